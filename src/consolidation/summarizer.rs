//! Revenue/expense totals for the consolidated statement

use bigdecimal::BigDecimal;

use crate::consolidation::elimination::EliminationEntry;
use crate::types::*;

/// Sum Revenue and Expense amounts over the given records.
///
/// Pure and total over any input. The pipeline only feeds it External
/// records, and only after pair validation has passed.
pub fn summarize<'a, I>(records: I) -> ConsolidatedSummary
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut revenue = BigDecimal::from(0);
    let mut expense = BigDecimal::from(0);

    for record in records {
        match record.account_type {
            AccountType::Revenue => revenue += &record.amount,
            AccountType::Expense => expense += &record.amount,
        }
    }

    ConsolidatedSummary::new(revenue, expense)
}

impl ConsolidatedSummary {
    /// Apply elimination adjustments to an unadjusted (all-records) summary
    pub fn with_eliminations(&self, eliminations: &[EliminationEntry]) -> ConsolidatedSummary {
        let mut revenue = self.total_revenue.clone();
        let mut expense = self.total_expense.clone();

        for elimination in eliminations {
            match elimination.account_type {
                AccountType::Revenue => revenue += &elimination.adjustment,
                AccountType::Expense => expense += &elimination.adjustment,
            }
        }

        ConsolidatedSummary::new(revenue, expense)
    }
}
