//! Elimination entries that reverse internal transactions on consolidation

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Adjustment that removes one internal record from the group statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EliminationEntry {
    /// Record being eliminated
    pub record_id: String,
    pub pair: EntityPairKey,
    pub account_type: AccountType,
    /// Posting side of the elimination (opposite of the account's normal balance)
    pub entry_type: EntryType,
    /// Unsigned posting amount
    pub amount: BigDecimal,
    /// Signed effect on the account total
    pub adjustment: BigDecimal,
    pub description: String,
}

/// Build the elimination for one internal record.
///
/// Revenue booked with a group company is reversed by a debit, expense by a
/// credit. Either way the signed adjustment cancels the original amount.
pub fn eliminate(record: &TransactionRecord) -> ConsolidationResult<EliminationEntry> {
    let pair = EntityPairKey::for_record(record).ok_or_else(|| {
        ConsolidationError::data_quality(&record.id, DataQualityIssue::SelfCounterparty)
    })?;

    let (entry_type, description) = match record.account_type {
        AccountType::Revenue => (
            EntryType::Debit,
            format!("Eliminate intercompany revenue {} ({})", record.id, pair),
        ),
        AccountType::Expense => (
            EntryType::Credit,
            format!("Eliminate intercompany expense {} ({})", record.id, pair),
        ),
    };

    Ok(EliminationEntry {
        record_id: record.id.clone(),
        pair,
        account_type: record.account_type,
        entry_type,
        amount: record.amount.abs(),
        adjustment: -record.amount.clone(),
        description,
    })
}

/// Build eliminations for a sequence of internal records
pub fn eliminate_all<'a, I>(internal_records: I) -> ConsolidationResult<Vec<EliminationEntry>>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    internal_records.into_iter().map(eliminate).collect()
}
