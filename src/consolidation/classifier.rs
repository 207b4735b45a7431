//! Internal/External classification of ledger records

use crate::types::*;

/// Tag a record as Internal when both parties belong to the group.
///
/// Matching is exact and case-sensitive. Unknown companies and a missing
/// counterparty classify as External rather than failing.
pub fn classify(record: &TransactionRecord, group: &GroupMembers) -> ClassificationTag {
    let company_in_group = group.contains(&record.company);
    let counterparty_in_group = record
        .counterparty
        .as_deref()
        .is_some_and(|counterparty| group.contains(counterparty));

    if company_in_group && counterparty_in_group {
        ClassificationTag::Internal
    } else {
        ClassificationTag::External
    }
}

/// Classify every record, preserving input order
pub fn classify_all(records: Vec<TransactionRecord>, group: &GroupMembers) -> Vec<TaggedRecord> {
    records
        .into_iter()
        .map(|record| {
            let tag = classify(&record, group);
            TaggedRecord { record, tag }
        })
        .collect()
}
