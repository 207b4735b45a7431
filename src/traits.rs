//! Traits for ledger sources, output sinks and record validation

use async_trait::async_trait;

use crate::types::*;

/// Source of the ledger rows and group membership list for one run
///
/// This lets the consolidation engine work with any input backend
/// (CSV files, a database export, in-memory fixtures) by implementing
/// these two loaders.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Load every transaction record for the run
    async fn load_records(&self) -> ConsolidationResult<Vec<TransactionRecord>>;

    /// Load the companies that belong to the consolidation group
    async fn load_group_members(&self) -> ConsolidationResult<GroupMembers>;
}

/// Destination for classified records (the audit trail of a run)
#[async_trait]
pub trait TaggedRecordSink: Send + Sync {
    /// Persist the tagged records, replacing any previous output
    async fn write_tagged(&mut self, records: &[TaggedRecord]) -> ConsolidationResult<()>;
}

/// Trait for implementing custom record validation rules
pub trait RecordValidator: Send + Sync {
    /// Validate a single record before it is classified
    fn validate_record(&self, record: &TransactionRecord) -> ConsolidationResult<()>;
}

/// Default record validator: enforces the amount sign convention only
pub struct DefaultRecordValidator;

impl RecordValidator for DefaultRecordValidator {
    fn validate_record(&self, record: &TransactionRecord) -> ConsolidationResult<()> {
        if !record.has_valid_sign() {
            return Err(ConsolidationError::data_quality(
                &record.id,
                DataQualityIssue::SignConvention {
                    account_type: record.account_type,
                    amount: record.amount.clone(),
                },
            ));
        }
        Ok(())
    }
}
