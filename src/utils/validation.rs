//! Validation utilities

use std::collections::HashSet;

use crate::traits::*;
use crate::types::*;

/// Longest accepted transaction identifier
pub const MAX_RECORD_ID_LEN: usize = 50;

/// Longest accepted description
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Validate that a transaction identifier has an accepted shape
pub fn validate_record_id(record_id: &str) -> ConsolidationResult<()> {
    if record_id.trim().is_empty() {
        return Err(ConsolidationError::data_quality(
            record_id,
            DataQualityIssue::MissingIdentifier,
        ));
    }

    if record_id.len() > MAX_RECORD_ID_LEN {
        return Err(ConsolidationError::data_quality(
            record_id,
            DataQualityIssue::InvalidIdentifier(format!(
                "longer than {} characters",
                MAX_RECORD_ID_LEN
            )),
        ));
    }

    // Check for valid characters (alphanumeric, dashes, underscores)
    if !record_id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConsolidationError::data_quality(
            record_id,
            DataQualityIssue::InvalidIdentifier(
                "only alphanumeric characters, dashes and underscores are allowed".to_string(),
            ),
        ));
    }

    Ok(())
}

/// Validate that a description is within the accepted length
pub fn validate_description(record: &TransactionRecord) -> ConsolidationResult<()> {
    let length = record.description.chars().count();
    if length > MAX_DESCRIPTION_LEN {
        return Err(ConsolidationError::data_quality(
            &record.id,
            DataQualityIssue::DescriptionTooLong {
                length,
                max: MAX_DESCRIPTION_LEN,
            },
        ));
    }
    Ok(())
}

/// Run the per-record validator plus the ledger-wide checks.
///
/// Stops at the first offending record: blank identifier or company,
/// validator failure, duplicate identifier, or a group company booking an
/// internal transaction against itself.
pub fn validate_ledger(
    records: &[TransactionRecord],
    group: &GroupMembers,
    validator: &dyn RecordValidator,
) -> ConsolidationResult<()> {
    let mut seen = HashSet::with_capacity(records.len());

    for record in records {
        if record.id.trim().is_empty() {
            return Err(ConsolidationError::data_quality(
                &record.id,
                DataQualityIssue::MissingIdentifier,
            ));
        }

        if record.company.trim().is_empty() {
            return Err(ConsolidationError::data_quality(
                &record.id,
                DataQualityIssue::MissingCompany,
            ));
        }

        validator.validate_record(record)?;

        if !seen.insert(record.id.as_str()) {
            return Err(ConsolidationError::data_quality(
                &record.id,
                DataQualityIssue::DuplicateIdentifier,
            ));
        }

        if group.contains(&record.company)
            && record.counterparty.as_deref() == Some(record.company.as_str())
        {
            return Err(ConsolidationError::data_quality(
                &record.id,
                DataQualityIssue::SelfCounterparty,
            ));
        }
    }

    Ok(())
}

/// Strict record validator: sign convention plus identifier and description checks
pub struct StrictRecordValidator;

impl RecordValidator for StrictRecordValidator {
    fn validate_record(&self, record: &TransactionRecord) -> ConsolidationResult<()> {
        // Basic validation
        DefaultRecordValidator.validate_record(record)?;

        validate_record_id(&record.id)?;
        validate_description(record)?;

        Ok(())
    }
}
