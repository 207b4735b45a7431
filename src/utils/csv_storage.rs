//! CSV ledger source and tagged-record writer
//!
//! Input columns: `TransactionID, Company, Counterparty, AccountType, Amount,
//! Description`. Tagged output keeps that order and appends `Is_Internal`
//! (`True`/`False`).

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::traits::*;
use crate::types::*;

#[derive(Debug, Deserialize)]
struct TransactionRow {
    #[serde(rename = "TransactionID")]
    transaction_id: String,
    #[serde(rename = "Company")]
    company: String,
    #[serde(rename = "Counterparty", default)]
    counterparty: Option<String>,
    #[serde(rename = "AccountType")]
    account_type: String,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Description", default)]
    description: String,
}

#[derive(Debug, Serialize)]
struct TaggedRow<'a> {
    #[serde(rename = "TransactionID")]
    transaction_id: &'a str,
    #[serde(rename = "Company")]
    company: &'a str,
    #[serde(rename = "Counterparty")]
    counterparty: &'a str,
    #[serde(rename = "AccountType")]
    account_type: &'static str,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Description")]
    description: &'a str,
    #[serde(rename = "Is_Internal")]
    is_internal: &'static str,
}

impl<'a> From<&'a TaggedRecord> for TaggedRow<'a> {
    fn from(tagged: &'a TaggedRecord) -> Self {
        let record = &tagged.record;
        Self {
            transaction_id: &record.id,
            company: &record.company,
            counterparty: record.counterparty.as_deref().unwrap_or(""),
            account_type: record.account_type.as_str(),
            amount: record.amount.to_string(),
            description: &record.description,
            is_internal: if tagged.is_internal() { "True" } else { "False" },
        }
    }
}

/// Parse transaction rows from CSV text with a header line.
///
/// Amounts are parsed as exact decimals. Rows missing trailing columns
/// (typically `Description`) read those columns as empty. Line numbers in
/// errors are the physical line a row starts on, header being line 1.
pub fn read_transactions<R: Read>(reader: R) -> ConsolidationResult<Vec<TransactionRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| ConsolidationError::Parse {
            line: 1,
            message: e.to_string(),
        })?
        .clone();

    let mut records = Vec::new();
    let mut raw = csv::StringRecord::new();
    loop {
        let more = reader.read_record(&mut raw).map_err(|e| ConsolidationError::Parse {
            line: e.position().map(|p| p.line()).unwrap_or_default(),
            message: e.to_string(),
        })?;
        if !more {
            break;
        }

        let line = raw.position().map(|p| p.line()).unwrap_or_default();
        while raw.len() < headers.len() {
            raw.push_field("");
        }

        let row: TransactionRow =
            raw.deserialize(Some(&headers))
                .map_err(|e| ConsolidationError::Parse {
                    line,
                    message: e.to_string(),
                })?;

        let account_type =
            AccountType::from_str(row.account_type.trim()).map_err(|e| ConsolidationError::Parse {
                line,
                message: e.to_string(),
            })?;
        let amount =
            BigDecimal::from_str(row.amount.trim()).map_err(|e| ConsolidationError::Parse {
                line,
                message: format!("cannot parse amount '{}': {}", row.amount, e),
            })?;

        records.push(TransactionRecord::new(
            row.transaction_id,
            row.company,
            row.counterparty,
            account_type,
            amount,
            row.description,
        ));
    }

    Ok(records)
}

/// Write tagged records as CSV with a header line
pub fn write_tagged_records<W: Write>(
    writer: W,
    records: &[TaggedRecord],
) -> ConsolidationResult<()> {
    let mut writer = csv::WriterBuilder::new().from_writer(writer);
    for tagged in records {
        writer
            .serialize(TaggedRow::from(tagged))
            .map_err(|e| ConsolidationError::Storage(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| ConsolidationError::Storage(e.to_string()))
}

fn open(path: &Path) -> ConsolidationResult<File> {
    File::open(path)
        .map_err(|e| ConsolidationError::Storage(format!("{}: {}", path.display(), e)))
}

/// Ledger read from a transactions CSV and a plain-text group list
#[derive(Debug, Clone)]
pub struct CsvLedger {
    transactions_path: PathBuf,
    group_path: PathBuf,
}

impl CsvLedger {
    pub fn new(transactions_path: impl Into<PathBuf>, group_path: impl Into<PathBuf>) -> Self {
        Self {
            transactions_path: transactions_path.into(),
            group_path: group_path.into(),
        }
    }
}

#[async_trait]
impl LedgerSource for CsvLedger {
    async fn load_records(&self) -> ConsolidationResult<Vec<TransactionRecord>> {
        read_transactions(open(&self.transactions_path)?)
    }

    async fn load_group_members(&self) -> ConsolidationResult<GroupMembers> {
        let mut text = String::new();
        open(&self.group_path)?
            .read_to_string(&mut text)
            .map_err(|e| ConsolidationError::Storage(e.to_string()))?;
        GroupMembers::parse(&text)
    }
}

/// Tagged output written to a CSV file, replacing any previous content
#[derive(Debug, Clone)]
pub struct CsvTaggedWriter {
    path: PathBuf,
}

impl CsvTaggedWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TaggedRecordSink for CsvTaggedWriter {
    async fn write_tagged(&mut self, records: &[TaggedRecord]) -> ConsolidationResult<()> {
        let file = File::create(&self.path).map_err(|e| {
            ConsolidationError::Storage(format!("{}: {}", self.path.display(), e))
        })?;
        write_tagged_records(file, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
TransactionID,Company,Counterparty,AccountType,Amount,Description
T001,A,Customer1,Revenue,550000,External sales
T002,A,B,Revenue,50000.00,Service to B
T003,A,,Expense,-400000,Unassigned cost
";

    #[test]
    fn test_read_transactions() {
        let records = read_transactions(SAMPLE.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id, "T001");
        assert_eq!(records[0].counterparty.as_deref(), Some("Customer1"));
        assert_eq!(records[1].amount, BigDecimal::from(50000));
        assert_eq!(records[2].counterparty, None);
        assert_eq!(records[2].account_type, AccountType::Expense);
        assert_eq!(records[2].amount, BigDecimal::from(-400000));
    }

    #[test]
    fn test_unknown_account_type_reports_line() {
        let csv = "\
TransactionID,Company,Counterparty,AccountType,Amount,Description
T001,A,B,Revenue,1,ok
T002,A,B,Asset,1,bad
";
        match read_transactions(csv.as_bytes()) {
            Err(ConsolidationError::Parse { line, message }) => {
                assert_eq!(line, 3);
                assert!(message.contains("Asset"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_line_follows_multiline_fields() {
        let csv = "\
TransactionID,Company,Counterparty,AccountType,Amount,Description
T1,A,B,Revenue,1,\"first line
second line\"
T2,A,B,Asset,1,bad
";
        match read_transactions(csv.as_bytes()) {
            Err(ConsolidationError::Parse { line, message }) => {
                assert_eq!(line, 4);
                assert!(message.contains("Asset"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_trailing_description() {
        let csv = "\
TransactionID,Company,Counterparty,AccountType,Amount,Description
T1,A,Customer,Revenue,10
T2,A,B,Expense,-5,Service from B
";
        let records = read_transactions(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].description, "");
        assert_eq!(records[0].amount, BigDecimal::from(10));
        assert_eq!(records[1].description, "Service from B");
    }

    #[test]
    fn test_bad_amount_reports_line() {
        let csv = "\
TransactionID,Company,Counterparty,AccountType,Amount,Description
T001,A,B,Revenue,12abc,bad
";
        assert!(matches!(
            read_transactions(csv.as_bytes()),
            Err(ConsolidationError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_write_tagged_records_keeps_column_order() {
        let records = read_transactions(SAMPLE.as_bytes()).unwrap();
        let tagged: Vec<TaggedRecord> = records
            .into_iter()
            .map(|record| {
                let tag = if record.id == "T002" {
                    ClassificationTag::Internal
                } else {
                    ClassificationTag::External
                };
                TaggedRecord { record, tag }
            })
            .collect();

        let mut out = Vec::new();
        write_tagged_records(&mut out, &tagged).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "TransactionID,Company,Counterparty,AccountType,Amount,Description,Is_Internal"
        );
        assert_eq!(lines[1], "T001,A,Customer1,Revenue,550000,External sales,False");
        assert_eq!(lines[2], "T002,A,B,Revenue,50000.00,Service to B,True");
        assert_eq!(lines[3], "T003,A,,Expense,-400000,Unassigned cost,False");
    }
}
