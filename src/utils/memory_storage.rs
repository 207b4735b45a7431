//! In-memory ledger source and tagged-record sink

use async_trait::async_trait;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::*;
use crate::types::*;

/// In-memory ledger for testing and embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    records: Arc<RwLock<Vec<TransactionRecord>>>,
    group_members: Arc<RwLock<Option<GroupMembers>>>,
    tagged: Arc<RwLock<Vec<TaggedRecord>>>,
}

fn read<T>(lock: &RwLock<T>) -> ConsolidationResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| ConsolidationError::Storage("memory ledger lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> ConsolidationResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| ConsolidationError::Storage("memory ledger lock poisoned".to_string()))
}

impl MemoryLedger {
    /// Create an empty memory ledger with no group configured
    pub fn new() -> Self {
        Self::default()
    }

    /// Append records to the ledger
    pub fn add_records(&self, records: Vec<TransactionRecord>) -> ConsolidationResult<()> {
        write(&self.records)?.extend(records);
        Ok(())
    }

    /// Configure the consolidation group
    pub fn set_group_members(&self, group: GroupMembers) -> ConsolidationResult<()> {
        *write(&self.group_members)? = Some(group);
        Ok(())
    }

    /// Tagged records written by the last run
    pub fn tagged_records(&self) -> ConsolidationResult<Vec<TaggedRecord>> {
        Ok(read(&self.tagged)?.clone())
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> ConsolidationResult<()> {
        write(&self.records)?.clear();
        *write(&self.group_members)? = None;
        write(&self.tagged)?.clear();
        Ok(())
    }
}

#[async_trait]
impl LedgerSource for MemoryLedger {
    async fn load_records(&self) -> ConsolidationResult<Vec<TransactionRecord>> {
        Ok(read(&self.records)?.clone())
    }

    async fn load_group_members(&self) -> ConsolidationResult<GroupMembers> {
        read(&self.group_members)?.clone().ok_or_else(|| {
            ConsolidationError::Configuration("Group membership list is missing".to_string())
        })
    }
}

#[async_trait]
impl TaggedRecordSink for MemoryLedger {
    async fn write_tagged(&mut self, records: &[TaggedRecord]) -> ConsolidationResult<()> {
        *write(&self.tagged)? = records.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    #[tokio::test]
    async fn test_records_round_trip() {
        let ledger = MemoryLedger::new();
        ledger
            .add_records(vec![TransactionRecord::revenue(
                "T1",
                "A",
                "B",
                BigDecimal::from(1),
                "",
            )])
            .unwrap();

        let records = ledger.load_records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "T1");
    }

    #[tokio::test]
    async fn test_missing_group_is_configuration_error() {
        let ledger = MemoryLedger::new();
        assert!(matches!(
            ledger.load_group_members().await,
            Err(ConsolidationError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let ledger = MemoryLedger::new();
        let mut sink = ledger.clone();
        let tagged = vec![TaggedRecord {
            record: TransactionRecord::revenue("T1", "A", "B", BigDecimal::from(1), ""),
            tag: ClassificationTag::Internal,
        }];
        sink.write_tagged(&tagged).await.unwrap();
        assert_eq!(ledger.tagged_records().unwrap(), tagged);

        ledger.clear().unwrap();
        assert!(sink.tagged_records().unwrap().is_empty());
    }
}
