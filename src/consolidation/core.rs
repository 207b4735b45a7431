//! Orchestrator that loads a ledger, runs the pipeline and persists tagged output

use tracing::{info, warn};

use crate::config::ConsolidationConfig;
use crate::consolidation::pipeline::{finish, Classified, ConsolidationReport};
use crate::traits::*;
use crate::types::*;

/// Consolidation run bound to one ledger source
pub struct Consolidator<S: LedgerSource> {
    source: S,
    tolerance: Tolerance,
    validator: Box<dyn RecordValidator>,
}

impl<S: LedgerSource> Consolidator<S> {
    /// Create a consolidator with exact tolerance and the default validator
    pub fn new(source: S) -> Self {
        Self {
            source,
            tolerance: Tolerance::exact(),
            validator: Box::new(DefaultRecordValidator),
        }
    }

    /// Create a consolidator with a custom record validator
    pub fn with_validator(source: S, validator: Box<dyn RecordValidator>) -> Self {
        Self {
            source,
            tolerance: Tolerance::exact(),
            validator,
        }
    }

    /// Replace the mismatch tolerance
    pub fn tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load the group membership list and build the run configuration
    pub async fn load_config(&self) -> ConsolidationResult<ConsolidationConfig> {
        let group = self.source.load_group_members().await?;
        Ok(ConsolidationConfig::new(group).with_tolerance(self.tolerance.clone()))
    }

    /// Load, classify, validate and summarize
    pub async fn run(&self) -> ConsolidationResult<ConsolidationReport> {
        let classified = self.load_and_classify().await?;
        self.finish_run(classified)
    }

    /// Same as [`run`](Self::run), but also writes the tagged records to `sink`.
    ///
    /// Tagged output is written once classification succeeds, so a run that is
    /// later rejected for mismatched pairs still leaves its audit trail.
    pub async fn run_with_sink<W: TaggedRecordSink>(
        &self,
        sink: &mut W,
    ) -> ConsolidationResult<ConsolidationReport> {
        let classified = self.load_and_classify().await?;
        sink.write_tagged(classified.tagged()).await?;
        info!(records = classified.tagged().len(), "wrote tagged records");
        self.finish_run(classified)
    }

    async fn load_and_classify(&self) -> ConsolidationResult<Classified> {
        // Group membership is checked before any record is looked at
        let config = self.load_config().await?;
        let records = self.source.load_records().await?;
        info!(
            records = records.len(),
            group_members = config.group_members.len(),
            "loaded ledger"
        );

        Classified::new(records, &config.group_members, self.validator.as_ref())
    }

    fn finish_run(&self, classified: Classified) -> ConsolidationResult<ConsolidationReport> {
        let result = finish(classified, &self.tolerance);
        if let Err(ConsolidationError::Mismatch(reports)) = &result {
            warn!(pairs = reports.len(), "consolidation aborted");
        }
        result
    }
}
