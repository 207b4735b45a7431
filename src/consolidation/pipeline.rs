//! Single-pass consolidation pipeline
//!
//! Each stage consumes the previous one:
//! `Classified -> Aggregated -> Validated | Rejected`, and only a
//! `Validated` ledger can be summarized. A rejected run ends without a
//! consolidated summary.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};
use uuid::Uuid;

use crate::config::ConsolidationConfig;
use crate::consolidation::aggregator::{aggregate, PairAggregates};
use crate::consolidation::classifier::classify_all;
use crate::consolidation::elimination::{eliminate_all, EliminationEntry};
use crate::consolidation::summarizer::summarize;
use crate::consolidation::validator::validate;
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::validate_ledger;

/// Records that passed data-quality checks and carry a classification tag
#[derive(Debug, Clone)]
pub struct Classified {
    tagged: Vec<TaggedRecord>,
}

impl Classified {
    /// Check and classify a loaded ledger
    pub fn new(
        records: Vec<TransactionRecord>,
        group: &GroupMembers,
        validator: &dyn RecordValidator,
    ) -> ConsolidationResult<Self> {
        validate_ledger(&records, group, validator)?;
        let tagged = classify_all(records, group);

        let internal = tagged.iter().filter(|t| t.is_internal()).count();
        info!(
            records = tagged.len(),
            internal,
            external = tagged.len() - internal,
            "classified ledger"
        );

        Ok(Self { tagged })
    }

    pub fn tagged(&self) -> &[TaggedRecord] {
        &self.tagged
    }

    pub fn internal_records(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.tagged
            .iter()
            .filter(|t| t.is_internal())
            .map(|t| &t.record)
    }

    pub fn external_records(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.tagged
            .iter()
            .filter(|t| !t.is_internal())
            .map(|t| &t.record)
    }

    /// Sum internal records per entity pair and build their eliminations
    pub fn aggregate(self) -> ConsolidationResult<Aggregated> {
        let aggregates = aggregate(self.internal_records())?;
        let eliminations = eliminate_all(self.internal_records())?;
        info!(pairs = aggregates.len(), "aggregated internal transactions");

        Ok(Aggregated {
            tagged: self.tagged,
            aggregates,
            eliminations,
        })
    }
}

/// Internal activity summed per entity pair, not yet validated
#[derive(Debug, Clone)]
pub struct Aggregated {
    tagged: Vec<TaggedRecord>,
    aggregates: PairAggregates,
    eliminations: Vec<EliminationEntry>,
}

impl Aggregated {
    pub fn tagged(&self) -> &[TaggedRecord] {
        &self.tagged
    }

    pub fn aggregates(&self) -> &PairAggregates {
        &self.aggregates
    }

    /// Gate: every pair must net to zero within tolerance
    pub fn validate(self, tolerance: &Tolerance) -> Result<Validated, Rejected> {
        match validate(&self.aggregates, tolerance) {
            Ok(()) => Ok(Validated {
                tagged: self.tagged,
                aggregates: self.aggregates,
                eliminations: self.eliminations,
            }),
            Err(mismatches) => Err(Rejected {
                tagged: self.tagged,
                mismatches,
            }),
        }
    }
}

/// Ledger whose internal transactions all balance
#[derive(Debug, Clone)]
pub struct Validated {
    tagged: Vec<TaggedRecord>,
    aggregates: PairAggregates,
    eliminations: Vec<EliminationEntry>,
}

impl Validated {
    pub fn tagged(&self) -> &[TaggedRecord] {
        &self.tagged
    }

    /// Produce the consolidated report from external records
    pub fn summarize(self) -> ConsolidationReport {
        let all_records = self.tagged.iter().map(|t| &t.record);
        let unadjusted = summarize(all_records);
        let consolidated = summarize(
            self.tagged
                .iter()
                .filter(|t| !t.is_internal())
                .map(|t| &t.record),
        );

        let internal_count = self.tagged.iter().filter(|t| t.is_internal()).count();
        let external_count = self.tagged.len() - internal_count;

        info!(
            revenue = %consolidated.total_revenue,
            expense = %consolidated.total_expense,
            net_profit = %consolidated.net_profit,
            "consolidated summary ready"
        );

        ConsolidationReport {
            run_id: Uuid::new_v4(),
            generated_at: chrono::Utc::now().naive_utc(),
            internal_count,
            external_count,
            pairs: self.aggregates.into_values().collect(),
            eliminations: self.eliminations,
            unadjusted,
            consolidated,
            tagged: self.tagged,
        }
    }
}

/// Terminal state of a run whose internal transactions do not balance
#[derive(Debug, Clone)]
pub struct Rejected {
    tagged: Vec<TaggedRecord>,
    mismatches: Vec<MismatchReport>,
}

impl Rejected {
    pub fn tagged(&self) -> &[TaggedRecord] {
        &self.tagged
    }

    pub fn mismatches(&self) -> &[MismatchReport] {
        &self.mismatches
    }

    pub fn into_error(self) -> ConsolidationError {
        ConsolidationError::Mismatch(self.mismatches)
    }
}

/// Outcome of a successful consolidation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationReport {
    pub run_id: Uuid,
    pub generated_at: NaiveDateTime,
    pub internal_count: usize,
    pub external_count: usize,
    /// Balanced entity pairs, in key order
    pub pairs: Vec<EntityPairAggregate>,
    pub eliminations: Vec<EliminationEntry>,
    /// Totals over every record, internal included
    pub unadjusted: ConsolidatedSummary,
    /// Totals over external records only
    pub consolidated: ConsolidatedSummary,
    pub tagged: Vec<TaggedRecord>,
}

/// Run the whole pipeline over an already-loaded ledger
pub fn consolidate(
    records: Vec<TransactionRecord>,
    config: &ConsolidationConfig,
) -> ConsolidationResult<ConsolidationReport> {
    consolidate_with_validator(records, config, &DefaultRecordValidator)
}

/// Run the whole pipeline with a custom record validator
pub fn consolidate_with_validator(
    records: Vec<TransactionRecord>,
    config: &ConsolidationConfig,
    validator: &dyn RecordValidator,
) -> ConsolidationResult<ConsolidationReport> {
    let span = info_span!("consolidate", records = records.len());
    let _guard = span.enter();

    let classified = Classified::new(records, &config.group_members, validator)?;
    finish(classified, &config.tolerance)
}

/// Aggregate, validate and summarize a classified ledger
pub fn finish(
    classified: Classified,
    tolerance: &Tolerance,
) -> ConsolidationResult<ConsolidationReport> {
    classified
        .aggregate()?
        .validate(tolerance)
        .map(Validated::summarize)
        .map_err(Rejected::into_error)
}
