//! Per entity pair summation of internal transactions

use std::collections::BTreeMap;

use tracing::debug;

use crate::types::*;

/// Aggregates keyed by canonical entity pair, in key order
pub type PairAggregates = BTreeMap<EntityPairKey, EntityPairAggregate>;

/// Group internal records by unordered (company, counterparty) pair and sum
/// Revenue and Expense amounts per pair.
///
/// Summation is exact, so the result does not depend on input order. A pair
/// with only one side present still aggregates and ends up with a nonzero net.
/// A record without two distinct parties cannot form a pair and is rejected.
pub fn aggregate<'a, I>(internal_records: I) -> ConsolidationResult<PairAggregates>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut aggregates = PairAggregates::new();

    for record in internal_records {
        let key = EntityPairKey::for_record(record).ok_or_else(|| {
            ConsolidationError::data_quality(&record.id, DataQualityIssue::SelfCounterparty)
        })?;
        aggregates
            .entry(key.clone())
            .or_insert_with(|| EntityPairAggregate::new(key))
            .add(record);
    }

    for aggregate in aggregates.values() {
        debug!(
            pair = %aggregate.key,
            revenue = %aggregate.revenue,
            expense = %aggregate.expense,
            records = aggregate.record_count,
            "aggregated entity pair"
        );
    }

    Ok(aggregates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    fn key(a: &str, b: &str) -> EntityPairKey {
        EntityPairKey::new(a, b).unwrap()
    }

    #[test]
    fn test_both_directions_share_a_pair() {
        let records = vec![
            TransactionRecord::revenue("T1", "A", "B", BigDecimal::from(50000), ""),
            TransactionRecord::expense("T2", "B", "A", BigDecimal::from(-50000), ""),
        ];
        let aggregates = aggregate(&records).unwrap();

        assert_eq!(aggregates.len(), 1);
        let pair = &aggregates[&key("A", "B")];
        assert_eq!(pair.revenue, BigDecimal::from(50000));
        assert_eq!(pair.expense, BigDecimal::from(-50000));
        assert_eq!(pair.net(), BigDecimal::from(0));
        assert_eq!(pair.record_count, 2);
    }

    #[test]
    fn test_pairs_are_kept_separate() {
        let records = vec![
            TransactionRecord::revenue("T1", "A", "B", BigDecimal::from(10), ""),
            TransactionRecord::revenue("T2", "C", "A", BigDecimal::from(20), ""),
            TransactionRecord::expense("T3", "A", "C", BigDecimal::from(-20), ""),
        ];
        let aggregates = aggregate(&records).unwrap();

        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates[&key("A", "B")].net(), BigDecimal::from(10));
        assert_eq!(aggregates[&key("A", "C")].net(), BigDecimal::from(0));
        // BTreeMap ordering: A|B before A|C
        let order: Vec<String> = aggregates.keys().map(|k| k.to_string()).collect();
        assert_eq!(order, vec!["A|B", "A|C"]);
    }

    #[test]
    fn test_single_sided_pair_keeps_its_amount() {
        let records = vec![TransactionRecord::revenue(
            "T1",
            "A",
            "B",
            BigDecimal::from(70000),
            "",
        )];
        let aggregates = aggregate(&records).unwrap();
        assert_eq!(aggregates[&key("A", "B")].net(), BigDecimal::from(70000));
    }

    #[test]
    fn test_reversed_input_gives_same_result() {
        let records = vec![
            TransactionRecord::revenue("T1", "A", "B", BigDecimal::from(5), ""),
            TransactionRecord::expense("T2", "B", "A", BigDecimal::from(-3), ""),
            TransactionRecord::revenue("T3", "B", "C", BigDecimal::from(7), ""),
        ];
        let mut reversed = records.clone();
        reversed.reverse();

        assert_eq!(aggregate(&records).unwrap(), aggregate(&reversed).unwrap());
    }

    #[test]
    fn test_self_counterparty_is_rejected() {
        let records = vec![TransactionRecord::revenue(
            "T1",
            "A",
            "A",
            BigDecimal::from(1),
            "",
        )];
        assert!(matches!(
            aggregate(&records),
            Err(ConsolidationError::DataQuality {
                issue: DataQualityIssue::SelfCounterparty,
                ..
            })
        ));
    }
}
