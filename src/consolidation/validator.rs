//! Zero-net check over entity pair aggregates

use tracing::warn;

use crate::consolidation::aggregator::PairAggregates;
use crate::types::*;

/// Check that every pair's net internal balance is within tolerance.
///
/// On failure all violating pairs are returned in pair-key order, so a
/// single run reports every issue.
pub fn validate(
    aggregates: &PairAggregates,
    tolerance: &Tolerance,
) -> Result<(), Vec<MismatchReport>> {
    let mismatches: Vec<MismatchReport> = aggregates
        .values()
        .filter(|aggregate| !tolerance.admits(&aggregate.net()))
        .map(MismatchReport::from_aggregate)
        .collect();

    if mismatches.is_empty() {
        return Ok(());
    }

    for mismatch in &mismatches {
        warn!(
            pair = %mismatch.pair,
            revenue = %mismatch.revenue,
            expense = %mismatch.expense,
            net = %mismatch.net,
            "internal transactions do not net to zero"
        );
    }

    Err(mismatches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consolidation::aggregator::aggregate;
    use bigdecimal::BigDecimal;

    #[test]
    fn test_balanced_pairs_pass() {
        let records = vec![
            TransactionRecord::revenue("T1", "A", "B", BigDecimal::from(50000), ""),
            TransactionRecord::expense("T2", "B", "A", BigDecimal::from(-50000), ""),
        ];
        let aggregates = aggregate(&records).unwrap();
        assert!(validate(&aggregates, &Tolerance::exact()).is_ok());
    }

    #[test]
    fn test_amount_mismatch_is_reported() {
        let records = vec![
            TransactionRecord::revenue("T1", "A", "B", BigDecimal::from(70000), ""),
            TransactionRecord::expense("T2", "B", "A", BigDecimal::from(-60000), ""),
        ];
        let aggregates = aggregate(&records).unwrap();
        let reports = validate(&aggregates, &Tolerance::exact()).unwrap_err();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].pair.to_string(), "A|B");
        assert_eq!(reports[0].revenue, BigDecimal::from(70000));
        assert_eq!(reports[0].expense, BigDecimal::from(-60000));
        assert_eq!(reports[0].net, BigDecimal::from(10000));
        assert_eq!(reports[0].record_ids, vec!["T1", "T2"]);
    }

    #[test]
    fn test_every_violation_is_reported_in_key_order() {
        let records = vec![
            TransactionRecord::revenue("T1", "C", "B", BigDecimal::from(5), ""),
            TransactionRecord::revenue("T2", "A", "B", BigDecimal::from(3), ""),
            TransactionRecord::revenue("T3", "A", "D", BigDecimal::from(4), ""),
            TransactionRecord::expense("T4", "D", "A", BigDecimal::from(-4), ""),
        ];
        let aggregates = aggregate(&records).unwrap();
        let reports = validate(&aggregates, &Tolerance::exact()).unwrap_err();

        let pairs: Vec<String> = reports.iter().map(|r| r.pair.to_string()).collect();
        assert_eq!(pairs, vec!["A|B", "B|C"]);
    }

    #[test]
    fn test_tolerance_absorbs_rounding() {
        let records = vec![
            TransactionRecord::revenue("T1", "A", "B", "100.005".parse().unwrap(), ""),
            TransactionRecord::expense("T2", "B", "A", BigDecimal::from(-100), ""),
        ];
        let aggregates = aggregate(&records).unwrap();

        assert!(validate(&aggregates, &Tolerance::exact()).is_err());
        let cent = Tolerance::absolute("0.01".parse().unwrap()).unwrap();
        assert!(validate(&aggregates, &cent).is_ok());
    }

    #[test]
    fn test_empty_aggregates_pass() {
        assert!(validate(&PairAggregates::new(), &Tolerance::exact()).is_ok());
    }
}
