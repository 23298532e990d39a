use crate::quality::classify::BoundaryTable;
use crate::quality::error::AirQualityError;
use crate::quality::types::{AggregateSummary, Reading, ValueStats};
use crate::quality::utility::mean;
use std::collections::BTreeMap;

/// Aggregates readings into an [`AggregateSummary`] using the PM2.5 table.
pub fn aggregate(readings: &[Reading]) -> Result<AggregateSummary, AirQualityError> {
    aggregate_with(readings, &BoundaryTable::pm25())
}

/// Aggregates readings into an [`AggregateSummary`] against `table`.
///
/// Readings without a value count towards `total_count` only. When no reading
/// has a value the summary carries no numeric statistics.
///
/// # Errors
///
/// Returns [`AirQualityError::InvalidInput`] on the first negative or
/// non-finite value instead of coercing it.
pub fn aggregate_with(
    readings: &[Reading],
    table: &BoundaryTable,
) -> Result<AggregateSummary, AirQualityError> {
    let mut values = Vec::with_capacity(readings.len());
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut tier_counts = BTreeMap::new();

    for value in readings.iter().filter_map(|r| r.value) {
        let tier = table.classify(value)?;
        *tier_counts.entry(tier).or_insert(0) += 1;

        values.push(value);
        min = min.min(value);
        max = max.max(value);
    }

    let Some(average) = mean(&values) else {
        return Ok(AggregateSummary::empty(readings.len()));
    };

    Ok(AggregateSummary {
        stats: Some(ValueStats {
            // Rounding in the running mean may not land exactly inside [min, max].
            average: average.clamp(min, max),
            min,
            max,
        }),
        valid_count: values.len(),
        total_count: readings.len(),
        tier_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::classify::classify;
    use crate::quality::tier::Tier;

    fn reading(station_id: u64, value: Option<f64>) -> Reading {
        Reading {
            station_id,
            latitude: 4.65,
            longitude: -74.08,
            value,
            timestamp: None,
        }
    }

    #[test]
    fn test_aggregate_empty() {
        let summary = aggregate(&[]).unwrap();
        assert_eq!(summary.valid_count, 0);
        assert_eq!(summary.total_count, 0);
        assert!(summary.stats.is_none());
        assert!(summary.tier_counts.is_empty());
    }

    #[test]
    fn test_aggregate_all_absent() {
        let readings = vec![reading(1, None), reading(2, None)];
        let summary = aggregate(&readings).unwrap();
        assert_eq!(summary.total_count, 2);
        assert_eq!(summary.valid_count, 0);
        assert_eq!(summary.min_value(), None);
    }

    #[test]
    fn test_aggregate_mixed() {
        let readings = vec![reading(1, Some(10.0)), reading(2, Some(20.0)), reading(3, None)];
        let summary = aggregate(&readings).unwrap();

        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.valid_count, 2);
        assert_eq!(summary.average_value(), Some(15.0));
        assert_eq!(summary.min_value(), Some(10.0));
        assert_eq!(summary.max_value(), Some(20.0));
        assert_eq!(summary.tier_counts.len(), 2);
        assert_eq!(summary.tier_count(Tier::Bueno), 1);
        assert_eq!(summary.tier_count(Tier::Moderado), 1);
    }

    #[test]
    fn test_tier_counts_sum_to_valid_count() {
        let readings: Vec<_> = [0.0, 5.0, 12.1, 40.0, 55.5, 200.0, 300.0]
            .iter()
            .enumerate()
            .map(|(i, v)| reading(i as u64, Some(*v)))
            .chain(std::iter::once(reading(99, None)))
            .collect();
        let summary = aggregate(&readings).unwrap();

        assert_eq!(summary.tier_counts.values().sum::<usize>(), summary.valid_count);
        assert!(summary.valid_count <= summary.total_count);
        assert_eq!(summary.tier_count(Tier::Bueno), 2);
        assert_eq!(summary.tier_count(Tier::Peligroso), 1);
    }

    #[test]
    fn test_aggregate_rejects_negative_value() {
        let readings = vec![reading(1, Some(10.0)), reading(2, Some(-3.0))];
        assert_eq!(
            aggregate(&readings),
            Err(AirQualityError::InvalidInput(-3.0))
        );
    }

    #[test]
    fn test_aggregate_is_idempotent_and_order_independent() {
        let readings = vec![
            reading(1, Some(8.0)),
            reading(2, None),
            reading(3, Some(60.0)),
            reading(4, Some(36.0)),
        ];
        let first = aggregate(&readings).unwrap();
        assert_eq!(first, aggregate(&readings).unwrap());

        let mut reversed = readings.clone();
        reversed.reverse();
        assert_eq!(first, aggregate(&reversed).unwrap());

        let mut rotated = readings.clone();
        rotated.rotate_left(1);
        assert_eq!(first, aggregate(&rotated).unwrap());
    }

    #[test]
    fn test_fractional_average_is_order_independent() {
        let forward = vec![reading(1, Some(0.1)), reading(2, Some(0.2)), reading(3, Some(0.3))];
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = aggregate(&forward).unwrap();
        let b = aggregate(&reversed).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.average_value(), b.average_value());
    }

    #[test]
    fn test_average_does_not_overflow() {
        let readings = vec![reading(1, Some(f64::MAX)), reading(2, Some(f64::MAX))];
        let summary = aggregate(&readings).unwrap();

        let average = summary.average_value().unwrap();
        assert!(average.is_finite());
        assert!(average <= summary.max_value().unwrap());
        assert!(average >= summary.min_value().unwrap());
    }

    #[test]
    fn test_alto_boundary_scenario() {
        let tiers: Vec<_> = [55.5, 55.4].iter().map(|v| classify(*v).unwrap()).collect();
        assert_eq!(tiers, vec![Tier::Alto, Tier::Regular]);

        let summary = aggregate(&[reading(1, Some(55.5)), reading(2, Some(55.4))]).unwrap();
        assert_eq!(summary.tier_count(Tier::Alto), 1);
        assert_eq!(summary.tier_count(Tier::Regular), 1);
    }

    #[test]
    fn test_aggregate_with_custom_table() {
        let table = BoundaryTable::pm10();
        let summary = aggregate_with(&[reading(1, Some(60.0))], &table).unwrap();
        assert_eq!(summary.tier_count(Tier::Alto), 1);
    }
}
