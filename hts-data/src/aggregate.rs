//! Reduce accumulated tuples to one value per timestamp.

use hts_series::{Series, SeriesPoint, TupleSeries};
use serde::{Deserialize, Serialize};

/// Reduction applied to the values contributed at one timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    #[default]
    Mean,
    Sum,
    Max,
    Min,
}

impl Aggregation {
    /// Reduce a non-empty slice; `None` for an empty one.
    pub fn reduce(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let result = match self {
            Aggregation::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Aggregation::Sum => values.iter().sum(),
            Aggregation::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregation::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        };
        Some(round3(result))
    }
}

/// Round to the three decimals used for mm and m³/s.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Reduce each tuple to a single value. Tuples with no contributed values are
/// dropped rather than zero-filled.
pub fn aggregate(tuples: &TupleSeries, aggregation: Aggregation) -> Series {
    let points = tuples
        .iter()
        .filter_map(|tuple| {
            aggregation
                .reduce(&tuple.values)
                .map(|value| SeriesPoint::new(tuple.timestamp, value))
        })
        .collect();
    Series::from_sorted(points)
}

pub fn average(tuples: &TupleSeries) -> Series {
    aggregate(tuples, Aggregation::Mean)
}

pub fn sum(tuples: &TupleSeries) -> Series {
    aggregate(tuples, Aggregation::Sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::at;
    use hts_series::TuplePoint;

    fn tuples(rows: &[(u32, u32, &[f64])]) -> TupleSeries {
        TupleSeries::from_sorted(
            rows.iter()
                .map(|&(h, m, values)| TuplePoint {
                    timestamp: at(h, m),
                    values: values.to_vec(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_average_and_sum() {
        let input = tuples(&[(10, 0, &[1.0, 2.0, 3.0])]);
        let avg = average(&input);
        assert_eq!(avg.len(), 1);
        assert_eq!(avg[0].timestamp, at(10, 0));
        assert_eq!(avg[0].formatted_value(), "2.000");
        assert_eq!(sum(&input)[0].formatted_value(), "6.000");
    }

    #[test]
    fn test_empty_tuples_are_dropped() {
        let input = tuples(&[(10, 0, &[]), (10, 5, &[4.0]), (10, 10, &[])]);
        let out = average(&input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].timestamp, at(10, 5));
        assert_eq!(out[0].value, Some(4.0));
        assert!(sum(&TupleSeries::new()).is_empty());
    }

    #[test]
    fn test_rounding_to_three_decimals() {
        let input = tuples(&[(10, 0, &[1.0, 1.0, 2.0])]);
        assert_eq!(average(&input)[0].value, Some(1.333));
        assert_eq!(round3(0.0004), 0.0);
        assert_eq!(round3(1.23456), 1.235);
    }

    #[test]
    fn test_negative_results_are_not_clamped() {
        let input = tuples(&[(10, 0, &[-1.0, -2.0])]);
        assert_eq!(sum(&input)[0].value, Some(-3.0));
    }

    #[test]
    fn test_max_min() {
        let input = tuples(&[(10, 0, &[1.5, -2.0, 0.25])]);
        assert_eq!(aggregate(&input, Aggregation::Max)[0].value, Some(1.5));
        assert_eq!(aggregate(&input, Aggregation::Min)[0].value, Some(-2.0));
    }
}
