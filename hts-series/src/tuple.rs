use crate::series::Series;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::ops::Deref;

/// One timestamp carrying the values contributed by several sources.
///
/// A source with no observation at this timestamp contributes nothing, so
/// `values` never holds a missing marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TuplePoint {
    pub timestamp: NaiveDateTime,
    pub values: Vec<f64>,
}

impl TuplePoint {
    /// A tuple with at most one value.
    pub fn single(timestamp: NaiveDateTime, value: Option<f64>) -> TuplePoint {
        TuplePoint {
            timestamp,
            values: value.into_iter().collect(),
        }
    }

    /// Widen the tuple with another contribution; missing contributions are ignored.
    pub fn with(mut self, value: Option<f64>) -> TuplePoint {
        if let Some(v) = value {
            self.values.push(v);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Intermediate per-timestamp tuples, consumed by aggregation and never persisted.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TupleSeries {
    points: Vec<TuplePoint>,
}

impl TupleSeries {
    pub fn new() -> TupleSeries {
        TupleSeries { points: Vec::new() }
    }

    /// Build from tuples already in strictly increasing timestamp order.
    pub fn from_sorted(points: Vec<TuplePoint>) -> TupleSeries {
        debug_assert!(
            points.windows(2).all(|w| w[0].timestamp < w[1].timestamp),
            "from_sorted called with non-monotonic tuples"
        );
        TupleSeries { points }
    }

    pub fn points(&self) -> &[TuplePoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<TuplePoint> {
        self.points
    }
}

impl From<&Series> for TupleSeries {
    fn from(series: &Series) -> Self {
        TupleSeries {
            points: series
                .iter()
                .map(|p| TuplePoint::single(p.timestamp, p.value))
                .collect(),
        }
    }
}

impl Deref for TupleSeries {
    type Target = [TuplePoint];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}
