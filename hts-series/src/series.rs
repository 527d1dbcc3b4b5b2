use crate::error::{Result, SeriesError};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Marker the legacy stores use for "expected but not observed yet".
///
/// Only [`SeriesPoint::from_legacy`] and [`SeriesPoint::to_legacy`] know about
/// it; inside the engine a missing value is always `None`.
pub const LEGACY_SENTINEL: f64 = -99999.0;

/// A single sample. `value == None` means no observation at this tick, which
/// is distinct from an observed zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

impl SeriesPoint {
    /// An observed sample.
    pub fn new(timestamp: NaiveDateTime, value: f64) -> SeriesPoint {
        SeriesPoint {
            timestamp,
            value: Some(value),
        }
    }

    /// A grid tick with no observation.
    pub fn missing(timestamp: NaiveDateTime) -> SeriesPoint {
        SeriesPoint {
            timestamp,
            value: None,
        }
    }

    /// Convert a raw store value, mapping the legacy sentinel and NaN to missing.
    pub fn from_legacy(timestamp: NaiveDateTime, raw: f64) -> SeriesPoint {
        if raw == LEGACY_SENTINEL || raw.is_nan() {
            SeriesPoint::missing(timestamp)
        } else {
            SeriesPoint::new(timestamp, raw)
        }
    }

    /// The value as the legacy stores expect it.
    pub fn to_legacy(&self) -> f64 {
        self.value.unwrap_or(LEGACY_SENTINEL)
    }

    pub fn is_missing(&self) -> bool {
        self.value.is_none()
    }

    /// Value rendered with three decimals (mm, m³/s); empty when missing.
    pub fn formatted_value(&self) -> String {
        match self.value {
            Some(v) => format!("{:.3}", v),
            None => String::new(),
        }
    }
}

/// An ordered sequence of samples with strictly increasing timestamps.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<SeriesPoint>", into = "Vec<SeriesPoint>")]
pub struct Series {
    points: Vec<SeriesPoint>,
}

impl Series {
    pub fn new() -> Series {
        Series { points: Vec::new() }
    }

    /// Build a series, rejecting duplicated or out-of-order timestamps.
    pub fn try_new(points: Vec<SeriesPoint>) -> Result<Series> {
        Series::check_monotonic(&points)?;
        Ok(Series { points })
    }

    /// Build a series from points the caller produced in increasing order.
    ///
    /// Intended for transformations that walk a grid forward; the ordering is
    /// only checked in debug builds.
    pub fn from_sorted(points: Vec<SeriesPoint>) -> Series {
        debug_assert!(
            Series::check_monotonic(&points).is_ok(),
            "from_sorted called with non-monotonic points"
        );
        Series { points }
    }

    /// Find the first timestamp that does not strictly increase.
    pub fn check_monotonic(points: &[SeriesPoint]) -> Result<()> {
        for (index, pair) in points.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(SeriesError::NonMonotonic {
                    index: index + 1,
                    previous: pair[0].timestamp,
                    current: pair[1].timestamp,
                });
            }
        }
        Ok(())
    }

    /// Append a point after the current last one.
    pub fn push(&mut self, point: SeriesPoint) -> Result<()> {
        if let Some(last) = self.points.last() {
            if point.timestamp <= last.timestamp {
                return Err(SeriesError::NonMonotonic {
                    index: self.points.len(),
                    previous: last.timestamp,
                    current: point.timestamp,
                });
            }
        }
        self.points.push(point);
        Ok(())
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<SeriesPoint> {
        self.points
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.points.first().map(|p| p.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.points.last().map(|p| p.timestamp)
    }

    /// Number of ticks still carrying no observation.
    pub fn missing_count(&self) -> usize {
        self.points.iter().filter(|p| p.is_missing()).count()
    }

    /// Look up the sample at an exact timestamp.
    pub fn get(&self, timestamp: NaiveDateTime) -> Option<&SeriesPoint> {
        self.points
            .binary_search_by(|p| p.timestamp.cmp(&timestamp))
            .ok()
            .map(|i| &self.points[i])
    }

    /// The samples strictly after `timestamp`.
    pub fn after(&self, timestamp: NaiveDateTime) -> Series {
        let start = self.points.partition_point(|p| p.timestamp <= timestamp);
        Series {
            points: self.points[start..].to_vec(),
        }
    }

    /// Apply `f` to every value, keeping the timestamps.
    pub fn map_values<F>(&self, f: F) -> Series
    where
        F: Fn(Option<f64>) -> Option<f64>,
    {
        Series {
            points: self
                .points
                .iter()
                .map(|p| SeriesPoint {
                    timestamp: p.timestamp,
                    value: f(p.value),
                })
                .collect(),
        }
    }
}

impl Deref for Series {
    type Target = [SeriesPoint];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl TryFrom<Vec<SeriesPoint>> for Series {
    type Error = SeriesError;

    fn try_from(points: Vec<SeriesPoint>) -> Result<Self> {
        Series::try_new(points)
    }
}

impl From<Series> for Vec<SeriesPoint> {
    fn from(series: Series) -> Self {
        series.points
    }
}

impl IntoIterator for Series {
    type Item = SeriesPoint;
    type IntoIter = std::vec::IntoIter<SeriesPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a SeriesPoint;
    type IntoIter = std::slice::Iter<'a, SeriesPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
