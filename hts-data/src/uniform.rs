//! Calendar-based reindexing and interpolation.

use chrono::NaiveDateTime;
use hts_series::{Result, Series, SeriesError, SeriesPoint, TimeGrid, Timestep};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a missing value between two observed ones is estimated.
///
/// Outside the first and last observed value every method holds the nearest
/// boundary value, in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Straight line between the neighbours, weighted by time
    #[default]
    Linear,
    /// The closer neighbour; the earlier one on a tie
    Nearest,
    /// Carry the previous observation forward
    Previous,
    /// Carry the next observation backward
    Next,
}

impl Interpolation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interpolation::Linear => "linear",
            Interpolation::Nearest => "nearest",
            Interpolation::Previous => "previous",
            Interpolation::Next => "next",
        }
    }

    fn between(&self, (t0, v0): (NaiveDateTime, f64), (t1, v1): (NaiveDateTime, f64), at: NaiveDateTime) -> f64 {
        match self {
            Interpolation::Linear => {
                let span = (t1 - t0).num_seconds() as f64;
                let slope = (v1 - v0) / span;
                v0 + slope * (at - t0).num_seconds() as f64
            }
            Interpolation::Nearest => {
                if at - t0 <= t1 - at {
                    v0
                } else {
                    v1
                }
            }
            Interpolation::Previous => v0,
            Interpolation::Next => v1,
        }
    }
}

impl FromStr for Interpolation {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Interpolation::Linear),
            "nearest" => Ok(Interpolation::Nearest),
            "previous" | "pad" | "ffill" => Ok(Interpolation::Previous),
            "next" | "bfill" => Ok(Interpolation::Next),
            _ => Err(SeriesError::UnknownLabel {
                kind: "interpolation method",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fill every missing value of `series` from its observed neighbours.
///
/// Fails with `EmptyInput` when there is nothing observed to fill from.
pub fn interpolate_missing(series: &Series, method: Interpolation) -> Result<Series> {
    let known: Vec<usize> = series
        .iter()
        .enumerate()
        .filter(|(_, p)| p.value.is_some())
        .map(|(i, _)| i)
        .collect();
    if known.is_empty() {
        return Err(SeriesError::EmptyInput("no observed value to interpolate from"));
    }

    let points = series
        .iter()
        .enumerate()
        .map(|(i, point)| {
            if point.value.is_some() {
                return *point;
            }
            let next_pos = known.partition_point(|&k| k < i);
            let observed = |k: usize| series[k].value.map(|v| (series[k].timestamp, v));
            let before = next_pos.checked_sub(1).and_then(|pos| observed(known[pos]));
            let after = known.get(next_pos).and_then(|&k| observed(k));
            let value = match (before, after) {
                (Some(b), Some(a)) => Some(method.between(b, a, point.timestamp)),
                (Some((_, edge)), None) | (None, Some((_, edge))) => Some(edge),
                (None, None) => None,
            };
            SeriesPoint {
                timestamp: point.timestamp,
                value,
            }
        })
        .collect();
    Ok(Series::from_sorted(points))
}

/// Reindex `series` onto the calendar `start ..= end` at `step` and fill the
/// gaps with `method`.
///
/// Samples that do not sit on a calendar tick are ignored. The result has
/// exactly one observed value per tick.
pub fn fill_uniform(
    start: NaiveDateTime,
    end: NaiveDateTime,
    series: &Series,
    method: Interpolation,
    step: Timestep,
) -> Result<Series> {
    if start > end {
        return Err(SeriesError::InvalidRange { start, end });
    }
    let calendar: Vec<SeriesPoint> = TimeGrid::new(start, end, step)
        .map(|tick| SeriesPoint {
            timestamp: tick,
            value: series.get(tick).and_then(|p| p.value),
        })
        .collect();
    interpolate_missing(&Series::from_sorted(calendar), method)
}
