//! Reconcile a raw series against an expected fixed-step grid.

use chrono::NaiveDateTime;
use hts_series::{Result, Series, SeriesError, SeriesPoint, Timestep};
use log::{debug, warn};

/// Why a raw sample did not make it onto the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Strictly before the grid start.
    BeforeGrid,
    /// Same timestamp as the raw sample before it.
    Duplicate,
    /// Earlier than the raw sample before it.
    OutOfOrder,
    /// Between two grid ticks.
    OffGrid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    /// Position in the raw input.
    pub index: usize,
    pub point: SeriesPoint,
    pub reason: SkipReason,
    /// Timestamp of the raw sample just before this one.
    pub previous: Option<NaiveDateTime>,
}

/// Output of [`resample`]: the gridded series plus every raw sample that was
/// left out, so callers can tell stale data from real duplicates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Resampled {
    pub series: Series,
    pub skipped: Vec<Skipped>,
}

impl Resampled {
    /// Skipped samples that indicate a broken source ordering.
    pub fn duplicates(&self) -> impl Iterator<Item = &Skipped> {
        self.skipped
            .iter()
            .filter(|s| matches!(s.reason, SkipReason::Duplicate | SkipReason::OutOfOrder))
    }

    /// The gridded series, or `NonMonotonic` if the raw input repeated or
    /// reordered timestamps.
    pub fn ensure_no_duplicates(self) -> Result<Series> {
        if let Some(first) = self.duplicates().next() {
            return Err(SeriesError::NonMonotonic {
                index: first.index,
                previous: first.previous.unwrap_or(first.point.timestamp),
                current: first.point.timestamp,
            });
        }
        Ok(self.series)
    }
}

/// Walk `raw` against the grid `expected_start, expected_start + step, ...`.
///
/// - a raw sample on the current tick is emitted and both cursors advance;
/// - a raw sample after the current tick leaves a gap: the tick is emitted
///   as missing and only the grid cursor advances;
/// - a raw sample before the current tick (before the grid start, stale,
///   duplicated or off-grid) is skipped and reported.
///
/// The output starts at `expected_start` and stops at the last raw sample
/// that landed on the grid; no missing ticks are padded after it.
pub fn resample(raw: &[SeriesPoint], expected_start: NaiveDateTime, step: Timestep) -> Resampled {
    let mut points: Vec<SeriesPoint> = Vec::new();
    let mut skipped = Vec::new();
    let mut consumed_len = 0;
    let mut cursor = expected_start;
    let mut index = 0;

    while index < raw.len() {
        let point = raw[index];
        if point.timestamp == cursor {
            points.push(point);
            consumed_len = points.len();
            cursor += step.duration();
            index += 1;
        } else if point.timestamp > cursor {
            points.push(SeriesPoint::missing(cursor));
            cursor += step.duration();
        } else {
            let previous = index.checked_sub(1).map(|i| raw[i].timestamp);
            let reason = match previous {
                Some(prev) if prev == point.timestamp => SkipReason::Duplicate,
                Some(prev) if prev > point.timestamp => SkipReason::OutOfOrder,
                _ if point.timestamp < expected_start => SkipReason::BeforeGrid,
                _ => SkipReason::OffGrid,
            };
            skipped.push(Skipped {
                index,
                point,
                reason,
                previous,
            });
            index += 1;
        }
    }

    // Ticks emitted after the last consumed sample were waiting for a raw
    // sample that turned out to be off-grid.
    points.truncate(consumed_len);

    let result = Resampled {
        series: Series::from_sorted(points),
        skipped,
    };
    let duplicates = result.duplicates().count();
    if duplicates > 0 {
        warn!(
            "resample: {} duplicated or out-of-order raw points skipped",
            duplicates
        );
    }
    if !result.skipped.is_empty() {
        debug!(
            "resample: {} of {} raw points skipped, {} grid points from {}",
            result.skipped.len(),
            raw.len(),
            result.series.len(),
            expected_start
        );
    }
    result
}

/// Resample using the first raw timestamp as the grid start.
pub fn resample_from_first(raw: &[SeriesPoint], step: Timestep) -> Result<Resampled> {
    let first = raw
        .first()
        .ok_or(SeriesError::EmptyInput("resample needs a grid start"))?;
    Ok(resample(raw, first.timestamp, step))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::at;

    fn raw(points: &[(u32, u32, f64)]) -> Vec<SeriesPoint> {
        points
            .iter()
            .map(|&(h, m, v)| SeriesPoint::new(at(h, m), v))
            .collect()
    }

    #[test]
    fn test_complete_grid_with_gaps() {
        let input = raw(&[(10, 0, 1.0), (10, 10, 2.0), (10, 25, 3.0)]);
        let out = resample(&input, at(10, 0), Timestep::FIVE);
        let timestamps: Vec<_> = out.series.iter().map(|p| p.timestamp).collect();
        assert_eq!(
            timestamps,
            vec![at(10, 0), at(10, 5), at(10, 10), at(10, 15), at(10, 20), at(10, 25)]
        );
        let values: Vec<_> = out.series.iter().map(|p| p.value).collect();
        assert_eq!(
            values,
            vec![Some(1.0), None, Some(2.0), None, None, Some(3.0)]
        );
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn test_leading_gap_when_start_precedes_data() {
        let input = raw(&[(10, 10, 4.0)]);
        let out = resample(&input, at(10, 0), Timestep::FIVE);
        assert_eq!(out.series.len(), 3);
        assert_eq!(out.series.missing_count(), 2);
        assert_eq!(out.series.last_timestamp(), Some(at(10, 10)));
    }

    #[test]
    fn test_empty_raw_gives_empty_output() {
        let out = resample(&[], at(10, 0), Timestep::FIVE);
        assert!(out.series.is_empty());
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn test_points_before_grid_start_are_skipped() {
        let input = raw(&[(9, 50, 9.0), (9, 55, 9.0), (10, 0, 1.0), (10, 5, 2.0)]);
        let out = resample(&input, at(10, 0), Timestep::FIVE);
        assert_eq!(out.series.len(), 2);
        assert_eq!(out.series[0].value, Some(1.0));
        assert_eq!(out.skipped.len(), 2);
        assert!(out
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::BeforeGrid));
    }

    #[test]
    fn test_duplicates_are_reported_not_overwritten() {
        let input = raw(&[(10, 0, 1.0), (10, 5, 2.0), (10, 5, 7.0), (10, 10, 3.0)]);
        let out = resample(&input, at(10, 0), Timestep::FIVE);
        assert_eq!(out.series.len(), 3);
        assert_eq!(out.series[1].value, Some(2.0));
        assert_eq!(out.duplicates().count(), 1);
        assert_eq!(out.skipped[0].reason, SkipReason::Duplicate);
        assert!(matches!(
            out.ensure_no_duplicates(),
            Err(SeriesError::NonMonotonic { index: 2, .. })
        ));
    }

    #[test]
    fn test_out_of_order_point_is_skipped() {
        let input = raw(&[(10, 0, 1.0), (10, 10, 2.0), (10, 5, 5.0), (10, 15, 3.0)]);
        let out = resample(&input, at(10, 0), Timestep::FIVE);
        assert_eq!(out.series.len(), 4);
        assert_eq!(out.series[1].value, None);
        assert_eq!(out.skipped[0].reason, SkipReason::OutOfOrder);
    }

    #[test]
    fn test_no_trailing_missing_after_off_grid_tail() {
        let input = raw(&[(10, 0, 1.0), (10, 7, 2.0)]);
        let out = resample(&input, at(10, 0), Timestep::FIVE);
        assert_eq!(out.series.len(), 1);
        assert_eq!(out.series.last_timestamp(), Some(at(10, 0)));
        assert_eq!(out.skipped[0].reason, SkipReason::OffGrid);
    }

    #[test]
    fn test_output_values_come_from_raw_or_are_missing() {
        let input = raw(&[(10, 0, 0.5), (10, 15, 0.0), (10, 45, 1.25), (11, 0, 2.0)]);
        let out = resample(&input, at(10, 0), Timestep::FIFTEEN);
        for (i, p) in out.series.iter().enumerate() {
            assert_eq!(p.timestamp, at(10, 0) + Timestep::FIFTEEN.duration() * i as i32);
            if let Some(v) = p.value {
                assert!(input.iter().any(|r| r.timestamp == p.timestamp && r.value == Some(v)));
            }
        }
        assert_eq!(out.series.len(), 5);
        // observed zero is kept as a value
        assert_eq!(out.series[1].value, Some(0.0));
    }

    #[test]
    fn test_resample_from_first_requires_input() {
        assert_eq!(
            resample_from_first(&[], Timestep::FIVE).unwrap_err(),
            SeriesError::EmptyInput("resample needs a grid start")
        );
        let input = raw(&[(10, 5, 1.0), (10, 15, 2.0)]);
        let out = resample_from_first(&input, Timestep::FIVE).unwrap();
        assert_eq!(out.series.first_timestamp(), Some(at(10, 5)));
        assert_eq!(out.series.len(), 3);
    }
}
