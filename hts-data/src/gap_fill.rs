//! Fill missing grid ticks of a primary series from redundant sources.

use crate::resample::resample;
use hts_series::{Series, Timestep};
use log::debug;
use std::cmp::Ordering;

/// Replace missing values of `primary` with the value `secondary` has at the
/// same timestamp.
///
/// Both series are walked with two cursors by timestamp; secondary samples
/// with no counterpart are ignored and primary ticks with no counterpart keep
/// their missing value. The result always has exactly the primary's
/// timestamps and never more missing values than the primary had.
pub fn fill(primary: &Series, secondary: &Series) -> Series {
    let mut points = primary.points().to_vec();
    let mut p = 0;
    let mut s = 0;
    let mut filled = 0;

    while p < points.len() && s < secondary.len() {
        match secondary[s].timestamp.cmp(&points[p].timestamp) {
            Ordering::Equal => {
                if points[p].value.is_none() && secondary[s].value.is_some() {
                    points[p].value = secondary[s].value;
                    filled += 1;
                }
                p += 1;
                s += 1;
            }
            Ordering::Less => s += 1,
            Ordering::Greater => p += 1,
        }
    }

    debug!(
        "gap_fill: filled {} of {} missing ticks",
        filled,
        primary.missing_count()
    );
    Series::from_sorted(points)
}

/// [`fill`], then lengthen the result with whatever `secondary` has after the
/// primary's last tick, resampled onto the same `step`.
///
/// An empty primary is replaced by the secondary resampled from its own
/// first timestamp.
pub fn fill_and_extend(primary: &Series, secondary: &Series, step: Timestep) -> Series {
    let Some(last) = primary.last_timestamp() else {
        return match secondary.first_timestamp() {
            Some(first) => resample(secondary, first, step).series,
            None => Series::new(),
        };
    };

    let filled = fill(primary, secondary);
    let tail = resample(secondary, last, step).series.after(last);
    if tail.is_empty() {
        return filled;
    }

    debug!(
        "gap_fill: extending {} points past {} with {} secondary points",
        filled.len(),
        last,
        tail.len()
    );
    let mut points = filled.into_points();
    points.extend(tail);
    Series::from_sorted(points)
}

/// Apply [`fill_and_extend`] with each secondary in order of preference.
pub fn fill_chain(primary: &Series, secondaries: &[Series], step: Timestep) -> Series {
    secondaries
        .iter()
        .fold(primary.clone(), |acc, secondary| {
            fill_and_extend(&acc, secondary, step)
        })
}
