//! Moving series between grid cadences.

use chrono::{NaiveDateTime, TimeDelta, Timelike};
use hts_series::{Result, Series, SeriesError, SeriesPoint, Timestep};
use std::collections::BTreeMap;

/// Round `ts` up to the next multiple of `n_minutes` within its hour.
///
/// Seconds and sub-seconds are dropped first, so a timestamp already on a
/// boundary is returned unchanged. A minute field that rounds up to 60 rolls
/// into the next hour. `n_minutes` must divide 60 so every bucket boundary
/// falls inside one hour.
pub fn round_up_to_nearest(ts: NaiveDateTime, n_minutes: u32) -> Result<NaiveDateTime> {
    if n_minutes == 0 || 60 % n_minutes != 0 {
        return Err(SeriesError::InvalidStep(i64::from(n_minutes)));
    }
    let minute = ts.minute();
    let hour_start = ts
        - TimeDelta::minutes(i64::from(minute))
        - TimeDelta::seconds(i64::from(ts.second()))
        - TimeDelta::nanoseconds(i64::from(ts.nanosecond()));
    let rounded = minute.div_ceil(n_minutes) * n_minutes;
    Ok(hour_start + TimeDelta::minutes(i64::from(rounded)))
}

/// Sum raw samples into `n_minutes` buckets labelled by their rounded-up
/// boundary. Input order does not matter; a bucket whose samples are all
/// missing stays missing.
pub fn accumulate_buckets(points: &[SeriesPoint], n_minutes: u32) -> Result<Series> {
    let mut buckets: BTreeMap<NaiveDateTime, Option<f64>> = BTreeMap::new();
    for point in points {
        let key = round_up_to_nearest(point.timestamp, n_minutes)?;
        let slot = buckets.entry(key).or_insert(None);
        if let Some(value) = point.value {
            *slot = Some(slot.unwrap_or(0.0) + value);
        }
    }
    Ok(Series::from_sorted(
        buckets
            .into_iter()
            .map(|(timestamp, value)| SeriesPoint { timestamp, value })
            .collect(),
    ))
}

/// Spread each coarse accumulated value evenly over the finer sub-steps it
/// covers.
///
/// A coarse sample at `t` covers `[t, t + from)`. Walking a fine cursor from
/// `start` (or the first coarse timestamp), each tick inside the current
/// coarse window gets `value / (from / to)`; a tick before the window is a
/// gap and is emitted as missing; a coarse sample whose window the cursor
/// has already passed is skipped as stale.
///
/// Only meaningful for accumulative quantities such as rainfall depth.
pub fn expand(
    series: &Series,
    from: Timestep,
    to: Timestep,
    start: Option<NaiveDateTime>,
) -> Result<Series> {
    let ratio = from
        .ratio_to(to)
        .ok_or(SeriesError::InvalidStep(i64::from(to.as_minutes())))?;
    let mut cursor = match start.or_else(|| series.first_timestamp()) {
        Some(cursor) => cursor,
        None => return Err(SeriesError::EmptyInput("expand needs a start")),
    };

    let mut points = Vec::with_capacity(series.len() * ratio as usize);
    let mut index = 0;
    while index < series.len() {
        let coarse = series[index];
        if cursor >= coarse.timestamp + from.duration() {
            index += 1;
        } else if cursor >= coarse.timestamp {
            points.push(SeriesPoint {
                timestamp: cursor,
                value: coarse.value.map(|v| v / f64::from(ratio)),
            });
            cursor += to.duration();
        } else {
            points.push(SeriesPoint::missing(cursor));
            cursor += to.duration();
        }
    }
    Ok(Series::from_sorted(points))
}

/// [`expand`] from the 15 minute forecast grid onto the 5 minute
/// observation grid.
pub fn expand_15_to_5(series: &Series, start: Option<NaiveDateTime>) -> Result<Series> {
    expand(series, Timestep::FIFTEEN, Timestep::FIVE, start)
}
