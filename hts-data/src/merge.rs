//! Combine series into per-timestamp tuples ahead of aggregation.
//!
//! All three merges borrow their inputs and build a new [`TupleSeries`];
//! callers can keep using the inputs afterwards.

use hts_series::{Result, Series, SeriesError, TuplePoint, TupleSeries};
use log::debug;
use std::cmp::Ordering;

/// Outer merge of two series on timestamp.
///
/// Every distinct timestamp present in either input gets one tuple. Where
/// both inputs have a sample the tuple holds `a`'s value followed by `b`'s;
/// elsewhere it holds the single value that exists. Missing values
/// contribute nothing.
pub fn join(a: &Series, b: &Series) -> TupleSeries {
    let mut points = Vec::with_capacity(a.len().max(b.len()));
    let mut i = 0;
    let mut j = 0;

    while i < a.len() && j < b.len() {
        match a[i].timestamp.cmp(&b[j].timestamp) {
            Ordering::Equal => {
                points.push(TuplePoint::single(a[i].timestamp, a[i].value).with(b[j].value));
                i += 1;
                j += 1;
            }
            Ordering::Less => {
                points.push(TuplePoint::single(a[i].timestamp, a[i].value));
                i += 1;
            }
            Ordering::Greater => {
                points.push(TuplePoint::single(b[j].timestamp, b[j].value));
                j += 1;
            }
        }
    }

    // At most one of these tails is non-empty.
    points.extend(a[i..].iter().map(|p| TuplePoint::single(p.timestamp, p.value)));
    points.extend(b[j..].iter().map(|p| TuplePoint::single(p.timestamp, p.value)));

    TupleSeries::from_sorted(points)
}

/// Left-anchored merge of one more member into an accumulated tuple series.
///
/// Tuples of `original` are kept in place; a `new` sample at the same
/// timestamp widens the tuple, and `new` samples past the end of `original`
/// are appended as fresh tuples. `new` samples that fall before or between
/// `original` timestamps have no tuple to join and are dropped.
pub fn append(original: &TupleSeries, new: &Series) -> TupleSeries {
    let mut points = Vec::with_capacity(original.len().max(new.len()));
    let mut i = 0;
    let mut j = 0;
    let mut dropped = 0;

    while i < original.len() && j < new.len() {
        match original[i].timestamp.cmp(&new[j].timestamp) {
            Ordering::Equal => {
                points.push(original[i].clone().with(new[j].value));
                i += 1;
                j += 1;
            }
            Ordering::Less => {
                points.push(original[i].clone());
                i += 1;
            }
            Ordering::Greater => {
                dropped += 1;
                j += 1;
            }
        }
    }

    points.extend(original[i..].iter().cloned());
    points.extend(new[j..].iter().map(|p| TuplePoint::single(p.timestamp, p.value)));

    if dropped > 0 {
        debug!(
            "merge: append dropped {} new points with no matching tuple",
            dropped
        );
    }
    TupleSeries::from_sorted(points)
}

/// Fast path of [`append`] for members on exactly the same grid.
///
/// Requires equal lengths and the same first timestamp, and then zips the
/// two position by position. Returns `LengthMismatch` or `AlignmentMismatch`
/// otherwise, leaving the caller to fall back to [`append`].
pub fn append_value_for_timestamp(existing: &TupleSeries, new: &Series) -> Result<TupleSeries> {
    if existing.len() != new.len() {
        return Err(SeriesError::LengthMismatch {
            existing: existing.len(),
            new: new.len(),
        });
    }
    if let (Some(first_existing), Some(first_new)) = (existing.first(), new.first()) {
        if first_existing.timestamp != first_new.timestamp {
            return Err(SeriesError::AlignmentMismatch {
                existing: first_existing.timestamp,
                new: first_new.timestamp,
            });
        }
    }

    let points = existing
        .iter()
        .zip(new.iter())
        .map(|(tuple, point)| tuple.clone().with(point.value))
        .collect();
    Ok(TupleSeries::from_sorted(points))
}
