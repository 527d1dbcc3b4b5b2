//! Timeseries alignment engine for observation and forecast series.
//!
//! This crate takes irregular raw samples from heterogeneous sources (rain
//! gauges, forecast grids, satellite estimates) and turns them into regular
//! series on a fixed step, ready to be written back to the simulation store.
//!
//! Typical flow for one target series:
//!
//! 1. [`resample::resample`] the primary source onto the grid, marking gaps.
//! 2. [`gap_fill::fill_chain`] the gaps from redundant sources.
//! 3. For forecast ensembles, [`merge`] the members into tuples and reduce
//!    them with [`aggregate`].
//! 4. Apply a [`policy::MissingPolicy`] and any caller clamps before persisting.
//!
//! Every operation is synchronous, borrows its inputs and returns a freshly
//! allocated result, so independent series can be processed in parallel.

pub mod aggregate;
pub mod gap_fill;
pub mod grid;
pub mod merge;
pub mod policy;
pub mod resample;
pub mod uniform;

pub use aggregate::{aggregate, average, round3, sum, Aggregation};
pub use gap_fill::{fill, fill_and_extend, fill_chain};
pub use grid::{accumulate_buckets, expand, expand_15_to_5, round_up_to_nearest};
pub use merge::{append, append_value_for_timestamp, join};
pub use policy::{apply_missing_policy, clamp_negative, MissingPolicy};
pub use resample::{resample, resample_from_first, Resampled, SkipReason, Skipped};
pub use uniform::{fill_uniform, interpolate_missing, Interpolation};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, NaiveDateTime};
    use hts_series::{Series, SeriesPoint};

    /// 2021-01-01 at `h:m`.
    pub fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    pub fn series(points: &[(u32, u32, Option<f64>)]) -> Series {
        Series::try_new(
            points
                .iter()
                .map(|&(h, m, value)| SeriesPoint {
                    timestamp: at(h, m),
                    value,
                })
                .collect(),
        )
        .unwrap()
    }
}
