//! Collaborator interfaces at the persistence boundary.
//!
//! The alignment engine never performs I/O itself; batch jobs pull raw points
//! through a [`SeriesSource`] and push results through a [`SeriesSink`].

use crate::series::{Series, SeriesPoint};
use chrono::NaiveDateTime;

/// Something that can return the raw samples of a logical series.
pub trait SeriesSource {
    type Error;

    /// Raw points for `series_id` with `start <= timestamp` (and
    /// `timestamp <= end` when given), ascending by timestamp.
    ///
    /// The points are not validated: they may be irregular, gapped or, for
    /// badly behaved sources, duplicated.
    fn fetch_series(
        &self,
        series_id: &str,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
    ) -> Result<Vec<SeriesPoint>, Self::Error>;
}

/// Something that can persist a series keyed by `(series_id, timestamp)`.
pub trait SeriesSink {
    type Error;

    /// Insert every point, replacing the value of an existing
    /// `(series_id, timestamp)` row. Returns the number of rows written.
    fn upsert_series(&self, series_id: &str, series: &Series) -> Result<usize, Self::Error>;
}
