//! Core value types for hydrological timeseries alignment.
//!
//! A [`Series`] is a strictly increasing sequence of [`SeriesPoint`]s whose
//! values may be missing. Missing values are `None`; the legacy `-99999`
//! marker is only recognised at the store boundary.

pub mod error;
pub mod labels;
pub mod series;
pub mod station;
pub mod store;
pub mod time_grid;
pub mod timestep;
pub mod tuple;

pub use error::{Result, SeriesError};
pub use series::{Series, SeriesPoint, LEGACY_SENTINEL};
pub use store::{SeriesSink, SeriesSource};
pub use time_grid::TimeGrid;
pub use timestep::Timestep;
pub use tuple::{TuplePoint, TupleSeries};
