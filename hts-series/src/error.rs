//! Error types for series construction and alignment.
use chrono::NaiveDateTime;
use thiserror::Error;

/// Main error type for series operations.
///
/// Every variant is a local, deterministic, input-dependent condition. Callers
/// processing many independent series are expected to log the failure and
/// move on to the next series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    /// An operation that needs at least one sample got none
    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    /// Two series expected to align one-to-one differ in length
    #[error("Series length mismatch (existing: {existing}, new: {new})")]
    LengthMismatch { existing: usize, new: usize },

    /// Two series expected to align one-to-one start at different timestamps
    #[error("Series start mismatch (existing: {existing}, new: {new})")]
    AlignmentMismatch {
        existing: NaiveDateTime,
        new: NaiveDateTime,
    },

    /// A timestamp is duplicated or out of order
    #[error("Non-monotonic timestamp at index {index}: {current} follows {previous}")]
    NonMonotonic {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    /// A time step that is zero, negative or not usable for the operation
    #[error("Invalid time step: {0} minutes")]
    InvalidStep(i64),

    /// A calendar whose start lies after its end
    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// A label that does not name any known variant
    #[error("Unknown {kind}: {value}")]
    UnknownLabel { kind: &'static str, value: String },
}

/// Type alias for Results using SeriesError
pub type Result<T> = std::result::Result<T, SeriesError>;
