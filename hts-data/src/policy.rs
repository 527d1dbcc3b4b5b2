//! What happens to still-missing ticks and negative values right before a
//! series is persisted.

use crate::uniform::{interpolate_missing, Interpolation};
use hts_series::{Result, Series, SeriesError};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Treatment of ticks that no source could fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Write `0.0`. Matches what the legacy ingestion scripts stored, but a
    /// zero written this way cannot be told apart from an observed zero.
    #[default]
    TreatAsZero,
    /// Write the tick with no value.
    LeaveNull,
    /// Fill from observed neighbours with linear interpolation.
    Interpolate,
}

impl MissingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingPolicy::TreatAsZero => "treat_as_zero",
            MissingPolicy::LeaveNull => "leave_null",
            MissingPolicy::Interpolate => "interpolate",
        }
    }
}

impl FromStr for MissingPolicy {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "treat_as_zero" | "zero" => Ok(MissingPolicy::TreatAsZero),
            "leave_null" | "null" => Ok(MissingPolicy::LeaveNull),
            "interpolate" => Ok(MissingPolicy::Interpolate),
            _ => Err(SeriesError::UnknownLabel {
                kind: "missing policy",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for MissingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the missing ticks of `series` according to `policy`.
///
/// A series with nothing missing is returned as is under every policy.
pub fn apply_missing_policy(series: &Series, policy: MissingPolicy) -> Result<Series> {
    let missing = series.missing_count();
    if missing == 0 {
        return Ok(series.clone());
    }
    match policy {
        MissingPolicy::TreatAsZero => {
            warn!(
                "policy: writing {} missing ticks of {} as 0.0",
                missing,
                series.len()
            );
            Ok(series.map_values(|v| Some(v.unwrap_or(0.0))))
        }
        MissingPolicy::LeaveNull => Ok(series.clone()),
        MissingPolicy::Interpolate => interpolate_missing(series, Interpolation::Linear),
    }
}

/// Replace negative values with zero.
pub fn clamp_negative(series: &Series) -> Series {
    series.map_values(|v| v.map(|x| x.max(0.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::series;

    fn values(series: &Series) -> Vec<Option<f64>> {
        series.iter().map(|p| p.value).collect()
    }

    #[test]
    fn test_treat_as_zero() {
        let input = series(&[(10, 0, Some(1.0)), (10, 5, None), (10, 10, Some(0.0))]);
        let out = apply_missing_policy(&input, MissingPolicy::TreatAsZero).unwrap();
        assert_eq!(values(&out), vec![Some(1.0), Some(0.0), Some(0.0)]);
        assert_eq!(input.missing_count(), 1);
    }

    #[test]
    fn test_leave_null() {
        let input = series(&[(10, 0, None), (10, 5, Some(2.0))]);
        let out = apply_missing_policy(&input, MissingPolicy::LeaveNull).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn test_interpolate() {
        let input = series(&[(10, 0, None), (10, 5, Some(2.0)), (10, 10, None), (10, 15, Some(4.0))]);
        let out = apply_missing_policy(&input, MissingPolicy::Interpolate).unwrap();
        assert_eq!(values(&out), vec![Some(2.0), Some(2.0), Some(3.0), Some(4.0)]);

        let all_missing = series(&[(10, 0, None)]);
        assert!(apply_missing_policy(&all_missing, MissingPolicy::Interpolate).is_err());
        assert!(apply_missing_policy(&Series::new(), MissingPolicy::Interpolate)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_clamp_negative() {
        let input = series(&[(10, 0, Some(-0.5)), (10, 5, None), (10, 10, Some(1.5))]);
        assert_eq!(
            values(&clamp_negative(&input)),
            vec![Some(0.0), None, Some(1.5)]
        );
    }

    #[test]
    fn test_policy_labels() {
        assert_eq!("leave-null".parse::<MissingPolicy>().unwrap(), MissingPolicy::LeaveNull);
        assert_eq!(MissingPolicy::default().to_string(), "treat_as_zero");
        assert!("drop".parse::<MissingPolicy>().is_err());
    }
}
