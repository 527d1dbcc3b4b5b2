use crate::error::{Result, SeriesError};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fixed cadence, in whole minutes, that a series is reconciled onto.
///
/// The step belongs to the call, not to the series: the same raw data can be
/// resampled to different cadences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Timestep(u32);

impl Timestep {
    pub const FIVE: Timestep = Timestep(5);
    pub const FIFTEEN: Timestep = Timestep(15);
    pub const HOURLY: Timestep = Timestep(60);

    /// Build a step from a number of minutes. Zero and negative values fail.
    pub fn minutes(minutes: i64) -> Result<Timestep> {
        if minutes <= 0 || minutes > i64::from(u32::MAX) {
            return Err(SeriesError::InvalidStep(minutes));
        }
        Ok(Timestep(minutes as u32))
    }

    pub fn as_minutes(&self) -> u32 {
        self.0
    }

    pub fn duration(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.0))
    }

    /// How many `finer` steps fit in this one, if the ratio is integral.
    pub fn ratio_to(&self, finer: Timestep) -> Option<u32> {
        if finer.0 <= self.0 && self.0 % finer.0 == 0 {
            Some(self.0 / finer.0)
        } else {
            None
        }
    }
}

impl TryFrom<i64> for Timestep {
    type Error = SeriesError;

    fn try_from(value: i64) -> Result<Self> {
        Timestep::minutes(value)
    }
}

impl From<Timestep> for i64 {
    fn from(value: Timestep) -> Self {
        i64::from(value.0)
    }
}

impl fmt::Display for Timestep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}min", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive() {
        assert_eq!(Timestep::minutes(0), Err(SeriesError::InvalidStep(0)));
        assert_eq!(Timestep::minutes(-5), Err(SeriesError::InvalidStep(-5)));
        assert_eq!(Timestep::minutes(15).unwrap(), Timestep::FIFTEEN);
    }

    #[test]
    fn test_ratio() {
        assert_eq!(Timestep::FIFTEEN.ratio_to(Timestep::FIVE), Some(3));
        assert_eq!(Timestep::HOURLY.ratio_to(Timestep::FIFTEEN), Some(4));
        assert_eq!(Timestep::FIVE.ratio_to(Timestep::FIFTEEN), None);
        assert_eq!(
            Timestep::FIFTEEN.ratio_to(Timestep::minutes(4).unwrap()),
            None
        );
    }

    #[test]
    fn test_duration() {
        assert_eq!(Timestep::FIVE.duration(), TimeDelta::minutes(5));
        assert_eq!(Timestep::HOURLY.to_string(), "60min");
    }
}
