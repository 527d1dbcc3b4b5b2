//! Shared utility functions for HTS crates.

/// Timestamp utility functions
pub mod dates {
    use anyhow::Context;
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Timelike};

    /// Timestamp layout used by the stores and the CSV inputs.
    pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    /// Format a NaiveDateTime as "YYYY-MM-DD HH:MM:SS"
    pub fn format_timestamp(ts: &NaiveDateTime) -> String {
        ts.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Parse a timestamp in "YYYY-MM-DD HH:MM:SS" format.
    /// A bare "YYYY-MM-DD" is taken as midnight.
    pub fn parse_timestamp(s: &str) -> anyhow::Result<NaiveDateTime> {
        let s = s.trim();
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT) {
            return Ok(ts);
        }
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid timestamp '{s}'"))?;
        date.and_hms_opt(0, 0, 0)
            .with_context(|| format!("invalid timestamp '{s}'"))
    }

    /// Drop minutes, seconds and sub-seconds.
    pub fn floor_to_hour(ts: &NaiveDateTime) -> NaiveDateTime {
        *ts - TimeDelta::minutes(i64::from(ts.minute()))
            - TimeDelta::seconds(i64::from(ts.second()))
            - TimeDelta::nanoseconds(i64::from(ts.nanosecond()))
    }

    /// Start of the default observation window: `days` before `now`, on the hour.
    pub fn obs_window_start(now: &NaiveDateTime, days: u32) -> NaiveDateTime {
        floor_to_hour(&(*now - TimeDelta::days(i64::from(days))))
    }

}
