//! JSON configuration shared by every command.
//!
//! Every field has a default, so an empty object (or no file at all) is a
//! valid configuration.
//!
//! ```json
//! {
//!   "database": "/var/lib/hts/sim.sqlite",
//!   "log_level": "debug",
//!   "model": "flo2d_250",
//!   "missing_policy": "leave_null"
//! }
//! ```

use anyhow::Context;
use hts_data::{Interpolation, MissingPolicy};
use hts_db::Database;
use hts_series::labels::{GridInterpolation, Method};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Path value that selects a throwaway in-memory database.
pub const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file, or `:memory:`.
    pub database: String,
    /// Default log filter; `RUST_LOG` takes precedence.
    pub log_level: String,
    /// How far back a series with no watermark starts.
    pub obs_window_days: u32,
    /// Model the produced series feed.
    pub model: String,
    pub method: Method,
    pub grid_interpolation: GridInterpolation,
    pub missing_policy: MissingPolicy,
    /// Method used by `fill-uniform` when none is given on the command line.
    pub interpolation: Interpolation,
    /// Replace negative aggregated forecast values with zero.
    pub clamp_negative: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: "hts.sqlite".to_string(),
            log_level: "info".to_string(),
            obs_window_days: 10,
            model: "hechms".to_string(),
            method: Method::Mme,
            grid_interpolation: GridInterpolation::Mdpa,
            missing_policy: MissingPolicy::default(),
            interpolation: Interpolation::default(),
            clamp_negative: true,
        }
    }
}

impl Config {
    /// Read a configuration file, or fall back to the defaults when `path`
    /// is `None`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
        let Some(path) = path else {
            return Ok(Config::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Config::from_json(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_json(text: &str) -> anyhow::Result<Config> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn open_database(&self) -> anyhow::Result<Database> {
        if self.database == IN_MEMORY {
            Database::new()
        } else {
            Database::open(&self.database)
        }
    }
}
