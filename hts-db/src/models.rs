//! Row model structs for runs and stations.

use chrono::NaiveDateTime;
use hts_series::labels::Method;
use hts_series::station::StationKind;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::fmt::Write;

/// Metadata of one simulation timeseries (a row of the `run` table).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunMetadata {
    pub latitude: f64,
    pub longitude: f64,
    /// Model the series feeds, e.g. `hechms` or `flo2d_250`.
    pub model: String,
    pub method: Method,
    /// Model grid cell or station the series belongs to.
    pub grid_id: String,
    /// Timestamp of the last persisted observation.
    pub obs_end: Option<NaiveDateTime>,
}

#[derive(Serialize)]
struct HashFields<'a> {
    latitude: f64,
    longitude: f64,
    method: &'a str,
    model: &'a str,
}

impl RunMetadata {
    /// Stable id of the timeseries: SHA3-256, in hex, of the JSON object
    /// holding `latitude`, `longitude`, `method` and `model` with sorted keys.
    ///
    /// `grid_id` and `obs_end` do not take part, so the id survives a grid
    /// rename and every watermark update.
    pub fn generate_timeseries_id(&self) -> anyhow::Result<String> {
        let fields = HashFields {
            latitude: self.latitude,
            longitude: self.longitude,
            method: self.method.abbreviation(),
            model: &self.model,
        };
        // Struct fields are declared in key order.
        let json = serde_json::to_string(&fields)?;

        let mut hasher = Sha3_256::new();
        hasher.update(json.as_bytes());
        let digest = hasher.finalize();

        let mut id = String::with_capacity(digest.len() * 2);
        for byte in digest.iter() {
            write!(id, "{:02x}", byte)?;
        }
        Ok(id)
    }
}

/// A row of the `station` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StationInfo {
    pub id: i64,
    pub station_type: StationKind,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<String>,
}
