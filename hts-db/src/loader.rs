//! CSV data loading functions for populating the store.
//!
//! Each loader method parses CSV data from a string slice and writes rows
//! into the corresponding table.
//!
//! # CSV Formats
//!
//! - **Raw points** (no headers): `series_id,time(YYYY-MM-DD HH:MM:SS),value`
//! - **Stations** (has headers): `id,station_type,name,latitude,longitude,description`

use crate::Database;
use hts_series::station::StationKind;
use hts_series::SeriesPoint;
use hts_utils::dates::{format_timestamp, parse_timestamp};
use rusqlite::params;

impl Database {
    /// Load raw points from CSV string.
    ///
    /// Expected format (no headers): `series_id,time,value`
    ///
    /// The legacy `-99999` marker and non-numeric values (`NA`, `---`) are
    /// stored as NULL, i.e. a tick with no observation. Rows with an empty
    /// series id or an unparseable time are skipped. An existing
    /// `(series_id, time)` row has its value replaced.
    ///
    /// # Example CSV
    /// ```text
    /// colombo_gauge,2019-08-22 01:00:00,1.8
    /// colombo_gauge,2019-08-22 01:05:00,-99999
    /// ```
    pub fn load_raw_points(&self, csv_data: &str) -> anyhow::Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let mut count = 0usize;
        let mut skipped = 0u32;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO data (id, time, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id, time) DO UPDATE SET value = excluded.value",
            )?;
            for result in rdr.records() {
                let r = result?;
                let series_id = r.get(0).unwrap_or("").trim();
                let time = match parse_timestamp(r.get(1).unwrap_or("")) {
                    Ok(t) => t,
                    Err(_) => {
                        skipped += 1;
                        continue;
                    }
                };
                if series_id.is_empty() {
                    skipped += 1;
                    continue;
                }

                let value = r
                    .get(2)
                    .and_then(|s| s.trim().parse::<f64>().ok())
                    .and_then(|v| SeriesPoint::from_legacy(time, v).value);

                stmt.execute(params![series_id, format_timestamp(&time), value])?;
                count += 1;
            }
        }
        tx.commit()?;
        log::info!(
            "[HTS Debug] loader: Loaded {} raw points, skipped {} malformed",
            count,
            skipped
        );
        Ok(count)
    }

    /// Load station metadata from CSV string.
    ///
    /// Expected format (with headers):
    /// `id,station_type,name,latitude,longitude,description`
    ///
    /// # Example CSV
    /// ```text
    /// id,station_type,name,latitude,longitude,description
    /// 100001,CUrW_WeatherStation,colombo,6.9,79.86,rooftop gauge
    /// ```
    pub fn load_stations(&self, csv_data: &str) -> anyhow::Result<usize> {
        let conn = self.conn()?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let mut count = 0usize;
        for result in rdr.records() {
            let r = result?;
            let id: i64 = r.get(0).unwrap_or("").trim().parse()?;
            let kind: StationKind = r.get(1).unwrap_or("").parse()?;
            let name = r.get(2).unwrap_or("").trim();
            let latitude: f64 = r.get(3).unwrap_or("").trim().parse()?;
            let longitude: f64 = r.get(4).unwrap_or("").trim().parse()?;
            let description = r.get(5).map(str::trim).filter(|s| !s.is_empty());

            conn.execute(
                "INSERT OR REPLACE INTO station
                 (id, station_type, name, latitude, longitude, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, kind.as_str(), name, latitude, longitude, description],
            )?;
            count += 1;
        }
        log::info!("[HTS Debug] loader: Loaded {} stations", count);
        Ok(count)
    }
}
