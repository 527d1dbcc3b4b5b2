//! Typed query methods for timeseries data and run metadata.
//!
//! Timestamps are stored as `YYYY-MM-DD HH:MM:SS` text, which sorts in time
//! order, so range filters and `ORDER BY time` work on the text column.

use crate::models::RunMetadata;
use crate::Database;
use chrono::NaiveDateTime;
use hts_series::labels::Method;
use hts_series::{Series, SeriesPoint, SeriesSink, SeriesSource};
use hts_utils::dates::{format_timestamp, parse_timestamp};
use rusqlite::{params, OptionalExtension};

impl SeriesSource for Database {
    type Error = anyhow::Error;

    /// Points of `series_id` in `[start, end]`, ascending. NULL and legacy
    /// sentinel values come back as missing.
    fn fetch_series(
        &self,
        series_id: &str,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
    ) -> anyhow::Result<Vec<SeriesPoint>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT time, value FROM data
             WHERE id = ?1 AND time >= ?2 AND (?3 IS NULL OR time <= ?3)
             ORDER BY time",
        )?;
        let end = end.map(|e| format_timestamp(&e));
        let rows = stmt
            .query_map(params![series_id, format_timestamp(&start), end], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<f64>>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let points = rows
            .into_iter()
            .map(|(time, value)| {
                let timestamp = parse_timestamp(&time)?;
                Ok(match value {
                    Some(v) => SeriesPoint::from_legacy(timestamp, v),
                    None => SeriesPoint::missing(timestamp),
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        log::info!(
            "[HTS Debug] query: fetch_series({}) returned {} records",
            series_id,
            points.len()
        );
        Ok(points)
    }
}

impl SeriesSink for Database {
    type Error = anyhow::Error;

    /// Upsert every point in one transaction. Missing values are written as
    /// NULL.
    fn upsert_series(&self, series_id: &str, series: &Series) -> anyhow::Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut count = 0usize;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO data (id, time, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id, time) DO UPDATE SET value = excluded.value",
            )?;
            for point in series.iter() {
                count += stmt.execute(params![
                    series_id,
                    format_timestamp(&point.timestamp),
                    point.value
                ])?;
            }
        }
        tx.commit()?;
        log::info!(
            "[HTS Debug] query: upsert_series({}) wrote {} records",
            series_id,
            count
        );
        Ok(count)
    }
}

impl Database {
    /// Id of the run for `grid_id` produced with `method`, if one exists.
    pub fn get_timeseries_id(&self, grid_id: &str, method: &Method) -> anyhow::Result<Option<String>> {
        let conn = self.conn()?;
        let id = conn
            .query_row(
                "SELECT id FROM run WHERE grid_id = ?1 AND method = ?2",
                params![grid_id, method.abbreviation()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Whether a run with this hash id exists.
    pub fn is_id_exists(&self, id: &str) -> anyhow::Result<bool> {
        let conn = self.conn()?;
        let found: Option<i64> = conn
            .query_row("SELECT 1 FROM run WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    /// Insert a run row and return its hash id.
    pub fn insert_run(&self, meta: &RunMetadata) -> anyhow::Result<String> {
        let id = meta.generate_timeseries_id()?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO run (id, latitude, longitude, model, method, grid_id, obs_end)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                meta.latitude,
                meta.longitude,
                meta.model,
                meta.method.abbreviation(),
                meta.grid_id,
                meta.obs_end.map(|t| format_timestamp(&t)),
            ],
        )?;
        log::info!(
            "[HTS Debug] query: insert_run created {} for {}",
            id,
            meta.grid_id
        );
        Ok(id)
    }

    /// Metadata of the run with this hash id.
    pub fn query_run(&self, id: &str) -> anyhow::Result<Option<RunMetadata>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT latitude, longitude, model, method, grid_id, obs_end FROM run WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, f64>(0)?,
                        row.get::<_, f64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, Option<String>>(5)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(latitude, longitude, model, method, grid_id, obs_end)| -> anyhow::Result<RunMetadata> {
            Ok(RunMetadata {
                latitude,
                longitude,
                model,
                method: Method::from(method),
                grid_id,
                obs_end: obs_end.as_deref().map(parse_timestamp).transpose()?,
            })
        })
        .transpose()
    }

    /// End of the last persisted observation of a run. `None` when the run
    /// does not exist or nothing has been persisted yet.
    pub fn get_obs_end(&self, id: &str) -> anyhow::Result<Option<NaiveDateTime>> {
        let conn = self.conn()?;
        let obs_end: Option<Option<String>> = conn
            .query_row("SELECT obs_end FROM run WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;
        obs_end
            .flatten()
            .as_deref()
            .map(parse_timestamp)
            .transpose()
    }

    /// Advance the watermark of a run to `obs_end`.
    pub fn update_latest_obs(&self, id: &str, obs_end: NaiveDateTime) -> anyhow::Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE run SET obs_end = ?1 WHERE id = ?2",
            params![format_timestamp(&obs_end), id],
        )?;
        if updated == 0 {
            anyhow::bail!("no run with id {}", id);
        }
        log::info!("[HTS Debug] query: obs_end of {} set to {}", id, obs_end);
        Ok(())
    }
}
