//! Station registry: lookups and id allocation inside per-kind namespaces.

use crate::models::StationInfo;
use crate::Database;
use hts_series::station::StationKind;
use rusqlite::{params, OptionalExtension};

impl Database {
    /// All stations, ordered by id.
    pub fn query_stations(&self) -> anyhow::Result<Vec<StationInfo>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, station_type, name, latitude, longitude, description
             FROM station ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let stations = rows
            .into_iter()
            .map(|(id, kind, name, latitude, longitude, description)| {
                Ok(StationInfo {
                    id,
                    station_type: kind.parse()?,
                    name,
                    latitude,
                    longitude,
                    description,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        log::info!(
            "[HTS Debug] query: query_stations returned {} records",
            stations.len()
        );
        Ok(stations)
    }

    /// Id of the station of `kind` at exactly these coordinates.
    pub fn get_station_id(
        &self,
        kind: StationKind,
        latitude: f64,
        longitude: f64,
    ) -> anyhow::Result<Option<i64>> {
        let range = kind.id_range();
        let conn = self.conn()?;
        let id = conn
            .query_row(
                "SELECT id FROM station
                 WHERE id BETWEEN ?1 AND ?2
                   AND station_type = ?3 AND latitude = ?4 AND longitude = ?5",
                params![
                    i64::try_from(range.start)?,
                    i64::try_from(range.last())?,
                    kind.as_str(),
                    latitude,
                    longitude
                ],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Register a station under the next free id of its kind's namespace.
    ///
    /// Returns `None` when a station of this kind already exists at these
    /// coordinates. Fails when the namespace is exhausted.
    pub fn add_station(
        &self,
        kind: StationKind,
        name: &str,
        latitude: f64,
        longitude: f64,
        description: Option<&str>,
    ) -> anyhow::Result<Option<i64>> {
        if let Some(existing) = self.get_station_id(kind, latitude, longitude)? {
            log::info!(
                "[HTS Debug] stations: {} station at ({}, {}) already exists as {}",
                kind,
                latitude,
                longitude,
                existing
            );
            return Ok(None);
        }

        let range = kind.id_range();
        let first = i64::try_from(range.start)?;
        let last = i64::try_from(range.last())?;

        let conn = self.conn()?;
        let highest: Option<i64> = conn.query_row(
            "SELECT MAX(id) FROM station WHERE id BETWEEN ?1 AND ?2",
            params![first, last],
            |row| row.get(0),
        )?;
        let id = match highest {
            Some(h) if h >= last => {
                anyhow::bail!("id range {}..={} of {} is full", first, last, kind)
            }
            Some(h) => h + 1,
            None => first,
        };

        conn.execute(
            "INSERT INTO station (id, station_type, name, latitude, longitude, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, kind.as_str(), name, latitude, longitude, description],
        )?;
        log::info!("[HTS Debug] stations: added {} as {}", name, id);
        Ok(Some(id))
    }
}
