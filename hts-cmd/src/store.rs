//! Commands that manage stored data directly: CSV imports, the station
//! registry and reindexing a stored series onto a uniform calendar.

use crate::config::Config;
use anyhow::Context;
use chrono::NaiveDateTime;
use hts_data::{fill_uniform, Interpolation};
use hts_db::Database;
use hts_series::station::StationKind;
use hts_series::{Series, SeriesSink, SeriesSource, Timestep};
use log::info;
use std::io::Write;

fn read_csv(path: &str) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path))
}

pub fn run_load_raw(db: &Database, csv_path: &str) -> anyhow::Result<()> {
    let count = db.load_raw_points(&read_csv(csv_path)?)?;
    info!("Loaded {} raw points from {}", count, csv_path);
    Ok(())
}

pub fn run_load_stations(db: &Database, csv_path: &str) -> anyhow::Result<()> {
    let count = db.load_stations(&read_csv(csv_path)?)?;
    info!("Loaded {} stations from {}", count, csv_path);
    Ok(())
}

pub fn run_add_station(
    db: &Database,
    kind: StationKind,
    name: &str,
    latitude: f64,
    longitude: f64,
    description: Option<&str>,
) -> anyhow::Result<()> {
    match db.add_station(kind, name, latitude, longitude, description)? {
        Some(id) => println!("{}", id),
        None => info!(
            "{} station at ({}, {}) already registered",
            kind, latitude, longitude
        ),
    }
    Ok(())
}

/// Write every station as CSV, headers included.
pub fn write_stations<W: Write>(db: &Database, out: W) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for station in db.query_stations()? {
        writer.serialize(station)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reindex `source` over `[start, end]` onto a `step` calendar, fill the
/// gaps with `method` and upsert the result under `target`.
pub fn fill_uniform_series(
    db: &Database,
    source: &str,
    target: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
    step: Timestep,
    method: Interpolation,
) -> anyhow::Result<usize> {
    let raw = db.fetch_series(source, start, Some(end))?;
    let series = Series::try_new(raw).with_context(|| format!("{} is not ordered", source))?;
    let filled = fill_uniform(start, end, &series, method, step)
        .with_context(|| format!("cannot fill {} onto a {} calendar", source, step))?;
    db.upsert_series(target, &filled)
}

#[allow(clippy::too_many_arguments)]
pub fn run_fill_uniform(
    db: &Database,
    config: &Config,
    source: &str,
    target: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
    step: Timestep,
    method: Option<Interpolation>,
) -> anyhow::Result<()> {
    let method = method.unwrap_or(config.interpolation);
    let rows = fill_uniform_series(db, source, target, start, end, step, method)?;
    info!(
        "Filled {} into {} with {} ({} rows)",
        source, target, method, rows
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 8, 22)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn fill_uniform_series_writes_full_calendar() {
        let db = Database::new().unwrap();
        db.load_raw_points(
            "\
discharge,2019-08-22 00:00:00,10.0
discharge,2019-08-22 02:00:00,30.0
discharge,2019-08-22 02:30:00,99.0
",
        )
        .unwrap();

        let rows = fill_uniform_series(
            &db,
            "discharge",
            "discharge_hourly",
            ts(0, 0),
            ts(3, 0),
            Timestep::HOURLY,
            Interpolation::Previous,
        )
        .unwrap();
        assert_eq!(rows, 4);

        let values: Vec<_> = db
            .fetch_series("discharge_hourly", ts(0, 0), None)
            .unwrap()
            .into_iter()
            .map(|p| p.value)
            .collect();
        assert_eq!(values, vec![Some(10.0), Some(10.0), Some(30.0), Some(30.0)]);
    }

    #[test]
    fn fill_uniform_series_needs_observations() {
        let db = Database::new().unwrap();
        let result = fill_uniform_series(
            &db,
            "nothing",
            "target",
            ts(0, 0),
            ts(1, 0),
            Timestep::HOURLY,
            Interpolation::Linear,
        );
        assert!(result.is_err());
    }

    #[test]
    fn write_stations_as_csv() {
        let db = Database::new().unwrap();
        db.add_station(StationKind::Wrf, "wrf_a", 6.9, 79.86, None)
            .unwrap();
        let mut out = Vec::new();
        write_stations(&db, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "id,station_type,name,latitude,longitude,description\n\
             1100000,WRF,wrf_a,6.9,79.86,\n"
        );
    }
}
