//! Observed rainfall: resample a primary gauge onto the grid, fill its gaps
//! from redundant gauges and persist the result past the run's watermark.

use crate::batch::run_batch;
use crate::config::Config;
use crate::targets::{parse_obs_targets, ObsTarget};
use chrono::{Local, NaiveDateTime};
use hts_data::{accumulate_buckets, apply_missing_policy, fill_chain, resample, Resampled};
use hts_db::models::RunMetadata;
use hts_db::Database;
use hts_series::{Series, SeriesSink, SeriesSource, Timestep};
use hts_utils::dates::obs_window_start;
use log::{info, warn};

/// Id of the run behind `grid_id`, creating the run on first use.
pub(crate) fn resolve_run(
    db: &Database,
    config: &Config,
    grid_id: &str,
    latitude: f64,
    longitude: f64,
) -> anyhow::Result<String> {
    if let Some(id) = db.get_timeseries_id(grid_id, &config.method)? {
        return Ok(id);
    }
    let meta = RunMetadata {
        latitude,
        longitude,
        model: config.model.clone(),
        method: config.method.clone(),
        grid_id: grid_id.to_string(),
        obs_end: None,
    };
    let id = meta.generate_timeseries_id()?;
    if db.is_id_exists(&id)? {
        return Ok(id);
    }
    db.insert_run(&meta)
}

/// Where a run picks up: its watermark, or the start of the observation
/// window when nothing was persisted yet.
pub(crate) fn window_start(
    db: &Database,
    config: &Config,
    id: &str,
    now: NaiveDateTime,
) -> anyhow::Result<NaiveDateTime> {
    Ok(db
        .get_obs_end(id)?
        .unwrap_or_else(|| obs_window_start(&now, config.obs_window_days)))
}

/// Rainfall depth of `source` per `step` bucket, on the grid from `start`.
///
/// Samples finer than `step` are summed into the bucket that ends at or after
/// them before gridding, so no depth is lost to off-grid samples.
fn gridded(db: &Database, source: &str, start: NaiveDateTime, step: Timestep) -> anyhow::Result<Series> {
    let raw = db.fetch_series(source, start, None)?;
    let buckets = accumulate_buckets(&raw, step.as_minutes())?;
    let Resampled { series, skipped } = resample(&buckets, start, step);
    if !skipped.is_empty() {
        info!(
            "[HTS Debug] obs: {} dropped {} raw points while gridding",
            source,
            skipped.len()
        );
    }
    Ok(series)
}

/// Build and persist one observation target. Returns the rows written.
pub fn process_obs_target(
    db: &Database,
    config: &Config,
    target: &ObsTarget,
    step: Timestep,
    now: NaiveDateTime,
) -> anyhow::Result<usize> {
    let id = resolve_run(db, config, &target.grid_id, target.latitude, target.longitude)?;
    let start = window_start(db, config, &id, now)?;

    let (primary, fallbacks) = match target.sources.split_first() {
        Some(split) => split,
        None => anyhow::bail!("{} has no source series", target.grid_id),
    };
    let primary = gridded(db, primary, start, step)?;
    let fallbacks = fallbacks
        .iter()
        .map(|source| gridded(db, source, start, step))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let filled = fill_chain(&primary, &fallbacks, step);

    // The tick at `start` is already persisted; it only anchors interpolation.
    let Some(last) = filled.after(start).last_timestamp() else {
        warn!("obs: no new data for {} since {}", target.grid_id, start);
        return Ok(0);
    };

    let resolved = apply_missing_policy(&filled, config.missing_policy)?.after(start);
    let rows = db.upsert_series(&id, &resolved)?;
    db.update_latest_obs(&id, last)?;
    Ok(rows)
}

pub async fn run_obs_rainfall(
    db: &Database,
    config: &Config,
    targets_csv: &str,
    step: Timestep,
) -> anyhow::Result<()> {
    let targets = parse_obs_targets(
        &std::fs::read_to_string(targets_csv)?,
        &config.grid_interpolation,
    )?;
    let now = Local::now().naive_local();
    info!(
        "Updating {} observed rainfall series at {} from {}",
        targets.len(),
        step,
        targets_csv
    );

    let items = targets
        .into_iter()
        .map(|t| (t.grid_id.clone(), t))
        .collect();
    let db = db.clone();
    let config = config.clone();
    run_batch("obs-rainfall", items, move |_, target| {
        process_obs_target(&db, &config, &target, step, now)
    })
    .await
    .into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hts_data::MissingPolicy;

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 8, 22)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn target(sources: &[&str]) -> ObsTarget {
        ObsTarget {
            grid_id: "rainfall_colombo_MDPA".to_string(),
            latitude: 6.9,
            longitude: 79.86,
            sources: sources.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn stored(db: &Database, id: &str) -> Vec<(NaiveDateTime, Option<f64>)> {
        db.fetch_series(id, ts(0, 0), None)
            .unwrap()
            .into_iter()
            .map(|p| (p.timestamp, p.value))
            .collect()
    }

    #[test]
    fn fills_from_secondary_and_advances_watermark() {
        let db = Database::new().unwrap();
        db.load_raw_points(
            "\
primary,2019-08-22 01:00:00,0.5
primary,2019-08-22 01:05:00,1.0
primary,2019-08-22 01:15:00,3.0
secondary,2019-08-22 01:10:00,2.0
secondary,2019-08-22 01:20:00,4.0
",
        )
        .unwrap();
        let config = Config::default();
        let id = resolve_run(&db, &config, "rainfall_colombo_MDPA", 6.9, 79.86).unwrap();
        db.update_latest_obs(&id, ts(1, 0)).unwrap();

        let rows = process_obs_target(
            &db,
            &config,
            &target(&["primary", "secondary"]),
            Timestep::FIVE,
            ts(12, 0),
        )
        .unwrap();
        assert_eq!(rows, 4);
        assert_eq!(
            stored(&db, &id),
            vec![
                (ts(1, 5), Some(1.0)),
                (ts(1, 10), Some(2.0)),
                (ts(1, 15), Some(3.0)),
                (ts(1, 20), Some(4.0)),
            ]
        );
        assert_eq!(db.get_obs_end(&id).unwrap(), Some(ts(1, 20)));

        // Nothing new on a second pass.
        let rows = process_obs_target(
            &db,
            &config,
            &target(&["primary", "secondary"]),
            Timestep::FIVE,
            ts(12, 0),
        )
        .unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn missing_policy_controls_unfilled_ticks() {
        let csv = "\
primary,2019-08-22 01:00:00,0.0
primary,2019-08-22 01:15:00,3.0
";
        let run = |policy| {
            let db = Database::new().unwrap();
            db.load_raw_points(csv).unwrap();
            let config = Config {
                missing_policy: policy,
                obs_window_days: 0,
                ..Config::default()
            };
            process_obs_target(&db, &config, &target(&["primary"]), Timestep::FIVE, ts(1, 0))
                .unwrap();
            let id = db
                .get_timeseries_id("rainfall_colombo_MDPA", &config.method)
                .unwrap()
                .unwrap();
            stored(&db, &id)
                .into_iter()
                .map(|(_, v)| v)
                .collect::<Vec<_>>()
        };

        assert_eq!(
            run(MissingPolicy::TreatAsZero),
            vec![Some(0.0), Some(0.0), Some(3.0)]
        );
        assert_eq!(run(MissingPolicy::LeaveNull), vec![None, None, Some(3.0)]);
        let interpolated = run(MissingPolicy::Interpolate);
        for (actual, expected) in interpolated.iter().zip([1.0, 2.0, 3.0]) {
            let actual = actual.unwrap();
            assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
        }
    }

    #[test]
    fn fifteen_minute_grid_sums_five_minute_samples() {
        let db = Database::new().unwrap();
        db.load_raw_points(
            "\
primary,2019-08-22 01:05:00,1.0
primary,2019-08-22 01:10:00,1.0
primary,2019-08-22 01:15:00,1.0
primary,2019-08-22 01:20:00,2.0
primary,2019-08-22 01:25:00,2.0
primary,2019-08-22 01:30:00,2.0
",
        )
        .unwrap();
        let config = Config::default();
        let id = resolve_run(&db, &config, "rainfall_colombo_MDPA", 6.9, 79.86).unwrap();
        db.update_latest_obs(&id, ts(1, 0)).unwrap();

        let rows = process_obs_target(
            &db,
            &config,
            &target(&["primary"]),
            Timestep::FIFTEEN,
            ts(12, 0),
        )
        .unwrap();
        assert_eq!(rows, 2);
        let out = stored(&db, &id);
        assert_eq!(out, vec![(ts(1, 15), Some(3.0)), (ts(1, 30), Some(6.0))]);
        let total: f64 = out.iter().filter_map(|(_, v)| *v).sum();
        assert_eq!(total, 9.0);
        assert_eq!(db.get_obs_end(&id).unwrap(), Some(ts(1, 30)));
    }

    #[test]
    fn resolve_run_is_idempotent() {
        let db = Database::new().unwrap();
        let config = Config::default();
        let first = resolve_run(&db, &config, "grid", 6.9, 79.86).unwrap();
        let second = resolve_run(&db, &config, "grid", 6.9, 79.86).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn window_start_without_watermark() {
        let db = Database::new().unwrap();
        let config = Config::default();
        let id = resolve_run(&db, &config, "grid", 6.9, 79.86).unwrap();
        let now = NaiveDate::from_ymd_opt(2019, 9, 1)
            .unwrap()
            .and_hms_opt(3, 47, 0)
            .unwrap();
        assert_eq!(window_start(&db, &config, &id, now).unwrap(), ts(3, 0));
    }
}
