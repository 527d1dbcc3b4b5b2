//! Forecast rainfall: bring every ensemble member onto the output grid,
//! accumulate them per timestamp and store the ensemble mean.

use crate::batch::run_batch;
use crate::config::Config;
use crate::obs::{resolve_run, window_start};
use crate::targets::{parse_fcst_targets, FcstTarget};
use chrono::{Local, NaiveDateTime};
use hts_data::{
    append, append_value_for_timestamp, average, clamp_negative, expand_15_to_5,
    resample_from_first,
};
use hts_db::Database;
use hts_series::{Series, SeriesSink, SeriesSource, Timestep, TupleSeries};
use log::{debug, info, warn};

fn check_timestep(step: Timestep) -> anyhow::Result<()> {
    if step != Timestep::FIVE && step != Timestep::FIFTEEN {
        anyhow::bail!("forecast timestep must be 5 or 15 minutes, got {}", step);
    }
    Ok(())
}

/// One member on the output grid, or `None` if it has no data yet.
fn member_series(
    db: &Database,
    member: &str,
    start: NaiveDateTime,
    step: Timestep,
) -> anyhow::Result<Option<Series>> {
    let raw = db.fetch_series(member, start, None)?;
    if raw.is_empty() {
        warn!("fcst: member {} has no data since {}", member, start);
        return Ok(None);
    }
    let series = resample_from_first(&raw, Timestep::FIFTEEN)?.ensure_no_duplicates()?;
    if step == Timestep::FIVE {
        return Ok(Some(expand_15_to_5(&series, None)?));
    }
    Ok(Some(series))
}

fn accumulate(tuples: Option<TupleSeries>, member: &str, series: &Series) -> TupleSeries {
    let Some(tuples) = tuples else {
        return TupleSeries::from(series);
    };
    match append_value_for_timestamp(&tuples, series) {
        Ok(merged) => merged,
        Err(e) => {
            debug!("fcst: {} is not aligned ({}), merging by timestamp", member, e);
            append(&tuples, series)
        }
    }
}

/// Build and persist the ensemble mean of one forecast target. Returns the
/// rows written.
pub fn process_fcst_target(
    db: &Database,
    config: &Config,
    target: &FcstTarget,
    step: Timestep,
    now: NaiveDateTime,
) -> anyhow::Result<usize> {
    check_timestep(step)?;
    let id = resolve_run(db, config, &target.grid_id, target.latitude, target.longitude)?;
    let start = window_start(db, config, &id, now)?;

    let mut tuples = None;
    for member in &target.members {
        if let Some(series) = member_series(db, member, start, step)? {
            tuples = Some(accumulate(tuples, member, &series));
        }
    }
    let Some(tuples) = tuples else {
        warn!("fcst: no member of {} has data", target.grid_id);
        return Ok(0);
    };

    let mut mean = average(&tuples);
    if config.clamp_negative {
        mean = clamp_negative(&mean);
    }
    db.upsert_series(&id, &mean)
}

pub async fn run_fcst_rainfall(
    db: &Database,
    config: &Config,
    targets_csv: &str,
    step: Timestep,
) -> anyhow::Result<()> {
    check_timestep(step)?;
    let targets = parse_fcst_targets(
        &std::fs::read_to_string(targets_csv)?,
        &config.grid_interpolation,
    )?;
    let now = Local::now().naive_local();
    info!(
        "Updating {} forecast rainfall series at {} from {}",
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
    run_batch("fcst-rainfall", items, move |_, target| {
        process_fcst_target(&db, &config, &target, step, now)
    })
    .await
    .into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const MEMBERS: &str = "\
wrf_a,2019-08-22 00:00:00,3.0
wrf_a,2019-08-22 00:15:00,6.0
wrf_b,2019-08-22 00:00:00,6.0
wrf_b,2019-08-22 00:15:00,-12.0
wrf_c,2019-08-22 00:15:00,9.0
";

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 8, 22)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn target(members: &[&str]) -> FcstTarget {
        FcstTarget {
            grid_id: "rainfall_colombo_MDPA".to_string(),
            latitude: 6.9,
            longitude: 79.86,
            members: members.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn run(config: &Config, members: &[&str], step: Timestep) -> Vec<(NaiveDateTime, Option<f64>)> {
        let db = Database::new().unwrap();
        db.load_raw_points(MEMBERS).unwrap();
        process_fcst_target(&db, config, &target(members), step, ts(12, 0)).unwrap();
        let id = db
            .get_timeseries_id("rainfall_colombo_MDPA", &config.method)
            .unwrap()
            .unwrap();
        db.fetch_series(&id, ts(0, 0), None)
            .unwrap()
            .into_iter()
            .map(|p| (p.timestamp, p.value))
            .collect()
    }

    #[test]
    fn averages_members_and_clamps_negatives() {
        let out = run(&Config::default(), &["wrf_a", "wrf_b"], Timestep::FIFTEEN);
        assert_eq!(out, vec![(ts(0, 0), Some(4.5)), (ts(0, 15), Some(0.0))]);
    }

    #[test]
    fn expands_members_to_five_minutes() {
        let config = Config {
            clamp_negative: false,
            ..Config::default()
        };
        let out = run(&config, &["wrf_a", "wrf_b"], Timestep::FIVE);
        let values: Vec<_> = out.iter().map(|(_, v)| *v).collect();
        assert_eq!(
            values,
            vec![
                Some(1.5),
                Some(1.5),
                Some(1.5),
                Some(-1.0),
                Some(-1.0),
                Some(-1.0)
            ]
        );
        assert_eq!(out[5].0, ts(0, 25));
    }

    #[test]
    fn misaligned_member_merges_by_timestamp() {
        let out = run(&Config::default(), &["wrf_a", "wrf_c"], Timestep::FIFTEEN);
        assert_eq!(out, vec![(ts(0, 0), Some(3.0)), (ts(0, 15), Some(7.5))]);
    }

    #[test]
    fn members_without_data_are_skipped() {
        let out = run(&Config::default(), &["wrf_missing", "wrf_a"], Timestep::FIFTEEN);
        assert_eq!(out, vec![(ts(0, 0), Some(3.0)), (ts(0, 15), Some(6.0))]);

        let db = Database::new().unwrap();
        let rows = process_fcst_target(
            &db,
            &Config::default(),
            &target(&["wrf_missing"]),
            Timestep::FIFTEEN,
            ts(12, 0),
        )
        .unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn rejects_unsupported_timestep() {
        let db = Database::new().unwrap();
        let result = process_fcst_target(
            &db,
            &Config::default(),
            &target(&["wrf_a"]),
            Timestep::HOURLY,
            ts(12, 0),
        );
        assert!(result.is_err());
    }
}
