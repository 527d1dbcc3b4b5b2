//! Target list CSVs consumed by the batch commands.
//!
//! # CSV Formats
//!
//! - **Observation targets** (no headers):
//!   `name,latitude,longitude,primary,secondary?,tertiary?`
//! - **Forecast targets** (no headers):
//!   `name,latitude,longitude,member1;member2;...`
//!
//! Lines starting with `#` are ignored. The grid id of a target is built from
//! its name and the configured grid interpolation, see [`rainfall_grid_id`].

use anyhow::Context;
use hts_series::labels::GridInterpolation;

/// A series to build from one primary source plus optional fallbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct ObsTarget {
    pub grid_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Source series ids, most preferred first. Never empty.
    pub sources: Vec<String>,
}

/// A series to build by averaging forecast ensemble members.
#[derive(Debug, Clone, PartialEq)]
pub struct FcstTarget {
    pub grid_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub members: Vec<String>,
}

/// Coordinates are stored with six decimals so the run hash is stable.
fn coordinate(field: Option<&str>, name: &str, line: u64) -> anyhow::Result<f64> {
    let value: f64 = field
        .unwrap_or("")
        .trim()
        .parse()
        .with_context(|| format!("line {}: invalid {}", line, name))?;
    Ok((value * 1e6).round() / 1e6)
}

/// `rainfall_{name}_{interpolation}`, e.g. `rainfall_colombo_MDPA`.
pub fn rainfall_grid_id(name: &str, grid_interpolation: &GridInterpolation) -> String {
    format!("rainfall_{}_{}", name, grid_interpolation)
}

fn reader(csv_data: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(csv_data.as_bytes())
}

pub fn parse_obs_targets(
    csv_data: &str,
    grid_interpolation: &GridInterpolation,
) -> anyhow::Result<Vec<ObsTarget>> {
    let mut targets = Vec::new();
    for result in reader(csv_data).records() {
        let r = result?;
        let line = r.position().map(|p| p.line()).unwrap_or(0);
        let name = r.get(0).unwrap_or("").trim();
        let sources: Vec<String> = r
            .iter()
            .skip(3)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if name.is_empty() || sources.is_empty() {
            anyhow::bail!("line {}: expected name,latitude,longitude,primary[,...]", line);
        }
        targets.push(ObsTarget {
            grid_id: rainfall_grid_id(name, grid_interpolation),
            latitude: coordinate(r.get(1), "latitude", line)?,
            longitude: coordinate(r.get(2), "longitude", line)?,
            sources,
        });
    }
    log::info!("[HTS Debug] targets: parsed {} observation targets", targets.len());
    Ok(targets)
}

pub fn parse_fcst_targets(
    csv_data: &str,
    grid_interpolation: &GridInterpolation,
) -> anyhow::Result<Vec<FcstTarget>> {
    let mut targets = Vec::new();
    for result in reader(csv_data).records() {
        let r = result?;
        let line = r.position().map(|p| p.line()).unwrap_or(0);
        let name = r.get(0).unwrap_or("").trim();
        let members: Vec<String> = r
            .get(3)
            .unwrap_or("")
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if name.is_empty() || members.is_empty() {
            anyhow::bail!("line {}: expected name,latitude,longitude,member1;member2;...", line);
        }
        targets.push(FcstTarget {
            grid_id: rainfall_grid_id(name, grid_interpolation),
            latitude: coordinate(r.get(1), "latitude", line)?,
            longitude: coordinate(r.get(2), "longitude", line)?,
            members,
        });
    }
    log::info!("[HTS Debug] targets: parsed {} forecast targets", targets.len());
    Ok(targets)
}
