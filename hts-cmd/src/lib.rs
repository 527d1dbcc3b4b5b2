//! Command implementations for the HTS CLI.
//!
//! Provides subcommands that import raw data, maintain the station registry
//! and build aligned rainfall series for the simulation store.

use clap::Subcommand;
use hts_data::Interpolation;
use hts_series::station::StationKind;
use hts_series::Timestep;
use hts_utils::dates::parse_timestamp;

pub mod batch;
pub mod config;
pub mod fcst;
pub mod obs;
pub mod store;
pub mod targets;

use config::Config;

#[derive(Subcommand)]
pub enum Command {
    /// Import raw points (`series_id,time,value`, no headers)
    LoadRaw {
        #[arg(long)]
        csv: String,
    },

    /// Import the station registry (CSV with headers)
    LoadStations {
        #[arg(long)]
        csv: String,
    },

    /// Register a station under the next free id of its kind
    AddStation {
        /// Station kind label, e.g. `WRF` or `CUrW_WeatherStation`
        #[arg(long)]
        kind: String,

        #[arg(long)]
        name: String,

        #[arg(long, allow_hyphen_values = true)]
        latitude: f64,

        #[arg(long, allow_hyphen_values = true)]
        longitude: f64,

        #[arg(long)]
        description: Option<String>,
    },

    /// Print the station registry as CSV
    Stations,

    /// Gap-fill observed rainfall onto a fixed grid for every target
    ObsRainfall {
        /// Target list: `grid_id,latitude,longitude,primary,secondary?,tertiary?`
        #[arg(short = 't', long)]
        targets: String,

        /// Output step in minutes
        #[arg(long, default_value_t = 5)]
        timestep: i64,
    },

    /// Average forecast ensemble members for every target
    FcstRainfall {
        /// Target list: `grid_id,latitude,longitude,member1;member2;...`
        #[arg(short = 't', long)]
        targets: String,

        /// Output step in minutes, 5 or 15
        #[arg(long, default_value_t = 5)]
        timestep: i64,
    },

    /// Reindex a stored series onto a uniform calendar and fill its gaps
    FillUniform {
        #[arg(long)]
        source: String,

        #[arg(long)]
        target: String,

        /// First tick, `YYYY-MM-DD[ HH:MM:SS]`
        #[arg(long)]
        start: String,

        /// Last tick, inclusive
        #[arg(long)]
        end: String,

        /// Calendar step in minutes
        #[arg(long, default_value_t = 60)]
        step: i64,

        /// linear, nearest, previous or next; defaults to the configured method
        #[arg(long)]
        method: Option<String>,
    },
}

pub async fn run(command: Command, config: &Config) -> anyhow::Result<()> {
    let db = config.open_database()?;
    match command {
        Command::LoadRaw { csv } => store::run_load_raw(&db, &csv),
        Command::LoadStations { csv } => store::run_load_stations(&db, &csv),
        Command::AddStation {
            kind,
            name,
            latitude,
            longitude,
            description,
        } => {
            let kind: StationKind = kind.parse()?;
            store::run_add_station(&db, kind, &name, latitude, longitude, description.as_deref())
        }
        Command::Stations => store::write_stations(&db, std::io::stdout().lock()),
        Command::ObsRainfall { targets, timestep } => {
            obs::run_obs_rainfall(&db, config, &targets, Timestep::minutes(timestep)?).await
        }
        Command::FcstRainfall { targets, timestep } => {
            fcst::run_fcst_rainfall(&db, config, &targets, Timestep::minutes(timestep)?).await
        }
        Command::FillUniform {
            source,
            target,
            start,
            end,
            step,
            method,
        } => {
            let method = method.map(|m| m.parse::<Interpolation>()).transpose()?;
            store::run_fill_uniform(
                &db,
                config,
                &source,
                &target,
                parse_timestamp(&start)?,
                parse_timestamp(&end)?,
                Timestep::minutes(step)?,
                method,
            )
        }
    }
}
