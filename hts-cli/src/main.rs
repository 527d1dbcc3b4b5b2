//! HTS CLI - Command line tool for aligning and gap-filling rainfall series.

use clap::Parser;
use hts_cmd::config::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "hts-cli",
    version,
    about = "Hydrological timeseries alignment toolkit"
)]
struct Cli {
    /// JSON configuration file; defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: hts_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();
    log::debug!("using database {}", config.database);
    hts_cmd::run(cli.command, &config).await
}
