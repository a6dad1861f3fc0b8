//! `datapulse` — run one stage of the bronze → silver → gold pipeline.
//!
//! # Usage
//!
//! ```
//! datapulse --step bronze
//! datapulse --step gold --config /etc/datapulse.toml
//! ```

mod driver;
mod settings;

use std::path::PathBuf;

use clap::Parser;
use driver::Step;
use settings::Settings;
use tracing::{Instrument as _, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about = "DataPulse batch ETL pipeline")]
struct Cli {
  /// Stage to run.
  #[arg(long, value_enum)]
  step: Step,

  /// Path to the TOML configuration file. Missing is fine; defaults apply.
  #[arg(short, long, default_value = "datapulse.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let run_id = Uuid::new_v4();
  let span = tracing::info_span!("pipeline", step = %cli.step, %run_id);

  async {
    let result = run(&cli).await;
    if let Err(e) = &result {
      tracing::error!(error = format!("{e:#}"), "pipeline failed");
    }
    result
  }
  .instrument(span)
  .await
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
  let settings = Settings::load(&cli.config)?;
  tracing::info!(config = %cli.config.display(), warehouse = %settings.warehouse.dir.display(), "starting");
  driver::run(cli.step, &settings).await?;
  tracing::info!("finished");
  Ok(())
}
