mod config;
mod error;
mod ingest;
mod pipeline;
mod storage;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use songlake_core::storage::TableId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{config::Config, pipeline::Pipeline};

/// Songlake - Turn music catalog and listening logs into a partitioned star schema
#[derive(Parser, Debug)]
#[command(name = "songlake")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, short, env = "SONGLAKE_CONFIG")]
    config: Option<PathBuf>,

    /// Root holding song_data/ and log_data/ (overrides config and environment)
    #[arg(long, short)]
    input: Option<String>,

    /// Root the tables are written under (overrides config and environment)
    #[arg(long, short)]
    output: Option<String>,

    /// Which part of the pipeline to run
    #[arg(long, value_enum, default_value_t = Stage::All)]
    stage: Stage,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, env = "SONGLAKE_LOG_FORMAT")]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Stage {
    /// Catalog, then activity log
    All,
    /// Catalog only: staging_songs, songs, artists
    Songs,
    /// Activity log only: staging_events, users, time, songplays
    Logs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    let registry = tracing_subscriber::registry().with(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "songlake=info".into()),
    );
    match cli.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env(|key| std::env::var(key).ok());
    config.apply_overrides(cli.input, cli.output);
    config.validate()?;

    let backends = storage::connect(&config).await?;
    let pipeline = Pipeline::new(backends);

    tracing::info!(stage = ?cli.stage, "Starting pipeline");
    let report = match cli.stage {
        Stage::All => pipeline.run().await?,
        Stage::Songs => pipeline.process_song_data().await?,
        Stage::Logs => pipeline.process_log_data().await?,
    };

    let rows: usize = report.tables.iter().map(|(_, summary)| summary.rows).sum();
    tracing::info!(
        tables = report.tables.len(),
        rows,
        songplays = ?report.summary(TableId::SongPlays).map(|summary| summary.rows),
        "Pipeline finished"
    );

    Ok(())
}
