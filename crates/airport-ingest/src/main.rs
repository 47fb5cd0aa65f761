//! Airport Ingest - one pipeline run per logical date

use airport_common::logging::{init_logging, LogConfig};
use airport_ingest::{
    ApiCredentials, IngestConfig, LogOnlyLoader, LogicalDate, MemoryObjectStore, ObjectStore,
    RunController, S3ObjectStore, SnapshotName,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
#[command(name = "airport-ingest")]
#[command(author, version, about = "Snapshot and enrich the provider's airport collection")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute one run: fetch, persist, enrich, load
    Run {
        /// Logical date of the run (YYYY-MM-DD); defaults to today in UTC
        #[arg(short, long, env = "LOGICAL_DATE")]
        date: Option<LogicalDate>,

        /// JSON secret document holding {"api_key": "..."}
        #[arg(long, env = "NINJA_SECRET_FILE")]
        secret_file: Option<PathBuf>,

        /// Directory for the local snapshot copy
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Bucket for the remote snapshot copy
        #[arg(long)]
        bucket: Option<String>,

        /// Records on a full provider page
        #[arg(long)]
        page_size: Option<usize>,

        /// Keep the remote copy in memory instead of uploading it
        #[arg(long)]
        offline: bool,
    },

    /// Print the snapshot name for a logical date
    SnapshotName {
        #[arg(short, long)]
        date: LogicalDate,
    },

    /// Print the effective configuration (secrets omitted)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let log_config = LogConfig::for_binary("airport-ingest")
        .with_level(level)
        .with_directives("aws_config=warn,aws_smithy_runtime=warn,hyper=info")
        .merge_env()?;
    let _log_guard = init_logging(&log_config)?;

    match cli.command {
        Command::Run {
            date,
            secret_file,
            output_dir,
            bucket,
            page_size,
            offline,
        } => {
            let mut config = IngestConfig::from_env()?;
            if let Some(dir) = output_dir {
                config.snapshot.local_dir = dir;
            }
            if let Some(bucket) = bucket {
                config.storage.bucket = bucket;
            }
            if let Some(page_size) = page_size {
                config.api.page_size = page_size;
            }

            let credentials = match secret_file {
                Some(path) => ApiCredentials::from_file(path)?,
                None => ApiCredentials::from_env()?,
            };

            let store: Arc<dyn ObjectStore> = if offline {
                warn!("Offline mode: remote snapshot is kept in memory only");
                Arc::new(MemoryObjectStore::new(config.storage.bucket.clone()))
            } else {
                Arc::new(S3ObjectStore::new(config.storage.clone()))
            };

            let logical_date = date.unwrap_or_else(LogicalDate::today);
            let controller =
                RunController::new(config, credentials, store, Arc::new(LogOnlyLoader))?;
            let report = controller.run(logical_date).await;

            let summary = serde_json::to_string_pretty(&report.summary())
                .context("Failed to render run summary")?;
            println!("{}", summary);

            if let Some(failure) = report.failure {
                let context =
                    format!("Run for {} failed in stage '{}'", logical_date, failure.stage);
                return Err(anyhow::Error::new(failure.error).context(context));
            }

            info!(%logical_date, "Run complete");
        },
        Command::SnapshotName { date } => {
            let config = IngestConfig::from_env()?;
            println!("{}", SnapshotName::new(&config.snapshot.label, date));
        },
        Command::Config => {
            let config = IngestConfig::from_env()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        },
    }

    Ok(())
}
