//! Petsnap main entry point
//!
//! Command-line shell around the ingestion pipeline and the paginated
//! record reader.

use clap::{Parser, Subcommand};
use petsnap::config::load_config;
use petsnap::storage::SqliteImageStore;
use petsnap::{read_records, IngestPipeline};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Petsnap: a quota-bounded pet-image ingestion pipeline
///
/// Petsnap scrapes image-search engines for pet pictures, downloads and
/// resizes them under a rate limit until a target count is reached, and
/// records the saved files in SQLite. Stored records can be streamed back
/// out in pages.
#[derive(Parser, Debug)]
#[command(name = "petsnap")]
#[command(version = "1.0.0")]
#[command(about = "A quota-bounded pet-image ingestion pipeline", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download and resize images until the target count is reached
    Ingest {
        /// Number of images to save
        #[arg(long)]
        count: u64,

        /// Route downloads through scraped public proxies
        #[arg(long)]
        proxy: bool,

        /// Override the configured save directory
        #[arg(long, value_name = "DIR")]
        save_dir: Option<PathBuf>,
    },

    /// Stream stored image records back out
    Read {
        /// Number of records to read (wraps around when the store is smaller)
        #[arg(long)]
        count: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Ingest {
            count,
            proxy,
            save_dir,
        } => {
            if let Some(dir) = save_dir {
                config.ingest.save_dir = dir.display().to_string();
            }
            handle_ingest(config, count, proxy).await
        }
        Command::Read { count } => handle_read(config, count).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("petsnap=info,warn"),
            1 => EnvFilter::new("petsnap=debug,info"),
            2 => EnvFilter::new("petsnap=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the `ingest` subcommand: one ingestion run to quota
async fn handle_ingest(
    config: petsnap::Config,
    count: u64,
    use_proxy: bool,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.ingest.save_dir)?;
    let store = Arc::new(SqliteImageStore::new(Path::new(
        &config.storage.database_path,
    ))?);

    tracing::info!(
        "ingesting {} images into {} ({} workers, proxy: {})",
        count,
        config.ingest.save_dir,
        config.ingest.workers,
        use_proxy
    );

    let pipeline = IngestPipeline::new(store, config);
    let start = Instant::now();
    let saved = pipeline.run(count, use_proxy).await?;

    println!("Saved {} images in {:.2?}", saved, start.elapsed());
    Ok(())
}

/// Handles the `read` subcommand: stream records from the store
async fn handle_read(config: petsnap::Config, count: u64) -> anyhow::Result<()> {
    let store = Arc::new(SqliteImageStore::new(Path::new(
        &config.storage.database_path,
    ))?);

    let start = Instant::now();
    let mut records = read_records(store, count);
    let mut total: u64 = 0;
    while let Some(record) = records.recv().await {
        tracing::info!("read image: {}", record.file);
        total += 1;
    }

    println!("Read {} records in {:.2?}", total, start.elapsed());
    Ok(())
}
