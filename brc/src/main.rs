use std::path::PathBuf;

use anyhow::{Context, Result};
use brc::config::{DEFAULT_BUFFER_CAPACITY, DEFAULT_PARTITIONS};
use brc::{AggregateConfig, FileSource};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "brc")]
#[command(version, about = "Per-station min/max/mean/count over a `station;value` file")]
struct Cli {
    /// Measurement file, one `station;value` record per line
    #[arg(default_value = "temperature_records.txt")]
    file: PathBuf,

    /// Number of partitions to scan concurrently
    #[arg(short, long, env = "BRC_PARTITIONS", default_value_t = DEFAULT_PARTITIONS)]
    partitions: usize,

    /// Read buffer size per partition, in bytes
    #[arg(long, env = "BRC_BUFFER_SIZE", default_value_t = DEFAULT_BUFFER_CAPACITY)]
    buffer_size: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let source = FileSource::from_path(&cli.file)
        .await
        .with_context(|| format!("failed to open {}", cli.file.display()))?;

    let config = AggregateConfig::new()
        .with_partitions(cli.partitions)
        .with_buffer_capacity(cli.buffer_size);

    let report = brc::process(source, &config)
        .await
        .with_context(|| format!("failed to aggregate {}", cli.file.display()))?;

    println!("{report}");
    Ok(())
}
