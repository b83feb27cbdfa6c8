//! Writes a synthetic measurement file for the `brc` binary.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

const STATIONS: &[&str] = &[
    "Hamburg",
    "Bulawayo",
    "Palembang",
    "St. John's",
    "Cracow",
    "Bridgetown",
    "Istanbul",
    "Roseau",
    "Conakry",
];

const MIN_TEMP: f64 = -30.0;
const MAX_TEMP: f64 = 50.0;

#[derive(Parser)]
#[command(name = "brc-generate")]
#[command(version, about = "Generate random `station;temperature` records")]
struct Cli {
    /// Output path
    #[arg(default_value = "temperature_records.txt")]
    output: PathBuf,

    /// Number of records to write
    #[arg(short, long)]
    rows: u64,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let file = File::create(&cli.output)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;
    let mut out = BufWriter::with_capacity(1 << 20, file);

    let started = Instant::now();
    for _ in 0..cli.rows {
        let station = STATIONS.choose(&mut rng).copied().unwrap_or(STATIONS[0]);
        let temp = (rng.gen_range(MIN_TEMP..=MAX_TEMP) * 10.0).round() / 10.0;
        writeln!(out, "{station};{temp:.1}")?;
    }
    out.flush()?;

    info!(
        rows = cli.rows,
        path = %cli.output.display(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "generated measurements"
    );
    Ok(())
}
