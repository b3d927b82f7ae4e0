//! Chunk reader - replays a read workload through the hybrid cache

mod reader;
mod source;

use anyhow::{Context, Result};
use chunkcache::{CacheConfig, Capacities, ChunkClass, StatsSnapshot};
use clap::Parser;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::reader::{ChunkCache, ChunkReader};
use crate::source::SimulatedStore;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Total cache budget in megabytes
    #[arg(short, long, default_value_t = 3)]
    size_mb: u64,

    /// Share of the budget given to small chunks (0.0 - 1.0)
    #[arg(long, default_value_t = 0.9)]
    split: f64,

    /// Simulated backing store latency in milliseconds
    #[arg(short, long, default_value_t = 5)]
    latency_ms: u64,

    /// Delay before a large-chunk backfill starts, in milliseconds
    #[arg(short, long, default_value_t = 100)]
    backfill_delay_ms: u64,

    /// Pause between the warm-up reads and the main workload, in milliseconds
    #[arg(short, long, default_value_t = 2000)]
    pause_ms: u64,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy)]
enum Read {
    Small(u64),
    Large(u64),
}

/// Reads issued back to back before the pause
const WARM_UP: &[Read] = &[Read::Small(1), Read::Small(1), Read::Small(2), Read::Small(3)];

/// Reads issued after the pause
const WORKLOAD: &[Read] = &[
    Read::Large(1),
    Read::Large(1),
    Read::Small(2),
    Read::Small(3),
    Read::Small(4),
    Read::Small(5),
    Read::Small(6),
    Read::Large(6),
    Read::Large(1),
    Read::Small(3),
    Read::Small(4),
    Read::Small(5),
    Read::Large(6),
    Read::Small(7),
];

#[derive(Debug, Serialize)]
struct Report {
    config: CacheConfig,
    capacities: Capacities,
    store_reads: u64,
    backfill_failures: usize,
    small: StatsSnapshot,
    large: StatsSnapshot,
}

async fn replay<S: source::ChunkSource>(reader: &mut ChunkReader<S>, reads: &[Read]) -> Result<()> {
    for read in reads {
        let chunk = match *read {
            Read::Small(offset) => reader.read_small(offset).await?,
            Read::Large(offset) => reader.read_large(offset).await?,
        };
        info!("{:?} -> {}", read, String::from_utf8_lossy(&chunk));
    }
    Ok(())
}

async fn run(args: &Args) -> Result<Report> {
    let config = CacheConfig::from_megabytes(args.size_mb, args.split);
    let cache = Arc::new(ChunkCache::new(config).context("invalid cache configuration")?);
    let capacities = cache.capacities();
    info!(
        "Cache sized: {} small slots, {} large slots",
        capacities.small, capacities.large
    );

    let store = Arc::new(SimulatedStore::new(Duration::from_millis(args.latency_ms)));
    let mut reader = ChunkReader::new(
        Arc::clone(&cache),
        Arc::clone(&store),
        Duration::from_millis(args.backfill_delay_ms),
    );

    replay(&mut reader, WARM_UP).await?;

    tokio::time::sleep(Duration::from_millis(args.pause_ms)).await;
    info!("Starting main workload");

    replay(&mut reader, WORKLOAD).await?;

    info!("Waiting for {} pending backfills", reader.pending_backfills());
    let failures = reader.drain_backfills().await;

    Ok(Report {
        config,
        capacities,
        store_reads: store.reads(),
        backfill_failures: failures.len(),
        small: reader.cache().snapshot(ChunkClass::Small),
        large: reader.cache().snapshot(ChunkClass::Large),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Starting chunkread v{}", env!("CARGO_PKG_VERSION"));
    info!("Cache budget: {} MB, small split {}", args.size_mb, args.split);

    let report = run(&args).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Store reads:       {}", report.store_reads);
        println!("Backfill failures: {}", report.backfill_failures);
        for (name, stats, capacity) in [
            ("small", &report.small, report.capacities.small),
            ("large", &report.large, report.capacities.large),
        ] {
            println!(
                "{:<6} cap {:>4}  hits {:>3}  misses {:>3}  evictions {:>3}  hit ratio {:.2}",
                name, capacity, stats.hits, stats.misses, stats.evictions, stats.hit_ratio
            );
        }
    }

    Ok(())
}
