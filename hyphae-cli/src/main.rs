//! Command-line entry point for the hyphae growth simulation.
//!
//! This binary wires the core growth engine to a PNG raster canvas:
//! it parses arguments, seeds the sources, runs the unbounded growth
//! loop until capacity, an iteration limit, or Ctrl-C, and writes the
//! final surface as the run's sole durable artifact.

mod raster;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use hyphae_core::{
    config::{Config, GrowthPolicy},
    engine::{CancelToken, GrowthEngine},
    node::StoreError,
};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use raster::Canvas;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// Sample any committed node each iteration (the classic process).
    Resample,
    /// Sample only non-exhausted nodes; stops cleanly on stall.
    Eligible,
}

impl From<PolicyArg> for GrowthPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Resample => GrowthPolicy::ResampleAll,
            PolicyArg::Eligible => GrowthPolicy::EligibleSet,
        }
    }
}

/// Grow a hyphae pattern and write it as a PNG.
#[derive(Debug, Parser)]
#[command(name = "hyphae", version)]
struct Args {
    /// Output image side length in pixels; also sets the drawable unit.
    #[arg(long, default_value_t = 2_000)]
    scale: u32,

    /// RNG seed; a random seed is drawn and logged when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of source nodes seeded before growth starts.
    #[arg(long, default_value_t = 5)]
    sources: usize,

    /// Hard maximum number of nodes.
    #[arg(long)]
    capacity: Option<usize>,

    /// Stop after this many iterations (accepted or rejected).
    #[arg(long)]
    iterations: Option<u64>,

    /// Parent selection policy.
    #[arg(long, value_enum, default_value_t = PolicyArg::Resample)]
    policy: PolicyArg,

    /// Output PNG path.
    #[arg(long, default_value = "hyphae.png")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut cfg = Config::for_scale(args.scale);
    if let Some(capacity) = args.capacity {
        cfg.capacity = capacity;
    }
    cfg.policy = args.policy.into();

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, scale = args.scale, sources = args.sources, "starting growth");
    let mut rng = ChaCha12Rng::seed_from_u64(seed);

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .context("failed to install interrupt handler")?;

    let mut canvas = Canvas::new(args.scale);
    let mut engine = GrowthEngine::new(cfg);
    engine
        .seed_sources(args.sources, &mut rng, &mut canvas)
        .context("failed to seed sources")?;

    match engine.run(&mut rng, &mut canvas, &cancel, args.iterations) {
        Ok(summary) => {
            tracing::info!(
                accepted = summary.accepted,
                rejected = summary.rejected,
                stop = ?summary.stop,
                "growth finished"
            );
        }
        // Filling the store is the process's natural end, not a failure.
        Err(StoreError::CapacityExceeded { capacity }) => {
            tracing::info!(capacity, "node capacity reached");
        }
        Err(e) => return Err(e).context("growth loop failed"),
    }

    canvas
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    tracing::info!(
        path = %args.output.display(),
        nodes = engine.store().count(),
        "wrote image"
    );
    Ok(())
}
