//! `shield`: sweeps the speculative safety shield over the lane-runner demo.
//!
//! Usage: `shield [CONFIG]`. Logs go to stderr (filtered by `RUST_LOG`); the
//! sweep result is printed to stdout as JSON.

mod demo;

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use shield_config::ShieldConfig;
use shield_core::sweep;

use crate::demo::{FastLaneOracle, LaneRunner};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let explicit = env::args_os().nth(1).map(PathBuf::from);
    let config = ShieldConfig::load(explicit.as_deref()).context("failed to load config")?;
    let plan = config.sweep.plan(LaneRunner::action_space());
    let demo = config.demo;

    tracing::info!(
        noops = ?plan.noops(),
        shield_depth = plan.shield_depth().value(),
        max_frames = plan.max_frames(),
        lanes = demo.lanes(),
        road_length = demo.road_length(),
        "starting sweep"
    );

    let result = sweep(|| Ok(LaneRunner::new(demo)), &FastLaneOracle, &plan)
        .context("verification aborted")?;

    if let Some(report) = result.first_unsafe() {
        tracing::warn!(
            noop_count = report.noop_count(),
            frame = ?report.main_violation_frame(),
            "main phase violation"
        );
    }

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &result).context("failed to write result")?;
    writeln!(stdout)?;
    Ok(())
}
