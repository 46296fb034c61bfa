//! Telemetry Trace Replay CLI
//!
//! Replays recorded (or synthetic) traces through the dashboard engine
//! without a gateway and dumps the rendered frames as JSON.
//!
//! Usage:
//!   trace-replay --data-dir data/telemetry --ticks 120 \
//!                --satellite h45-k1 --metric fuel --resolution hour \
//!                --output replay.json

use anyhow::{bail, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use telemetry_core::{
    loader,
    synthetic::{generate_trace_set, SyntheticConfig},
    DashboardEngine, DashboardFrame, Metric, Resolution, UiEvent,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "trace-replay",
    about = "Replay satellite telemetry traces through the dashboard engine"
)]
struct Args {
    /// Directory holding the twelve CSV traces
    #[arg(short = 'd', long)]
    data_dir: Option<PathBuf>,

    /// Use generated traces instead of CSV
    #[arg(long, conflicts_with = "data_dir")]
    synthetic: bool,

    /// Seed for generated traces
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Number of ticks to replay
    #[arg(short = 'n', long, default_value_t = 60)]
    ticks: u64,

    /// Satellite key (h45-k1, l12-5); omitted shows the default feed
    #[arg(short, long)]
    satellite: Option<String>,

    /// Metric to plot
    #[arg(short, long)]
    metric: Option<Metric>,

    /// minute or hour
    #[arg(short, long, default_value = "minute")]
    resolution: Resolution,

    /// Hide the ground track
    #[arg(long)]
    no_path: bool,

    /// Emit every frame instead of only the last one
    #[arg(long)]
    all: bool,

    /// Output JSON file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging (stderr, stdout may carry the frames)
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{}", "=".repeat(60));
    info!("Satellite Telemetry Trace Replay");
    info!("{}", "=".repeat(60));

    let traces = match &args.data_dir {
        Some(dir) if !args.synthetic => {
            if !loader::dataset_present(dir) {
                bail!("{:?} does not contain the telemetry CSV traces", dir);
            }
            loader::load_trace_set(dir)?
        }
        _ => {
            info!("Generating synthetic traces (seed {})", args.seed);
            generate_trace_set(&SyntheticConfig {
                seed: args.seed,
            })?
        }
    };

    let mut engine = DashboardEngine::new(Arc::new(traces))?;
    engine.apply(UiEvent::SatelliteSelected {
        satellite: args.satellite.clone(),
    });
    engine.apply(UiEvent::ResolutionToggled {
        minute_mode: args.resolution == Resolution::Minute,
    });
    engine.apply(UiEvent::PathToggled {
        visible: !args.no_path,
    });
    if let Some(metric) = args.metric {
        engine.apply(UiEvent::MetricSelected { metric });
    }

    let mut frames: Vec<DashboardFrame> = Vec::new();
    if args.all {
        frames.push(engine.frame());
    }
    for tick in 1..=args.ticks {
        engine.on_tick(tick);
        if args.all {
            frames.push(engine.frame());
        }
    }
    if !args.all {
        frames.push(engine.frame());
    }

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => {
            info!("Writing {} frame(s) to {:?}", frames.len(), path);
            Box::new(BufWriter::new(File::create(path)?))
        }
        None => Box::new(BufWriter::new(io::stdout())),
    };
    match frames.last() {
        Some(last) if !args.all => serde_json::to_writer_pretty(&mut out, last)?,
        _ => serde_json::to_writer_pretty(&mut out, &frames)?,
    }
    writeln!(out)?;
    out.flush()?;

    // Summary
    info!("{}", "=".repeat(60));
    info!("Replayed {} ticks", engine.tick());
    match engine.selection().active() {
        Some(metric) => info!("Active metric: {} ({})", metric, args.resolution),
        None => info!("No metric selected"),
    }

    Ok(())
}
