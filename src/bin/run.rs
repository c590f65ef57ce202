//! Headless kite flight runner.
//!
//! Flies a scripted bar sequence and writes telemetry as JSON lines.
//!
//! ```bash
//! run                          # defaults, position-based lines
//! run kite.yaml --model spring --seconds 30 --every 1
//! ```

use std::{
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use clap::Parser;
use kiteflyer::{FlightEngine, FlightModelRegistry, SimulationConfig};

const FRAME_DT: f64 = 1.0 / 60.0;

#[derive(Parser, Debug)]
#[command(name = "run")]
#[command(version, about = "Fly the kite headless and emit telemetry", long_about = None)]
struct RunArgs {
    /// YAML or JSON simulation config; defaults are used when omitted
    config: Option<PathBuf>,

    /// Line model to fly with
    #[arg(short, long, default_value = FlightModelRegistry::DEFAULT_MODEL)]
    model: String,

    /// Simulated duration [s]
    #[arg(short, long, default_value_t = 10.0)]
    seconds: f64,

    /// Emit telemetry every N frames
    #[arg(short, long, default_value_t = 6, value_parser = clap::value_parser!(u64).range(1..))]
    every: u64,
}

/// Bar input: hold neutral, pull left, return, pull right, return.
fn scripted_bar(time: f64, max_rotation: f64) -> f64 {
    match time % 8.0 {
        t if t < 2.0 => 0.0,
        t if t < 3.5 => max_rotation,
        t if t < 4.5 => 0.0,
        t if t < 6.0 => -max_rotation,
        _ => 0.0,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = RunArgs::parse();

    let config = match &args.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    };
    let max_rotation = config.control_bar.max_rotation;

    let mut engine = FlightEngine::builder()
        .with_config(config)
        .with_model(args.model.as_str())
        .with_logging(true)
        .build()?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let frames = (args.seconds.max(0.0) / FRAME_DT).round() as u64;

    for frame in 0..frames {
        let time = frame as f64 * FRAME_DT;
        engine.update(FRAME_DT, scripted_bar(time, max_rotation), false);
        if frame % args.every == 0 {
            writeln!(out, "{}", engine.telemetry().to_json()?)?;
        }
    }
    out.flush()?;

    let flags = engine.safety_flags();
    eprintln!(
        "Finished {} steps ({:.2}s simulated), final position {:?}, warnings: {}",
        engine.step_count(),
        engine.simulated_time(),
        engine.position(),
        flags.any_warning()
    );
    Ok(())
}
