//! Diode Tran - transient simulation of a nonlinear diode network
//!
//! Runs the simulation and writes one text file per tracked quantity.
//!
//! # Usage
//!
//! ```bash
//! diode-tran --output-dir results --t-end 1e-3
//! ```

use std::path::PathBuf;

use clap::Parser;
use diode_tran::{
    error::Result,
    output::{writer, ResultSeries},
    CircuitParams, Simulator, SimulatorConfig,
};
use log::{error, LevelFilter};

/// Diode network transient simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory the result files are written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// End time in seconds
    #[arg(long)]
    t_end: Option<f64>,

    /// Step size of the first attempt in seconds
    #[arg(long)]
    initial_step: Option<f64>,

    /// Upper bound on the step size in seconds
    #[arg(long)]
    max_step: Option<f64>,

    /// Record every n-th accepted step
    #[arg(long)]
    record_every: Option<usize>,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn config(&self) -> SimulatorConfig {
        let mut config = SimulatorConfig::default();
        if let Some(t_end) = self.t_end {
            config.t_end = t_end;
        }
        if let Some(initial_step) = self.initial_step {
            config.initial_step = initial_step;
        }
        if let Some(max_step) = self.max_step {
            config.max_step = max_step;
        }
        if let Some(record_every) = self.record_every {
            config.record_every = record_every;
        }
        config
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    // Validates the configuration
    let simulator = Simulator::with_config(CircuitParams::default(), args.config())?;

    writer::clear_files(&args.output_dir)?;

    let mut series = ResultSeries::new();
    let outcome = simulator.run_into(&mut series);

    // Whatever was recorded is written, even if the run failed
    writer::write_series(&args.output_dir, &series)?;

    if let Err(e) = &outcome {
        error!("simulation aborted: {e}");
    }
    outcome.map(|_| ())
}
