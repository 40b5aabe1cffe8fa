//! # Diode Tran
//!
//! Adaptive-step transient simulation of a nonlinear diode network.
//!
//! This library provides:
//! - The network equations as an 18-unknown differential-algebraic system
//! - A modified Newton solver on top of a direct dense linear solve
//! - A second-difference local error estimate driving the step size
//! - Result series collection and text file output (CLI only)
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`circuit`] - State vector, element values, residual and Jacobian
//! - [`solver`] - Linear solve, Newton iteration, step control and the time loop
//! - [`output`] - Recorded series and result files
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! RUST_LOG=info diode-tran --output-dir results --t-end 1e-3
//! ```
//!
//! ### Library
//!
//! ```no_run
//! use diode_tran::{CircuitParams, Simulator, SimulatorConfig};
//!
//! let config = SimulatorConfig::new().with_t_end(1e-4);
//! let sim = Simulator::with_config(CircuitParams::default(), config)?;
//! let result = sim.run()?;
//! println!("{} points, {} accepted steps", result.series.len(), result.stats.accepted_steps);
//! # Ok::<(), diode_tran::SimError>(())
//! ```
//!
//! ## Time Stepping
//!
//! For each step of size h ending at t:
//!
//! 1. Seed the unknowns by extrapolating the last two accepted states
//! 2. Iterate Newton with the Jacobian frozen at that seed
//! 3. Estimate the local error from the last three solutions
//! 4. Reject and halve, accept, or accept and double the step
//!
//! Derivatives are discretized with backward Euler.

pub mod circuit;
pub mod error;
pub mod output;
pub mod solver;

// Re-export main types for convenience
pub use circuit::{CircuitParams, StateVector};
pub use error::{Result, SimError};
pub use output::ResultSeries;
pub use solver::{Simulator, SimulatorConfig};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmTransientSim;
