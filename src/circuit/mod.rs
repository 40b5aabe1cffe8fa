//! The simulated network: its state, element values and equations.
//!
//! The network topology is fixed. [`DiodeNetwork`] holds the element values
//! and evaluates the DAE residual and its Jacobian for the time-stepping
//! engine in [`crate::solver`].

mod network;
mod params;
mod state;
mod validate;

pub use network::DiodeNetwork;
pub use params::{CircuitParams, DiodeParams, Waveform};
pub use state::{StateVector, StorageState, STATE_DIM};
pub use validate::validate_config;
