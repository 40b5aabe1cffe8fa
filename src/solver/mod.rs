//! Time-stepping engine.
//!
//! This module turns the network equations into a transient solution.
//!
//! ## Method
//!
//! Every unknown of the network, including the time derivatives of the
//! storage elements, sits in one state vector `x`. A time step of size `h`
//! asks for `x` such that the DAE residual `F(t + h, h, x, x_prev) = 0`,
//! where derivatives are tied to the storage variables by backward Euler:
//!
//! ```text
//! dx/dt - (x - x_prev) / h = 0
//! ```
//!
//! The nonlinear system is solved with a modified Newton iteration. The
//! Jacobian is built once per step from the initial guess and reused for
//! every iteration of that step:
//!
//! ```text
//! J(x0) dx = -F(x_k)
//! x_{k+1} = x_k + dx
//! ```
//!
//! After a converged step, a second-difference estimate of the local error on
//! the node potentials decides whether the step is rejected and halved,
//! accepted as is, or accepted with the step doubled.

pub mod linear;
mod newton;
mod simulator;
pub mod step_control;

use crate::circuit::{StateVector, StorageState, STATE_DIM};

pub use linear::DenseMatrix;
pub use newton::{NewtonOutcome, NewtonSolver};
pub use simulator::{
    History, SimulationResult, SimulationStats, Simulator, SimulatorConfig, StepContext, StepEvent,
};
pub use step_control::{predict, StepController, TimeControl};

/// Default convergence tolerance on the Newton correction norm.
pub const DEFAULT_TOLERANCE: f64 = 5e-2;

/// Default maximum Newton iterations per time step.
pub const DEFAULT_MAX_ITERATIONS: usize = 7;

/// Local error above which a step is rejected.
pub const DEFAULT_REJECT_THRESHOLD: f64 = 1e-2;

/// Local error above which an accepted step keeps its size.
pub const DEFAULT_HOLD_THRESHOLD: f64 = 1e-3;

/// Equations a Newton step can be taken on.
///
/// Implemented by [`DiodeNetwork`](crate::circuit::DiodeNetwork); tests use
/// synthetic systems to drive the solver into known outcomes.
pub trait DaeSystem {
    /// Residual of the equations at `state`, for a step of size `step`
    /// ending at `time`. Zero when `state` solves the step exactly.
    fn residual(
        &self,
        time: f64,
        step: f64,
        state: &StateVector,
        memory: &StorageState,
    ) -> [f64; STATE_DIM];

    /// Linearization of [`residual`](Self::residual) around `reference`.
    fn jacobian(&self, step: f64, reference: &StateVector) -> DenseMatrix;
}
