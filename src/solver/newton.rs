//! Modified Newton iteration for one time step.

use log::trace;

use crate::circuit::{StateVector, StorageState};
use crate::error::Result;

use super::linear;
use super::{DaeSystem, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};

/// Result of a Newton solve.
#[derive(Debug, Clone, PartialEq)]
pub enum NewtonOutcome {
    /// The correction norm dropped below tolerance.
    Converged {
        state: StateVector,
        /// Iterations used, counting from 1
        iterations: usize,
    },
    /// The iteration budget ran out first. No state is valid.
    Diverged {
        iterations: usize,
        last_correction_norm: f64,
    },
}

impl NewtonOutcome {
    /// Whether the solve converged.
    pub fn is_converged(&self) -> bool {
        matches!(self, NewtonOutcome::Converged { .. })
    }

    /// The converged state, if any.
    pub fn state(&self) -> Option<&StateVector> {
        match self {
            NewtonOutcome::Converged { state, .. } => Some(state),
            NewtonOutcome::Diverged { .. } => None,
        }
    }

    /// Number of iterations performed.
    pub fn iterations(&self) -> usize {
        match self {
            NewtonOutcome::Converged { iterations, .. }
            | NewtonOutcome::Diverged { iterations, .. } => *iterations,
        }
    }
}

/// Newton solver for the step equations.
///
/// The Jacobian is evaluated once, at the initial guess, and kept for every
/// iteration of the same solve.
#[derive(Debug, Clone)]
pub struct NewtonSolver {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Convergence tolerance on the Euclidean norm of the correction
    pub tolerance: f64,
}

impl Default for NewtonSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl NewtonSolver {
    /// Create a solver with the default budget and tolerance.
    pub fn new() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Create a solver with custom settings.
    pub fn with_config(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
        }
    }

    /// Solve the step ending at `time` with step size `step`.
    ///
    /// Non-convergence is reported as [`NewtonOutcome::Diverged`]; `Err` is
    /// only returned for dimension or conversion defects.
    pub fn solve<S: DaeSystem + ?Sized>(
        &self,
        system: &S,
        time: f64,
        step: f64,
        guess: &StateVector,
        memory: &StorageState,
    ) -> Result<NewtonOutcome> {
        let mut current = *guess;
        let mut norm = f64::INFINITY;

        for iter in 0..self.max_iterations {
            // Frozen at the initial guess for the whole solve
            let jacobian = system.jacobian(step, guess);
            let rhs: Vec<f64> = system
                .residual(time, step, &current, memory)
                .iter()
                .map(|r| -r)
                .collect();

            let delta = StateVector::from_slice(&linear::solve(jacobian, rhs)?)?;
            current = current.plus(&delta);
            norm = delta.norm();

            trace!("newton iter {}: |dx| = {:.3e}", iter + 1, norm);

            if norm < self.tolerance {
                return Ok(NewtonOutcome::Converged {
                    state: current,
                    iterations: iter + 1,
                });
            }
        }

        Ok(NewtonOutcome::Diverged {
            iterations: self.max_iterations,
            last_correction_norm: norm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{CircuitParams, DiodeNetwork, STATE_DIM};
    use crate::solver::DenseMatrix;
    use approx::assert_relative_eq;

    /// Linear system `x - target = 0` with identity Jacobian.
    struct Affine {
        target: StateVector,
    }

    impl DaeSystem for Affine {
        fn residual(&self, _: f64, _: f64, x: &StateVector, _: &StorageState) -> [f64; STATE_DIM] {
            x.zip_with(&self.target, |a, b| a - b).to_array()
        }

        fn jacobian(&self, _: f64, _: &StateVector) -> DenseMatrix {
            DenseMatrix::identity(STATE_DIM)
        }
    }

    /// Residual that never shrinks: every correction has unit norm.
    struct Stubborn;

    impl DaeSystem for Stubborn {
        fn residual(&self, _: f64, _: f64, _: &StateVector, _: &StorageState) -> [f64; STATE_DIM] {
            let mut r = [0.0; STATE_DIM];
            r[10] = 1.0;
            r
        }

        fn jacobian(&self, _: f64, _: &StateVector) -> DenseMatrix {
            DenseMatrix::identity(STATE_DIM)
        }
    }

    #[test]
    fn test_zero_residual_converges_in_one_iteration() {
        let guess = StateVector {
            phi2: 1.5,
            i_l: -0.25,
            ..StateVector::default()
        };
        let system = Affine { target: guess };
        let outcome = NewtonSolver::new()
            .solve(&system, 0.0, 1e-9, &guess, &StorageState::default())
            .unwrap();
        match outcome {
            NewtonOutcome::Converged { state, iterations } => {
                assert_eq!(iterations, 1);
                assert_eq!(state, guess);
            }
            other => panic!("expected convergence, got {other:?}"),
        }
    }

    #[test]
    fn test_linear_system_solved_in_one_correction() {
        let target = StateVector {
            phi1: 3.0,
            phi4: -2.0,
            ..StateVector::default()
        };
        let outcome = NewtonSolver::new()
            .solve(
                &Affine { target },
                0.0,
                1e-9,
                &StateVector::default(),
                &StorageState::default(),
            )
            .unwrap();
        // First correction is large, second one is zero
        assert_eq!(outcome.iterations(), 2);
        assert_eq!(outcome.state(), Some(&target));
    }

    #[test]
    fn test_budget_exhaustion_yields_no_state() {
        let outcome = NewtonSolver::new()
            .solve(
                &Stubborn,
                0.0,
                1e-9,
                &StateVector::default(),
                &StorageState::default(),
            )
            .unwrap();
        assert!(!outcome.is_converged());
        assert_eq!(outcome.state(), None);
        match outcome {
            NewtonOutcome::Diverged {
                iterations,
                last_correction_norm,
            } => {
                assert_eq!(iterations, 7);
                assert_relative_eq!(last_correction_norm, 1.0);
            }
            other => panic!("expected divergence, got {other:?}"),
        }
    }

    #[test]
    fn test_first_step_of_network_converges() {
        let params = CircuitParams::default();
        let network = DiodeNetwork::new(params.clone());
        let guess = StateVector::initial(&params, 0.0);
        let memory = StorageState::default();
        let (t, h) = (0.0, 1e-11);

        let outcome = NewtonSolver::new()
            .solve(&network, t + h, h, &guess, &memory)
            .unwrap();
        let state = *outcome.state().expect("first step should converge");

        assert!(outcome.iterations() <= DEFAULT_MAX_ITERATIONS);
        assert!(state.is_finite());
        let residual = network.residual(t + h, h, &state, &memory);
        let norm = residual.iter().map(|r| r * r).sum::<f64>().sqrt();
        assert!(norm < DEFAULT_TOLERANCE, "residual norm {norm:e}");
        assert_relative_eq!(state.phi5, 5.0, epsilon = 1e-12);
    }
}
