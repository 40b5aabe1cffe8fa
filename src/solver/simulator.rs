//! Main simulator interface.

use log::{debug, info, warn};

use crate::circuit::{validate_config, CircuitParams, DiodeNetwork, StateVector, StorageState};
use crate::error::{Result, SimError};
use crate::output::ResultSeries;

use super::step_control::{predict, StepController, TimeControl};
use super::{
    NewtonOutcome, NewtonSolver, DEFAULT_HOLD_THRESHOLD, DEFAULT_MAX_ITERATIONS,
    DEFAULT_REJECT_THRESHOLD, DEFAULT_TOLERANCE,
};

/// Configuration for the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Start time (s).
    pub t_start: f64,
    /// End time (s).
    pub t_end: f64,
    /// Step size of the first attempt (s).
    pub initial_step: f64,
    /// Halving below this step aborts the run (s).
    pub min_step: f64,
    /// Growth cap for the step size (s).
    pub max_step: f64,
    /// Maximum Newton iterations per step.
    pub max_iterations: usize,
    /// Newton convergence tolerance on the correction norm.
    pub tolerance: f64,
    /// Local error above which a step is rejected.
    pub reject_threshold: f64,
    /// Local error above which an accepted step keeps its size.
    pub hold_threshold: f64,
    /// Record every n-th accepted step (the final step is always recorded).
    pub record_every: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            t_start: 0.0,
            t_end: 1e-3,
            initial_step: 1e-11,
            min_step: 1e-18,
            max_step: 1e-5,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            reject_threshold: DEFAULT_REJECT_THRESHOLD,
            hold_threshold: DEFAULT_HOLD_THRESHOLD,
            record_every: 1000,
        }
    }
}

impl SimulatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the simulated time interval.
    pub fn with_time_span(mut self, t_start: f64, t_end: f64) -> Self {
        self.t_start = t_start;
        self.t_end = t_end;
        self
    }

    /// Set the end time, keeping the start time.
    pub fn with_t_end(mut self, t_end: f64) -> Self {
        self.t_end = t_end;
        self
    }

    /// Set the initial, minimum and maximum step sizes.
    pub fn with_steps(mut self, initial: f64, min: f64, max: f64) -> Self {
        self.initial_step = initial;
        self.min_step = min;
        self.max_step = max;
        self
    }

    /// Set the maximum Newton iterations per step.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the Newton convergence tolerance.
    ///
    /// The norm covers every unknown, derivatives included, so it is a
    /// loose criterion compared to a per-node voltage tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the reject and hold thresholds of the step controller.
    pub fn with_thresholds(mut self, reject: f64, hold: f64) -> Self {
        self.reject_threshold = reject;
        self.hold_threshold = hold;
        self
    }

    /// Set how often accepted steps are recorded.
    pub fn with_record_every(mut self, record_every: usize) -> Self {
        self.record_every = record_every;
        self
    }
}

/// The two most recent accepted states.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct History {
    pub newer: StateVector,
    pub older: StateVector,
}

impl History {
    /// History with both slots holding `seed`.
    pub fn seeded(seed: StateVector) -> Self {
        Self {
            newer: seed,
            older: seed,
        }
    }

    /// Push `state` in, dropping the older entry.
    pub fn shift(&self, state: StateVector) -> Self {
        Self {
            newer: state,
            older: self.newer,
        }
    }
}

/// Counters collected over a run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimulationStats {
    pub accepted_steps: usize,
    /// Steps rejected by the local error estimate
    pub rejected_steps: usize,
    /// Steps where Newton ran out of iterations
    pub newton_failures: usize,
    pub newton_iterations: usize,
    /// Smallest step size that was accepted
    pub min_step_used: Option<f64>,
}

/// Everything that evolves from one loop iteration to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct StepContext {
    pub control: TimeControl,
    /// Step size of the last accepted step
    pub prev_step: f64,
    pub history: History,
    /// Storage variables of the last accepted state
    pub memory: StorageState,
    /// Starting point of the next Newton solve
    pub guess: StateVector,
    pub stats: SimulationStats,
}

/// What happened in one call to [`Simulator::advance`].
#[derive(Debug, Clone, PartialEq)]
pub enum StepEvent {
    /// Time advanced to `time` with `state`.
    Accepted {
        state: StateVector,
        time: f64,
        /// Whether this point belongs in the result series
        record: bool,
    },
    /// Newton did not converge; retrying with half the step.
    NewtonFailed,
    /// Local error too large; retrying with half the step.
    ErrorRejected,
}

/// Output of a complete run.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub series: ResultSeries,
    pub stats: SimulationStats,
}

/// The transient simulator for the diode network.
pub struct Simulator {
    /// Run settings
    config: SimulatorConfig,
    /// Network equations
    network: DiodeNetwork,
    /// Per-step nonlinear solver
    newton: NewtonSolver,
    /// Accept/reject decisions
    controller: StepController,
}

impl Simulator {
    /// Create a simulator with default circuit values and configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(CircuitParams::default(), SimulatorConfig::default())
    }

    /// Create a simulator for the given circuit values and configuration.
    pub fn with_config(params: CircuitParams, config: SimulatorConfig) -> Result<Self> {
        validate_config(&params, &config)?;

        let newton = NewtonSolver::with_config(config.max_iterations, config.tolerance);
        let controller = StepController::new(config.max_step)
            .with_thresholds(config.reject_threshold, config.hold_threshold);

        Ok(Self {
            config,
            network: DiodeNetwork::new(params),
            newton,
            controller,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Get the network being simulated.
    pub fn network(&self) -> &DiodeNetwork {
        &self.network
    }

    /// Context at the start of a run.
    pub fn initial_context(&self) -> StepContext {
        let initial = StateVector::initial(self.network.params(), self.config.t_start);
        StepContext {
            control: TimeControl::new(self.config.t_start, self.config.initial_step),
            prev_step: self.config.initial_step,
            history: History::seeded(initial),
            memory: StorageState::from(&initial),
            guess: initial,
            stats: SimulationStats::default(),
        }
    }

    /// Run one iteration of the time-stepping loop.
    ///
    /// Returns the context for the next iteration together with what
    /// happened. Only step size exhaustion and defects are errors.
    pub fn advance(&self, mut ctx: StepContext) -> Result<(StepContext, StepEvent)> {
        let step = ctx.control.step;
        let t_next = ctx.control.time + step;

        let outcome = self
            .newton
            .solve(&self.network, t_next, step, &ctx.guess, &ctx.memory)?;
        ctx.stats.newton_iterations += outcome.iterations();

        let state = match outcome {
            NewtonOutcome::Converged { state, .. } => state,
            NewtonOutcome::Diverged {
                last_correction_norm,
                ..
            } => {
                debug!(
                    "newton diverged at t = {:.6e}, h = {:.3e} (|dx| = {:.3e})",
                    ctx.control.time, step, last_correction_norm
                );
                ctx.stats.newton_failures += 1;
                ctx.control = self.shrink(&ctx.control)?;
                // The extrapolation was made for the old step size
                ctx.guess = ctx.history.newer;
                return Ok((ctx, StepEvent::NewtonFailed));
            }
        };

        let next = self.controller.assess(
            &ctx.control,
            ctx.prev_step,
            &state,
            &ctx.history.newer,
            &ctx.history.older,
        );

        if !next.success {
            debug!(
                "step rejected at t = {:.6e}, h = {:.3e}",
                ctx.control.time, step
            );
            ctx.stats.rejected_steps += 1;
            ctx.control = self.shrink(&ctx.control)?;
            return Ok((ctx, StepEvent::ErrorRejected));
        }

        let mut stats = ctx.stats;
        stats.accepted_steps += 1;
        stats.min_step_used = Some(stats.min_step_used.map_or(step, |m| m.min(step)));

        let record = next.time >= self.config.t_end - next.step
            || stats.accepted_steps % self.config.record_every == 0;

        let next_ctx = StepContext {
            control: next,
            prev_step: step,
            history: ctx.history.shift(state),
            memory: StorageState::from(&state),
            guess: predict(&state, &ctx.history.newer),
            stats,
        };

        Ok((
            next_ctx,
            StepEvent::Accepted {
                state,
                time: next.time,
                record,
            },
        ))
    }

    /// Run to the end time, appending recorded points to `series`.
    ///
    /// Points recorded before a fatal error stay in `series`.
    pub fn run_into(&self, series: &mut ResultSeries) -> Result<SimulationStats> {
        let mut ctx = self.initial_context();
        series.push(&ctx.history.newer, ctx.control.time);

        while ctx.control.time < self.config.t_end {
            let (next, event) = self.advance(ctx)?;
            if let StepEvent::Accepted {
                state,
                time,
                record: true,
            } = event
            {
                info!("{}, t={:e}", next.stats.accepted_steps, time);
                series.push(&state, time);
            }
            ctx = next;
        }

        let stats = ctx.stats;
        info!(
            "finished at t = {:e}: {} accepted, {} rejected, {} newton failures, {} newton iterations",
            ctx.control.time,
            stats.accepted_steps,
            stats.rejected_steps,
            stats.newton_failures,
            stats.newton_iterations
        );
        Ok(stats)
    }

    /// Run to the end time and collect the result.
    pub fn run(&self) -> Result<SimulationResult> {
        let mut series = ResultSeries::new();
        let stats = self.run_into(&mut series)?;
        Ok(SimulationResult { series, stats })
    }

    /// Halve the step, failing once it drops below the minimum.
    fn shrink(&self, control: &TimeControl) -> Result<TimeControl> {
        let halved = control.halved();
        if halved.step < self.config.min_step {
            return Err(SimError::StepSizeExhausted {
                time: control.time,
                step: halved.step,
                min_step: self.config.min_step,
            });
        }
        if halved.step < 2.0 * self.config.min_step {
            warn!(
                "step size {:.3e} at t = {:.6e} is close to the minimum {:.1e}",
                halved.step, control.time, self.config.min_step
            );
        }
        Ok(halved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::DaeSystem;
    use approx::assert_relative_eq;

    fn short_run(t_end: f64) -> SimulatorConfig {
        SimulatorConfig::new().with_t_end(t_end)
    }

    #[test]
    fn test_first_step_accepted_and_history_shifted() {
        let sim = Simulator::new().unwrap();
        let ctx = sim.initial_context();
        let initial = ctx.guess;

        let (next, event) = sim.advance(ctx).unwrap();
        let state = match event {
            StepEvent::Accepted { state, time, .. } => {
                assert_relative_eq!(time, 1e-11);
                state
            }
            other => panic!("expected first step to be accepted, got {other:?}"),
        };

        assert!(next.control.success);
        assert_relative_eq!(next.control.time, 1e-11);
        assert_relative_eq!(next.control.step, 2e-11);
        assert_eq!(next.prev_step, 1e-11);
        assert_eq!(next.history.newer, state);
        assert_eq!(next.history.older, initial);
        assert_eq!(next.memory, StorageState::from(&state));
        assert_eq!(next.guess, predict(&state, &initial));
        assert_eq!(next.stats.accepted_steps, 1);
    }

    #[test]
    fn test_run_reaches_end_time() {
        let sim = Simulator::with_config(CircuitParams::default(), short_run(1e-5)).unwrap();
        let result = sim.run().unwrap();
        let series = &result.series;

        assert!(result.stats.accepted_steps > 0);
        assert!(series.len() >= 2);
        assert_eq!(series.time[0], 0.0);
        assert_eq!(series.phi5[0], 5.0);
        assert!(*series.time.last().unwrap() >= 1e-5);
        assert!(series.phi1.iter().chain(&series.phi4).all(|v| v.is_finite()));
        // Recorded times never go backwards
        assert!(series.time.windows(2).all(|w| w[0] < w[1]));
        // The supply node stays pinned
        for v in &series.phi5 {
            assert_relative_eq!(*v, 5.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_record_every_step() {
        let config = short_run(2e-6).with_record_every(1);
        let sim = Simulator::with_config(CircuitParams::default(), config).unwrap();
        let result = sim.run().unwrap();
        assert_eq!(result.series.len(), result.stats.accepted_steps + 1);
        assert_eq!(result.series.time.len(), result.series.i_l.len());
    }

    #[test]
    fn test_accepted_states_solve_their_step() {
        let sim = Simulator::with_config(CircuitParams::default(), short_run(1e-7)).unwrap();
        let mut ctx = sim.initial_context();
        while ctx.control.time < sim.config().t_end {
            let before = ctx.clone();
            let (next, event) = sim.advance(ctx).unwrap();
            if let StepEvent::Accepted { state, time, .. } = event {
                let r = sim.network().residual(
                    time,
                    before.control.step,
                    &state,
                    &before.memory,
                );
                // Newton stops on the correction, not the residual; the
                // linear equations are satisfied to rounding
                for row in [5, 6, 7, 8, 14, 16, 17] {
                    assert!(r[row].abs() < 1e-6, "row {row}: {}", r[row]);
                }
            } else {
                // Rejections leave time and history alone
                assert_eq!(next.control.time, before.control.time);
                assert_eq!(next.history, before.history);
                assert_eq!(next.control.step, before.control.step / 2.0);
            }
            ctx = next;
        }
    }

    #[test]
    fn test_step_size_exhaustion_is_fatal() {
        // Any change in the potentials exceeds the reject threshold
        let config = short_run(1e-6).with_thresholds(1e-30, 1e-31);
        let sim = Simulator::with_config(CircuitParams::default(), config).unwrap();
        let mut series = ResultSeries::new();

        match sim.run_into(&mut series) {
            Err(SimError::StepSizeExhausted { time, step, min_step }) => {
                assert_eq!(time, 0.0);
                assert!(step < min_step);
            }
            other => panic!("expected step size exhaustion, got {other:?}"),
        }
        // The initial point was committed before the failure
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_rejection_keeps_context() {
        let config = short_run(1e-6).with_thresholds(1e-30, 1e-31);
        let sim = Simulator::with_config(CircuitParams::default(), config).unwrap();
        let ctx = sim.initial_context();
        let (next, event) = sim.advance(ctx.clone()).unwrap();

        assert_eq!(event, StepEvent::ErrorRejected);
        assert!(!next.control.success);
        assert_eq!(next.control.time, ctx.control.time);
        assert_eq!(next.control.step, ctx.control.step / 2.0);
        assert_eq!(next.history, ctx.history);
        assert_eq!(next.memory, ctx.memory);
        assert_eq!(next.guess, ctx.guess);
        assert_eq!(next.stats.rejected_steps, 1);
    }

    #[test]
    fn test_newton_failure_halves_and_reseeds() {
        // One iteration can never bring the correction below tolerance
        let config = short_run(1e-6).with_max_iterations(1);
        let sim = Simulator::with_config(CircuitParams::default(), config).unwrap();
        let mut ctx = sim.initial_context();
        ctx.guess = predict(&ctx.guess, &StateVector::default());

        let (next, event) = sim.advance(ctx.clone()).unwrap();
        assert_eq!(event, StepEvent::NewtonFailed);
        assert_eq!(next.control.step, ctx.control.step / 2.0);
        assert_eq!(next.control.time, ctx.control.time);
        assert_eq!(next.guess, ctx.history.newer);
        assert_eq!(next.stats.newton_failures, 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SimulatorConfig::new().with_time_span(1e-3, 0.0);
        assert!(matches!(
            Simulator::with_config(CircuitParams::default(), config),
            Err(SimError::InvalidConfig { .. })
        ));
    }
}
