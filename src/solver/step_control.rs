//! Step prediction and local-error step size control.

use crate::circuit::StateVector;

use super::{DEFAULT_HOLD_THRESHOLD, DEFAULT_REJECT_THRESHOLD};

/// Current time, step size and whether the last step was accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeControl {
    /// Simulation time of the last accepted point
    pub time: f64,
    /// Step size for the next attempt
    pub step: f64,
    /// False after a rejection
    pub success: bool,
}

impl TimeControl {
    /// Start at `time` with step size `step`.
    pub fn new(time: f64, step: f64) -> Self {
        Self {
            time,
            step,
            success: true,
        }
    }

    /// Same time, half the step, marked as rejected.
    pub fn halved(&self) -> Self {
        Self {
            time: self.time,
            step: self.step / 2.0,
            success: false,
        }
    }
}

/// Linear extrapolation `2 * newer - older` used to seed the next step.
pub fn predict(newer: &StateVector, older: &StateVector) -> StateVector {
    newer.zip_with(older, |n, o| 2.0 * n - o)
}

/// Accept/reject decision based on a second-difference error estimate.
#[derive(Debug, Clone)]
pub struct StepController {
    /// Upper bound on the step size after growth
    pub max_step: f64,
    /// Error above which the step is rejected
    pub reject_threshold: f64,
    /// Error above which an accepted step keeps its size
    pub hold_threshold: f64,
}

impl StepController {
    /// Create a controller with the default thresholds.
    pub fn new(max_step: f64) -> Self {
        Self {
            max_step,
            reject_threshold: DEFAULT_REJECT_THRESHOLD,
            hold_threshold: DEFAULT_HOLD_THRESHOLD,
        }
    }

    /// Set both decision thresholds.
    pub fn with_thresholds(mut self, reject: f64, hold: f64) -> Self {
        self.reject_threshold = reject;
        self.hold_threshold = hold;
        self
    }

    /// Largest local error estimate over the six node potentials.
    ///
    /// `step` produced `curr` from `prev`; `prev_step` produced `prev` from
    /// `prev_prev`.
    pub fn error_estimate(
        step: f64,
        prev_step: f64,
        curr: &StateVector,
        prev: &StateVector,
        prev_prev: &StateVector,
    ) -> f64 {
        let c = curr.potentials();
        let p = prev.potentials();
        let pp = prev_prev.potentials();

        (0..c.len())
            .map(|i| {
                (c[i] * prev_step - p[i] * (step + prev_step) + pp[i] * step).abs()
                    / (2.0 * prev_step)
            })
            // NaN must survive the max so the step gets rejected
            .fold(0.0, |max, e| if e > max || e.is_nan() { e } else { max })
    }

    /// Decide the fate of the step just solved.
    ///
    /// A rejected step keeps its time and halves the step size. An accepted
    /// step advances time by the step just used and either keeps the step or
    /// doubles it up to `max_step`.
    pub fn assess(
        &self,
        control: &TimeControl,
        prev_step: f64,
        curr: &StateVector,
        prev: &StateVector,
        prev_prev: &StateVector,
    ) -> TimeControl {
        let error = Self::error_estimate(control.step, prev_step, curr, prev, prev_prev);
        let time = control.time;
        let step = control.step;

        if error.is_nan() || error > self.reject_threshold {
            control.halved()
        } else if error > self.hold_threshold {
            TimeControl {
                time: time + step,
                step,
                success: true,
            }
        } else {
            TimeControl {
                time: time + step,
                step: (2.0 * step).min(self.max_step),
                success: true,
            }
        }
    }
}
