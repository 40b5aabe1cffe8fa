//! Configuration validation.

use crate::error::{Result, SimError};
use crate::solver::SimulatorConfig;

use super::{CircuitParams, Waveform};

/// Validate circuit values and run settings before simulating.
///
/// Checks:
/// - The time interval is finite and non-empty
/// - Step sizes are positive and ordered `min <= initial <= max`
/// - Newton and step controller settings are usable
/// - Element values are positive
pub fn validate_config(params: &CircuitParams, config: &SimulatorConfig) -> Result<()> {
    if !config.t_start.is_finite() || !config.t_end.is_finite() {
        return Err(SimError::invalid_config("time bounds must be finite"));
    }

    if config.t_end <= config.t_start {
        return Err(SimError::invalid_config(format!(
            "end time {:e} must be after start time {:e}",
            config.t_end, config.t_start
        )));
    }

    for (name, value) in [
        ("initial step", config.initial_step),
        ("minimum step", config.min_step),
        ("maximum step", config.max_step),
    ] {
        if !(value > 0.0 && value.is_finite()) {
            return Err(SimError::invalid_config(format!(
                "{name} must be positive, got {value:e}"
            )));
        }
    }

    if config.min_step > config.initial_step || config.initial_step > config.max_step {
        return Err(SimError::invalid_config(format!(
            "steps must satisfy min <= initial <= max, got {:e} / {:e} / {:e}",
            config.min_step, config.initial_step, config.max_step
        )));
    }

    if config.max_iterations == 0 {
        return Err(SimError::invalid_config("Newton needs at least one iteration"));
    }

    if !(config.tolerance > 0.0) {
        return Err(SimError::invalid_config("Newton tolerance must be positive"));
    }

    if !(config.hold_threshold > 0.0 && config.hold_threshold < config.reject_threshold) {
        return Err(SimError::invalid_config(format!(
            "thresholds must satisfy 0 < hold < reject, got {:e} / {:e}",
            config.hold_threshold, config.reject_threshold
        )));
    }

    if config.record_every == 0 {
        return Err(SimError::invalid_config("record_every must be at least 1"));
    }

    for (name, value) in params.element_values() {
        if !(value > 0.0 && value.is_finite()) {
            return Err(SimError::invalid_config(format!(
                "{name} must be positive, got {value:e}"
            )));
        }
    }

    if let Waveform::Sine { period, .. } = params.e1 {
        if !(period > 0.0) {
            return Err(SimError::invalid_config("excitation period must be positive"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(config: SimulatorConfig) -> Result<()> {
        validate_config(&CircuitParams::default(), &config)
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(check(SimulatorConfig::default()).is_ok());
    }

    #[test]
    fn test_bad_time_span() {
        assert!(check(SimulatorConfig::new().with_time_span(0.0, 0.0)).is_err());
        assert!(check(SimulatorConfig::new().with_t_end(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_bad_steps() {
        assert!(check(SimulatorConfig::new().with_steps(0.0, 1e-18, 1e-5)).is_err());
        assert!(check(SimulatorConfig::new().with_steps(1e-11, 1e-10, 1e-5)).is_err());
        assert!(check(SimulatorConfig::new().with_steps(1e-4, 1e-18, 1e-5)).is_err());
    }

    #[test]
    fn test_bad_solver_settings() {
        assert!(check(SimulatorConfig::new().with_max_iterations(0)).is_err());
        assert!(check(SimulatorConfig::new().with_tolerance(f64::NAN)).is_err());
        assert!(check(SimulatorConfig::new().with_thresholds(1e-3, 1e-2)).is_err());
        assert!(check(SimulatorConfig::new().with_record_every(0)).is_err());
    }

    #[test]
    fn test_bad_element_value() {
        let params = CircuitParams::default().with_load(0.0);
        let err = validate_config(&params, &SimulatorConfig::default()).unwrap_err();
        assert!(err.to_string().contains("load resistance"));
    }
}
