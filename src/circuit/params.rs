//! Element values and source definitions of the network.

use std::f64::consts::PI;

/// Waveform driven by an ideal voltage source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    /// Constant voltage
    Dc { value: f64 },
    /// `amplitude * sin(2*pi*t / period)`
    Sine { amplitude: f64, period: f64 },
}

impl Waveform {
    /// Source voltage at time `t`.
    pub fn value_at(&self, t: f64) -> f64 {
        match *self {
            Waveform::Dc { value } => value,
            Waveform::Sine { amplitude, period } => amplitude * (2.0 * PI / period * t).sin(),
        }
    }
}

/// Parameters for the two diode junctions.
///
/// Both diodes share one model: Shockley current `Is * (exp(V / Vt) - 1)`
/// in parallel with a junction capacitance and a leakage resistance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiodeParams {
    /// Saturation current (Is)
    pub is: f64,
    /// Thermal voltage (Vt), already multiplied by the ideality factor
    pub vt: f64,
    /// Junction capacitance (Cb)
    pub capacitance: f64,
    /// Leakage resistance (Ru)
    pub leakage: f64,
}

impl Default for DiodeParams {
    fn default() -> Self {
        Self {
            is: 1e-12,
            vt: 0.026,
            capacitance: 2e-12,
            leakage: 1_000_000.0,
        }
    }
}

/// Element values of the simulated network.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitParams {
    /// Inductance L (H)
    pub inductance: f64,
    /// Capacitance C1 (F)
    pub c1: f64,
    /// Capacitance C2 (F)
    pub c2: f64,
    /// Diode model shared by both junctions
    pub diode: DiodeParams,
    /// Series resistance of each diode branch (Rb)
    pub r_series: f64,
    /// Load resistance R
    pub r_load: f64,
    /// Excitation source E1
    pub e1: Waveform,
    /// Supply source E2
    pub e2: Waveform,
}

impl Default for CircuitParams {
    fn default() -> Self {
        Self {
            inductance: 2.53e-4,
            c1: 1e-6,
            c2: 1e-6,
            diode: DiodeParams::default(),
            r_series: 20.0,
            r_load: 1_000.0,
            e1: Waveform::Sine {
                amplitude: 10.0,
                period: 1e-4,
            },
            e2: Waveform::Dc { value: 5.0 },
        }
    }
}

impl CircuitParams {
    /// Create parameters with the reference element values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the excitation source E1.
    pub fn with_excitation(mut self, e1: Waveform) -> Self {
        self.e1 = e1;
        self
    }

    /// Set the supply source E2.
    pub fn with_supply(mut self, e2: Waveform) -> Self {
        self.e2 = e2;
        self
    }

    /// Set the load resistance.
    pub fn with_load(mut self, r_load: f64) -> Self {
        self.r_load = r_load;
        self
    }

    /// Set the diode model.
    pub fn with_diode(mut self, diode: DiodeParams) -> Self {
        self.diode = diode;
        self
    }

    /// Element values that must be strictly positive, with their names.
    pub(crate) fn element_values(&self) -> [(&'static str, f64); 9] {
        [
            ("inductance", self.inductance),
            ("c1", self.c1),
            ("c2", self.c2),
            ("diode saturation current", self.diode.is),
            ("diode thermal voltage", self.diode.vt),
            ("diode capacitance", self.diode.capacitance),
            ("diode leakage resistance", self.diode.leakage),
            ("series resistance", self.r_series),
            ("load resistance", self.r_load),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sine_source() {
        let e1 = CircuitParams::default().e1;
        assert_abs_diff_eq!(e1.value_at(0.0), 0.0);
        // Quarter period peaks at the amplitude
        assert_abs_diff_eq!(e1.value_at(25e-6), 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(e1.value_at(75e-6), -10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_dc_source() {
        let e2 = CircuitParams::default().e2;
        assert_eq!(e2.value_at(0.0), 5.0);
        assert_eq!(e2.value_at(1.0), 5.0);
    }

    #[test]
    fn test_builders() {
        let params = CircuitParams::new()
            .with_load(470.0)
            .with_supply(Waveform::Dc { value: 9.0 });
        assert_eq!(params.r_load, 470.0);
        assert_eq!(params.e2.value_at(0.0), 9.0);
        assert_eq!(params.c1, 1e-6);
    }
}
