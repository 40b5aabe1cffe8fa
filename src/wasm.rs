//! WASM bindings for Diode Tran.
//!
//! This module provides JavaScript-friendly bindings for plotting the
//! transient response in a browser.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmTransientSim } from 'diode_tran';
//!
//! await init();
//!
//! const sim = new WasmTransientSim(1e-4);
//! sim.run();
//!
//! const t = sim.time();
//! const vOut = sim.phi4();
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::CircuitParams;
use crate::output::{ResultSeries, SeriesKind};
use crate::solver::{Simulator, SimulatorConfig};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// WASM-compatible transient simulator.
///
/// Wraps the native `Simulator` and keeps the recorded series so they can be
/// fetched one quantity at a time.
#[wasm_bindgen]
pub struct WasmTransientSim {
    simulator: Simulator,
    series: ResultSeries,
}

#[wasm_bindgen]
impl WasmTransientSim {
    /// Create a simulator that runs from 0 to `t_end` seconds.
    ///
    /// Without `t_end` the default end time of 1 ms is used.
    ///
    /// # Example
    /// ```javascript
    /// const sim = new WasmTransientSim(1e-3);
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new(t_end: Option<f64>) -> Result<WasmTransientSim, JsValue> {
        let defaults = SimulatorConfig::default();
        Self::with_config(t_end.unwrap_or(defaults.t_end), defaults.record_every)
    }

    /// Create a simulator with a custom recording cadence.
    ///
    /// # Arguments
    /// * `t_end` - End time in seconds
    /// * `record_every` - Record every n-th accepted step (default: 1000)
    #[wasm_bindgen]
    pub fn with_config(t_end: f64, record_every: usize) -> Result<WasmTransientSim, JsValue> {
        let config = SimulatorConfig::new()
            .with_t_end(t_end)
            .with_record_every(record_every);
        let simulator = Simulator::with_config(CircuitParams::default(), config)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(WasmTransientSim {
            simulator,
            series: ResultSeries::new(),
        })
    }

    /// Run the simulation, replacing any previous results.
    ///
    /// Returns the number of accepted steps. On failure the points recorded
    /// so far remain available.
    #[wasm_bindgen]
    pub fn run(&mut self) -> Result<usize, JsValue> {
        self.series = ResultSeries::new();
        let stats = self
            .simulator
            .run_into(&mut self.series)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(stats.accepted_steps)
    }

    /// Recorded time stamps.
    #[wasm_bindgen]
    pub fn time(&self) -> Vec<f64> {
        self.series.get(SeriesKind::Time).to_vec()
    }

    /// Recorded potential of node 1 (excitation).
    #[wasm_bindgen]
    pub fn phi1(&self) -> Vec<f64> {
        self.series.get(SeriesKind::Phi1).to_vec()
    }

    /// Recorded potential of node 2.
    #[wasm_bindgen]
    pub fn phi2(&self) -> Vec<f64> {
        self.series.get(SeriesKind::Phi2).to_vec()
    }

    /// Recorded potential of node 4 (output).
    #[wasm_bindgen]
    pub fn phi4(&self) -> Vec<f64> {
        self.series.get(SeriesKind::Phi4).to_vec()
    }

    /// Recorded potential of node 5 (supply).
    #[wasm_bindgen]
    pub fn phi5(&self) -> Vec<f64> {
        self.series.get(SeriesKind::Phi5).to_vec()
    }

    /// Recorded voltage across C1.
    #[wasm_bindgen]
    pub fn u_c1(&self) -> Vec<f64> {
        self.series.get(SeriesKind::UC1).to_vec()
    }

    /// Recorded voltage across C2.
    #[wasm_bindgen]
    pub fn u_c2(&self) -> Vec<f64> {
        self.series.get(SeriesKind::UC2).to_vec()
    }

    /// Recorded inductor current.
    #[wasm_bindgen]
    pub fn i_l(&self) -> Vec<f64> {
        self.series.get(SeriesKind::IL).to_vec()
    }

    /// Number of recorded points.
    #[wasm_bindgen(getter)]
    pub fn len(&self) -> usize {
        self.series.len()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
