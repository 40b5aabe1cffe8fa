//! Equations of the diode network.
//!
//! The network has six nodes, two diode branches, three storage elements
//! and two ideal voltage sources:
//!
//! ```text
//! E1: phi1 = E1(t)            C1:  phi1 - phi2
//! D1 (Cb, Ru): phi6 - phi2    Rb:  phi6 - 0, phi2 - phi3
//! D2 (Cb, Ru): phi3 - phi4    C2:  phi4 - 0,  R: phi4 - 0
//! L: phi4 - phi5              E2:  phi5 = E2(t)
//! ```
//!
//! Each diode is a Shockley junction in parallel with its junction
//! capacitance `Cb` and leakage resistance `Ru`.

use crate::solver::{DaeSystem, DenseMatrix};

use super::{CircuitParams, StateVector, StorageState, STATE_DIM};

/// The fixed diode network, ready to be stepped in time.
#[derive(Debug, Clone)]
pub struct DiodeNetwork {
    params: CircuitParams,
}

impl DiodeNetwork {
    /// Create the network from its element values.
    pub fn new(params: CircuitParams) -> Self {
        Self { params }
    }

    /// Element values of this network.
    pub fn params(&self) -> &CircuitParams {
        &self.params
    }

    /// Junction current plus leakage for a diode branch voltage.
    pub fn diode_current(&self, v: f64) -> f64 {
        let d = &self.params.diode;
        v / d.leakage + d.is * ((v / d.vt).exp() - 1.0)
    }

    /// dI/dV of [`diode_current`](Self::diode_current).
    pub fn diode_conductance(&self, v: f64) -> f64 {
        let d = &self.params.diode;
        1.0 / d.leakage + d.is / d.vt * (v / d.vt).exp()
    }
}

impl DaeSystem for DiodeNetwork {
    fn residual(
        &self,
        time: f64,
        step: f64,
        x: &StateVector,
        prev: &StorageState,
    ) -> [f64; STATE_DIM] {
        let p = &self.params;
        let cb = p.diode.capacitance;
        let rb = p.r_series;
        let i_d1 = self.diode_current(x.u_cb1);
        let i_d2 = self.diode_current(x.u_cb2);

        [
            // Backward Euler
            x.du_c1 - (x.u_c1 - prev.u_c1) / step,
            x.du_c2 - (x.u_c2 - prev.u_c2) / step,
            x.du_cb1 - (x.u_cb1 - prev.u_cb1) / step,
            x.du_cb2 - (x.u_cb2 - prev.u_cb2) / step,
            x.di_l - (x.i_l - prev.i_l) / step,
            // Element voltages
            x.u_c1 - (x.phi1 - x.phi2),
            x.u_c2 - x.phi4,
            x.u_cb1 - (x.phi6 - x.phi2),
            x.u_cb2 - (x.phi3 - x.phi4),
            p.inductance * x.di_l - (x.phi4 - x.phi5),
            // KCL, phi1 .. phi6
            x.i_e1 + p.c1 * x.du_c1,
            -p.c1 * x.du_c1 - cb * x.du_cb1 - i_d1 + (x.phi2 - x.phi3) / rb,
            -(x.phi2 - x.phi3) / rb + cb * x.du_cb2 + i_d2,
            -(cb * x.du_cb2 + i_d2) + p.c2 * x.du_c2 + x.phi4 / p.r_load + x.i_l,
            -x.i_l + x.i_e2,
            x.phi6 / rb + cb * x.du_cb1 + i_d1,
            // Sources
            p.e1.value_at(time) - x.phi1,
            p.e2.value_at(time) - x.phi5,
        ]
    }

    fn jacobian(&self, step: f64, reference: &StateVector) -> DenseMatrix {
        let p = &self.params;
        let cb = p.diode.capacitance;
        let gb = 1.0 / p.r_series;
        let g1 = self.diode_conductance(reference.u_cb1);
        let g2 = self.diode_conductance(reference.u_cb2);

        let mut j = DenseMatrix::zeros(STATE_DIM);

        for i in 0..5 {
            j.set(i, i, 1.0);
            j.set(i, i + 5, -1.0 / step);
        }

        j.set(5, 5, 1.0);
        j.set(5, 10, -1.0);
        j.set(5, 11, 1.0);

        j.set(6, 6, 1.0);
        j.set(6, 13, -1.0);

        j.set(7, 7, 1.0);
        j.set(7, 11, 1.0);
        j.set(7, 15, -1.0);

        j.set(8, 8, 1.0);
        j.set(8, 12, -1.0);
        j.set(8, 13, 1.0);

        j.set(9, 4, p.inductance);
        j.set(9, 13, -1.0);
        j.set(9, 14, 1.0);

        j.set(10, 0, p.c1);
        j.set(10, 16, 1.0);

        j.set(11, 0, -p.c1);
        j.set(11, 2, -cb);
        j.set(11, 7, -g1);
        j.set(11, 11, gb);
        j.set(11, 12, -gb);

        j.set(12, 3, cb);
        j.set(12, 8, g2);
        j.set(12, 11, -gb);
        j.set(12, 12, gb);

        j.set(13, 1, p.c2);
        j.set(13, 3, -cb);
        j.set(13, 8, -g2);
        j.set(13, 9, 1.0);
        j.set(13, 13, 1.0 / p.r_load);

        j.set(14, 9, -1.0);
        j.set(14, 17, 1.0);

        j.set(15, 2, cb);
        j.set(15, 7, g1);
        j.set(15, 15, gb);

        j.set(16, 10, -1.0);
        j.set(17, 14, -1.0);

        j
    }
}
