//! Core value types for the network state.

use crate::error::{Result, SimError};

use super::CircuitParams;

/// Number of unknowns in the network DAE.
pub const STATE_DIM: usize = 18;

/// Full set of unknowns at one time point.
///
/// Field order matches the flat solution vector layout used by the
/// Jacobian and residual: five derivative terms, the five storage
/// variables they belong to, six node potentials and two source currents.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateVector {
    /// d(u_C1)/dt
    pub du_c1: f64,
    /// d(u_C2)/dt
    pub du_c2: f64,
    /// d(u_Cb1)/dt, first diode junction capacitance
    pub du_cb1: f64,
    /// d(u_Cb2)/dt, second diode junction capacitance
    pub du_cb2: f64,
    /// d(i_L)/dt
    pub di_l: f64,

    pub u_c1: f64,
    pub u_c2: f64,
    pub u_cb1: f64,
    pub u_cb2: f64,
    pub i_l: f64,

    pub phi1: f64,
    pub phi2: f64,
    pub phi3: f64,
    pub phi4: f64,
    pub phi5: f64,
    pub phi6: f64,

    /// Current through the sinusoidal source E1
    pub i_e1: f64,
    /// Current through the constant source E2
    pub i_e2: f64,
}

impl StateVector {
    /// State the simulation starts from: everything zero except the node
    /// pinned by the constant source.
    pub fn initial(params: &CircuitParams, t_start: f64) -> Self {
        Self {
            phi5: params.e2.value_at(t_start),
            ..Self::default()
        }
    }

    /// Rebuild a state from a flat slice in solution-vector order.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        if values.len() != STATE_DIM {
            return Err(SimError::conversion(values.len()));
        }
        Ok(Self {
            du_c1: values[0],
            du_c2: values[1],
            du_cb1: values[2],
            du_cb2: values[3],
            di_l: values[4],
            u_c1: values[5],
            u_c2: values[6],
            u_cb1: values[7],
            u_cb2: values[8],
            i_l: values[9],
            phi1: values[10],
            phi2: values[11],
            phi3: values[12],
            phi4: values[13],
            phi5: values[14],
            phi6: values[15],
            i_e1: values[16],
            i_e2: values[17],
        })
    }

    /// Flatten into solution-vector order.
    pub fn to_array(&self) -> [f64; STATE_DIM] {
        [
            self.du_c1, self.du_c2, self.du_cb1, self.du_cb2, self.di_l,
            self.u_c1, self.u_c2, self.u_cb1, self.u_cb2, self.i_l,
            self.phi1, self.phi2, self.phi3, self.phi4, self.phi5, self.phi6,
            self.i_e1, self.i_e2,
        ]
    }

    /// Component-wise sum. Used to apply a Newton correction.
    pub fn plus(&self, other: &StateVector) -> StateVector {
        self.zip_with(other, |a, b| a + b)
    }

    /// The six node potentials, phi1 through phi6.
    pub fn potentials(&self) -> [f64; 6] {
        [self.phi1, self.phi2, self.phi3, self.phi4, self.phi5, self.phi6]
    }

    /// Euclidean norm over all 18 components.
    pub fn norm(&self) -> f64 {
        self.to_array().iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Whether every component is finite.
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }

    /// Combine two states component by component.
    pub(crate) fn zip_with(&self, other: &StateVector, f: impl Fn(f64, f64) -> f64) -> StateVector {
        let a = self.to_array();
        let b = other.to_array();
        let out: [f64; STATE_DIM] = std::array::from_fn(|i| f(a[i], b[i]));
        Self::from(out)
    }
}

impl From<[f64; STATE_DIM]> for StateVector {
    fn from(values: [f64; STATE_DIM]) -> Self {
        let [du_c1, du_c2, du_cb1, du_cb2, di_l, u_c1, u_c2, u_cb1, u_cb2, i_l, phi1, phi2, phi3, phi4, phi5, phi6, i_e1, i_e2] =
            values;
        Self {
            du_c1,
            du_c2,
            du_cb1,
            du_cb2,
            di_l,
            u_c1,
            u_c2,
            u_cb1,
            u_cb2,
            i_l,
            phi1,
            phi2,
            phi3,
            phi4,
            phi5,
            phi6,
            i_e1,
            i_e2,
        }
    }
}

impl TryFrom<&[f64]> for StateVector {
    type Error = SimError;

    fn try_from(values: &[f64]) -> Result<Self> {
        Self::from_slice(values)
    }
}

/// Storage variables carried over from the last accepted step.
///
/// The residual uses these to form backward-difference derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StorageState {
    pub u_c1: f64,
    pub u_c2: f64,
    pub u_cb1: f64,
    pub u_cb2: f64,
    pub i_l: f64,
}

impl From<&StateVector> for StorageState {
    fn from(state: &StateVector) -> Self {
        Self {
            u_c1: state.u_c1,
            u_c2: state.u_c2,
            u_cb1: state.u_cb1,
            u_cb2: state.u_cb2,
            i_l: state.i_l,
        }
    }
}
