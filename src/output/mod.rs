//! Recorded simulation results.
//!
//! [`ResultSeries`] collects the tracked quantities at recorded points.
//! With the `cli` feature, [`writer`] stores each series as a text file
//! with one value per line.

#[cfg(feature = "cli")]
pub mod writer;

use crate::circuit::StateVector;

/// A tracked quantity and the file it is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    Phi1,
    Phi2,
    Phi4,
    Phi5,
    Time,
    UC1,
    UC2,
    IL,
}

impl SeriesKind {
    /// All series, in the order they are written.
    pub const ALL: [SeriesKind; 8] = [
        SeriesKind::Phi1,
        SeriesKind::Phi2,
        SeriesKind::Phi4,
        SeriesKind::Phi5,
        SeriesKind::Time,
        SeriesKind::UC1,
        SeriesKind::UC2,
        SeriesKind::IL,
    ];

    /// File name of this series.
    pub fn file_name(&self) -> &'static str {
        match self {
            SeriesKind::Phi1 => "phi1.txt",
            SeriesKind::Phi2 => "phi2.txt",
            SeriesKind::Phi4 => "phi4.txt",
            SeriesKind::Phi5 => "phi5.txt",
            SeriesKind::Time => "t.txt",
            SeriesKind::UC1 => "uC1.txt",
            SeriesKind::UC2 => "uC2.txt",
            SeriesKind::IL => "iL.txt",
        }
    }
}

/// Time series of the tracked quantities.
///
/// All vectors grow together, one entry per recorded point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSeries {
    pub phi1: Vec<f64>,
    pub phi2: Vec<f64>,
    pub phi4: Vec<f64>,
    pub phi5: Vec<f64>,
    pub time: Vec<f64>,
    /// Voltage across C1
    pub u_c1: Vec<f64>,
    /// Voltage across C2
    pub u_c2: Vec<f64>,
    /// Inductor current
    pub i_l: Vec<f64>,
}

impl ResultSeries {
    /// Create an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `state` at `time`.
    pub fn push(&mut self, state: &StateVector, time: f64) {
        self.phi1.push(state.phi1);
        self.phi2.push(state.phi2);
        self.phi4.push(state.phi4);
        self.phi5.push(state.phi5);
        self.time.push(time);
        self.u_c1.push(state.u_c1);
        self.u_c2.push(state.u_c2);
        self.i_l.push(state.i_l);
    }

    /// Number of recorded points.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Values of one series.
    pub fn get(&self, kind: SeriesKind) -> &[f64] {
        match kind {
            SeriesKind::Phi1 => &self.phi1,
            SeriesKind::Phi2 => &self.phi2,
            SeriesKind::Phi4 => &self.phi4,
            SeriesKind::Phi5 => &self.phi5,
            SeriesKind::Time => &self.time,
            SeriesKind::UC1 => &self.u_c1,
            SeriesKind::UC2 => &self.u_c2,
            SeriesKind::IL => &self.i_l,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_records_tracked_fields() {
        let mut series = ResultSeries::new();
        assert!(series.is_empty());

        let state = StateVector {
            phi1: 1.0,
            phi2: 2.0,
            phi3: 3.0,
            phi4: 4.0,
            phi5: 5.0,
            u_c1: -1.0,
            u_c2: 4.0,
            i_l: 1e-3,
            ..StateVector::default()
        };
        series.push(&state, 2e-6);

        assert_eq!(series.len(), 1);
        assert_eq!(series.get(SeriesKind::Phi4), &[4.0]);
        assert_eq!(series.get(SeriesKind::Time), &[2e-6]);
        assert_eq!(series.get(SeriesKind::UC1), &[-1.0]);
        assert_eq!(series.get(SeriesKind::IL), &[1e-3]);
    }

    #[test]
    fn test_file_names_are_distinct() {
        let mut names: Vec<_> = SeriesKind::ALL.iter().map(|k| k.file_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SeriesKind::ALL.len());
    }
}
