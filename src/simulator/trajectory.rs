use std::fmt;
use std::time::Duration;

use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::data::State;

/// What the solver reports about a finished integration
#[derive(Debug, Clone, PartialEq)]
pub struct SolverDiagnostics {
    /// Human readable summary of the run
    pub message: String,
    /// Internal steps taken by the solver
    pub steps: usize,
    /// Stop times the solver was asked to land on (grid points and dose onsets)
    pub segments: usize,
    /// Last time the solver reached
    pub t_reached: f64,
    /// Requested end of the time grid
    pub t_end: f64,
    pub elapsed: Duration,
}

impl SolverDiagnostics {
    /// The whole grid was covered
    pub fn is_success(&self) -> bool {
        self.t_reached == self.t_end
    }
}

impl fmt::Display for SolverDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} steps over {} segments, t={} of {}, {:.3}s)",
            self.message,
            self.steps,
            self.segments,
            self.t_reached,
            self.t_end,
            self.elapsed.as_secs_f64()
        )
    }
}

/// State of the model at every requested time
///
/// Row `i` of the state matrix holds `[Iblood, Itissue, f]` at `times[i]`.
#[derive(Debug, Clone)]
pub struct Trajectory {
    times: Array1<f64>,
    states: Array2<f64>,
    etot: f64,
    diagnostics: SolverDiagnostics,
}

impl Trajectory {
    pub(crate) fn new(
        times: Array1<f64>,
        states: Array2<f64>,
        etot: f64,
        diagnostics: SolverDiagnostics,
    ) -> Self {
        debug_assert_eq!(times.len(), states.nrows());
        debug_assert_eq!(states.ncols(), 3);
        Trajectory {
            times,
            states,
            etot,
            diagnostics,
        }
    }

    pub fn times(&self) -> ArrayView1<'_, f64> {
        self.times.view()
    }

    pub fn states(&self) -> &Array2<f64> {
        &self.states
    }

    pub fn diagnostics(&self) -> &SolverDiagnostics {
        &self.diagnostics
    }

    pub fn etot(&self) -> f64 {
        self.etot
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn state(&self, index: usize) -> State {
        let row = self.states.row(index);
        State::new(row[0], row[1], row[2])
    }

    pub fn last(&self) -> Option<State> {
        (!self.is_empty()).then(|| self.state(self.len() - 1))
    }

    pub fn iblood(&self) -> ArrayView1<'_, f64> {
        self.states.column(0)
    }

    pub fn itissue(&self) -> ArrayView1<'_, f64> {
        self.states.column(1)
    }

    pub fn bound_fraction(&self) -> ArrayView1<'_, f64> {
        self.states.column(2)
    }

    /// Free target protein `E = (1 - f) * Etot`
    pub fn free_protein(&self) -> Array1<f64> {
        self.bound_fraction().mapv(|f| (1.0 - f) * self.etot)
    }

    /// Drug-target complex `EI = f * Etot`
    pub fn bound_complex(&self) -> Array1<f64> {
        self.bound_fraction().mapv(|f| f * self.etot)
    }

    pub fn is_finite(&self) -> bool {
        self.states.iter().all(|value| value.is_finite())
    }

    /// Times and values where `f` leaves `[-tolerance, 1 + tolerance]`
    pub fn fraction_excursions(&self, tolerance: f64) -> Vec<(f64, f64)> {
        self.times
            .iter()
            .zip(self.bound_fraction())
            .filter(|(_, f)| **f < -tolerance || **f > 1.0 + tolerance)
            .map(|(&t, &f)| (t, f))
            .collect()
    }

    /// Largest value reached by each state component
    pub fn peaks(&self) -> State {
        let peak = |axis: usize| {
            self.states
                .index_axis(Axis(1), axis)
                .iter()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max)
        };
        State::new(peak(0), peak(1), peak(2))
    }
}
