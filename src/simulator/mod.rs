pub mod forcing;
pub mod model;
pub mod ode;
pub mod trajectory;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::data::{State, TimeGrid};
use crate::PkbindError;
use forcing::Forcing;
use model::TargetEngagement;
use ode::SolverSettings;
use trajectory::Trajectory;

pub type T = f64;
pub type V = nalgebra::DVector<T>;
pub type M = nalgebra::DMatrix<T>;

/// How numerical sanity checks on the finished trajectory are enforced
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct NumericChecks {
    /// Allowed overshoot of the bound fraction outside `[0, 1]`
    pub fraction_tolerance: f64,
    /// Turn bound-fraction excursions into errors instead of warnings
    pub strict: bool,
}

impl Default for NumericChecks {
    fn default() -> Self {
        NumericChecks {
            fraction_tolerance: 1e-6,
            strict: false,
        }
    }
}

/// Everything produced by one run
#[derive(Debug, Clone)]
pub struct SimulationOutput {
    /// Drug available for absorption at every grid time
    pub forcing: Array1<f64>,
    pub trajectory: Trajectory,
    /// `(t, f)` pairs where the bound fraction left `[0, 1]` beyond tolerance
    pub excursions: Vec<(f64, f64)>,
}

/// A validated, ready to run simulation
///
/// All inputs are owned and immutable; two simulations never share state.
#[derive(Debug, Clone)]
pub struct Simulation {
    model: TargetEngagement,
    x0: State,
    grid: TimeGrid,
    solver: SolverSettings,
    checks: NumericChecks,
}

impl Simulation {
    pub fn new(
        model: TargetEngagement,
        x0: State,
        grid: TimeGrid,
        solver: SolverSettings,
        checks: NumericChecks,
    ) -> Result<Self, PkbindError> {
        let initial = x0.to_array();
        if initial.iter().any(|value| !value.is_finite()) {
            return Err(PkbindError::InvalidInitialState(initial.to_vec()));
        }
        solver.validate()?;
        if !checks.fraction_tolerance.is_finite() || checks.fraction_tolerance < 0.0 {
            return Err(PkbindError::InvalidSolverSettings(format!(
                "fraction_tolerance must be finite and non-negative, got {}",
                checks.fraction_tolerance
            )));
        }
        Ok(Simulation {
            model,
            x0,
            grid,
            solver,
            checks,
        })
    }

    pub fn model(&self) -> &TargetEngagement {
        &self.model
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn initial_state(&self) -> State {
        self.x0
    }

    pub fn forcing(&self) -> Forcing<'_> {
        self.model.forcing()
    }

    /// Integrate the model and check the result
    pub fn run(&self) -> Result<SimulationOutput, PkbindError> {
        tracing::info!(
            rates = %self.model.rates(),
            etot = self.model.etot(),
            schedule = %self.model.schedule(),
            samples = self.grid.len(),
            "starting simulation over [{}, {}]",
            self.grid.start(),
            self.grid.end()
        );
        let forcing = self.forcing().batch(self.grid.times());
        let trajectory = ode::integrate(&self.model, self.x0, &self.grid, &self.solver)?;

        let excursions = trajectory.fraction_excursions(self.checks.fraction_tolerance);
        if let Some(&(time, value)) = excursions.first() {
            if self.checks.strict {
                return Err(PkbindError::BoundFractionExcursion { time, value });
            }
            tracing::warn!(
                count = excursions.len(),
                first_time = time,
                first_value = value,
                "bound fraction left [0, 1]; values are reported unclamped"
            );
        }

        Ok(SimulationOutput {
            forcing,
            trajectory,
            excursions,
        })
    }
}
