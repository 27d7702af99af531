use std::time::Instant;

use diffsol::{
    error::{DiffsolError, OdeSolverError},
    ode_solver::method::OdeSolverMethod,
    NalgebraLU, OdeBuilder, OdeSolverStopReason,
};
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::data::{State, TimeGrid};
use crate::simulator::model::TargetEngagement;
use crate::simulator::trajectory::{SolverDiagnostics, Trajectory};
use crate::simulator::{M, T, V};
use crate::PkbindError;

const RTOL: f64 = 1e-6;
const ATOL: f64 = 1e-9;
const H0: f64 = 1e-3;
const MAX_STEPS: usize = 500_000;

/// Tolerances and safeguards for the BDF solver
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SolverSettings {
    pub rtol: f64,
    pub atol: f64,
    /// Initial step size
    pub h0: f64,
    /// Maximum number of internal steps between two stop times
    pub max_steps: usize,
    /// Draw a progress bar on stderr while integrating
    #[serde(skip)]
    pub progress: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            rtol: RTOL,
            atol: ATOL,
            h0: H0,
            max_steps: MAX_STEPS,
            progress: false,
        }
    }
}

impl SolverSettings {
    pub fn validate(&self) -> Result<(), PkbindError> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(PkbindError::InvalidSolverSettings(format!(
                    "{name} must be finite and positive, got {value}"
                )))
            }
        };
        positive("rtol", self.rtol)?;
        positive("atol", self.atol)?;
        positive("h0", self.h0)?;
        if self.max_steps == 0 {
            return Err(PkbindError::InvalidSolverSettings(
                "max_steps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Times the solver has to land on, in order.
///
/// Every grid point after the first is recorded. Dose onsets strictly inside
/// the grid are added as unrecorded stops so that no step straddles the jump
/// in the forcing term.
fn stop_times(grid: &TimeGrid, onsets: impl Iterator<Item = f64>) -> Vec<(f64, bool)> {
    let (start, end) = (grid.start(), grid.end());
    let mut stops: Vec<(f64, bool)> = grid.times()[1..].iter().map(|&t| (t, true)).collect();
    stops.extend(
        onsets
            .filter(|&t| t > start && t < end)
            .filter(|t| !grid.times().contains(t))
            .map(|t| (t, false)),
    );
    stops.sort_by(|a, b| a.0.total_cmp(&b.0));
    stops.dedup_by(|next, prev| next.0 == prev.0);
    stops
}

fn progress_bar(len: usize, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} t={msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

/// Integrate the model over the grid, starting from `x0` at `grid.start()`.
///
/// The solver is a variable-order BDF method with adaptive steps. It is
/// stopped exactly on every grid time, so row `i` of the returned trajectory
/// is the state at `grid.times()[i]`.
pub fn integrate(
    model: &TargetEngagement,
    x0: State,
    grid: &TimeGrid,
    settings: &SolverSettings,
) -> Result<Trajectory, PkbindError> {
    settings.validate()?;
    if let Some(component) = x0.non_finite_component() {
        return Err(PkbindError::NonFinite {
            time: grid.start(),
            component,
        });
    }

    let started = Instant::now();
    let nstates = TargetEngagement::NSTATES;
    let init = V::from_column_slice(&x0.to_array());
    let rhs_model = model.clone();
    let jac_model = model.clone();

    let problem = OdeBuilder::<M>::new()
        .t0(grid.start())
        .h0(settings.h0)
        .rtol(settings.rtol)
        .atol(vec![settings.atol; nstates])
        .rhs_implicit(
            move |x: &V, _p: &V, t: T, dx: &mut V| rhs_model.derivative(x, t, dx),
            move |x: &V, _p: &V, t: T, v: &V, jv: &mut V| jac_model.jacobian_mul(x, t, v, jv),
        )
        .init(move |_p: &V, _t: T| init.clone())
        .build()?;

    let mut solver = problem.bdf::<NalgebraLU<f64>>()?;

    let stops = stop_times(grid, model.schedule().onsets());
    let mut states = Array2::<f64>::zeros((grid.len(), nstates));
    states.row_mut(0).assign(&Array1::from(x0.to_array().to_vec()));
    let mut row = 1;
    let mut steps = 0;

    let bar = progress_bar(grid.len(), settings.progress);
    bar.inc(1);

    for &(stop, record) in &stops {
        match solver.set_stop_time(stop) {
            Ok(_) => {
                let mut segment_steps = 0;
                loop {
                    match solver.step() {
                        Ok(OdeSolverStopReason::InternalTimestep) => {
                            segment_steps += 1;
                            if segment_steps >= settings.max_steps {
                                bar.abandon();
                                return Err(PkbindError::MaxStepsExceeded {
                                    max_steps: settings.max_steps,
                                    time: solver.state().t,
                                    target: stop,
                                });
                            }
                        }
                        Ok(OdeSolverStopReason::TstopReached) => {
                            segment_steps += 1;
                            break;
                        }
                        Err(DiffsolError::OdeSolverError(OdeSolverError::StepSizeTooSmall {
                            ..
                        })) => {
                            bar.abandon();
                            return Err(PkbindError::StepSizeTooSmall {
                                time: solver.state().t,
                            });
                        }
                        Err(err) => {
                            bar.abandon();
                            return Err(err.into());
                        }
                        Ok(reason) => {
                            bar.abandon();
                            return Err(PkbindError::UnexpectedStop {
                                time: solver.state().t,
                                reason: format!("{:?}", reason),
                            });
                        }
                    }
                }
                steps += segment_steps;
                tracing::trace!(stop, segment_steps, "segment finished");
            }
            Err(DiffsolError::OdeSolverError(OdeSolverError::StopTimeAtCurrentTime)) => {}
            Err(err) => {
                bar.abandon();
                return Err(err.into());
            }
        }

        if !record {
            tracing::debug!(t = stop, "crossed dose onset");
            continue;
        }

        let y = solver.state().y;
        let state = State::new(y[0], y[1], y[2]);
        if let Some(component) = state.non_finite_component() {
            bar.abandon();
            return Err(PkbindError::NonFinite {
                time: stop,
                component,
            });
        }
        states
            .row_mut(row)
            .assign(&Array1::from(state.to_array().to_vec()));
        row += 1;
        bar.set_message(format!("{stop:.1}"));
        bar.inc(1);
    }
    bar.finish_and_clear();

    let diagnostics = SolverDiagnostics {
        message: "Integration successful.".to_string(),
        steps,
        segments: stops.len(),
        t_reached: solver.state().t,
        t_end: grid.end(),
        elapsed: started.elapsed(),
    };
    tracing::info!("{}", diagnostics);

    Ok(Trajectory::new(grid.to_array(), states, model.etot(), diagnostics))
}
