use std::path::PathBuf;

use diffsol::error::DiffsolError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PkbindError {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The parallel dose arrays do not have the same length
    #[error("Dose schedule has {times} onset times but {concs} concentrations")]
    DoseScheduleMismatch { times: usize, concs: usize },

    /// A dose has a non-finite onset or a negative / non-finite concentration
    #[error("Invalid dose at index {index}: time={time}, conc={conc}")]
    InvalidDose { index: usize, time: f64, conc: f64 },

    /// A rate constant is negative or not finite
    #[error("Rate constant '{name}' must be finite and non-negative, got {value}")]
    InvalidRate { name: &'static str, value: f64 },

    #[error("Rate vector must have exactly 6 elements [kabs, kout, k1, k2, kon, koff], got {0}")]
    RateVectorLength(usize),

    #[error("State vector must have exactly 3 elements [Iblood, Itissue, f], got {0}")]
    StateVectorLength(usize),

    #[error("Initial state must be finite, got {0:?}")]
    InvalidInitialState(Vec<f64>),

    #[error("Total protein concentration must be finite and non-negative, got {0}")]
    InvalidProteinConcentration(f64),

    #[error("Dose unit concentration i0 must be finite and non-negative, got {0}")]
    InvalidDoseUnit(f64),

    #[error("Invalid time grid: {0}")]
    InvalidTimeGrid(String),

    #[error("Invalid solver settings: {0}")]
    InvalidSolverSettings(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────────────────
    // Numerical Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("ODE solver error: {0}")]
    Solver(#[from] DiffsolError),

    #[error("The step size of the ODE solver went to zero at t={time}; check the rate constants for values close to 0.0 or INFINITE")]
    StepSizeTooSmall { time: f64 },

    #[error("Exceeded {max_steps} internal steps while integrating towards t={target} (reached t={time})")]
    MaxStepsExceeded {
        max_steps: usize,
        time: f64,
        target: f64,
    },

    #[error("Solver stopped unexpectedly at t={time}: {reason}")]
    UnexpectedStop { time: f64, reason: String },

    #[error("Non-finite value in state component {component} at t={time}")]
    NonFinite { time: f64, component: &'static str },

    #[error("Bound fraction left [0, 1] at t={time}: f={value}")]
    BoundFractionExcursion { time: f64, value: f64 },

    // ─────────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to render {}: {message}", path.display())]
    Report { path: PathBuf, message: String },
}

impl PkbindError {
    /// True for errors raised while validating inputs, before any integration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PkbindError::DoseScheduleMismatch { .. }
                | PkbindError::InvalidDose { .. }
                | PkbindError::InvalidRate { .. }
                | PkbindError::RateVectorLength(_)
                | PkbindError::StateVectorLength(_)
                | PkbindError::InvalidInitialState(_)
                | PkbindError::InvalidProteinConcentration(_)
                | PkbindError::InvalidDoseUnit(_)
                | PkbindError::InvalidTimeGrid(_)
                | PkbindError::InvalidSolverSettings(_)
                | PkbindError::ConfigParse(_)
        )
    }
}
