//! JSON configuration of a simulation run
//!
//! Every field has a default reproducing the reference scenario: three unit
//! doses twelve hours apart, observed for 30 hours on 1000 samples. A
//! configuration file only needs the fields it changes.
//!
//! ```json
//! {
//!   "time": { "tmin": 0, "tmax": 108000, "tres": 1000 },
//!   "dose": { "times": [-0.001, 36000, 72000], "concs": [1, 1, 1] },
//!   "rates": [1e-4, 0.05, 10, 1, 1e6, 1e-3],
//!   "etot": 1
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::{DoseSchedule, Rates, State, TimeGrid};
use crate::report::ReportConfig;
use crate::simulator::model::TargetEngagement;
use crate::simulator::ode::SolverSettings;
use crate::simulator::{NumericChecks, Simulation};
use crate::PkbindError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TimeConfig {
    /// First time point of interest (s)
    pub tmin: f64,
    /// Last time point of interest (s)
    pub tmax: f64,
    /// Number of output samples
    pub tres: usize,
}

impl Default for TimeConfig {
    fn default() -> Self {
        TimeConfig {
            tmin: 0.0,
            tmax: 108000.0,
            tres: 1000,
        }
    }
}

/// Dose schedule as parallel arrays
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DoseConfig {
    /// Onset times (s)
    pub times: Vec<f64>,
    /// Concentrations (mol/L)
    pub concs: Vec<f64>,
}

impl Default for DoseConfig {
    fn default() -> Self {
        DoseConfig {
            times: vec![-0.001, 36000.0, 72000.0],
            concs: vec![1.0, 1.0, 1.0],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub time: TimeConfig,
    pub dose: DoseConfig,
    /// `[Iblood, Itissue, f]` at `tmin`
    pub initial_state: Vec<f64>,
    /// `[kabs, kout, k1, k2, kon, koff]`
    pub rates: Vec<f64>,
    /// Total target protein concentration (mol/L)
    pub etot: f64,
    /// Concentration of one unabsorbed dose unit (mol/L); descriptive only
    pub i0: f64,
    pub solver: SolverSettings,
    pub numerics: NumericChecks,
    pub report: ReportConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            time: TimeConfig::default(),
            dose: DoseConfig::default(),
            initial_state: vec![0.0, 0.0, 0.0],
            rates: Rates::default().to_vec(),
            etot: 1.0,
            i0: 1.0,
            solver: SolverSettings::default(),
            numerics: NumericChecks::default(),
            report: ReportConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self, PkbindError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PkbindError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&contents)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded configuration");
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, PkbindError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every input and turn the configuration into a [Simulation]
    ///
    /// Nothing is integrated here; all configuration errors surface before
    /// the solver starts.
    pub fn validate(&self) -> Result<Simulation, PkbindError> {
        let schedule = DoseSchedule::from_parallel(&self.dose.times, &self.dose.concs)?;
        let rates = Rates::from_slice(&self.rates)?;
        let x0 = State::from_slice(&self.initial_state)?;
        let grid = TimeGrid::linspace(self.time.tmin, self.time.tmax, self.time.tres)?;
        if !self.i0.is_finite() || self.i0 < 0.0 {
            return Err(PkbindError::InvalidDoseUnit(self.i0));
        }
        let model = TargetEngagement::new(rates, self.etot, schedule)?;
        Simulation::new(model, x0, grid, self.solver, self.numerics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference() {
        let config = SimulationConfig::default();
        assert_eq!(config.time.tmin, 0.0);
        assert_eq!(config.time.tmax, 108000.0);
        assert_eq!(config.time.tres, 1000);
        assert_eq!(config.dose.times, vec![-0.001, 36000.0, 72000.0]);
        assert_eq!(config.dose.concs, vec![1.0, 1.0, 1.0]);
        assert_eq!(config.rates, vec![1e-4, 0.05, 10.0, 1.0, 1e6, 1e-3]);
        assert_eq!(config.etot, 1.0);
        assert_eq!(config.initial_state, vec![0.0; 3]);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimulationConfig::from_json(r#"{ "etot": 2.5, "time": { "tres": 10 } }"#)
            .unwrap();
        assert_eq!(config.etot, 2.5);
        assert_eq!(config.time.tres, 10);
        assert_eq!(config.time.tmax, 108000.0);
        assert_eq!(config.rates, Rates::default().to_vec());
    }

    #[test]
    fn test_empty_json_is_reference() {
        let config = SimulationConfig::from_json("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = SimulationConfig::default();
        let json = config.to_json_pretty().unwrap();
        assert_eq!(SimulationConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = SimulationConfig::from_json(r#"{ "kabs": 1.0 }"#).unwrap_err();
        assert!(matches!(err, PkbindError::ConfigParse(_)));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_validate_reference() {
        let simulation = SimulationConfig::default().validate().unwrap();
        assert_eq!(simulation.grid().len(), 1000);
        assert_eq!(simulation.model().schedule().len(), 3);
        assert_eq!(simulation.initial_state(), State::default());
    }

    #[test]
    fn test_validate_rejects_malformed_inputs() {
        let mut config = SimulationConfig::default();
        config.dose.concs.pop();
        assert!(matches!(
            config.validate(),
            Err(PkbindError::DoseScheduleMismatch { times: 3, concs: 2 })
        ));

        let mut config = SimulationConfig::default();
        config.rates[4] = -1e6;
        assert!(matches!(
            config.validate(),
            Err(PkbindError::InvalidRate { name: "kon", .. })
        ));

        let mut config = SimulationConfig::default();
        config.rates.push(1.0);
        assert!(matches!(
            config.validate(),
            Err(PkbindError::RateVectorLength(7))
        ));

        let mut config = SimulationConfig::default();
        config.time.tmax = -1.0;
        assert!(matches!(
            config.validate(),
            Err(PkbindError::InvalidTimeGrid(_))
        ));

        let mut config = SimulationConfig::default();
        config.initial_state = vec![0.0, f64::NAN, 0.0];
        assert!(matches!(
            config.validate(),
            Err(PkbindError::InvalidInitialState(_))
        ));

        let mut config = SimulationConfig::default();
        config.i0 = -1.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, PkbindError::InvalidDoseUnit(v) if v == -1.0));
        assert!(err.to_string().contains("i0"));

        let mut config = SimulationConfig::default();
        config.etot = f64::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(PkbindError::InvalidProteinConcentration(_))
        ));
    }
}
