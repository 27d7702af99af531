use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::builder::DoseScheduleBuilder;
use crate::PkbindError;

/// A single administration of drug
///
/// The dose becomes available for absorption strictly after its onset time and
/// then decays exponentially with the absorption rate.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Dose {
    time: f64,
    conc: f64,
}

impl Dose {
    /// Create a new dose
    ///
    /// # Arguments
    ///
    /// * `time` - Onset time of the dose (s)
    /// * `conc` - Dose concentration (mol/L)
    pub fn new(time: f64, conc: f64) -> Self {
        Dose { time, conc }
    }

    /// Onset time of the dose
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Concentration administered
    pub fn conc(&self) -> f64 {
        self.conc
    }

    /// Concentration of this dose still available for absorption at `t`
    ///
    /// Zero up to and including the onset time: the gate is `t > time`.
    #[inline(always)]
    pub fn contribution(&self, kabs: f64, t: f64) -> f64 {
        let dt = t - self.time;
        if dt > 0.0 {
            self.conc * (-kabs * dt).exp()
        } else {
            0.0
        }
    }
}

/// Ordered collection of [Dose]s
///
/// Doses are sorted by onset time; doses sharing an onset keep the order in
/// which they were added and simply superpose.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(try_from = "Vec<Dose>", into = "Vec<Dose>")]
pub struct DoseSchedule {
    doses: Vec<Dose>,
}

impl TryFrom<Vec<Dose>> for DoseSchedule {
    type Error = PkbindError;

    fn try_from(doses: Vec<Dose>) -> Result<Self, Self::Error> {
        DoseSchedule::new(doses)
    }
}

impl From<DoseSchedule> for Vec<Dose> {
    fn from(schedule: DoseSchedule) -> Self {
        schedule.doses
    }
}

impl DoseSchedule {
    /// Create a schedule from a list of doses
    pub fn new(mut doses: Vec<Dose>) -> Result<Self, PkbindError> {
        for (index, dose) in doses.iter().enumerate() {
            if !dose.time.is_finite() || !dose.conc.is_finite() || dose.conc < 0.0 {
                return Err(PkbindError::InvalidDose {
                    index,
                    time: dose.time,
                    conc: dose.conc,
                });
            }
        }
        doses.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(DoseSchedule { doses })
    }

    /// Create a schedule from parallel arrays of onset times and concentrations
    pub fn from_parallel(times: &[f64], concs: &[f64]) -> Result<Self, PkbindError> {
        if times.len() != concs.len() {
            return Err(PkbindError::DoseScheduleMismatch {
                times: times.len(),
                concs: concs.len(),
            });
        }
        let doses = times
            .iter()
            .zip(concs)
            .map(|(&time, &conc)| Dose::new(time, conc))
            .collect();
        DoseSchedule::new(doses)
    }

    pub fn builder() -> DoseScheduleBuilder {
        DoseScheduleBuilder::new()
    }

    pub fn doses(&self) -> &[Dose] {
        &self.doses
    }

    pub fn len(&self) -> usize {
        self.doses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doses.is_empty()
    }

    /// Onset times of all doses, in order
    pub fn onsets(&self) -> impl Iterator<Item = f64> + '_ {
        self.doses.iter().map(|dose| dose.time)
    }

    /// Onset of the last dose, if any
    pub fn last_onset(&self) -> Option<f64> {
        self.doses.last().map(|dose| dose.time)
    }

    /// Total concentration administered over the schedule
    pub fn total(&self) -> f64 {
        self.doses.iter().map(|dose| dose.conc).sum()
    }
}

impl fmt::Display for DoseSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dose(s):", self.doses.len())?;
        for dose in &self.doses {
            write!(f, " {}@{}s", dose.conc, dose.time)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contribution_gate_is_strict() {
        let dose = Dose::new(10.0, 2.0);
        assert_eq!(dose.contribution(0.1, 5.0), 0.0);
        assert_eq!(dose.contribution(0.1, 10.0), 0.0);
        assert!(dose.contribution(0.1, 10.0 + 1e-9) > 0.0);
    }

    #[test]
    fn test_from_parallel_sorts_by_onset() {
        let schedule = DoseSchedule::from_parallel(&[72000.0, -0.001, 36000.0], &[3.0, 1.0, 2.0])
            .unwrap();
        let onsets: Vec<f64> = schedule.onsets().collect();
        assert_eq!(onsets, vec![-0.001, 36000.0, 72000.0]);
        assert_eq!(schedule.doses()[2].conc(), 3.0);
        assert_eq!(schedule.total(), 6.0);
    }

    #[test]
    fn test_from_parallel_length_mismatch() {
        let err = DoseSchedule::from_parallel(&[0.0, 1.0], &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            PkbindError::DoseScheduleMismatch { times: 2, concs: 1 }
        ));
    }

    #[test]
    fn test_negative_concentration_is_rejected() {
        let err = DoseSchedule::from_parallel(&[0.0, 1.0], &[1.0, -1.0]).unwrap_err();
        assert!(matches!(err, PkbindError::InvalidDose { index: 1, .. }));
    }

    #[test]
    fn test_deserialize_validates_and_sorts() {
        let schedule: DoseSchedule = serde_json::from_str(
            r#"[{ "time": 36000.0, "conc": 2.0 }, { "time": -0.001, "conc": 1.0 }]"#,
        )
        .unwrap();
        let onsets: Vec<f64> = schedule.onsets().collect();
        assert_eq!(onsets, vec![-0.001, 36000.0]);

        let err = serde_json::from_str::<DoseSchedule>(r#"[{ "time": 0.0, "conc": -1.0 }]"#)
            .unwrap_err();
        assert!(err.to_string().contains("Invalid dose at index 0"));
    }

    #[test]
    fn test_empty_schedule() {
        let schedule = DoseSchedule::from_parallel(&[], &[]).unwrap();
        assert!(schedule.is_empty());
        assert_eq!(schedule.last_onset(), None);
    }
}
