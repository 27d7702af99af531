use crate::data::*;
use crate::PkbindError;

/// Incremental construction of a [DoseSchedule]
pub struct DoseScheduleBuilder {
    doses: Vec<Dose>,
}

impl DoseScheduleBuilder {
    pub(crate) fn new() -> Self {
        DoseScheduleBuilder { doses: Vec::new() }
    }

    pub fn dose(mut self, time: f64, conc: f64) -> Self {
        self.doses.push(Dose::new(time, conc));
        self
    }

    /// Repeat the last dose `n` more times, every `interval` seconds
    pub fn repeat(mut self, n: usize, interval: f64) -> Self {
        let last_dose = match self.doses.last() {
            Some(dose) => *dose,
            None => panic!("There is no dose to repeat"),
        };
        for i in 1..=n {
            self = self.dose(last_dose.time() + interval * i as f64, last_dose.conc());
        }
        self
    }

    pub fn build(self) -> Result<DoseSchedule, PkbindError> {
        DoseSchedule::new(self.doses)
    }
}
