use ndarray::Array1;

use crate::data::DoseSchedule;

/// Drug available for absorption, summed over every dose given so far
///
/// `Forcing` borrows the schedule, so it is rebuilt wherever it is needed
/// rather than stored.
#[derive(Debug, Clone, Copy)]
pub struct Forcing<'a> {
    schedule: &'a DoseSchedule,
    kabs: f64,
}

impl<'a> Forcing<'a> {
    pub fn new(schedule: &'a DoseSchedule, kabs: f64) -> Self {
        Forcing { schedule, kabs }
    }

    /// Pointwise evaluation, used inside the derivative function
    #[inline(always)]
    pub fn at(&self, t: f64) -> f64 {
        self.schedule
            .doses()
            .iter()
            .map(|dose| dose.contribution(self.kabs, t))
            .sum()
    }

    /// Evaluation over a sequence of times, used for reporting
    pub fn batch(&self, times: &[f64]) -> Array1<f64> {
        times.iter().map(|&t| self.at(t)).collect()
    }

    /// Absorption input rate `kabs * F(t)` entering the blood compartment
    #[inline(always)]
    pub fn input_rate(&self, t: f64) -> f64 {
        self.kabs * self.at(t)
    }
}
