use ndarray::Array1;

use crate::PkbindError;

/// Strictly increasing sequence of output times
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    times: Vec<f64>,
}

impl TimeGrid {
    /// `tres` evenly spaced samples over `[tmin, tmax]`, both ends included
    pub fn linspace(tmin: f64, tmax: f64, tres: usize) -> Result<Self, PkbindError> {
        if !tmin.is_finite() || !tmax.is_finite() {
            return Err(PkbindError::InvalidTimeGrid(format!(
                "time domain must be finite, got [{tmin}, {tmax}]"
            )));
        }
        if tres == 0 {
            return Err(PkbindError::InvalidTimeGrid(
                "tres must be at least 1".to_string(),
            ));
        }
        if tres == 1 {
            return TimeGrid::from_times(vec![tmin]);
        }
        let step = (tmax - tmin) / (tres - 1) as f64;
        let mut times: Vec<f64> = (0..tres).map(|i| tmin + i as f64 * step).collect();
        times[tres - 1] = tmax;
        TimeGrid::from_times(times)
    }

    /// Grid from explicit time points
    pub fn from_times(times: Vec<f64>) -> Result<Self, PkbindError> {
        if times.is_empty() {
            return Err(PkbindError::InvalidTimeGrid(
                "the time grid is empty".to_string(),
            ));
        }
        if let Some(index) = times.iter().position(|t| !t.is_finite()) {
            return Err(PkbindError::InvalidTimeGrid(format!(
                "time point {index} is not finite"
            )));
        }
        if let Some(index) = times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(PkbindError::InvalidTimeGrid(format!(
                "times must be strictly increasing, but t[{}]={} >= t[{}]={}",
                index,
                times[index],
                index + 1,
                times[index + 1]
            )));
        }
        Ok(TimeGrid { times })
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn to_array(&self) -> Array1<f64> {
        Array1::from(self.times.clone())
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always false, an empty grid cannot be constructed
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn start(&self) -> f64 {
        self.times[0]
    }

    pub fn end(&self) -> f64 {
        self.times[self.times.len() - 1]
    }
}
