use serde::{Deserialize, Serialize};

use crate::PkbindError;

/// Integrated state of the model
///
/// `f` is the bound fraction of the target protein. The dynamics keep it in
/// `[0, 1]` under realistic rates, but nothing clamps it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct State {
    /// Blood drug concentration (mol/L)
    pub iblood: f64,
    /// Tissue drug concentration (mol/L)
    pub itissue: f64,
    /// Bound fraction of target protein
    pub f: f64,
}

impl State {
    pub const NAMES: [&'static str; 3] = ["Iblood", "Itissue", "f"];

    pub fn new(iblood: f64, itissue: f64, f: f64) -> Self {
        State { iblood, itissue, f }
    }

    /// Create from a slice in the order `[Iblood, Itissue, f]`
    pub fn from_slice(values: &[f64]) -> Result<Self, PkbindError> {
        match *values {
            [iblood, itissue, f] => Ok(State::new(iblood, itissue, f)),
            _ => Err(PkbindError::StateVectorLength(values.len())),
        }
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.iblood, self.itissue, self.f]
    }

    /// Free target protein `(1 - f) * etot`
    pub fn free_protein(&self, etot: f64) -> f64 {
        (1.0 - self.f) * etot
    }

    /// Drug-target complex `f * etot`
    pub fn bound_complex(&self, etot: f64) -> f64 {
        self.f * etot
    }

    /// Name of the first non-finite component, if any
    pub fn non_finite_component(&self) -> Option<&'static str> {
        Self::NAMES
            .into_iter()
            .zip(self.to_array())
            .find(|(_, value)| !value.is_finite())
            .map(|(name, _)| name)
    }
}
