use std::fmt;

use serde::{Deserialize, Serialize};

use crate::PkbindError;

/// Rate constants of the absorption / distribution / binding model
///
/// ```text
///     kabs            k1           kon
///  I  --->   Iblood  ----> Itissue ---->  EI
///            |       <----         <----
///            | kout   k2           koff
///           \/
/// ```
///
/// All rates are in 1/s, except `kon` which is in 1/(M s). `kout` lumps
/// elimination and metabolism together.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    /// Absorption of the administered drug into blood
    pub kabs: f64,
    /// Elimination and metabolism from blood
    pub kout: f64,
    /// Transfer from blood to tissue
    pub k1: f64,
    /// Transfer from tissue back to blood
    pub k2: f64,
    /// Association of drug and target protein
    pub kon: f64,
    /// Dissociation of the drug-target complex
    pub koff: f64,
}

impl Rates {
    /// Canonical order of the rate vector
    pub const NAMES: [&'static str; 6] = ["kabs", "kout", "k1", "k2", "kon", "koff"];

    /// Create a validated set of rate constants
    pub fn new(
        kabs: f64,
        kout: f64,
        k1: f64,
        k2: f64,
        kon: f64,
        koff: f64,
    ) -> Result<Self, PkbindError> {
        let rates = Rates {
            kabs,
            kout,
            k1,
            k2,
            kon,
            koff,
        };
        rates.validate()?;
        Ok(rates)
    }

    /// Create from a slice in the order `[kabs, kout, k1, k2, kon, koff]`
    pub fn from_slice(values: &[f64]) -> Result<Self, PkbindError> {
        match *values {
            [kabs, kout, k1, k2, kon, koff] => Rates::new(kabs, kout, k1, k2, kon, koff),
            _ => Err(PkbindError::RateVectorLength(values.len())),
        }
    }

    /// The rates as a vector in canonical order
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.kabs, self.kout, self.k1, self.k2, self.kon, self.koff]
    }

    /// Every rate must be finite and non-negative.
    ///
    /// Zero is accepted: `kon = koff = 0` switches binding off.
    pub fn validate(&self) -> Result<(), PkbindError> {
        for (name, value) in Self::NAMES.into_iter().zip(self.to_vec()) {
            if !value.is_finite() || value < 0.0 {
                return Err(PkbindError::InvalidRate { name, value });
            }
        }
        Ok(())
    }

    /// Dissociation constant `koff / kon`, `None` when binding is switched off
    pub fn kd(&self) -> Option<f64> {
        if self.kon > 0.0 {
            Some(self.koff / self.kon)
        } else {
            None
        }
    }
}

impl Default for Rates {
    fn default() -> Self {
        Rates {
            kabs: 1e-4,
            kout: 0.05,
            k1: 10.0,
            k2: 1.0,
            kon: 1e6,
            koff: 1e-3,
        }
    }
}

impl fmt::Display for Rates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "kabs={:e} kout={:e} k1={:e} k2={:e} kon={:e} koff={:e}",
            self.kabs, self.kout, self.k1, self.k2, self.kon, self.koff
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_slice_roundtrip() {
        let values = [1e-4, 0.05, 10.0, 1.0, 1e6, 1e-3];
        let rates = Rates::from_slice(&values).unwrap();
        assert_eq!(rates, Rates::default());
        assert_eq!(rates.to_vec(), values.to_vec());
    }

    #[test]
    fn test_wrong_length() {
        let err = Rates::from_slice(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, PkbindError::RateVectorLength(3)));
    }

    #[test]
    fn test_negative_rate_is_rejected() {
        let err = Rates::new(1e-4, -0.05, 10.0, 1.0, 1e6, 1e-3).unwrap_err();
        match err {
            PkbindError::InvalidRate { name, value } => {
                assert_eq!(name, "kout");
                assert_eq!(value, -0.05);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_finite_rate_is_rejected() {
        assert!(Rates::new(1e-4, 0.05, 10.0, 1.0, f64::INFINITY, 1e-3).is_err());
        assert!(Rates::new(f64::NAN, 0.05, 10.0, 1.0, 1e6, 1e-3).is_err());
    }

    #[test]
    fn test_binding_can_be_disabled() {
        let rates = Rates::new(1e-4, 0.05, 10.0, 1.0, 0.0, 0.0).unwrap();
        assert_eq!(rates.kd(), None);
        assert_relative_eq!(Rates::default().kd().unwrap(), 1e-9);
    }
}
