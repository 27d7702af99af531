use crate::data::{DoseSchedule, Rates, State};
use crate::simulator::forcing::Forcing;
use crate::simulator::{T, V};
use crate::PkbindError;

/// Mass-action kinetics of absorption, blood/tissue exchange and target binding
///
/// State vector `x = [Iblood, Itissue, f]`:
///
/// ```text
/// dIblood/dt  = kabs*F(t) - Iblood*(kout + k1) + Itissue*k2
/// dItissue/dt = k1*Iblood - Itissue*(k2 + (1 - f)*Etot*kon) + f*koff*Etot
/// df/dt       = Itissue*kon - f*(Itissue*kon + koff)
/// ```
///
/// where `F(t)` is the [Forcing] of the dose schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetEngagement {
    rates: Rates,
    etot: f64,
    schedule: DoseSchedule,
}

impl TargetEngagement {
    pub const NSTATES: usize = 3;

    pub fn new(rates: Rates, etot: f64, schedule: DoseSchedule) -> Result<Self, PkbindError> {
        rates.validate()?;
        if !etot.is_finite() || etot < 0.0 {
            return Err(PkbindError::InvalidProteinConcentration(etot));
        }
        Ok(TargetEngagement {
            rates,
            etot,
            schedule,
        })
    }

    pub fn rates(&self) -> &Rates {
        &self.rates
    }

    pub fn etot(&self) -> f64 {
        self.etot
    }

    pub fn schedule(&self) -> &DoseSchedule {
        &self.schedule
    }

    pub fn forcing(&self) -> Forcing<'_> {
        Forcing::new(&self.schedule, self.rates.kabs)
    }

    /// Rate of change of the state at time `t`
    #[inline(always)]
    pub fn derivative(&self, x: &V, t: T, dx: &mut V) {
        let Rates {
            kout,
            k1,
            k2,
            kon,
            koff,
            ..
        } = self.rates;
        let etot = self.etot;
        let (iblood, itissue, f) = (x[0], x[1], x[2]);

        dx[0] = self.forcing().input_rate(t) - iblood * (kout + k1) + itissue * k2;
        dx[1] = k1 * iblood - itissue * (k2 + (1.0 - f) * etot * kon) + f * koff * etot;
        dx[2] = itissue * kon - f * (itissue * kon + koff);
    }

    /// Jacobian of the derivative at `x`, applied to `v`
    ///
    /// The forcing term does not depend on the state, so `t` drops out.
    #[inline(always)]
    pub fn jacobian_mul(&self, x: &V, _t: T, v: &V, jv: &mut V) {
        let Rates {
            kout,
            k1,
            k2,
            kon,
            koff,
            ..
        } = self.rates;
        let etot = self.etot;
        let (itissue, f) = (x[1], x[2]);

        jv[0] = -(kout + k1) * v[0] + k2 * v[1];
        jv[1] = k1 * v[0] - (k2 + (1.0 - f) * etot * kon) * v[1]
            + (itissue * etot * kon + koff * etot) * v[2];
        jv[2] = kon * (1.0 - f) * v[1] - (itissue * kon + koff) * v[2];
    }

    /// Convenience wrapper around [TargetEngagement::derivative] for a [State]
    pub fn derivative_of(&self, state: &State, t: T) -> State {
        let x = V::from_column_slice(&state.to_array());
        let mut dx = V::zeros(Self::NSTATES);
        self.derivative(&x, t, &mut dx);
        State::new(dx[0], dx[1], dx[2])
    }
}
