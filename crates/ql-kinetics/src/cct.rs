//! Coarse CCT-band constitution estimate from the quench severity.
//!
//! Fallback used when no JMAK parameters are stored: the mean cooling
//! rate through 800-500 deg C selects a banded mixture, then the bands
//! are corrected against the critical temperatures actually reached.

use ql_core::Real;

use crate::scheil::PhaseFractions;
use crate::store::CriticalTemperatures;

/// Mean cooling rate over the 800-500 deg C interval, K/s.
pub fn cooling_rate_from_t8_5(t8_5: Real) -> Real {
    300.0 / t8_5.max(1e-6)
}

/// Banded phase mixture for a low-alloy steel at the given cooling rate.
fn band_mixture(rate: Real) -> PhaseFractions {
    if rate > 100.0 {
        PhaseFractions {
            martensite: 0.95,
            retained_austenite: 0.05,
            ..Default::default()
        }
    } else if rate > 30.0 {
        PhaseFractions {
            martensite: 0.80,
            bainite: 0.15,
            retained_austenite: 0.05,
            ..Default::default()
        }
    } else if rate > 10.0 {
        PhaseFractions {
            martensite: 0.50,
            bainite: 0.40,
            retained_austenite: 0.10,
            ..Default::default()
        }
    } else if rate > 1.0 {
        PhaseFractions {
            martensite: 0.10,
            bainite: 0.70,
            ferrite: 0.10,
            pearlite: 0.05,
            retained_austenite: 0.05,
            ..Default::default()
        }
    } else {
        PhaseFractions {
            ferrite: 0.50,
            pearlite: 0.45,
            bainite: 0.05,
            ..Default::default()
        }
    }
}

/// Band estimate constrained by what the path actually reached:
/// no martensite unless the part went below Ms, no bainite unless it
/// went below Bs. Displaced fractions fall through to the next slower
/// product so the total stays 1.
pub fn cct_fractions(
    critical: &CriticalTemperatures,
    t8_5: Real,
    min_temperature: Real,
) -> PhaseFractions {
    let mut f = band_mixture(cooling_rate_from_t8_5(t8_5));

    if min_temperature >= critical.ms && f.martensite > 0.0 {
        let displaced = f.martensite;
        f.martensite = 0.0;
        if min_temperature < critical.bs {
            f.bainite += displaced;
        } else {
            f.retained_austenite += displaced;
        }
    }
    if min_temperature >= critical.bs && f.bainite > 0.0 {
        let displaced = f.bainite;
        f.bainite = 0.0;
        f.pearlite += displaced;
    }
    f
}
