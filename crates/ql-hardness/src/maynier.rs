//! As-quenched hardness from the Maynier regressions.
//!
//! Per-constituent Vickers hardness as a function of composition and
//! quench severity, blended by the rule of mixtures over the predicted
//! phase constitution.

use ql_core::Real;
use ql_material::Composition;
use ql_kinetics::PhaseFractions;

/// Hardness assigned to retained austenite, HV.
const HV_RETAINED_AUSTENITE: Real = 200.0;

/// Cooling rate at 700 deg C implied by t8/5, K/s.
fn cooling_rate(t8_5: Real) -> Real {
    300.0 / t8_5.max(0.1)
}

/// Martensite hardness, HV.
pub fn martensite_hv(comp: &Composition, t8_5: Real) -> Real {
    let log_vr = cooling_rate(t8_5).log10();
    (127.0
        + 949.0 * comp.c()
        + 27.0 * comp.si()
        + 11.0 * comp.mn()
        + 8.0 * comp.ni()
        + 16.0 * comp.cr()
        + 21.0 * log_vr)
        .max(100.0)
}

/// Bainite hardness, HV.
pub fn bainite_hv(comp: &Composition, t8_5: Real) -> Real {
    (200.0
        + 500.0 * comp.c()
        + 30.0 * comp.si()
        + 20.0 * comp.mn()
        + 10.0 * comp.ni()
        + 30.0 * comp.cr()
        + 50.0 * comp.mo()
        - 5.0 * t8_5.max(0.1).log10())
    .max(150.0)
}

/// Ferrite-pearlite hardness, HV.
pub fn ferrite_pearlite_hv(comp: &Composition, t8_5: Real) -> Real {
    let log_vr = cooling_rate(t8_5).log10();
    (42.0
        + 223.0 * comp.c()
        + 53.0 * comp.si()
        + 30.0 * comp.mn()
        + 12.6 * comp.ni()
        + 7.0 * comp.cr()
        + 19.0 * comp.mo()
        + (10.0 - 19.0 * comp.si() + 4.0 * comp.ni() + 8.0 * comp.cr() + 130.0 * comp.v())
            * log_vr)
        .max(100.0)
}

/// Rule-of-mixtures hardness of the full constitution, HV.
pub fn mixture_hv(comp: &Composition, fractions: &PhaseFractions, t8_5: Real) -> Real {
    let fp = fractions.ferrite + fractions.pearlite;
    fractions.martensite * martensite_hv(comp, t8_5)
        + fractions.bainite * bainite_hv(comp, t8_5)
        + fp * ferrite_pearlite_hv(comp, t8_5)
        + fractions.retained_austenite * HV_RETAINED_AUSTENITE
}

/// Vickers to Rockwell C. None below 200 HV, where the C scale does
/// not read meaningfully; otherwise clamped to [20, 68].
pub fn hv_to_hrc(hv: Real) -> Option<Real> {
    if hv < 200.0 {
        return None;
    }
    let hrc = -0.0001 * hv * hv + 0.1755 * hv - 8.48;
    Some(hrc.clamp(20.0, 68.0))
}
