//! Rough mechanical properties derived from Vickers hardness.
//!
//! Standard conversions for quenched-and-tempered low-alloy steels;
//! indicative values, not design allowables.

use serde::{Deserialize, Serialize};

use ql_core::Real;
use ql_kinetics::PhaseFractions;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MechanicalEstimate {
    /// Ultimate tensile strength, MPa
    pub uts_mpa: Real,
    /// 0.2% proof strength, MPa
    pub yield_mpa: Real,
    /// Elongation at fracture, percent
    pub elongation_pct: Real,
}

/// Estimate tensile properties from hardness.
///
/// UTS ~ 3.3 HV holds across the hardness range of interest; the yield
/// ratio rises with strength, and ductility falls with hardness.
pub fn from_hardness(hv: Real) -> MechanicalEstimate {
    let uts = 3.3 * hv;
    let yield_ratio = (0.6 + 0.0004 * hv).min(0.92);
    MechanicalEstimate {
        uts_mpa: uts,
        yield_mpa: yield_ratio * uts,
        elongation_pct: (35.0 - 0.04 * hv).clamp(4.0, 35.0),
    }
}

/// Qualitative impact-toughness rating from the phase constitution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToughnessRating {
    Poor,
    Fair,
    Good,
}

/// Rate toughness from the constitution. Untempered martensite is
/// brittle; tempering restores it. Bainite and tempered martensite rate
/// well; coarse pearlite sits in between.
pub fn toughness(fractions: &PhaseFractions, tempered: bool) -> ToughnessRating {
    if fractions.martensite > 0.5 && !tempered {
        ToughnessRating::Poor
    } else if fractions.pearlite > 0.5 || fractions.retained_austenite > 0.2 {
        ToughnessRating::Fair
    } else {
        ToughnessRating::Good
    }
}
