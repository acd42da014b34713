//! Tempering response via the Hollomon-Jaffe parameter.
//!
//! HJP = T_K * (C + log10(t_min)), with the carbon-dependent C
//! coefficient from the composition. Softening maps HJP to a retained
//! hardness factor through a swappable table; martensite and bainite
//! soften, ferrite-pearlite and retained austenite do not.

use serde::{Deserialize, Serialize};

use ql_core::{interp_clamped, Real, KELVIN_OFFSET};
use ql_material::Composition;
use ql_kinetics::PhaseFractions;

use crate::error::{HardnessError, HardnessResult};
use crate::maynier;

/// Fully softened floor for tempered martensite/bainite, HV.
const SOFTENED_FLOOR_HV: Real = 180.0;

/// Hollomon-Jaffe parameter for a hold. None for zero hold: the part
/// is as-quenched and no tempering arithmetic applies.
pub fn hollomon_jaffe(
    temperature_c: Real,
    hold_s: Real,
    c_coefficient: Real,
) -> HardnessResult<Option<Real>> {
    if hold_s < 0.0 || !hold_s.is_finite() {
        return Err(HardnessError::InvalidInput {
            what: format!("hold time {hold_s} must be non-negative"),
        });
    }
    if hold_s == 0.0 {
        return Ok(None);
    }
    let t_k = temperature_c + KELVIN_OFFSET;
    if t_k <= 0.0 {
        return Err(HardnessError::InvalidInput {
            what: format!("tempering temperature {temperature_c} below absolute zero"),
        });
    }
    let hold_min = hold_s / 60.0;
    Ok(Some(t_k * (c_coefficient + hold_min.log10())))
}

/// HJP -> fraction of as-quenched hardness (above the softened floor)
/// retained. Monotone non-increasing in HJP.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SofteningTable {
    /// (HJP, retained factor), sorted by HJP
    points: Vec<(Real, Real)>,
}

impl Default for SofteningTable {
    fn default() -> Self {
        // Typical low-alloy response: barely tempered at P ~ 12000,
        // heavily softened past P ~ 21000
        Self {
            points: vec![
                (12_000.0, 1.00),
                (14_000.0, 0.95),
                (16_000.0, 0.85),
                (18_000.0, 0.70),
                (20_000.0, 0.55),
                (22_000.0, 0.42),
                (24_000.0, 0.32),
            ],
        }
    }
}

impl SofteningTable {
    pub fn new(points: Vec<(Real, Real)>) -> HardnessResult<Self> {
        if points.len() < 2 {
            return Err(HardnessError::InvalidInput {
                what: "softening table needs at least 2 points".to_string(),
            });
        }
        for pair in points.windows(2) {
            if pair[1].0 <= pair[0].0 {
                return Err(HardnessError::InvalidInput {
                    what: "softening table HJP values must be strictly increasing".to_string(),
                });
            }
            if pair[1].1 > pair[0].1 {
                return Err(HardnessError::InvalidInput {
                    what: "softening factors must be non-increasing in HJP".to_string(),
                });
            }
        }
        Ok(Self { points })
    }

    pub fn factor(&self, hjp: Real) -> Real {
        interp_clamped(&self.points, hjp).unwrap_or(1.0)
    }
}

/// Tempering hold specification.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TemperingSpec {
    /// Hold temperature, deg C
    pub temperature: Real,
    /// Hold time, seconds; zero means untempered
    pub hold_s: Real,
}

/// Tempered mixture hardness. The softenable share (martensite +
/// bainite) relaxes toward the softened floor by the table factor;
/// diffusional products and retained austenite keep their as-quenched
/// hardness.
pub fn tempered_hv(
    comp: &Composition,
    fractions: &PhaseFractions,
    t8_5: Real,
    spec: &TemperingSpec,
    table: &SofteningTable,
) -> HardnessResult<Real> {
    let as_quenched = maynier::mixture_hv(comp, fractions, t8_5);
    let Some(hjp) = hollomon_jaffe(spec.temperature, spec.hold_s, comp.hollomon_jaffe_c())?
    else {
        return Ok(as_quenched);
    };
    let factor = table.factor(hjp);

    let softenable = fractions.martensite + fractions.bainite;
    let hard_share = fractions.martensite * maynier::martensite_hv(comp, t8_5)
        + fractions.bainite * maynier::bainite_hv(comp, t8_5);
    let softened = if softenable > 0.0 {
        let floor = SOFTENED_FLOOR_HV * softenable;
        floor + (hard_share - floor).max(0.0) * factor
    } else {
        0.0
    };
    Ok(as_quenched - hard_share + softened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ql_material::Element;

    fn alloy() -> Composition {
        Composition::new()
            .with(Element::C, 0.43)
            .with(Element::Mn, 0.85)
            .with(Element::Cr, 1.0)
            .with(Element::Mo, 0.22)
    }

    fn martensitic() -> PhaseFractions {
        PhaseFractions {
            martensite: 0.95,
            retained_austenite: 0.05,
            ..Default::default()
        }
    }

    #[test]
    fn zero_hold_leaves_hardness_as_quenched() {
        let comp = alloy();
        let f = martensitic();
        let spec = TemperingSpec {
            temperature: 550.0,
            hold_s: 0.0,
        };
        let hv = tempered_hv(&comp, &f, 5.0, &spec, &SofteningTable::default()).unwrap();
        let as_quenched = maynier::mixture_hv(&comp, &f, 5.0);
        assert_eq!(hv, as_quenched);
    }

    #[test]
    fn hardness_decreases_monotonically_with_hjp() {
        let comp = alloy();
        let f = martensitic();
        let table = SofteningTable::default();
        let mut last = Real::INFINITY;
        for temp in [200.0, 350.0, 500.0, 650.0] {
            let spec = TemperingSpec {
                temperature: temp,
                hold_s: 7200.0,
            };
            let hv = tempered_hv(&comp, &f, 5.0, &spec, &table).unwrap();
            assert!(hv <= last, "hv {hv} rose past {last} at {temp} deg C");
            last = hv;
        }
        // Heavy temper should land well below as-quenched
        let as_quenched = maynier::mixture_hv(&comp, &f, 5.0);
        assert!(last < 0.7 * as_quenched);
    }

    #[test]
    fn longer_hold_softens_more() {
        let comp = alloy();
        let f = martensitic();
        let table = SofteningTable::default();
        let short = tempered_hv(
            &comp,
            &f,
            5.0,
            &TemperingSpec {
                temperature: 550.0,
                hold_s: 600.0,
            },
            &table,
        )
        .unwrap();
        let long = tempered_hv(
            &comp,
            &f,
            5.0,
            &TemperingSpec {
                temperature: 550.0,
                hold_s: 4.0 * 3600.0,
            },
            &table,
        )
        .unwrap();
        assert!(long < short);
    }

    #[test]
    fn ferrite_pearlite_untouched_by_tempering() {
        let comp = alloy();
        let f = PhaseFractions {
            ferrite: 0.5,
            pearlite: 0.5,
            ..Default::default()
        };
        let spec = TemperingSpec {
            temperature: 600.0,
            hold_s: 7200.0,
        };
        let hv = tempered_hv(&comp, &f, 300.0, &spec, &SofteningTable::default()).unwrap();
        assert_eq!(hv, maynier::mixture_hv(&comp, &f, 300.0));
    }

    #[test]
    fn negative_hold_rejected() {
        let err = hollomon_jaffe(550.0, -1.0, 20.0);
        assert!(matches!(err, Err(HardnessError::InvalidInput { .. })));
    }

    #[test]
    fn unsorted_table_rejected() {
        let err = SofteningTable::new(vec![(14_000.0, 0.9), (12_000.0, 1.0)]);
        assert!(err.is_err());
    }
}
