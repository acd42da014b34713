//! Composition-based estimation of critical temperatures and JMAK
//! parameters for low-alloy steels.
//!
//! Critical temperatures follow the Andrews and Steven-Haynes
//! regressions; JMAK C-curves are synthesized from a hardenability
//! factor so that leaner steels have faster noses. All coefficients
//! live in a [`RegressionTable`] so a different data set can be
//! swapped in without touching the logic.

use serde::{Deserialize, Serialize};

use ql_core::Real;
use ql_material::Composition;

use crate::error::{KineticsError, KineticsResult};
use crate::store::{
    BModel, CriticalTemperatures, DataSource, GradeKinetics, JmakParameters,
    MartensiteParameters, Phase,
};

/// Regression coefficients for the empirical estimator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegressionTable {
    /// Ae1: base, Mn, Ni, Si, Cr, W
    pub ae1: [Real; 6],
    /// Ae3: base, sqrt(C), Ni, Si, V, Mo, W
    pub ae3: [Real; 7],
    /// Ms: base, C, Mn, Ni, Cr, Mo
    pub ms: [Real; 6],
    /// Bs: base, C, Mn, Ni, Cr, Mo
    pub bs: [Real; 6],
    /// Mf = max(Ms + mf_offset, mf_floor), kept below Ms
    pub mf_offset: Real,
    pub mf_floor: Real,
    pub km_alpha: Real,
}

impl Default for RegressionTable {
    fn default() -> Self {
        Self {
            // Andrews (1965)
            ae1: [723.0, -10.7, -16.9, 29.1, 16.9, 6.38],
            ae3: [910.0, -203.0, -15.2, 44.7, 104.0, 31.5, 13.1],
            ms: [539.0, -423.0, -30.4, -17.7, -12.1, -7.5],
            // Steven-Haynes (1956)
            bs: [830.0, -270.0, -90.0, -37.0, -70.0, -83.0],
            mf_offset: -215.0,
            mf_floor: -50.0,
            km_alpha: MartensiteParameters::DEFAULT_ALPHA,
        }
    }
}

impl RegressionTable {
    pub fn critical_temperatures(
        &self,
        comp: &Composition,
    ) -> KineticsResult<CriticalTemperatures> {
        if !comp.has_carbon() {
            return Err(KineticsError::DataUnavailable {
                what: "composition has no carbon content".to_string(),
            });
        }
        let (c, mn, si, cr, ni, mo, v) = (
            comp.c(),
            comp.mn(),
            comp.si(),
            comp.cr(),
            comp.ni(),
            comp.mo(),
            comp.v(),
        );
        let w = comp.get(ql_material::Element::W);

        let [a0, a_mn, a_ni, a_si, a_cr, a_w] = self.ae1;
        let ae1 = a0 + a_mn * mn + a_ni * ni + a_si * si + a_cr * cr + a_w * w;

        let [e0, e_c, e_ni, e_si, e_v, e_mo, e_w] = self.ae3;
        let ae3 =
            (e0 + e_c * c.sqrt() + e_ni * ni + e_si * si + e_v * v + e_mo * mo + e_w * w).max(ae1);

        let [m0, m_c, m_mn, m_ni, m_cr, m_mo] = self.ms;
        let ms = m0 + m_c * c + m_mn * mn + m_ni * ni + m_cr * cr + m_mo * mo;

        let [b0, b_c, b_mn, b_ni, b_cr, b_mo] = self.bs;
        let bs = b0 + b_c * c + b_mn * mn + b_ni * ni + b_cr * cr + b_mo * mo;

        let mf = (ms + self.mf_offset).max(self.mf_floor).min(ms - 10.0);

        let critical = CriticalTemperatures { ae1, ae3, bs, ms, mf };
        critical.validate()?;
        Ok(critical)
    }

    /// Multiplicative hardenability factor; 1 for plain iron, larger for
    /// richer chemistries. Scales all nose times.
    pub fn hardenability_factor(&self, comp: &Composition) -> Real {
        (1.0 + 6.0 * comp.c())
            * (1.0 + 1.2 * comp.mn())
            * (1.0 + 0.6 * comp.cr())
            * (1.0 + 1.5 * comp.mo())
    }
}

/// Estimate the complete kinetic data set for a composition.
///
/// Pure in the composition and table: estimating twice yields identical
/// parameters.
pub fn estimate_kinetics(
    comp: &Composition,
    table: &RegressionTable,
) -> KineticsResult<GradeKinetics> {
    let critical = table.critical_temperatures(comp)?;
    let hf = table.hardenability_factor(comp);
    let martensite = MartensiteParameters {
        ms: critical.ms,
        mf: critical.mf,
        alpha: table.km_alpha,
    };

    let mut kinetics = GradeKinetics::new(
        comp.clone(),
        critical,
        martensite,
        DataSource::Empirical,
    )?;

    // Ferrite: hypoeutectoid steels only, window (Bs+20, Ae3]
    if comp.c() < 0.8 && critical.ae3 > critical.ae1 {
        let t_min = critical.bs + 20.0;
        if t_min < critical.ae3 {
            let nose_t = (critical.ae1
                - (30.0 + 10.0 * comp.cr() + 10.0 * comp.mo() + 5.0 * comp.mn()))
            .max(critical.bs + 30.0);
            let nose_time = 1.5 * hf;
            kinetics.set_jmak(
                Phase::Ferrite,
                c_curve(2.0, nose_t, nose_time, t_min, critical.ae3),
            )?;
        }
    }

    // Pearlite: window (Bs, Ae1]
    if critical.bs < critical.ae1 {
        let nose_t = critical.ae1 - 70.0;
        let nose_time = 3.0 * hf * (1.0 + 0.8 * comp.cr()) * (1.0 + 1.2 * comp.mo())
            / comp.c().max(0.15);
        kinetics.set_jmak(
            Phase::Pearlite,
            c_curve(1.5, nose_t, nose_time, critical.bs, critical.ae1),
        )?;
    }

    // Bainite: window (Ms, Bs], only when there is a usable bay
    if critical.bs > critical.ms + 20.0 {
        let nose_t = critical.ms + 0.5 * (critical.bs - critical.ms);
        let nose_time = 0.5 * hf * (1.0 + 0.8 * comp.cr()) * (1.0 + 1.5 * comp.mo());
        kinetics.set_jmak(
            Phase::Bainite,
            c_curve(2.5, nose_t, nose_time, critical.ms, critical.bs),
        )?;
    }

    Ok(kinetics)
}

/// Gaussian C-curve reaching 99% transformed at the nose in `nose_time`.
fn c_curve(n: Real, t_nose: Real, nose_time: Real, t_min: Real, t_max: Real) -> JmakParameters {
    let b_max = (100.0f64).ln() / nose_time.powf(n);
    let sigma = ((t_max - t_min) / 1.5).max(30.0);
    JmakParameters {
        n,
        b: BModel::Gaussian {
            b_max,
            t_nose,
            sigma,
        },
        t_min,
        t_max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jmak;
    use ql_material::Element;

    fn alloy_4140_like() -> Composition {
        Composition::new()
            .with(Element::C, 0.43)
            .with(Element::Mn, 0.85)
            .with(Element::Si, 0.30)
            .with(Element::Cr, 1.0)
            .with(Element::Mo, 0.22)
            .with(Element::Ni, 0.30)
    }

    #[test]
    fn medium_carbon_alloy_temperatures_in_handbook_range() {
        let table = RegressionTable::default();
        let critical = table.critical_temperatures(&alloy_4140_like()).unwrap();
        assert!((250.0..=320.0).contains(&critical.ms), "Ms = {}", critical.ms);
        assert!((700.0..=740.0).contains(&critical.ae1), "Ae1 = {}", critical.ae1);
        assert!(critical.ae3 > critical.ae1);
        assert!(critical.bs > critical.ms);
        assert!(critical.ms > critical.mf);
    }

    #[test]
    fn estimation_is_idempotent() {
        let table = RegressionTable::default();
        let comp = alloy_4140_like();
        let a = estimate_kinetics(&comp, &table).unwrap();
        let b = estimate_kinetics(&comp, &table).unwrap();
        let ja = serde_json::to_string(&a).unwrap();
        let jb = serde_json::to_string(&b).unwrap();
        assert_eq!(ja, jb);
    }

    #[test]
    fn all_three_diffusional_phases_generated_for_hypoeutectoid_alloy() {
        let table = RegressionTable::default();
        let k = estimate_kinetics(&alloy_4140_like(), &table).unwrap();
        assert!(k.jmak(Phase::Ferrite).is_some());
        assert!(k.jmak(Phase::Pearlite).is_some());
        assert!(k.jmak(Phase::Bainite).is_some());
        assert_eq!(k.source, DataSource::Empirical);
    }

    #[test]
    fn nose_reaches_99_percent_at_nose_time() {
        let params = c_curve(1.5, 650.0, 10.0, 560.0, 727.0);
        let x = jmak::fraction(&params, 650.0, 10.0);
        assert!((x - 0.99).abs() < 1e-6, "x = {x}");
    }

    #[test]
    fn richer_chemistry_slows_the_nose() {
        let table = RegressionTable::default();
        let lean = Composition::new().with(Element::C, 0.4);
        let rich = alloy_4140_like();
        assert!(table.hardenability_factor(&rich) > table.hardenability_factor(&lean));
    }

    #[test]
    fn missing_carbon_is_data_unavailable() {
        let table = RegressionTable::default();
        let comp = Composition::new().with(Element::Mn, 1.0);
        let err = table.critical_temperatures(&comp);
        assert!(matches!(err, Err(KineticsError::DataUnavailable { .. })));
    }

    #[test]
    fn high_carbon_keeps_ms_above_mf() {
        let table = RegressionTable::default();
        let comp = Composition::new().with(Element::C, 1.2);
        let critical = table.critical_temperatures(&comp).unwrap();
        assert!(critical.ms > critical.mf);
    }
}
