//! Tiered phase-constitution prediction.
//!
//! Predictors are tried in fidelity order: Scheil integration of stored
//! JMAK curves, then the CCT band table, then a martensite-only
//! estimate. The first predictor whose data requirements are met runs,
//! and the tier used is recorded on the result.

use serde::{Deserialize, Serialize};
use tracing::debug;

use ql_core::{CancelToken, Real};
use ql_thermal::solver::t8_5;

use crate::cct::cct_fractions;
use crate::error::{KineticsError, KineticsResult};
use crate::martensite::koistinen_marburger;
use crate::scheil::{PhaseFractions, ScheilTracker};
use crate::store::{GradeKinetics, Phase};

/// Fidelity tier that produced a prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictorTier {
    /// Scheil additivity over stored JMAK curves
    Scheil,
    /// Cooling-rate band lookup
    CctBands,
    /// Koistinen-Marburger only; everything else reported as austenite
    MartensiteOnly,
}

/// Thermal history at one location, time-aligned.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoolingPath {
    pub times: Vec<Real>,
    pub temperatures: Vec<Real>,
}

impl CoolingPath {
    pub fn new(times: Vec<Real>, temperatures: Vec<Real>) -> KineticsResult<Self> {
        if times.len() != temperatures.len() || times.len() < 2 {
            return Err(KineticsError::InvalidParameter {
                what: format!(
                    "path needs matching series of >= 2 points, got {} / {}",
                    times.len(),
                    temperatures.len()
                ),
            });
        }
        if times.windows(2).any(|w| w[1] <= w[0]) {
            return Err(KineticsError::InvalidParameter {
                what: "path times must be strictly increasing".to_string(),
            });
        }
        Ok(Self {
            times,
            temperatures,
        })
    }

    pub fn min_temperature(&self) -> Real {
        self.temperatures.iter().copied().fold(Real::INFINITY, Real::min)
    }

    pub fn t8_5(&self) -> Option<Real> {
        t8_5(&self.times, &self.temperatures)
    }
}

/// Prediction plus the tier that produced it. Tier 1 also carries the
/// time-resolved fraction series; coarser tiers only have finals.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Prediction {
    pub fractions: PhaseFractions,
    pub tier: PredictorTier,
    /// (absolute time, fractions summing to 1) along the path
    pub series: Vec<(Real, PhaseFractions)>,
}

/// Times at which a phase passed 1% and 99% of its final fraction.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PhaseMarkers {
    pub phase: Phase,
    pub start_time: Option<Real>,
    pub finish_time: Option<Real>,
}

impl Prediction {
    /// Start/finish markers for every phase that formed, from the
    /// series. Empty when no series was recorded.
    pub fn markers(&self) -> Vec<PhaseMarkers> {
        if self.series.is_empty() {
            return Vec::new();
        }
        Phase::DIFFUSIONAL
            .iter()
            .chain(std::iter::once(&Phase::Martensite))
            .filter_map(|&phase| {
                let final_fraction = self.fractions.get(phase);
                if final_fraction <= 0.0 {
                    return None;
                }
                let crossing = |level: Real| {
                    self.series
                        .iter()
                        .find(|(_, f)| f.get(phase) >= level * final_fraction)
                        .map(|(t, _)| *t)
                };
                Some(PhaseMarkers {
                    phase,
                    start_time: crossing(0.01),
                    finish_time: crossing(0.99),
                })
            })
            .collect()
    }
}

/// One fidelity level of the prediction chain.
pub trait PhasePredictor {
    fn tier(&self) -> PredictorTier;

    /// Whether the stored data suffices to run this predictor on `path`.
    fn is_available(&self, kinetics: &GradeKinetics, path: &CoolingPath) -> bool;

    fn predict(
        &self,
        kinetics: &GradeKinetics,
        path: &CoolingPath,
        cancel: &CancelToken,
    ) -> KineticsResult<Prediction>;
}

/// Tier 1: Scheil additivity over the stored JMAK curves.
pub struct ScheilPredictor;

impl PhasePredictor for ScheilPredictor {
    fn tier(&self) -> PredictorTier {
        PredictorTier::Scheil
    }

    fn is_available(&self, kinetics: &GradeKinetics, _path: &CoolingPath) -> bool {
        kinetics.has_diffusional_data()
    }

    fn predict(
        &self,
        kinetics: &GradeKinetics,
        path: &CoolingPath,
        cancel: &CancelToken,
    ) -> KineticsResult<Prediction> {
        let mut tracker = ScheilTracker::new(kinetics);
        let mut series = Vec::with_capacity(path.times.len());
        series.push((path.times[0], tracker.snapshot()));
        for (i, window) in path.times.windows(2).enumerate() {
            // Cancellation checked at coarse intervals, not every step
            if i % 256 == 0 {
                cancel.check()?;
            }
            let dt = window[1] - window[0];
            let temp = 0.5 * (path.temperatures[i] + path.temperatures[i + 1]);
            tracker.step(temp, dt);
            series.push((window[1], tracker.snapshot()));
        }
        Ok(Prediction {
            fractions: tracker.finalize(),
            tier: PredictorTier::Scheil,
            series,
        })
    }
}

/// Tier 2: cooling-rate band lookup from t8/5.
pub struct CctPredictor;

impl PhasePredictor for CctPredictor {
    fn tier(&self) -> PredictorTier {
        PredictorTier::CctBands
    }

    fn is_available(&self, _kinetics: &GradeKinetics, path: &CoolingPath) -> bool {
        path.t8_5().is_some()
    }

    fn predict(
        &self,
        kinetics: &GradeKinetics,
        path: &CoolingPath,
        cancel: &CancelToken,
    ) -> KineticsResult<Prediction> {
        cancel.check()?;
        let t8_5 = path.t8_5().ok_or_else(|| KineticsError::DataUnavailable {
            what: "path never spans 800-500 deg C".to_string(),
        })?;
        Ok(Prediction {
            fractions: cct_fractions(&kinetics.critical, t8_5, path.min_temperature()),
            tier: PredictorTier::CctBands,
            series: Vec::new(),
        })
    }
}

/// Tier 3: athermal martensite from the coldest point; the balance is
/// reported as retained austenite.
pub struct MartensitePredictor;

impl PhasePredictor for MartensitePredictor {
    fn tier(&self) -> PredictorTier {
        PredictorTier::MartensiteOnly
    }

    fn is_available(&self, _kinetics: &GradeKinetics, _path: &CoolingPath) -> bool {
        true
    }

    fn predict(
        &self,
        kinetics: &GradeKinetics,
        path: &CoolingPath,
        cancel: &CancelToken,
    ) -> KineticsResult<Prediction> {
        cancel.check()?;
        let km = koistinen_marburger(&kinetics.martensite, path.min_temperature());
        Ok(Prediction {
            fractions: PhaseFractions {
                martensite: km,
                retained_austenite: 1.0 - km,
                ..Default::default()
            },
            tier: PredictorTier::MartensiteOnly,
            series: Vec::new(),
        })
    }
}

/// Prediction chain trying each tier in order.
pub struct TieredPredictor {
    predictors: Vec<Box<dyn PhasePredictor + Send + Sync>>,
}

impl Default for TieredPredictor {
    fn default() -> Self {
        Self {
            predictors: vec![
                Box::new(ScheilPredictor),
                Box::new(CctPredictor),
                Box::new(MartensitePredictor),
            ],
        }
    }
}

impl TieredPredictor {
    pub fn new(predictors: Vec<Box<dyn PhasePredictor + Send + Sync>>) -> Self {
        Self { predictors }
    }

    /// Run the first available tier.
    pub fn predict(
        &self,
        kinetics: &GradeKinetics,
        path: &CoolingPath,
        cancel: &CancelToken,
    ) -> KineticsResult<Prediction> {
        for predictor in &self.predictors {
            if !predictor.is_available(kinetics, path) {
                continue;
            }
            debug!(tier = ?predictor.tier(), "running phase predictor");
            return predictor.predict(kinetics, path, cancel);
        }
        Err(KineticsError::DataUnavailable {
            what: "no predictor tier available for this path".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::{estimate_kinetics, RegressionTable};
    use crate::store::{
        CriticalTemperatures, DataSource, MartensiteParameters,
    };
    use ql_material::{Composition, Element};

    fn alloy() -> Composition {
        Composition::new()
            .with(Element::C, 0.43)
            .with(Element::Mn, 0.85)
            .with(Element::Si, 0.30)
            .with(Element::Cr, 1.0)
            .with(Element::Mo, 0.22)
            .with(Element::Ni, 0.30)
    }

    fn bare_grade() -> GradeKinetics {
        // Critical temperatures only; no JMAK data
        GradeKinetics::new(
            alloy(),
            CriticalTemperatures {
                ae1: 735.0,
                ae3: 793.0,
                bs: 538.0,
                ms: 312.0,
                mf: 97.0,
            },
            MartensiteParameters {
                ms: 312.0,
                mf: 97.0,
                alpha: 0.011,
            },
            DataSource::Literature,
        )
        .unwrap()
    }

    fn linear_path(start: Real, end: Real, duration: Real, n: usize) -> CoolingPath {
        let times: Vec<Real> = (0..n).map(|i| duration * i as Real / (n - 1) as Real).collect();
        let temps: Vec<Real> = (0..n)
            .map(|i| start + (end - start) * i as Real / (n - 1) as Real)
            .collect();
        CoolingPath::new(times, temps).unwrap()
    }

    #[test]
    fn scheil_tier_selected_when_jmak_present() {
        let kinetics = estimate_kinetics(&alloy(), &RegressionTable::default()).unwrap();
        let path = linear_path(850.0, 25.0, 8.0, 500);
        let p = TieredPredictor::default()
            .predict(&kinetics, &path, &CancelToken::none())
            .unwrap();
        assert_eq!(p.tier, PredictorTier::Scheil);
        assert!((p.fractions.sum() - 1.0).abs() < 1e-6);
        // ~100 K/s quench on a Cr-Mo steel: mostly martensite
        assert!(p.fractions.martensite > 0.5, "{:?}", p.fractions);
    }

    #[test]
    fn path_held_above_bs_forms_no_bainite_or_martensite() {
        let kinetics = estimate_kinetics(&alloy(), &RegressionTable::default()).unwrap();
        // Slow furnace cool stopping above Bs (~538): only the
        // high-temperature products can form
        let path = linear_path(850.0, 560.0, 20_000.0, 800);
        let p = TieredPredictor::default()
            .predict(&kinetics, &path, &CancelToken::none())
            .unwrap();
        assert_eq!(p.tier, PredictorTier::Scheil);
        assert_eq!(p.fractions.bainite, 0.0, "{:?}", p.fractions);
        assert_eq!(p.fractions.martensite, 0.0, "{:?}", p.fractions);
        assert!(
            p.fractions.ferrite + p.fractions.pearlite > 0.5,
            "{:?}",
            p.fractions
        );
        assert!(
            (p.fractions.transformed() - p.fractions.ferrite - p.fractions.pearlite).abs()
                < 1e-12,
            "{:?}",
            p.fractions
        );
    }

    #[test]
    fn falls_back_to_cct_bands_without_jmak_data() {
        let kinetics = bare_grade();
        let path = linear_path(850.0, 25.0, 30.0, 200);
        let p = TieredPredictor::default()
            .predict(&kinetics, &path, &CancelToken::none())
            .unwrap();
        assert_eq!(p.tier, PredictorTier::CctBands);
        assert!((p.fractions.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn falls_back_to_martensite_only_without_t8_5() {
        let kinetics = bare_grade();
        // Path entirely below 800, never crossing it
        let path = linear_path(600.0, 25.0, 30.0, 100);
        let p = TieredPredictor::default()
            .predict(&kinetics, &path, &CancelToken::none())
            .unwrap();
        assert_eq!(p.tier, PredictorTier::MartensiteOnly);
        assert!(p.fractions.martensite > 0.0);
        assert!((p.fractions.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn slow_cool_produces_diffusional_products() {
        let kinetics = estimate_kinetics(&alloy(), &RegressionTable::default()).unwrap();
        // 0.1 K/s furnace cool
        let path = linear_path(850.0, 25.0, 8250.0, 4000);
        let p = TieredPredictor::default()
            .predict(&kinetics, &path, &CancelToken::none())
            .unwrap();
        let diffusional = p.fractions.ferrite + p.fractions.pearlite + p.fractions.bainite;
        assert!(diffusional > 0.5, "{:?}", p.fractions);
        assert!((p.fractions.sum() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn faster_quench_never_less_martensite() {
        let kinetics = estimate_kinetics(&alloy(), &RegressionTable::default()).unwrap();
        let predictor = TieredPredictor::default();
        let fast = predictor
            .predict(
                &kinetics,
                &linear_path(850.0, 25.0, 10.0, 2000),
                &CancelToken::none(),
            )
            .unwrap();
        let slow = predictor
            .predict(
                &kinetics,
                &linear_path(850.0, 25.0, 2000.0, 2000),
                &CancelToken::none(),
            )
            .unwrap();
        assert!(fast.fractions.martensite >= slow.fractions.martensite);
    }

    #[test]
    fn tier_one_series_sums_to_unity_everywhere() {
        let kinetics = estimate_kinetics(&alloy(), &RegressionTable::default()).unwrap();
        let path = linear_path(850.0, 25.0, 120.0, 1200);
        let p = TieredPredictor::default()
            .predict(&kinetics, &path, &CancelToken::none())
            .unwrap();
        assert_eq!(p.series.len(), path.times.len());
        for (t, f) in &p.series {
            assert!((f.sum() - 1.0).abs() < 1e-6, "sum {} at t={t}", f.sum());
        }
    }

    #[test]
    fn markers_bracket_transformation() {
        let kinetics = estimate_kinetics(&alloy(), &RegressionTable::default()).unwrap();
        let path = linear_path(850.0, 25.0, 60.0, 1000);
        let p = TieredPredictor::default()
            .predict(&kinetics, &path, &CancelToken::none())
            .unwrap();
        let markers = p.markers();
        let martensite = markers
            .iter()
            .find(|m| m.phase == Phase::Martensite)
            .expect("martensite formed");
        let (Some(start), Some(finish)) = (martensite.start_time, martensite.finish_time) else {
            panic!("martensite markers missing");
        };
        assert!(start <= finish);
    }

    #[test]
    fn invalid_path_rejected() {
        assert!(CoolingPath::new(vec![0.0], vec![800.0]).is_err());
        assert!(CoolingPath::new(vec![0.0, 0.0], vec![800.0, 700.0]).is_err());
    }
}
