//! ql-kinetics: austenite decomposition kinetics.
//!
//! JMAK isothermal models with Scheil additivity for arbitrary thermal
//! paths, Koistinen-Marburger athermal martensite, composition-based
//! parameter estimation, calibration against measured data, and a
//! tiered predictor that degrades gracefully as data thins out.

pub mod calibrate;
pub mod cct;
pub mod error;
pub mod estimate;
pub mod jmak;
pub mod martensite;
pub mod predictor;
pub mod scheil;
pub mod store;
pub mod ttt;

pub use calibrate::{
    calibrate_continuous, calibrate_isothermal, BModelKind, CoolingPoint, IsothermalPoint,
};
pub use cct::{cct_fractions, cooling_rate_from_t8_5};
pub use error::{KineticsError, KineticsResult};
pub use estimate::{estimate_kinetics, RegressionTable};
pub use martensite::koistinen_marburger;
pub use predictor::{
    CctPredictor, CoolingPath, MartensitePredictor, PhaseMarkers, PhasePredictor, Prediction,
    PredictorTier, ScheilPredictor, TieredPredictor,
};
pub use scheil::{PhaseFractions, ScheilTracker};
pub use store::{
    BModel, CriticalTemperatures, DataSource, GradeKinetics, JmakParameters,
    MartensiteParameters, Phase,
};
pub use ttt::{ttt_curves, TttCurve};
