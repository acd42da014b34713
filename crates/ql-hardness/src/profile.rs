//! Through-thickness hardness profile from a solved thermal cycle.
//!
//! Every mesh node gets its own cooling path, phase prediction, and
//! hardness; nodes are independent, so the profile is computed in
//! parallel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ql_core::{CancelToken, Real};
use ql_kinetics::{
    CoolingPath, GradeKinetics, PhaseFractions, PredictorTier, TieredPredictor,
};
use ql_material::Composition;
use ql_thermal::{PhaseKind, SolverOutput};

use crate::error::{HardnessError, HardnessResult};
use crate::maynier;
use crate::tempering::{tempered_hv, SofteningTable, TemperingSpec};

/// Prediction and hardness at one mesh node.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ProfilePoint {
    /// Distance from the center, meters
    pub position: Real,
    pub fractions: PhaseFractions,
    pub tier: PredictorTier,
    pub t8_5: Option<Real>,
    /// As-quenched Vickers hardness; None when t8/5 is unavailable
    pub as_quenched_hv: Option<Real>,
    /// Tempered hardness when a tempering spec was supplied
    pub tempered_hv: Option<Real>,
    pub hrc: Option<Real>,
}

/// Compute the hardness profile over all mesh nodes.
pub fn hardness_profile(
    output: &SolverOutput,
    composition: &Composition,
    kinetics: &GradeKinetics,
    tempering: Option<&TemperingSpec>,
    softening: &SofteningTable,
    cancel: &CancelToken,
) -> HardnessResult<Vec<ProfilePoint>> {
    cancel.check()?;
    let predictor = TieredPredictor::default();
    let cutoff = decomposition_cutoff(output);

    let points: Result<Vec<ProfilePoint>, HardnessError> = output
        .positions
        .par_iter()
        .enumerate()
        .map(|(node, &position)| {
            let path = decomposition_path(output, node, cutoff)?;
            let prediction = predictor.predict(kinetics, &path, cancel)?;
            let t8_5 = path.t8_5();

            let as_quenched = t8_5
                .map(|t| maynier::mixture_hv(composition, &prediction.fractions, t));
            let tempered = match (tempering, t8_5) {
                (Some(spec), Some(t)) => Some(tempered_hv(
                    composition,
                    &prediction.fractions,
                    t,
                    spec,
                    softening,
                )?),
                _ => None,
            };
            let reported = tempered.or(as_quenched);

            Ok(ProfilePoint {
                position,
                fractions: prediction.fractions,
                tier: prediction.tier,
                t8_5,
                as_quenched_hv: as_quenched,
                tempered_hv: tempered,
                hrc: reported.and_then(maynier::hv_to_hrc),
            })
        })
        .collect();

    let points = points?;
    debug!(
        nodes = points.len(),
        with_hardness = points.iter().filter(|p| p.as_quenched_hv.is_some()).count(),
        "hardness profile complete"
    );
    Ok(points)
}

/// Absolute time at which austenite decomposition stops being tracked:
/// the end of the last non-tempering phase. The tempering reheat must
/// not feed the transformation model.
fn decomposition_cutoff(output: &SolverOutput) -> Real {
    let decomposition_end = output
        .phases
        .iter()
        .filter(|p| p.kind != PhaseKind::Tempering)
        .map(|p| p.end_time)
        .fold(Real::NEG_INFINITY, Real::max);
    if decomposition_end.is_finite() {
        decomposition_end
    } else {
        output.time.last().copied().unwrap_or(0.0)
    }
}

/// Thermal path for one node from its peak temperature (full
/// austenitization) down to the cutoff.
fn decomposition_path(
    output: &SolverOutput,
    node: usize,
    cutoff: Real,
) -> HardnessResult<CoolingPath> {
    let end = output
        .time
        .iter()
        .rposition(|&t| t <= cutoff + 1e-9)
        .unwrap_or(output.time.len() - 1);
    let series: Vec<Real> = output.field[..=end]
        .iter()
        .map(|snapshot| snapshot[node])
        .collect();
    let peak = series
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let start = if peak + 1 < series.len() { peak } else { 0 };
    Ok(CoolingPath::new(
        output.time[start..=end].to_vec(),
        series[start..].to_vec(),
    )?)
}
