//! Orchestration of a full simulation run.
//!
//! Thermal solving is mandatory; metallurgy and hardness degrade
//! gracefully when their inputs are missing, recording a skipped
//! section instead of failing the run.

use tracing::{info, warn};

use ql_core::{CancelToken, TrackedPosition};
use ql_hardness::{hardness_profile, hollomon_jaffe, mechanical, TemperingSpec};
use ql_kinetics::{estimate_kinetics, KineticsError};
use ql_thermal::{MultiPhaseSolver, PhaseKind, SolverOutput};

use crate::config::RunConfig;
use crate::error::SimResult;
use crate::report::{PositionSummary, SimReport, SkippedSection, TemperingRecord};

/// Run the configured cycle end to end.
pub fn run(config: &RunConfig, cancel: &CancelToken) -> SimResult<SimReport> {
    config.validate()?;
    let mut skipped = Vec::new();

    let kinetics = match estimate_kinetics(&config.composition, &config.regressions) {
        Ok(k) => Some(k),
        Err(KineticsError::Cancelled) => return Err(KineticsError::Cancelled.into()),
        Err(err) => {
            warn!(%err, "kinetic estimation skipped");
            skipped.push(SkippedSection {
                section: "kinetics".to_string(),
                reason: err.to_string(),
            });
            None
        }
    };

    let solver = MultiPhaseSolver::new(
        config.geometry,
        config.material.clone(),
        config.schedule.clone(),
        config.solver,
    )?;
    let thermal = solver.solve(config.initial_temperature, cancel)?;
    info!(
        phases = thermal.phases.len(),
        t8_5 = ?thermal.t8_5,
        "thermal cycle solved"
    );

    let tempering = tempering_spec(&thermal);

    let profile = match &kinetics {
        Some(kinetics) => match hardness_profile(
            &thermal,
            &config.composition,
            kinetics,
            tempering.as_ref(),
            &config.softening,
            cancel,
        ) {
            Ok(profile) => Some(profile),
            Err(ql_hardness::HardnessError::Cancelled) => {
                return Err(ql_hardness::HardnessError::Cancelled.into())
            }
            Err(err) => {
                warn!(%err, "hardness profile skipped");
                skipped.push(SkippedSection {
                    section: "hardness".to_string(),
                    reason: err.to_string(),
                });
                None
            }
        },
        None => None,
    };

    let summaries = profile
        .as_deref()
        .map(summarize)
        .unwrap_or_default();

    let tempering_record = match &tempering {
        Some(spec) => Some(TemperingRecord {
            temperature: spec.temperature,
            hold_s: spec.hold_s,
            hjp: hollomon_jaffe(
                spec.temperature,
                spec.hold_s,
                config.composition.hollomon_jaffe_c(),
            )?,
        }),
        None => None,
    };

    Ok(SimReport {
        critical: kinetics.as_ref().map(|k| k.critical),
        kinetics_source: kinetics.as_ref().map(|k| k.source),
        carbon_equivalent: config.composition.carbon_equivalent_iiw(),
        tempering: tempering_record,
        t8_5: thermal.t8_5,
        thermal,
        profile,
        summaries,
        skipped,
    })
}

/// Tempering spec derived from the schedule's tempering phase. The
/// hold is the time the solver actually spent in the phase.
fn tempering_spec(thermal: &SolverOutput) -> Option<TemperingSpec> {
    thermal
        .phases
        .iter()
        .find(|p| p.kind == PhaseKind::Tempering)
        .map(|p| {
            // Hold temperature taken as the final center temperature,
            // which has settled at the setpoint by the end condition
            let temperature = p.field.last().map(|f| f[0]).unwrap_or(0.0);
            TemperingSpec {
                temperature,
                hold_s: p.end_time - p.start_time,
            }
        })
}

fn summarize(profile: &[ql_hardness::ProfilePoint]) -> Vec<PositionSummary> {
    TrackedPosition::ALL
        .iter()
        .map(|&position| {
            let point = &profile[position.node_index(profile.len())];
            let reported = point.tempered_hv.or(point.as_quenched_hv);
            PositionSummary {
                position,
                t8_5: point.t8_5,
                fractions: point.fractions,
                tier: point.tier,
                as_quenched_hv: point.as_quenched_hv,
                tempered_hv: point.tempered_hv,
                hrc: point.hrc,
                mechanical: reported.map(mechanical::from_hardness),
                toughness: reported.map(|_| {
                    mechanical::toughness(&point.fractions, point.tempered_hv.is_some())
                }),
            }
        })
        .collect()
}
