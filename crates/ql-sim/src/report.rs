//! Simulation report: everything the run could produce, plus a record
//! of what it could not.

use serde::{Deserialize, Serialize};

use ql_core::{Real, TrackedPosition};
use ql_hardness::{MechanicalEstimate, ProfilePoint, ToughnessRating};
use ql_kinetics::{CriticalTemperatures, DataSource, PhaseFractions, PredictorTier};
use ql_thermal::SolverOutput;

/// A section the run skipped instead of failing, and why.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkippedSection {
    pub section: String,
    pub reason: String,
}

/// Condensed results at one tracked position.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PositionSummary {
    pub position: TrackedPosition,
    pub t8_5: Option<Real>,
    pub fractions: PhaseFractions,
    pub tier: PredictorTier,
    pub as_quenched_hv: Option<Real>,
    pub tempered_hv: Option<Real>,
    pub hrc: Option<Real>,
    pub mechanical: Option<MechanicalEstimate>,
    pub toughness: Option<ToughnessRating>,
}

/// Realized tempering conditions.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TemperingRecord {
    /// Hold temperature, deg C
    pub temperature: Real,
    /// Hold time, seconds
    pub hold_s: Real,
    /// Realized Hollomon-Jaffe parameter; None for a zero hold
    pub hjp: Option<Real>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimReport {
    /// Estimated critical temperatures; None when estimation was skipped
    pub critical: Option<CriticalTemperatures>,
    pub kinetics_source: Option<DataSource>,
    /// CE(IIW) carbon equivalent of the run's composition
    pub carbon_equivalent: Real,
    /// Tempering conditions actually realized, when the schedule had a
    /// tempering phase
    pub tempering: Option<TemperingRecord>,
    pub thermal: SolverOutput,
    /// t8/5 at the center, from the quench phase
    pub t8_5: Option<Real>,
    /// Full per-node profile; None when metallurgy was skipped
    pub profile: Option<Vec<ProfilePoint>>,
    pub summaries: Vec<PositionSummary>,
    pub skipped: Vec<SkippedSection>,
}

impl SimReport {
    pub fn summary_at(&self, position: TrackedPosition) -> Option<&PositionSummary> {
        self.summaries.iter().find(|s| s.position == position)
    }

    pub fn was_skipped(&self, section: &str) -> bool {
        self.skipped.iter().any(|s| s.section == section)
    }
}
