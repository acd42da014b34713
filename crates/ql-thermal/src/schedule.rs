//! Heat-treatment phase schedule.
//!
//! Phases run in a fixed order: heating -> transfer -> quenching ->
//! tempering. Each enabled phase carries its own boundary parameters
//! and an end condition.

use serde::{Deserialize, Serialize};

use ql_core::Real;

use crate::boundary::{AmbientRamp, BoundaryCondition};
use crate::error::{ThermalError, ThermalResult};

/// Heat-treatment phase identity, in cycle order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    Heating,
    Transfer,
    Quenching,
    Tempering,
}

impl PhaseKind {
    pub const ORDER: [PhaseKind; 4] = [
        PhaseKind::Heating,
        PhaseKind::Transfer,
        PhaseKind::Quenching,
        PhaseKind::Tempering,
    ];
}

/// Quench bath agitation; scales the default media HTC.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Agitation {
    Still,
    #[default]
    Moderate,
    Strong,
}

impl Agitation {
    pub fn htc_multiplier(self) -> Real {
        match self {
            Agitation::Still => 0.7,
            Agitation::Moderate => 1.0,
            Agitation::Strong => 1.5,
        }
    }
}

/// How a phase decides it is finished.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum EndCondition {
    /// Run until max_time.
    FixedDuration,
    /// Stop when the center-surface spread and the rate of change at the
    /// sampling position both fall under the solver tolerance.
    Equilibrium,
    /// Stop `hold_after_s` seconds after |dT/dt| at the sampling position
    /// first drops below `threshold_c_per_hr`.
    RateThreshold {
        threshold_c_per_hr: Real,
        hold_after_s: Real,
    },
}

/// One enabled phase of the cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseSpec {
    pub kind: PhaseKind,
    /// Target (furnace/tempering) or media (transfer/quench) temperature, deg C
    pub target_temperature: Real,
    /// Maximum phase duration, seconds
    pub max_time: Real,
    pub end_condition: EndCondition,
    /// Fractional sampling position for rate-based end detection
    /// (0 = center, 1 = surface).
    pub sampling_offset: Real,
    /// Heat transfer coefficient, W/(m^2 K)
    pub htc: Real,
    /// Surface emissivity for the radiative term; 0 disables radiation
    pub emissivity: Real,
    /// Quench agitation; ignored for other phases
    pub agitation: Agitation,
    /// Cold furnace: ambient ramps from a start temperature instead of
    /// jumping. Heating/tempering only.
    pub cold_furnace: Option<AmbientRamp>,
}

impl PhaseSpec {
    /// Austenitizing in a furnace, ending at thermal equilibrium.
    pub fn heating(target_temperature: Real, max_time: Real) -> Self {
        Self {
            kind: PhaseKind::Heating,
            target_temperature,
            max_time,
            end_condition: EndCondition::Equilibrium,
            sampling_offset: 0.0,
            htc: 25.0,
            emissivity: 0.85,
            agitation: Agitation::Moderate,
            cold_furnace: None,
        }
    }

    /// Air transfer from furnace to quench tank, fixed duration.
    pub fn transfer(ambient: Real, duration: Real) -> Self {
        Self {
            kind: PhaseKind::Transfer,
            target_temperature: ambient,
            max_time: duration,
            end_condition: EndCondition::FixedDuration,
            sampling_offset: 1.0,
            htc: 10.0,
            emissivity: 0.85,
            agitation: Agitation::Moderate,
            cold_furnace: None,
        }
    }

    /// Quench into media at `media_temperature`, fixed duration.
    pub fn quenching(media_temperature: Real, htc: Real, duration: Real) -> Self {
        Self {
            kind: PhaseKind::Quenching,
            target_temperature: media_temperature,
            max_time: duration,
            end_condition: EndCondition::FixedDuration,
            sampling_offset: 0.0,
            htc,
            emissivity: 0.0,
            agitation: Agitation::Moderate,
            cold_furnace: None,
        }
    }

    /// Tempering hold, ending at equilibrium.
    pub fn tempering(temperature: Real, max_time: Real) -> Self {
        Self {
            kind: PhaseKind::Tempering,
            target_temperature: temperature,
            max_time,
            end_condition: EndCondition::Equilibrium,
            sampling_offset: 0.0,
            htc: 25.0,
            emissivity: 0.85,
            agitation: Agitation::Moderate,
            cold_furnace: None,
        }
    }

    pub fn with_agitation(mut self, agitation: Agitation) -> Self {
        self.agitation = agitation;
        self
    }

    pub fn with_end_condition(mut self, end: EndCondition) -> Self {
        self.end_condition = end;
        self
    }

    pub fn with_sampling_offset(mut self, offset: Real) -> Self {
        self.sampling_offset = offset;
        self
    }

    pub fn with_cold_furnace(mut self, start_temperature: Real, rate_c_per_min: Real) -> Self {
        self.cold_furnace = Some(AmbientRamp {
            start_temperature,
            rate_c_per_min,
        });
        self
    }

    /// Effective HTC after agitation scaling (quench only).
    pub fn effective_htc(&self) -> Real {
        match self.kind {
            PhaseKind::Quenching => self.htc * self.agitation.htc_multiplier(),
            _ => self.htc,
        }
    }

    /// Boundary condition realized by this phase.
    pub fn boundary(&self) -> BoundaryCondition {
        let mut bc = BoundaryCondition::convective(self.effective_htc(), self.target_temperature)
            .with_radiation(self.emissivity);
        if let Some(ramp) = self.cold_furnace {
            bc = bc.with_ramp(ramp);
        }
        bc
    }

    fn validate(&self) -> ThermalResult<()> {
        if !self.max_time.is_finite() || self.max_time <= 0.0 {
            return Err(ThermalError::Configuration {
                what: format!("{:?}: max_time must be positive", self.kind),
            });
        }
        if self.htc < 0.0 {
            return Err(ThermalError::Configuration {
                what: format!("{:?}: htc must be non-negative", self.kind),
            });
        }
        if !(0.0..=1.0).contains(&self.sampling_offset) {
            return Err(ThermalError::Configuration {
                what: format!("{:?}: sampling_offset must be in [0, 1]", self.kind),
            });
        }
        if self.cold_furnace.is_some()
            && !matches!(self.kind, PhaseKind::Heating | PhaseKind::Tempering)
        {
            return Err(ThermalError::Configuration {
                what: format!("{:?}: cold_furnace only applies to heating/tempering", self.kind),
            });
        }
        if let EndCondition::RateThreshold {
            threshold_c_per_hr,
            hold_after_s,
        } = self.end_condition
        {
            if threshold_c_per_hr <= 0.0 || hold_after_s < 0.0 {
                return Err(ThermalError::Configuration {
                    what: format!("{:?}: invalid rate-threshold parameters", self.kind),
                });
            }
        }
        Ok(())
    }
}

/// Ordered set of enabled phases.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    phases: Vec<PhaseSpec>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a phase; ordering against already-added phases is enforced.
    pub fn push(mut self, phase: PhaseSpec) -> ThermalResult<Self> {
        if let Some(last) = self.phases.last() {
            if phase.kind <= last.kind {
                return Err(ThermalError::Configuration {
                    what: format!(
                        "phase order violated: {:?} cannot follow {:?}",
                        phase.kind, last.kind
                    ),
                });
            }
        }
        self.phases.push(phase);
        Ok(self)
    }

    pub fn phases(&self) -> &[PhaseSpec] {
        &self.phases
    }

    pub fn validate(&self) -> ThermalResult<()> {
        if self.phases.is_empty() {
            return Err(ThermalError::Configuration {
                what: "schedule has no enabled phases".to_string(),
            });
        }
        for phase in &self.phases {
            phase.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_order_enforced() {
        let schedule = Schedule::new()
            .push(PhaseSpec::quenching(25.0, 2000.0, 300.0))
            .unwrap();
        let err = schedule.push(PhaseSpec::heating(850.0, 3600.0));
        assert!(err.is_err());
    }

    #[test]
    fn full_cycle_accepted() {
        let schedule = Schedule::new()
            .push(PhaseSpec::heating(850.0, 7200.0))
            .unwrap()
            .push(PhaseSpec::transfer(25.0, 10.0))
            .unwrap()
            .push(PhaseSpec::quenching(25.0, 2000.0, 300.0))
            .unwrap()
            .push(PhaseSpec::tempering(550.0, 7200.0))
            .unwrap();
        assert!(schedule.validate().is_ok());
        assert_eq!(schedule.phases().len(), 4);
    }

    #[test]
    fn agitation_scales_quench_htc_only() {
        let quench =
            PhaseSpec::quenching(25.0, 2000.0, 300.0).with_agitation(Agitation::Strong);
        assert!((quench.effective_htc() - 3000.0).abs() < 1e-9);

        let heat = PhaseSpec::heating(850.0, 3600.0).with_agitation(Agitation::Strong);
        assert!((heat.effective_htc() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn cold_furnace_rejected_on_quench() {
        let mut quench = PhaseSpec::quenching(25.0, 2000.0, 300.0);
        quench.cold_furnace = Some(AmbientRamp {
            start_temperature: 25.0,
            rate_c_per_min: 10.0,
        });
        let schedule = Schedule::new().push(quench).unwrap();
        assert!(schedule.validate().is_err());
    }

    #[test]
    fn empty_schedule_invalid() {
        assert!(Schedule::new().validate().is_err());
    }
}
