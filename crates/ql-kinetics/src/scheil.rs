//! Scheil additivity tracking of diffusional transformation along an
//! arbitrary thermal path.
//!
//! At each step the current fraction of a phase is converted to a
//! virtual time at the new temperature, advanced by the step duration,
//! and re-evaluated. Each phase only grows inside its validity window;
//! leaving the window resets the phase's virtual time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ql_core::Real;

use crate::jmak;
use crate::martensite::koistinen_marburger;
use crate::store::{GradeKinetics, JmakParameters, Phase};

const FRACTION_CAP: Real = 1.0 - 1e-9;

/// Final phase constitution; fractions sum to 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseFractions {
    pub ferrite: Real,
    pub pearlite: Real,
    pub bainite: Real,
    pub martensite: Real,
    pub retained_austenite: Real,
}

impl PhaseFractions {
    pub fn get(&self, phase: Phase) -> Real {
        match phase {
            Phase::Ferrite => self.ferrite,
            Phase::Pearlite => self.pearlite,
            Phase::Bainite => self.bainite,
            Phase::Martensite => self.martensite,
            Phase::RetainedAustenite => self.retained_austenite,
        }
    }

    pub fn set(&mut self, phase: Phase, value: Real) {
        match phase {
            Phase::Ferrite => self.ferrite = value,
            Phase::Pearlite => self.pearlite = value,
            Phase::Bainite => self.bainite = value,
            Phase::Martensite => self.martensite = value,
            Phase::RetainedAustenite => self.retained_austenite = value,
        }
    }

    pub fn sum(&self) -> Real {
        self.ferrite + self.pearlite + self.bainite + self.martensite + self.retained_austenite
    }

    /// Untransformed austenite remaining (excludes retained austenite,
    /// which is only assigned at finalization).
    pub fn transformed(&self) -> Real {
        self.ferrite + self.pearlite + self.bainite + self.martensite
    }

    /// Dominant phase by fraction.
    pub fn dominant(&self) -> Phase {
        let mut best = (Phase::RetainedAustenite, self.retained_austenite);
        for phase in [
            Phase::Ferrite,
            Phase::Pearlite,
            Phase::Bainite,
            Phase::Martensite,
        ] {
            let f = self.get(phase);
            if f > best.1 {
                best = (phase, f);
            }
        }
        best.0
    }
}

/// Incremental transformation state along a cooling (or arbitrary) path.
#[derive(Clone, Debug)]
pub struct ScheilTracker {
    jmak: BTreeMap<Phase, JmakParameters>,
    martensite: crate::store::MartensiteParameters,
    virtual_time: BTreeMap<Phase, Real>,
    fractions: PhaseFractions,
    /// Coldest temperature seen, for athermal martensite
    min_temperature: Real,
    generation: u64,
}

impl ScheilTracker {
    pub fn new(kinetics: &GradeKinetics) -> Self {
        Self {
            jmak: kinetics
                .diffusional_phases()
                .map(|(p, params)| (p, params.clone()))
                .collect(),
            martensite: kinetics.martensite,
            virtual_time: BTreeMap::new(),
            fractions: PhaseFractions::default(),
            min_temperature: Real::INFINITY,
            generation: kinetics.generation(),
        }
    }

    /// False once the source parameters have been rewritten; the tracker
    /// must be rebuilt before further stepping.
    pub fn is_current(&self, kinetics: &GradeKinetics) -> bool {
        self.generation == kinetics.generation()
    }

    pub fn fractions(&self) -> PhaseFractions {
        self.fractions
    }

    /// Advance all diffusional phases through `dt` seconds at `temperature`.
    pub fn step(&mut self, temperature: Real, dt: Real) {
        if dt <= 0.0 {
            return;
        }
        self.min_temperature = self.min_temperature.min(temperature);

        for phase in Phase::DIFFUSIONAL {
            let Some(params) = self.jmak.get(&phase) else {
                continue;
            };
            if jmak::effective_rate(params, temperature) <= 0.0 {
                // Outside the window: growth stops and additivity restarts
                self.virtual_time.remove(&phase);
                continue;
            }

            let current = self.fractions.get(phase);
            // Austenite this phase may still consume
            let ceiling = (1.0 - (self.fractions.transformed() - current)).max(0.0);
            if ceiling <= 0.0 {
                continue;
            }

            let normalized = (current / ceiling).min(FRACTION_CAP);
            let t_virtual = jmak::time_to_fraction(params, temperature, normalized)
                .unwrap_or(0.0);
            let advanced = jmak::fraction(params, temperature, t_virtual + dt);
            self.virtual_time.insert(phase, t_virtual + dt);
            self.fractions.set(phase, (advanced * ceiling).min(ceiling));
        }
    }

    /// Fractions as they stand mid-path, with provisional athermal
    /// martensite from the coldest temperature seen and the balance as
    /// austenite. Sums to 1 at every point of a Tier-1 series.
    pub fn snapshot(&self) -> PhaseFractions {
        let mut f = self.fractions;
        let austenite = (1.0 - f.transformed()).max(0.0);
        let km = if self.min_temperature.is_finite() {
            koistinen_marburger(&self.martensite, self.min_temperature)
        } else {
            0.0
        };
        f.martensite = austenite * km;
        f.retained_austenite = (austenite * (1.0 - km)).max(0.0);
        f
    }

    /// Apply athermal martensite from the coldest temperature reached and
    /// assign the remainder to retained austenite. Fractions sum to 1.
    pub fn finalize(self) -> PhaseFractions {
        self.snapshot()
    }
}
