//! Kinetic parameter store for a single steel grade.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use ql_core::Real;
use ql_material::Composition;

use crate::error::{KineticsError, KineticsResult};

/// Transformation products tracked through the cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    Ferrite,
    Pearlite,
    Bainite,
    Martensite,
    RetainedAustenite,
}

impl Phase {
    /// Phases governed by diffusional (JMAK) kinetics.
    pub const DIFFUSIONAL: [Phase; 3] = [Phase::Ferrite, Phase::Pearlite, Phase::Bainite];

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Ferrite => "ferrite",
            Phase::Pearlite => "pearlite",
            Phase::Bainite => "bainite",
            Phase::Martensite => "martensite",
            Phase::RetainedAustenite => "retained austenite",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Critical transformation temperatures, deg C.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CriticalTemperatures {
    pub ae1: Real,
    pub ae3: Real,
    pub bs: Real,
    pub ms: Real,
    pub mf: Real,
}

impl CriticalTemperatures {
    pub fn validate(&self) -> KineticsResult<()> {
        for (name, v) in [
            ("Ae1", self.ae1),
            ("Ae3", self.ae3),
            ("Bs", self.bs),
            ("Ms", self.ms),
            ("Mf", self.mf),
        ] {
            if !v.is_finite() {
                return Err(KineticsError::InvalidParameter {
                    what: format!("{name} is not finite"),
                });
            }
        }
        if self.ae3 < self.ae1 {
            return Err(KineticsError::InvalidParameter {
                what: format!("Ae3 ({}) below Ae1 ({})", self.ae3, self.ae1),
            });
        }
        if self.ms <= self.mf {
            return Err(KineticsError::InvalidParameter {
                what: format!("Ms ({}) must exceed Mf ({})", self.ms, self.mf),
            });
        }
        Ok(())
    }
}

/// Temperature dependence of the JMAK rate coefficient b(T).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BModel {
    /// C-curve: peak rate b_max at the nose temperature, Gaussian falloff
    Gaussian { b_max: Real, t_nose: Real, sigma: Real },
    /// b(T) = b0 * exp(-Q / (R * T_K)), Q in J/mol
    Arrhenius { b0: Real, q: Real },
    /// b(T) = sum c_i * T^i, T in deg C
    Polynomial { coeffs: Vec<Real> },
}

/// JMAK parameters for one diffusional phase.
///
/// The rate coefficient is zero outside the validity window
/// (t_min, t_max], so the phase cannot form there.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JmakParameters {
    /// Avrami exponent
    pub n: Real,
    pub b: BModel,
    /// Lower edge of the validity window, deg C (exclusive)
    pub t_min: Real,
    /// Upper edge of the validity window, deg C (inclusive)
    pub t_max: Real,
}

impl JmakParameters {
    pub fn validate(&self) -> KineticsResult<()> {
        if !(self.n.is_finite() && self.n > 0.0) {
            return Err(KineticsError::InvalidParameter {
                what: format!("JMAK exponent n must be positive, got {}", self.n),
            });
        }
        if self.t_min >= self.t_max {
            return Err(KineticsError::InvalidParameter {
                what: format!(
                    "empty validity window [{}, {}]",
                    self.t_min, self.t_max
                ),
            });
        }
        match &self.b {
            BModel::Gaussian { b_max, sigma, .. } => {
                if *b_max <= 0.0 || *sigma <= 0.0 {
                    return Err(KineticsError::InvalidParameter {
                        what: "Gaussian b model needs b_max > 0 and sigma > 0".to_string(),
                    });
                }
            }
            BModel::Arrhenius { b0, .. } => {
                if *b0 <= 0.0 {
                    return Err(KineticsError::InvalidParameter {
                        what: "Arrhenius b model needs b0 > 0".to_string(),
                    });
                }
            }
            BModel::Polynomial { coeffs } => {
                if coeffs.is_empty() {
                    return Err(KineticsError::InvalidParameter {
                        what: "polynomial b model needs at least one coefficient".to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Koistinen-Marburger athermal martensite parameters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MartensiteParameters {
    pub ms: Real,
    pub mf: Real,
    /// Rate constant, 1/K; 0.011 for most low-alloy steels
    pub alpha: Real,
}

impl MartensiteParameters {
    pub const DEFAULT_ALPHA: Real = 0.011;
}

/// Provenance of the stored kinetic parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    /// Composition-based regressions
    Empirical,
    /// Published diagrams entered directly
    Literature,
    /// Fitted from measured transformation data
    Calibrated { points: usize },
}

/// All kinetic data for one grade, with a generation counter that bumps
/// on every parameter change so cached derived state can detect staleness.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GradeKinetics {
    pub composition: Composition,
    pub critical: CriticalTemperatures,
    jmak: BTreeMap<Phase, JmakParameters>,
    pub martensite: MartensiteParameters,
    /// Temperature the grade was austenitized at, deg C
    pub austenitizing_temperature: Real,
    /// Prior-austenite grain size, ASTM number, when known
    pub grain_size_astm: Option<Real>,
    pub source: DataSource,
    generation: u64,
}

impl GradeKinetics {
    pub fn new(
        composition: Composition,
        critical: CriticalTemperatures,
        martensite: MartensiteParameters,
        source: DataSource,
    ) -> KineticsResult<Self> {
        critical.validate()?;
        Ok(Self {
            composition,
            critical,
            jmak: BTreeMap::new(),
            martensite,
            // Austenitizing defaults to 50 deg above Ae3
            austenitizing_temperature: critical.ae3 + 50.0,
            grain_size_astm: None,
            source,
            generation: 0,
        })
    }

    pub fn with_austenitizing(mut self, temperature: Real, grain_size_astm: Option<Real>) -> Self {
        self.austenitizing_temperature = temperature;
        self.grain_size_astm = grain_size_astm;
        self.generation += 1;
        self
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn jmak(&self, phase: Phase) -> Option<&JmakParameters> {
        self.jmak.get(&phase)
    }

    pub fn diffusional_phases(&self) -> impl Iterator<Item = (Phase, &JmakParameters)> {
        self.jmak.iter().map(|(p, params)| (*p, params))
    }

    pub fn has_diffusional_data(&self) -> bool {
        !self.jmak.is_empty()
    }

    /// Install JMAK parameters for a phase, invalidating cached state.
    pub fn set_jmak(&mut self, phase: Phase, params: JmakParameters) -> KineticsResult<()> {
        if !Phase::DIFFUSIONAL.contains(&phase) {
            return Err(KineticsError::InvalidParameter {
                what: format!("{phase} does not follow JMAK kinetics"),
            });
        }
        params.validate()?;
        self.jmak.insert(phase, params);
        self.generation += 1;
        Ok(())
    }

    pub fn set_martensite(&mut self, params: MartensiteParameters) -> KineticsResult<()> {
        if params.ms <= params.mf {
            return Err(KineticsError::InvalidParameter {
                what: format!("Ms ({}) must exceed Mf ({})", params.ms, params.mf),
            });
        }
        if params.alpha <= 0.0 {
            return Err(KineticsError::InvalidParameter {
                what: "Koistinen-Marburger alpha must be positive".to_string(),
            });
        }
        self.martensite = params;
        self.generation += 1;
        Ok(())
    }

    pub fn set_source(&mut self, source: DataSource) {
        self.source = source;
        self.generation += 1;
    }
}
