//! Surface boundary conditions.
//!
//! The surface sees convective plus radiative flux against an ambient
//! that may ramp over the phase (cold-furnace start). Flux is always
//! evaluated against live state: (elapsed phase time, surface temperature).

use serde::{Deserialize, Serialize};

use ql_core::{Real, KELVIN_OFFSET, STEFAN_BOLTZMANN};

/// Linear ambient ramp from `start_temperature` toward the target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmbientRamp {
    /// Furnace temperature when the part is loaded, deg C
    pub start_temperature: Real,
    /// Ramp rate, deg C per minute
    pub rate_c_per_min: Real,
}

/// Robin boundary condition: q = h*(Ts - Tamb) + eps*sigma*(Ts^4 - Tamb^4).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCondition {
    /// Heat transfer coefficient, W/(m^2 K)
    pub htc: Real,
    /// Ambient / media / furnace setpoint temperature, deg C
    pub ambient: Real,
    /// Surface emissivity; 0 disables the radiative term
    pub emissivity: Real,
    /// Cold-furnace ramp; None means the ambient jumps to `ambient`
    pub ramp: Option<AmbientRamp>,
}

impl BoundaryCondition {
    pub fn convective(htc: Real, ambient: Real) -> Self {
        Self {
            htc,
            ambient,
            emissivity: 0.0,
            ramp: None,
        }
    }

    pub fn with_radiation(mut self, emissivity: Real) -> Self {
        self.emissivity = emissivity;
        self
    }

    pub fn with_ramp(mut self, ramp: AmbientRamp) -> Self {
        self.ramp = Some(ramp);
        self
    }

    /// Ambient temperature seen by the surface at `elapsed` seconds into
    /// the phase. A ramp rises linearly and then holds at the setpoint.
    pub fn ambient_at(&self, elapsed: Real) -> Real {
        match self.ramp {
            Some(ramp) => {
                let ramped = ramp.start_temperature + ramp.rate_c_per_min / 60.0 * elapsed;
                if self.ambient >= ramp.start_temperature {
                    ramped.min(self.ambient)
                } else {
                    ramped.max(self.ambient)
                }
            }
            None => self.ambient,
        }
    }

    /// Linearized total transfer coefficient at `surface_temp`,
    /// W/(m^2 K): htc plus the radiative slope 4*eps*sigma*T^3 taken at
    /// the hotter of surface and ambient so the estimate bounds the
    /// true one.
    pub fn linearized_coefficient(&self, elapsed: Real, surface_temp: Real) -> Real {
        let ambient = self.ambient_at(elapsed);
        let t_hot = surface_temp.max(ambient) + KELVIN_OFFSET;
        self.htc + 4.0 * self.emissivity * STEFAN_BOLTZMANN * t_hot.powi(3)
    }

    /// Total outward heat flux from the surface, W/m^2.
    pub fn heat_flux(&self, elapsed: Real, surface_temp: Real) -> Real {
        let ambient = self.ambient_at(elapsed);
        let q_conv = self.htc * (surface_temp - ambient);

        let q_rad = if self.emissivity > 0.0 {
            let ts = surface_temp + KELVIN_OFFSET;
            let ta = ambient + KELVIN_OFFSET;
            self.emissivity * STEFAN_BOLTZMANN * (ts.powi(4) - ta.powi(4))
        } else {
            0.0
        };

        q_conv + q_rad
    }
}
