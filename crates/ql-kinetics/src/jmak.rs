//! Johnson-Mehl-Avrami-Kolmogorov isothermal transformation kinetics.
//!
//! X(t) = 1 - exp(-b(T) * t^n). The rate coefficient b(T) is zero
//! outside the phase's validity window.

use ql_core::{Real, KELVIN_OFFSET};

use crate::store::{BModel, JmakParameters};

/// Universal gas constant, J/(mol K).
pub const GAS_CONSTANT: Real = 8.314;

/// Exponent clamp keeping exp() arguments in range.
const MAX_EXPONENT: Real = 700.0;

/// Rate coefficient b(T), ignoring the validity window.
pub fn rate_coefficient(model: &BModel, temperature: Real) -> Real {
    match model {
        BModel::Gaussian {
            b_max,
            t_nose,
            sigma,
        } => {
            let z = (temperature - t_nose) / sigma;
            b_max * (-0.5 * z * z).exp()
        }
        BModel::Arrhenius { b0, q } => {
            let t_k = temperature + KELVIN_OFFSET;
            if t_k <= 0.0 {
                return 0.0;
            }
            b0 * (-(q / (GAS_CONSTANT * t_k)).min(MAX_EXPONENT)).exp()
        }
        BModel::Polynomial { coeffs } => coeffs
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * temperature + c)
            .max(0.0),
    }
}

/// b(T) with the validity window applied.
pub fn effective_rate(params: &JmakParameters, temperature: Real) -> Real {
    if temperature <= params.t_min || temperature > params.t_max {
        0.0
    } else {
        rate_coefficient(&params.b, temperature)
    }
}

/// Transformed fraction after holding `time` seconds at `temperature`.
pub fn fraction(params: &JmakParameters, temperature: Real, time: Real) -> Real {
    if time <= 0.0 {
        return 0.0;
    }
    let b = effective_rate(params, temperature);
    if b <= 0.0 {
        return 0.0;
    }
    let exponent = (b * time.powf(params.n)).min(MAX_EXPONENT);
    1.0 - (-exponent).exp()
}

/// Time to reach fraction `x` at `temperature`; None when the phase
/// cannot form there or `x` is outside (0, 1).
pub fn time_to_fraction(params: &JmakParameters, temperature: Real, x: Real) -> Option<Real> {
    if !(0.0..1.0).contains(&x) {
        return None;
    }
    if x == 0.0 {
        return Some(0.0);
    }
    let b = effective_rate(params, temperature);
    if b <= 0.0 {
        return None;
    }
    let ln_term = (1.0 / (1.0 - x)).ln();
    Some((ln_term / b).powf(1.0 / params.n))
}
