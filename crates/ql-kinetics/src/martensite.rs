//! Koistinen-Marburger athermal martensite formation.

use ql_core::Real;

use crate::store::MartensiteParameters;

/// Fraction of austenite transformed to martensite at `temperature`.
///
/// f = 1 - exp(-alpha * (Ms - T)) for T below Ms, zero above. Athermal:
/// depends only on the undercooling, not on time.
pub fn koistinen_marburger(params: &MartensiteParameters, temperature: Real) -> Real {
    if temperature >= params.ms {
        return 0.0;
    }
    let undercooling = params.ms - temperature;
    1.0 - (-params.alpha * undercooling).exp()
}
