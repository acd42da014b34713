//! TTT diagram contours derived from stored JMAK parameters.

use serde::{Deserialize, Serialize};

use ql_core::Real;

use crate::jmak;
use crate::store::{GradeKinetics, Phase};

/// Start/finish contour for one diffusional phase: points are
/// (time to fraction, temperature), hottest first.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TttCurve {
    pub phase: Phase,
    /// 1% transformed
    pub start: Vec<(Real, Real)>,
    /// 99% transformed
    pub finish: Vec<(Real, Real)>,
}

/// Contours for every phase with stored parameters, sampled at
/// `n_temps` temperatures across each validity window.
pub fn ttt_curves(kinetics: &GradeKinetics, n_temps: usize) -> Vec<TttCurve> {
    let n_temps = n_temps.max(2);
    kinetics
        .diffusional_phases()
        .map(|(phase, params)| {
            let mut start = Vec::with_capacity(n_temps);
            let mut finish = Vec::with_capacity(n_temps);
            let span = params.t_max - params.t_min;
            for i in 0..n_temps {
                // Sample strictly inside the window (t_min is exclusive)
                let frac = (i as Real + 0.5) / n_temps as Real;
                let temperature = params.t_max - frac * span;
                if let Some(t) = jmak::time_to_fraction(params, temperature, 0.01) {
                    start.push((t, temperature));
                }
                if let Some(t) = jmak::time_to_fraction(params, temperature, 0.99) {
                    finish.push((t, temperature));
                }
            }
            TttCurve {
                phase,
                start,
                finish,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{
        BModel, CriticalTemperatures, DataSource, JmakParameters, MartensiteParameters,
    };
    use ql_material::{Composition, Element};

    fn grade() -> GradeKinetics {
        let mut g = GradeKinetics::new(
            Composition::new().with(Element::C, 0.4),
            CriticalTemperatures {
                ae1: 727.0,
                ae3: 790.0,
                bs: 560.0,
                ms: 330.0,
                mf: 115.0,
            },
            MartensiteParameters {
                ms: 330.0,
                mf: 115.0,
                alpha: 0.011,
            },
            DataSource::Literature,
        )
        .unwrap();
        g.set_jmak(
            Phase::Pearlite,
            JmakParameters {
                n: 1.5,
                b: BModel::Gaussian {
                    b_max: 0.01,
                    t_nose: 620.0,
                    sigma: 60.0,
                },
                t_min: 560.0,
                t_max: 727.0,
            },
        )
        .unwrap();
        g
    }

    #[test]
    fn finish_follows_start_at_every_temperature() {
        let curves = ttt_curves(&grade(), 20);
        assert_eq!(curves.len(), 1);
        let curve = &curves[0];
        assert_eq!(curve.start.len(), curve.finish.len());
        for ((t1, temp1), (t99, temp99)) in curve.start.iter().zip(&curve.finish) {
            assert_eq!(temp1, temp99);
            assert!(t99 > t1);
        }
    }

    #[test]
    fn nose_is_fastest_point() {
        let curves = ttt_curves(&grade(), 40);
        let start = &curves[0].start;
        let min_time = start.iter().map(|(t, _)| *t).fold(Real::INFINITY, Real::min);
        let (_, nose_temp) = start
            .iter()
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .unwrap();
        // Nose sits near the Gaussian peak and is faster than the edges
        assert!((nose_temp - 620.0).abs() < 20.0);
        assert!(start.first().unwrap().0 > min_time);
        assert!(start.last().unwrap().0 > min_time);
    }
}
