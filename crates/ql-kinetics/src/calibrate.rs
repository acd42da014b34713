//! Fitting JMAK parameters to measured transformation data.
//!
//! Isothermal data is linearized (ln(-ln(1-X)) = n ln t + ln b) per hold
//! temperature, then the per-temperature coefficients are fitted to a
//! b(T) model. Continuous-cooling data scales an existing C-curve so
//! forward Scheil predictions match the observed fractions.
//!
//! Fits never touch the store on failure; parameters are written (and
//! the generation bumped) only after a successful fit validates.

use nalgebra::{Matrix3, Vector3};
use tracing::info;

use ql_core::{linear_fit, CancelToken, Real, KELVIN_OFFSET};

use crate::error::{KineticsError, KineticsResult};
use crate::jmak::GAS_CONSTANT;
use crate::scheil::ScheilTracker;
use crate::store::{BModel, DataSource, GradeKinetics, JmakParameters, Phase};

/// One isothermal hold measurement.
#[derive(Clone, Copy, Debug)]
pub struct IsothermalPoint {
    /// Hold temperature, deg C
    pub temperature: Real,
    /// Hold time, seconds
    pub time: Real,
    /// Transformed fraction observed, (0, 1)
    pub fraction: Real,
}

/// One continuous-cooling dilatometry measurement: the temperature at
/// which the phase was first detected (1% transformed) at a constant
/// cooling rate.
#[derive(Clone, Copy, Debug)]
pub struct CoolingPoint {
    /// Cooling rate, K/s
    pub cooling_rate: Real,
    /// Observed transformation-start temperature, deg C
    pub start_temperature: Real,
}

/// Which b(T) form an isothermal fit should produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BModelKind {
    Gaussian,
    Arrhenius,
}

/// Temperatures closer than this are treated as the same hold.
const TEMP_BUCKET: Real = 0.5;

fn calibration_err(what: impl Into<String>) -> KineticsError {
    KineticsError::Calibration { what: what.into() }
}

/// Fit JMAK parameters for `phase` from isothermal holds and store them.
pub fn calibrate_isothermal(
    kinetics: &mut GradeKinetics,
    phase: Phase,
    points: &[IsothermalPoint],
    model: BModelKind,
    cancel: &CancelToken,
) -> KineticsResult<()> {
    cancel.check()?;
    validate_isothermal_points(points)?;

    let groups = group_by_temperature(points);
    let (n, coefficients) = linearized_coefficients(&groups)?;
    cancel.check()?;

    let b = match model {
        BModelKind::Gaussian => fit_gaussian(&coefficients)?,
        BModelKind::Arrhenius => fit_arrhenius(&coefficients)?,
    };

    // Preserve the estimator's validity window when one exists, else
    // span the measured temperatures with a margin
    let (t_min, t_max) = match kinetics.jmak(phase) {
        Some(existing) => (existing.t_min, existing.t_max),
        None => {
            let lo = coefficients.iter().map(|c| c.0).fold(Real::INFINITY, Real::min);
            let hi = coefficients
                .iter()
                .map(|c| c.0)
                .fold(Real::NEG_INFINITY, Real::max);
            (lo - 10.0, hi + 10.0)
        }
    };

    let params = JmakParameters { n, b, t_min, t_max };
    params.validate()?;

    info!(%phase, n, points = points.len(), "isothermal calibration accepted");
    kinetics.set_jmak(phase, params)?;
    kinetics.set_source(DataSource::Calibrated {
        points: points.len(),
    });
    Ok(())
}

fn validate_isothermal_points(points: &[IsothermalPoint]) -> KineticsResult<()> {
    if points.len() < 3 {
        return Err(calibration_err(format!(
            "need at least 3 points, got {}",
            points.len()
        )));
    }
    for p in points {
        if !(p.fraction > 0.0 && p.fraction < 1.0) {
            return Err(calibration_err(format!(
                "fraction {} at {} deg C must be in (0, 1)",
                p.fraction, p.temperature
            )));
        }
        if !(p.time.is_finite() && p.time > 0.0) {
            return Err(calibration_err(format!(
                "hold time {} at {} deg C must be positive",
                p.time, p.temperature
            )));
        }
    }
    Ok(())
}

fn group_by_temperature(points: &[IsothermalPoint]) -> Vec<(Real, Vec<IsothermalPoint>)> {
    let mut groups: Vec<(Real, Vec<IsothermalPoint>)> = Vec::new();
    for &p in points {
        match groups
            .iter_mut()
            .find(|(t, _)| (*t - p.temperature).abs() <= TEMP_BUCKET)
        {
            Some((_, group)) => group.push(p),
            None => groups.push((p.temperature, vec![p])),
        }
    }
    groups
}

/// Shared Avrami exponent plus per-temperature (T, ln b) pairs.
fn linearized_coefficients(
    groups: &[(Real, Vec<IsothermalPoint>)],
) -> KineticsResult<(Real, Vec<(Real, Real)>)> {
    // y = ln(-ln(1-X)) = n ln t + ln b
    let transform = |p: &IsothermalPoint| ((1.0 / (1.0 - p.fraction)).ln().ln(), p.time.ln());

    let mut slopes = Vec::new();
    for (temp, group) in groups {
        if group.len() < 2 {
            continue;
        }
        let ys: Vec<Real> = group.iter().map(|p| transform(p).0).collect();
        let xs: Vec<Real> = group.iter().map(|p| transform(p).1).collect();
        let (slope, _) = linear_fit(&xs, &ys).ok_or_else(|| {
            calibration_err(format!("degenerate hold times at {temp} deg C"))
        })?;
        if !(slope.is_finite() && slope > 0.0) {
            return Err(calibration_err(format!(
                "non-physical Avrami exponent {slope} at {temp} deg C"
            )));
        }
        slopes.push(slope);
    }
    if slopes.is_empty() {
        return Err(calibration_err(
            "need at least one temperature with two or more hold times",
        ));
    }
    let n = slopes.iter().sum::<Real>() / slopes.len() as Real;

    let coefficients = groups
        .iter()
        .map(|(temp, group)| {
            let ln_b = group
                .iter()
                .map(|p| {
                    let (y, ln_t) = transform(p);
                    y - n * ln_t
                })
                .sum::<Real>()
                / group.len() as Real;
            (*temp, ln_b)
        })
        .collect();
    Ok((n, coefficients))
}

/// Gaussian b(T) from (T, ln b): ln b is quadratic in T, so the fit is
/// a 3x3 normal-equations solve.
fn fit_gaussian(coefficients: &[(Real, Real)]) -> KineticsResult<BModel> {
    if coefficients.len() < 3 {
        return Err(calibration_err(
            "Gaussian b(T) needs at least 3 distinct hold temperatures",
        ));
    }
    let mut ata = Matrix3::<Real>::zeros();
    let mut atb = Vector3::<Real>::zeros();
    for &(t, ln_b) in coefficients {
        let row = Vector3::new(1.0, t, t * t);
        ata += row * row.transpose();
        atb += row * ln_b;
    }
    let solution = ata
        .lu()
        .solve(&atb)
        .ok_or_else(|| calibration_err("singular system fitting b(T)"))?;
    let (a0, a1, a2) = (solution[0], solution[1], solution[2]);
    if a2 >= 0.0 {
        return Err(calibration_err(
            "fitted b(T) has no maximum; data shows no C-curve nose",
        ));
    }
    let sigma = (-1.0 / (2.0 * a2)).sqrt();
    let t_nose = -a1 / (2.0 * a2);
    let b_max = (a0 - a1 * a1 / (4.0 * a2)).exp();
    if !(b_max.is_finite() && b_max > 0.0 && sigma.is_finite()) {
        return Err(calibration_err("fitted Gaussian b(T) is not finite"));
    }
    Ok(BModel::Gaussian {
        b_max,
        t_nose,
        sigma,
    })
}

/// Arrhenius b(T) from (T, ln b): ln b is linear in 1/T_K.
fn fit_arrhenius(coefficients: &[(Real, Real)]) -> KineticsResult<BModel> {
    if coefficients.len() < 2 {
        return Err(calibration_err(
            "Arrhenius b(T) needs at least 2 distinct hold temperatures",
        ));
    }
    let xs: Vec<Real> = coefficients
        .iter()
        .map(|(t, _)| 1.0 / (t + KELVIN_OFFSET))
        .collect();
    let ys: Vec<Real> = coefficients.iter().map(|(_, ln_b)| *ln_b).collect();
    let (slope, intercept) =
        linear_fit(&xs, &ys).ok_or_else(|| calibration_err("degenerate temperatures"))?;
    let q = -slope * GAS_CONSTANT;
    let b0 = intercept.exp();
    if !(q.is_finite() && b0.is_finite() && b0 > 0.0) {
        return Err(calibration_err("fitted Arrhenius b(T) is not finite"));
    }
    Ok(BModel::Arrhenius { b0, q })
}

/// Scale an existing C-curve so forward Scheil predictions along linear
/// cooling paths reproduce the observed transformation-start
/// temperatures.
pub fn calibrate_continuous(
    kinetics: &mut GradeKinetics,
    phase: Phase,
    points: &[CoolingPoint],
    cancel: &CancelToken,
) -> KineticsResult<()> {
    cancel.check()?;
    if points.len() < 3 {
        return Err(calibration_err(format!(
            "need at least 3 points, got {}",
            points.len()
        )));
    }
    for p in points {
        if !(p.cooling_rate.is_finite() && p.cooling_rate > 0.0) {
            return Err(calibration_err(format!(
                "cooling rate {} must be positive",
                p.cooling_rate
            )));
        }
        if !p.start_temperature.is_finite() {
            return Err(calibration_err(format!(
                "start temperature {} is not finite",
                p.start_temperature
            )));
        }
    }
    let base = kinetics
        .jmak(phase)
        .cloned()
        .ok_or_else(|| KineticsError::DataUnavailable {
            what: format!("no stored C-curve for {phase} to scale"),
        })?;

    // Bounded search over a log-spaced rate multiplier
    let mut best = (1.0, Real::INFINITY, points.len());
    for i in 0..=120 {
        cancel.check()?;
        let scale = 10f64.powf(-3.0 + i as Real * 0.05);
        let (err, misses) = cooling_sse(kinetics, phase, &base, scale, points);
        if err < best.1 {
            best = (scale, err, misses);
        }
    }
    let (scale, sse, misses) = best;
    if !sse.is_finite() || misses > 0 {
        return Err(calibration_err(format!(
            "no rate scaling reproduces the observed start temperatures \
             ({misses} of {} points never reach 1% transformed)",
            points.len()
        )));
    }

    let params = JmakParameters {
        b: scale_model(&base.b, scale),
        ..base
    };
    params.validate()?;

    info!(%phase, scale, sse, points = points.len(), "continuous-cooling calibration accepted");
    kinetics.set_jmak(phase, params)?;
    kinetics.set_source(DataSource::Calibrated {
        points: points.len(),
    });
    Ok(())
}

fn scale_model(model: &BModel, scale: Real) -> BModel {
    match model {
        BModel::Gaussian {
            b_max,
            t_nose,
            sigma,
        } => BModel::Gaussian {
            b_max: b_max * scale,
            t_nose: *t_nose,
            sigma: *sigma,
        },
        BModel::Arrhenius { b0, q } => BModel::Arrhenius {
            b0: b0 * scale,
            q: *q,
        },
        BModel::Polynomial { coeffs } => BModel::Polynomial {
            coeffs: coeffs.iter().map(|c| c * scale).collect(),
        },
    }
}

/// Sum-of-squares error plus the number of points the scaled curve
/// cannot explain (never reaches 1% along their cooling paths).
fn cooling_sse(
    kinetics: &GradeKinetics,
    phase: Phase,
    base: &JmakParameters,
    scale: Real,
    points: &[CoolingPoint],
) -> (Real, usize) {
    // Penalty when the scaled curve never reaches 1% on a path where
    // the measurement says it did
    const MISS: Real = 500.0;

    let mut trial = kinetics.clone();
    let scaled = JmakParameters {
        b: scale_model(&base.b, scale),
        ..base.clone()
    };
    if trial.set_jmak(phase, scaled).is_err() {
        return (Real::INFINITY, points.len());
    }

    let mut sse = 0.0;
    let mut misses = 0;
    for p in points {
        let delta = match predict_start_temperature(&trial, phase, p.cooling_rate) {
            Some(predicted) => predicted - p.start_temperature,
            None => {
                misses += 1;
                MISS
            }
        };
        sse += delta * delta;
    }
    (sse, misses)
}

/// Temperature at which the phase first reaches 1% along a linear cool
/// from the austenitizing temperature at `rate` K/s.
fn predict_start_temperature(
    kinetics: &GradeKinetics,
    phase: Phase,
    rate: Real,
) -> Option<Real> {
    let start = kinetics.austenitizing_temperature;
    let total_time = (start - 20.0) / rate;
    let steps = 2000;
    let dt = total_time / steps as Real;

    let mut tracker = ScheilTracker::new(kinetics);
    for i in 0..steps {
        let t = start - rate * dt * (i as Real + 0.5);
        tracker.step(t, dt);
        if tracker.fractions().get(phase) >= 0.01 {
            return Some(t);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::{estimate_kinetics, RegressionTable};
    use crate::jmak;
    use ql_material::{Composition, Element};

    fn grade() -> GradeKinetics {
        let comp = Composition::new()
            .with(Element::C, 0.43)
            .with(Element::Mn, 0.85)
            .with(Element::Si, 0.30)
            .with(Element::Cr, 1.0)
            .with(Element::Mo, 0.22)
            .with(Element::Ni, 0.30);
        estimate_kinetics(&comp, &RegressionTable::default()).unwrap()
    }

    fn synthetic_points(truth: &JmakParameters, temps: &[Real]) -> Vec<IsothermalPoint> {
        let mut points = Vec::new();
        for &temp in temps {
            for &x in &[0.1, 0.5, 0.9] {
                let time = jmak::time_to_fraction(truth, temp, x).unwrap();
                points.push(IsothermalPoint {
                    temperature: temp,
                    time,
                    fraction: x,
                });
            }
        }
        points
    }

    #[test]
    fn gaussian_round_trip_recovers_parameters() {
        let truth = JmakParameters {
            n: 1.5,
            b: BModel::Gaussian {
                b_max: 0.02,
                t_nose: 640.0,
                sigma: 55.0,
            },
            t_min: 545.0,
            t_max: 730.0,
        };
        let points = synthetic_points(&truth, &[580.0, 620.0, 660.0, 700.0]);

        let mut g = grade();
        calibrate_isothermal(
            &mut g,
            Phase::Pearlite,
            &points,
            BModelKind::Gaussian,
            &CancelToken::none(),
        )
        .unwrap();

        let fitted = g.jmak(Phase::Pearlite).unwrap();
        assert!((fitted.n - 1.5).abs() / 1.5 < 0.05);
        match fitted.b {
            BModel::Gaussian {
                b_max,
                t_nose,
                sigma,
            } => {
                assert!((b_max - 0.02).abs() / 0.02 < 0.05, "b_max = {b_max}");
                assert!((t_nose - 640.0).abs() < 5.0, "t_nose = {t_nose}");
                assert!((sigma - 55.0).abs() / 55.0 < 0.05, "sigma = {sigma}");
            }
            ref other => panic!("expected Gaussian, got {other:?}"),
        }
        assert!(matches!(g.source, DataSource::Calibrated { points: 12 }));
    }

    #[test]
    fn arrhenius_round_trip_recovers_activation_energy() {
        let truth = JmakParameters {
            n: 2.0,
            b: BModel::Arrhenius {
                b0: 5.0e4,
                q: 1.1e5,
            },
            t_min: 545.0,
            t_max: 730.0,
        };
        let points = synthetic_points(&truth, &[580.0, 640.0, 700.0]);

        let mut g = grade();
        calibrate_isothermal(
            &mut g,
            Phase::Pearlite,
            &points,
            BModelKind::Arrhenius,
            &CancelToken::none(),
        )
        .unwrap();

        match g.jmak(Phase::Pearlite).unwrap().b {
            BModel::Arrhenius { q, .. } => {
                assert!((q - 1.1e5).abs() / 1.1e5 < 0.05, "Q = {q}");
            }
            ref other => panic!("expected Arrhenius, got {other:?}"),
        }
    }

    #[test]
    fn too_few_points_leaves_store_untouched() {
        let mut g = grade();
        let before = g.generation();
        let err = calibrate_isothermal(
            &mut g,
            Phase::Pearlite,
            &[IsothermalPoint {
                temperature: 620.0,
                time: 10.0,
                fraction: 0.5,
            }],
            BModelKind::Gaussian,
            &CancelToken::none(),
        );
        assert!(matches!(err, Err(KineticsError::Calibration { .. })));
        assert_eq!(g.generation(), before);
    }

    #[test]
    fn invalid_fraction_rejected() {
        let mut g = grade();
        let points = vec![
            IsothermalPoint {
                temperature: 620.0,
                time: 10.0,
                fraction: 1.0,
            };
            3
        ];
        let err = calibrate_isothermal(
            &mut g,
            Phase::Pearlite,
            &points,
            BModelKind::Gaussian,
            &CancelToken::none(),
        );
        assert!(matches!(err, Err(KineticsError::Calibration { .. })));
    }

    #[test]
    fn continuous_calibration_matches_start_temperatures() {
        let mut g = grade();
        // Truth: a steel transforming faster than the empirical estimate
        let mut truth = g.clone();
        let base = truth.jmak(Phase::Pearlite).unwrap().clone();
        let boosted = JmakParameters {
            b: super::scale_model(&base.b, 8.0),
            ..base
        };
        truth.set_jmak(Phase::Pearlite, boosted).unwrap();

        let rates = [0.2, 0.5, 1.0];
        let points: Vec<CoolingPoint> = rates
            .iter()
            .filter_map(|&rate| {
                super::predict_start_temperature(&truth, Phase::Pearlite, rate).map(
                    |start_temperature| CoolingPoint {
                        cooling_rate: rate,
                        start_temperature,
                    },
                )
            })
            .collect();
        assert_eq!(points.len(), 3, "truth must transform at all test rates");

        calibrate_continuous(&mut g, Phase::Pearlite, &points, &CancelToken::none()).unwrap();
        for p in &points {
            let predicted =
                super::predict_start_temperature(&g, Phase::Pearlite, p.cooling_rate)
                    .expect("calibrated curve transforms at measured rates");
            assert!(
                (predicted - p.start_temperature).abs() < 15.0,
                "rate {}: predicted {predicted} observed {}",
                p.cooling_rate,
                p.start_temperature
            );
        }
        assert!(matches!(g.source, DataSource::Calibrated { points: 3 }));
    }

    #[test]
    fn unreachable_start_temperatures_leave_store_untouched() {
        let mut g = grade();
        let before_gen = g.generation();
        let before_params = g.jmak(Phase::Pearlite).unwrap().clone();

        // Start temperatures well above Ae1: pearlite can never reach 1%
        // there, whatever the rate scaling
        let points: Vec<CoolingPoint> = [1200.0, 1250.0, 1300.0]
            .iter()
            .enumerate()
            .map(|(i, &start_temperature)| CoolingPoint {
                cooling_rate: 0.2 + 0.3 * i as Real,
                start_temperature,
            })
            .collect();

        let err = calibrate_continuous(&mut g, Phase::Pearlite, &points, &CancelToken::none());
        assert!(matches!(err, Err(KineticsError::Calibration { .. })));
        assert_eq!(g.generation(), before_gen);
        assert_eq!(
            g.jmak(Phase::Pearlite).unwrap(),
            &before_params,
            "failed fit must not overwrite stored parameters"
        );
    }

    #[test]
    fn cancellation_aborts_calibration() {
        let token = CancelToken::none();
        token.cancel();
        let mut g = grade();
        let err = calibrate_isothermal(
            &mut g,
            Phase::Pearlite,
            &[],
            BModelKind::Gaussian,
            &token,
        );
        assert!(matches!(err, Err(KineticsError::Cancelled)));
    }
}
