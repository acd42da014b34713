//! Explicit finite-difference solver for the multi-phase cycle.
//!
//! Each phase advances the 1D field under its own boundary condition and
//! hands its final field to the next phase. The requested time step is
//! clamped to the explicit stability limit (interior and surface
//! half-cell bounds) and the clamp is recorded on the phase result.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ql_core::{nearly_equal, CancelToken, Real, Tolerances, TrackedPosition};
use ql_material::MaterialProperties;

use crate::boundary::BoundaryCondition;
use crate::error::{ThermalError, ThermalResult};
use crate::geometry::Geometry;
use crate::schedule::{EndCondition, PhaseKind, PhaseSpec, Schedule};

/// Solver configuration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Number of spatial nodes, center -> surface
    pub n_nodes: usize,
    /// Requested time step, seconds
    pub dt: Real,
    /// Hard cap on any single phase, seconds
    pub max_time: Real,
    /// Equilibrium tolerance (deg C for spread, deg C/s for rate)
    pub tolerance: Real,
    /// Record every N-th step (decimation)
    pub record_every: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            n_nodes: 51,
            dt: 0.05,
            max_time: 36_000.0,
            tolerance: 0.5,
            record_every: 10,
        }
    }
}

impl SolverConfig {
    fn validate(&self) -> ThermalResult<()> {
        if self.n_nodes < 3 {
            return Err(ThermalError::Configuration {
                what: format!("n_nodes must be >= 3, got {}", self.n_nodes),
            });
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ThermalError::Configuration {
                what: format!("dt must be positive, got {}", self.dt),
            });
        }
        if self.max_time <= 0.0 {
            return Err(ThermalError::Configuration {
                what: "max_time must be positive".to_string(),
            });
        }
        if self.tolerance <= 0.0 {
            return Err(ThermalError::Configuration {
                what: "tolerance must be positive".to_string(),
            });
        }
        if self.record_every == 0 {
            return Err(ThermalError::Configuration {
                what: "record_every must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Results from a single heat-treatment phase.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PhaseResult {
    pub kind: PhaseKind,
    /// Time points relative to phase start, seconds
    pub time: Vec<Real>,
    /// Time points from cycle start, seconds
    pub absolute_time: Vec<Real>,
    /// Field snapshots [time][node], deg C
    pub field: Vec<Vec<Real>>,
    /// Cooling time 800 -> 500 deg C at the center, if spanned
    pub t8_5: Option<Real>,
    /// Actual step used when the requested dt violated stability
    pub dt_clamped: Option<Real>,
    pub start_time: Real,
    pub end_time: Real,
}

impl PhaseResult {
    /// Temperature series at a tracked position.
    pub fn series_at(&self, pos: TrackedPosition) -> Vec<Real> {
        let n = self.field.first().map(Vec::len).unwrap_or(0);
        if n == 0 {
            return Vec::new();
        }
        let idx = pos.node_index(n);
        self.field.iter().map(|snapshot| snapshot[idx]).collect()
    }

    pub fn center_series(&self) -> Vec<Real> {
        self.series_at(TrackedPosition::Center)
    }

    pub fn surface_series(&self) -> Vec<Real> {
        self.series_at(TrackedPosition::Surface)
    }
}

/// Combined results from the full cycle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolverOutput {
    /// Node positions, center -> surface, meters
    pub positions: Vec<Real>,
    /// Absolute time points, seconds
    pub time: Vec<Real>,
    /// Field snapshots [time][node], deg C
    pub field: Vec<Vec<Real>>,
    /// t8/5 from the quench phase, if present and spanned
    pub t8_5: Option<Real>,
    pub phases: Vec<PhaseResult>,
}

impl SolverOutput {
    pub fn series_at(&self, pos: TrackedPosition) -> Vec<Real> {
        let idx = pos.node_index(self.positions.len());
        self.field.iter().map(|snapshot| snapshot[idx]).collect()
    }

    /// t8/5 at a tracked position (the stored `t8_5` is the center value).
    pub fn t8_5_at(&self, pos: TrackedPosition) -> Option<Real> {
        t8_5(&self.time, &self.series_at(pos))
    }
}

/// dT/dt by central differences, deg C/s (negative = cooling).
pub fn cooling_rates(times: &[Real], temps: &[Real]) -> Vec<Real> {
    let n = times.len();
    if n < 2 {
        return vec![0.0; n];
    }
    (0..n)
        .map(|i| {
            let (lo, hi) = if i == 0 {
                (0, 1)
            } else if i == n - 1 {
                (n - 2, n - 1)
            } else {
                (i - 1, i + 1)
            };
            let dt = times[hi] - times[lo];
            if dt.abs() < 1e-12 {
                0.0
            } else {
                (temps[hi] - temps[lo]) / dt
            }
        })
        .collect()
}

/// Cooling time from 800 to 500 deg C, linearly interpolated between
/// recorded points. None when the series never spans the range.
pub fn t8_5(times: &[Real], temps: &[Real]) -> Option<Real> {
    let t_800 = downward_crossing(times, temps, 800.0, 0)?;
    let idx_after = times.iter().position(|&t| t >= t_800.0)?;
    let t_500 = downward_crossing(times, temps, 500.0, idx_after)?;
    Some(t_500.0 - t_800.0)
}

/// First downward crossing of `level` at or after `from`, as (time, index).
fn downward_crossing(
    times: &[Real],
    temps: &[Real],
    level: Real,
    from: usize,
) -> Option<(Real, usize)> {
    for i in (from.max(1))..temps.len() {
        if temps[i - 1] > level && temps[i] <= level {
            let frac = (temps[i - 1] - level) / (temps[i - 1] - temps[i]);
            let t = times[i - 1] + frac * (times[i] - times[i - 1]);
            return Some((t, i));
        }
    }
    None
}

/// Multi-phase 1D transient conduction solver.
pub struct MultiPhaseSolver {
    geometry: Geometry,
    material: MaterialProperties,
    schedule: Schedule,
    config: SolverConfig,
}

impl MultiPhaseSolver {
    pub fn new(
        geometry: Geometry,
        material: MaterialProperties,
        schedule: Schedule,
        config: SolverConfig,
    ) -> ThermalResult<Self> {
        geometry.validate()?;
        material.validate()?;
        schedule.validate()?;
        config.validate()?;
        Ok(Self {
            geometry,
            material,
            schedule,
            config,
        })
    }

    /// Run the full cycle from a uniform initial temperature.
    pub fn solve(&self, initial_temperature: Real, cancel: &CancelToken) -> ThermalResult<SolverOutput> {
        let positions = self.geometry.mesh(self.config.n_nodes);
        let mut field = vec![initial_temperature; self.config.n_nodes];

        let mut phases = Vec::with_capacity(self.schedule.phases().len());
        let mut all_times: Vec<Real> = Vec::new();
        let mut all_fields: Vec<Vec<Real>> = Vec::new();
        let mut current_time = 0.0;

        for phase in self.schedule.phases() {
            cancel.check()?;

            let result = self.solve_phase(&field, &positions, phase, current_time)?;
            debug!(
                phase = ?phase.kind,
                duration_s = result.end_time - result.start_time,
                t8_5 = ?result.t8_5,
                "phase complete"
            );

            field = result
                .field
                .last()
                .cloned()
                .unwrap_or_else(|| field.clone());
            current_time = result.end_time;

            // Skip the first point of follow-on phases to avoid duplicates
            let skip = usize::from(!all_times.is_empty());
            all_times.extend(result.absolute_time.iter().skip(skip));
            all_fields.extend(result.field.iter().skip(skip).cloned());

            phases.push(result);
        }
        cancel.check()?;

        let t8_5 = phases
            .iter()
            .find(|p| p.kind == PhaseKind::Quenching)
            .and_then(|p| p.t8_5);

        Ok(SolverOutput {
            positions,
            time: all_times,
            field: all_fields,
            t8_5,
            phases,
        })
    }

    fn solve_phase(
        &self,
        initial_field: &[Real],
        positions: &[Real],
        phase: &PhaseSpec,
        start_time: Real,
    ) -> ThermalResult<PhaseResult> {
        let cfg = &self.config;
        let n = positions.len();
        let dx = positions[1] - positions[0];
        let dx2 = dx * dx;
        let m = self.geometry.shape_exponent();
        let bc = phase.boundary();
        let max_time = phase.max_time.min(cfg.max_time);
        let sample_idx = ((phase.sampling_offset * (n - 1) as Real).round() as usize).min(n - 1);

        let mut temp = initial_field.to_vec();
        let mut t = 0.0;
        let mut step = 0usize;

        let mut times = vec![0.0];
        let mut history = vec![temp.clone()];

        // End-condition bookkeeping
        let mut sample_rate = Real::INFINITY;
        let mut rate_trigger: Option<Real> = None;
        let mut dt_clamped: Option<Real> = None;

        while t < max_time {
            match phase.end_condition {
                EndCondition::FixedDuration => {}
                EndCondition::Equilibrium => {
                    let tol = Tolerances {
                        abs: cfg.tolerance,
                        rel: 0.0,
                    };
                    if step > 0
                        && nearly_equal(temp[0], temp[n - 1], tol)
                        && nearly_equal(sample_rate, 0.0, tol)
                    {
                        break;
                    }
                }
                EndCondition::RateThreshold {
                    threshold_c_per_hr,
                    hold_after_s,
                } => {
                    if step > 0 && sample_rate.abs() < threshold_c_per_hr / 3600.0 {
                        let trigger = *rate_trigger.get_or_insert(t);
                        if t - trigger >= hold_after_s {
                            break;
                        }
                    } else {
                        // Rate recovered; re-arm the trigger
                        rate_trigger = None;
                    }
                }
            }

            let dt = self.stable_dt(&temp, dx, dx2, m, phase, &bc, t, &mut dt_clamped);
            let next = self.step_field(&temp, positions, dx, dx2, m, &bc, t, dt);

            if next.iter().any(|v| !v.is_finite()) {
                return Err(ThermalError::Divergence {
                    phase: phase.kind,
                    elapsed_s: t,
                    last_temperature: temp[0],
                });
            }

            sample_rate = (next[sample_idx] - temp[sample_idx]) / dt;
            temp = next;
            t += dt;
            step += 1;

            if step % cfg.record_every == 0 {
                times.push(t);
                history.push(temp.clone());
            }
        }

        // Always record the final state
        if step % cfg.record_every != 0 {
            times.push(t);
            history.push(temp);
        }

        let center: Vec<Real> = history.iter().map(|s| s[0]).collect();
        let t8_5_value = t8_5(&times, &center);
        let absolute_time: Vec<Real> = times.iter().map(|v| v + start_time).collect();
        let end_time = start_time + times.last().copied().unwrap_or(0.0);

        Ok(PhaseResult {
            kind: phase.kind,
            time: times,
            absolute_time,
            field: history,
            t8_5: t8_5_value,
            dt_clamped,
            start_time,
            end_time,
        })
    }

    /// Requested dt, reduced to the explicit stability limit when needed.
    ///
    /// The limit is the tighter of the interior bound
    /// dx^2/(2*(1+m)*alpha) and the surface half-cell bound
    /// rho*cp*dx^2/(2*(k + h*dx)), where h is the linearized Robin
    /// coefficient. A strong quench on a coarse mesh makes the surface
    /// bound the binding one.
    #[allow(clippy::too_many_arguments)]
    fn stable_dt(
        &self,
        temp: &[Real],
        dx: Real,
        dx2: Real,
        m: Real,
        phase: &PhaseSpec,
        bc: &BoundaryCondition,
        t: Real,
        dt_clamped: &mut Option<Real>,
    ) -> Real {
        let alpha_max = temp
            .iter()
            .map(|&ti| self.material.diffusivity_at(ti))
            .fold(0.0, Real::max);
        let interior = dx2 / (2.0 * (1.0 + m) * alpha_max);

        let s = temp.len() - 1;
        let k_s = self.material.conductivity_at(temp[s]);
        let cp_s = self.material.specific_heat_at(temp[s]);
        let h = bc.linearized_coefficient(t, temp[s]);
        let surface = self.material.density * cp_s * dx2 / (2.0 * (k_s + h * dx));

        let limit = 0.9 * interior.min(surface);
        if self.config.dt > limit {
            if dt_clamped.is_none() {
                warn!(
                    phase = ?phase.kind,
                    requested = self.config.dt,
                    used = limit,
                    "time step reduced to stability limit"
                );
            }
            *dt_clamped = Some(match *dt_clamped {
                Some(prev) => prev.min(limit),
                None => limit,
            });
            limit
        } else {
            self.config.dt
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn step_field(
        &self,
        temp: &[Real],
        positions: &[Real],
        dx: Real,
        dx2: Real,
        m: Real,
        bc: &BoundaryCondition,
        t: Real,
        dt: Real,
    ) -> Vec<Real> {
        let n = temp.len();
        let mut next = temp.to_vec();

        // Interior nodes
        for i in 1..n - 1 {
            let alpha = self.material.diffusivity_at(temp[i]);
            let laplacian = (temp[i + 1] - 2.0 * temp[i] + temp[i - 1]) / dx2;
            let curvature = if m > 0.0 {
                m / positions[i] * (temp[i + 1] - temp[i - 1]) / (2.0 * dx)
            } else {
                0.0
            };
            next[i] = temp[i] + dt * alpha * (laplacian + curvature);
        }

        // Center: zero-flux symmetry, L'Hopital form of the m/r term
        let alpha_c = self.material.diffusivity_at(temp[0]);
        next[0] = temp[0] + dt * alpha_c * 2.0 * (1.0 + m) * (temp[1] - temp[0]) / dx2;

        // Surface: half-cell energy balance with the Robin flux
        let s = n - 1;
        let k_s = self.material.conductivity_at(temp[s]);
        let cp_s = self.material.specific_heat_at(temp[s]);
        let rho = self.material.density;
        let q = bc.heat_flux(t, temp[s]);
        next[s] = temp[s]
            + dt * (2.0 * k_s * (temp[s - 1] - temp[s]) / dx2 - 2.0 * q / dx) / (rho * cp_s);

        next
    }
}
