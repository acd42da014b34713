//! Full-cycle integration tests for the thermal solver.

use ql_core::{CancelToken, TrackedPosition};
use ql_material::MaterialProperties;
use ql_thermal::{
    Geometry, MultiPhaseSolver, PhaseKind, PhaseSpec, Schedule, SolverConfig,
};

fn config() -> SolverConfig {
    SolverConfig {
        n_nodes: 21,
        dt: 0.005,
        record_every: 20,
        ..SolverConfig::default()
    }
}

fn quench_t8_5(htc: f64) -> Option<f64> {
    let schedule = Schedule::new()
        .push(PhaseSpec::quenching(25.0, htc, 300.0))
        .unwrap();
    let solver = MultiPhaseSolver::new(
        Geometry::Slab { half_thickness: 0.01 },
        MaterialProperties::steel_defaults(),
        schedule,
        config(),
    )
    .unwrap();
    solver
        .solve(850.0, &CancelToken::none())
        .unwrap()
        .t8_5
}

#[test]
fn water_quench_faster_than_oil() {
    // Water ~3000 W/(m^2 K), oil ~1200: stronger cooling, shorter t8/5
    let water = quench_t8_5(3000.0).expect("water quench spans 800-500");
    let oil = quench_t8_5(1200.0).expect("oil quench spans 800-500");
    assert!(water < oil, "water t8/5 {water} should be below oil {oil}");
    assert!(water > 0.0);
}

#[test]
fn surface_leads_center_during_quench() {
    let schedule = Schedule::new()
        .push(PhaseSpec::quenching(25.0, 2000.0, 60.0))
        .unwrap();
    let solver = MultiPhaseSolver::new(
        Geometry::Cylinder { radius: 0.015 },
        MaterialProperties::steel_defaults(),
        schedule,
        config(),
    )
    .unwrap();
    let out = solver.solve(850.0, &CancelToken::none()).unwrap();
    let center = out.series_at(TrackedPosition::Center);
    let surface = out.series_at(TrackedPosition::Surface);
    // After the initial instant the surface must be cooler than the center
    for (c, s) in center.iter().zip(&surface).skip(1) {
        assert!(s <= c, "surface {s} above center {c}");
    }
}

#[test]
fn phases_chain_field_continuously() {
    let schedule = Schedule::new()
        .push(PhaseSpec::transfer(25.0, 10.0))
        .unwrap()
        .push(PhaseSpec::quenching(25.0, 2000.0, 60.0))
        .unwrap();
    let solver = MultiPhaseSolver::new(
        Geometry::Slab { half_thickness: 0.01 },
        MaterialProperties::steel_defaults(),
        schedule,
        config(),
    )
    .unwrap();
    let out = solver.solve(850.0, &CancelToken::none()).unwrap();
    assert_eq!(out.phases.len(), 2);
    assert_eq!(out.phases[0].kind, PhaseKind::Transfer);
    assert_eq!(out.phases[1].kind, PhaseKind::Quenching);

    // Final transfer field == initial quench field, node by node
    let handoff = out.phases[0].field.last().unwrap();
    let pickup = out.phases[1].field.first().unwrap();
    for (a, b) in handoff.iter().zip(pickup) {
        assert!((a - b).abs() < 1e-12);
    }

    // Absolute time is monotone across the combined record
    for pair in out.time.windows(2) {
        assert!(pair[1] > pair[0]);
    }
}

#[test]
fn out_of_order_phases_rejected() {
    let err = Schedule::new()
        .push(PhaseSpec::quenching(25.0, 2000.0, 60.0))
        .unwrap()
        .push(PhaseSpec::transfer(25.0, 10.0));
    assert!(err.is_err());
}

#[test]
fn sphere_cools_faster_than_slab_of_same_extent() {
    let make = |geometry: Geometry| {
        let schedule = Schedule::new()
            .push(PhaseSpec::quenching(25.0, 2000.0, 300.0))
            .unwrap();
        MultiPhaseSolver::new(
            geometry,
            MaterialProperties::steel_defaults(),
            schedule,
            config(),
        )
        .unwrap()
        .solve(850.0, &CancelToken::none())
        .unwrap()
        .t8_5
        .expect("spans 800-500")
    };
    let slab = make(Geometry::Slab { half_thickness: 0.01 });
    let sphere = make(Geometry::Sphere { radius: 0.01 });
    assert!(sphere < slab);
}
