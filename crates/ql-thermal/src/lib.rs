//! ql-thermal: 1D transient conduction through a heat-treatment cycle.
//!
//! Geometry (slab/cylinder/sphere) + material + phase schedule feed an
//! explicit finite-difference solver that chains each phase's final field
//! into the next phase's initial field.

pub mod boundary;
pub mod error;
pub mod geometry;
pub mod schedule;
pub mod solver;

pub use boundary::{AmbientRamp, BoundaryCondition};
pub use error::{ThermalError, ThermalResult};
pub use geometry::Geometry;
pub use schedule::{Agitation, EndCondition, PhaseKind, PhaseSpec, Schedule};
pub use solver::{
    cooling_rates, t8_5, MultiPhaseSolver, PhaseResult, SolverConfig, SolverOutput,
};
