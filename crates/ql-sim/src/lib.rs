//! ql-sim: end-to-end heat-treatment simulation.
//!
//! Wires the thermal solver, phase-transformation kinetics, and
//! hardness prediction into a single run that produces a [`SimReport`].

pub mod config;
pub mod error;
pub mod report;
pub mod runner;

pub use config::RunConfig;
pub use error::{SimError, SimResult};
pub use report::{PositionSummary, SimReport, SkippedSection};
pub use runner::run;

/// Install the default stderr tracing subscriber. Call once at process
/// start; later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .try_init();
}
