//! ql-core: stable foundation for quenchlab.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - probe (tracked spatial positions shared by solver and predictors)
//! - cancel (cooperative cancellation/deadline token)
//! - error (shared error types)

pub mod cancel;
pub mod error;
pub mod numeric;
pub mod probe;

// Re-exports: nice ergonomics for downstream crates
pub use cancel::CancelToken;
pub use error::{QlError, QlResult};
pub use numeric::*;
pub use probe::TrackedPosition;
