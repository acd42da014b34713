//! ql-material: steel composition and thermophysical property inputs.

pub mod composition;
pub mod error;
pub mod property;

pub use composition::{Composition, Element};
pub use error::{MaterialError, MaterialResult};
pub use property::{MaterialProperties, Property};
