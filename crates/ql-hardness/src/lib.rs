//! ql-hardness: hardness and strength prediction.
//!
//! Maynier constituent hardness with rule-of-mixtures blending,
//! Hollomon-Jaffe tempering response, through-thickness profiles, and
//! rough tensile-property estimates.

pub mod error;
pub mod maynier;
pub mod mechanical;
pub mod profile;
pub mod tempering;

pub use error::{HardnessError, HardnessResult};
pub use maynier::{
    bainite_hv, ferrite_pearlite_hv, hv_to_hrc, martensite_hv, mixture_hv,
};
pub use mechanical::{from_hardness, toughness, MechanicalEstimate, ToughnessRating};
pub use profile::{hardness_profile, ProfilePoint};
pub use tempering::{hollomon_jaffe, tempered_hv, SofteningTable, TemperingSpec};
