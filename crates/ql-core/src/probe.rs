//! Tracked spatial positions.
//!
//! The solver records full field snapshots, but downstream consumers
//! (phase prediction, hardness) work at four canonical radial positions.

use serde::{Deserialize, Serialize};

/// Canonical tracked position along the center -> surface coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackedPosition {
    Center,
    OneThird,
    TwoThirds,
    Surface,
}

impl TrackedPosition {
    pub const ALL: [TrackedPosition; 4] = [
        TrackedPosition::Center,
        TrackedPosition::OneThird,
        TrackedPosition::TwoThirds,
        TrackedPosition::Surface,
    ];

    /// Fractional position from center (0.0) to surface (1.0).
    pub fn offset(self) -> f64 {
        match self {
            TrackedPosition::Center => 0.0,
            TrackedPosition::OneThird => 1.0 / 3.0,
            TrackedPosition::TwoThirds => 2.0 / 3.0,
            TrackedPosition::Surface => 1.0,
        }
    }

    /// Node index in a grid of `n_nodes` ordered center -> surface.
    pub fn node_index(self, n_nodes: usize) -> usize {
        debug_assert!(n_nodes >= 2);
        let last = n_nodes - 1;
        ((self.offset() * last as f64).round() as usize).min(last)
    }

    pub fn label(self) -> &'static str {
        match self {
            TrackedPosition::Center => "center",
            TrackedPosition::OneThird => "one_third",
            TrackedPosition::TwoThirds => "two_thirds",
            TrackedPosition::Surface => "surface",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_indices_span_grid() {
        assert_eq!(TrackedPosition::Center.node_index(51), 0);
        assert_eq!(TrackedPosition::Surface.node_index(51), 50);
        assert_eq!(TrackedPosition::OneThird.node_index(51), 17);
        assert_eq!(TrackedPosition::TwoThirds.node_index(51), 33);
    }

    #[test]
    fn surface_index_clamped_for_tiny_grids() {
        assert_eq!(TrackedPosition::Surface.node_index(2), 1);
    }
}
