//! River: spline centerlines and the channel ribbon mesh built along them.
//!
//! # Invariants
//! - A ribbon has exactly four vertices and two triangles per centerline segment.
//! - Degenerate centerlines (fewer than two points) yield an empty mesh, never an error.

mod curve;
mod ribbon;

pub use curve::{Curve, CurveKind};
pub use ribbon::{RiverChannel, RiverParams, build_ribbon};

pub fn crate_info() -> &'static str {
    "landscape-river v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("river"));
    }
}
