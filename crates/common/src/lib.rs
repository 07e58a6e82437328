//! Shared data model: height fields, path masks, triangle meshes.
//!
//! # Invariants
//! - Grids are square and row-major; lengths always match their resolution.
//! - Generated data is immutable once handed to a consumer.

mod mesh;
mod types;

pub use mesh::MeshData;
pub use types::{GridLengthError, Heightmap, PathMask, grid_cells};

pub fn crate_info() -> &'static str {
    "landscape-common v0.1.0"
}
