//! Terrain: heightfield synthesis, path blend mask, displaced surface mesh.
//!
//! # Invariants
//! - Octaves run strictly in order; radial shaping sees every earlier octave.
//! - Generators are total: degenerate resolutions yield empty or minimal output.
//! - The same noise table and z offset always reproduce the same terrain.

mod heightfield;
mod path_mask;
mod surface;

pub use heightfield::{
    HeightfieldParams, OCTAVES, Z_OFFSET_RANGE, ZOffset, center_distance, flatten_factor,
    generate_heightmap, valley_depth,
};
pub use path_mask::{FALLOFF, generate_path_mask, nearest_path_distance, path_alpha};
pub use surface::{SurfaceParams, TerrainSurface, build_surface_mesh};

pub fn crate_info() -> &'static str {
    "landscape-terrain v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("terrain"));
    }
}
