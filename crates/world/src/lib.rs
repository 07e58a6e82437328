//! Landscape assembly: scene config, one-shot generation, JSON export.
//!
//! # Invariants
//! - Generation order is fixed: heightmap, path mask, surface mesh, river mesh.
//! - The same config and seed always yield the same `state_hash`.
//! - Exports are content-addressed; a digest mismatch on load is an error.

mod config;
mod export;
mod landscape;

pub use config::{ConfigError, LandscapeConfig, TerrainConfig};
pub use export::{ExportBundle, ExportError};
pub use landscape::{Landscape, LandscapeSummary};

pub fn crate_info() -> &'static str {
    "landscape-world v0.1.0"
}
