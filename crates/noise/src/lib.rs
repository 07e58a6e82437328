//! Noise Source: coherent, band-limited pseudo-randomness for terrain synthesis.
//!
//! # Invariants
//! - Sampling is pure: identical inputs and table always yield bit-identical output.
//! - The permutation table is built once and never mutated afterwards.

mod perlin;

pub use perlin::{NoiseField, NoiseSource, PERMUTATION};

pub fn crate_info() -> &'static str {
    "landscape-noise v0.1.0"
}
