//! JSON export of a generated landscape.
//!
//! The file is a small envelope around the payload:
//! ```text
//! {
//!   "format_version": 1,
//!   "sha256": "<hex digest of the compact payload JSON>",
//!   "payload": { seed, z_offset, config, heightmap, path_mask, surface, river }
//! }
//! ```
//! The digest is recomputed on load and a mismatch is rejected.

use std::path::Path;

use landscape_common::{Heightmap, MeshData, PathMask};
use landscape_river::CurveKind;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::LandscapeConfig;
use crate::landscape::Landscape;

/// Current export format version.
const EXPORT_FORMAT_VERSION: u32 = 1;

/// Errors from writing or reading an export file.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("integrity check failed: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },
    #[error("format version mismatch: file has v{file_version}, expected v{expected_version}")]
    FormatMismatch {
        file_version: u32,
        expected_version: u32,
    },
    #[error("{field} contains a non-finite value and cannot be exported")]
    NonFinite { field: &'static str },
}

/// Every generated buffer plus the inputs that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub seed: u64,
    pub z_offset: f64,
    pub config: LandscapeConfig,
    pub heightmap: Heightmap,
    pub path_mask: PathMask,
    pub surface: MeshData,
    pub river: MeshData,
}

#[derive(Serialize, Deserialize)]
struct ExportFile {
    format_version: u32,
    sha256: String,
    payload: ExportBundle,
}

impl ExportBundle {
    pub fn from_landscape(landscape: &Landscape) -> Self {
        Self {
            seed: landscape.seed(),
            z_offset: landscape.z_offset().0,
            config: landscape.config().clone(),
            heightmap: landscape.heightmap().clone(),
            path_mask: landscape.path_mask().clone(),
            surface: landscape.surface_mesh().clone(),
            river: landscape.river_mesh().clone(),
        }
    }

    /// Hex SHA-256 of the compact JSON encoding.
    pub fn digest(&self) -> Result<String, ExportError> {
        let bytes = serde_json::to_vec(self)?;
        Ok(sha256_hex(&bytes))
    }

    /// First field holding NaN or an infinity, if any.
    ///
    /// JSON has no encoding for these, so such a bundle cannot be read back.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        let hf = &self.config.terrain.heightfield;
        let surface = &self.config.terrain.surface;
        let river = &self.config.river;
        let tension = match river.curve {
            CurveKind::Uniform { tension } => tension,
            CurveKind::Centripetal | CurveKind::Chordal => 0.0,
        };
        [
            ("z_offset", self.z_offset.is_finite()),
            ("config.terrain.heightfield.amplitude", hf.amplitude.is_finite()),
            ("config.terrain.surface.size", surface.size.is_finite()),
            ("config.terrain.surface.offset", surface.offset.is_finite()),
            (
                "config.river.control_points",
                river.control_points.iter().all(|p| p.is_finite()),
            ),
            ("config.river.curve", tension.is_finite()),
            ("config.river.width", river.width.is_finite()),
            ("config.river.depth", river.depth.is_finite()),
            ("heightmap", all_finite(self.heightmap.as_slice())),
            ("surface", mesh_finite(&self.surface)),
            ("river", mesh_finite(&self.river)),
        ]
        .into_iter()
        .find_map(|(field, ok)| (!ok).then_some(field))
    }

    /// Write the bundle as pretty JSON. Returns the payload digest.
    ///
    /// Bundles with non-finite values are refused before anything is written.
    pub fn export_json(&self, path: impl AsRef<Path>) -> Result<String, ExportError> {
        let path = path.as_ref();
        if let Some(field) = self.non_finite_field() {
            tracing::warn!(path = %path.display(), field, "refusing to export non-finite values");
            return Err(ExportError::NonFinite { field });
        }
        let sha256 = self.digest()?;
        let file = ExportFile {
            format_version: EXPORT_FORMAT_VERSION,
            sha256: sha256.clone(),
            payload: self.clone(),
        };
        let writer = std::io::BufWriter::new(std::fs::File::create(path)?);
        serde_json::to_writer_pretty(writer, &file)?;
        tracing::info!(path = %path.display(), %sha256, "landscape exported");
        Ok(sha256)
    }

    /// Read a bundle back, failing closed on version or digest mismatch.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let reader = std::io::BufReader::new(std::fs::File::open(path)?);
        let file: ExportFile = serde_json::from_reader(reader)?;
        if file.format_version != EXPORT_FORMAT_VERSION {
            return Err(ExportError::FormatMismatch {
                file_version: file.format_version,
                expected_version: EXPORT_FORMAT_VERSION,
            });
        }
        let actual = file.payload.digest()?;
        if actual != file.sha256 {
            tracing::warn!(path = %path.display(), "export digest mismatch");
            return Err(ExportError::DigestMismatch {
                expected: file.sha256,
                actual,
            });
        }
        tracing::debug!(path = %path.display(), "landscape export loaded");
        Ok(file.payload)
    }
}

fn all_finite(values: &[f32]) -> bool {
    values.iter().all(|v| v.is_finite())
}

fn mesh_finite(mesh: &MeshData) -> bool {
    mesh.positions.iter().chain(&mesh.normals).all(|v| all_finite(v))
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
