use std::path::Path;

use landscape_river::RiverParams;
use landscape_terrain::{HeightfieldParams, SurfaceParams};
use serde::{Deserialize, Serialize};

/// Errors from reading or writing a landscape config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Terrain half of the scene: the synthesized field and where its surface sits.
///
/// The path mask shares the heightfield resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub heightfield: HeightfieldParams,
    pub surface: SurfaceParams,
}

/// Everything needed to rebuild a landscape.
///
/// Missing keys fall back to the shipped scene, so an empty file is a valid
/// config. `seed` is optional; callers decide what to do when it is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandscapeConfig {
    pub seed: Option<u64>,
    pub terrain: TerrainConfig,
    pub river: RiverParams,
}

impl LandscapeConfig {
    /// Read a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "config loaded");
        Ok(config)
    }

    /// Write the config as YAML, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path.as_ref(), self.to_yaml()?)?;
        tracing::debug!(path = %path.as_ref().display(), "config saved");
        Ok(())
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Values outside the generators' intended domain.
    ///
    /// None of these are fatal: the generators still run and produce empty
    /// or flattened output.
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        let hf = &self.terrain.heightfield;
        if hf.resolution < 2 {
            out.push(format!(
                "terrain.heightfield.resolution = {} (needs at least 2)",
                hf.resolution
            ));
        }
        if !positive(hf.amplitude) {
            out.push(format!(
                "terrain.heightfield.amplitude = {} (expected a positive number)",
                hf.amplitude
            ));
        }
        if !positive(self.terrain.surface.size) {
            out.push(format!(
                "terrain.surface.size = {} (expected a positive number)",
                self.terrain.surface.size
            ));
        }
        if self.river.control_points.len() < 2 {
            out.push(format!(
                "river.control_points has {} entries (needs at least 2)",
                self.river.control_points.len()
            ));
        }
        if !positive(self.river.width) {
            out.push(format!(
                "river.width = {} (expected a positive number)",
                self.river.width
            ));
        }
        if self.river.divisions == 0 {
            out.push("river.divisions = 0 (the river collapses to a point)".to_string());
        }
        out
    }
}

fn positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use landscape_river::CurveKind;

    #[test]
    fn defaults_match_shipped_scene() {
        let config = LandscapeConfig::default();
        assert_eq!(config.seed, None);
        assert_eq!(config.terrain.heightfield.resolution, 128);
        assert_eq!(config.terrain.heightfield.amplitude, 10.0);
        assert_eq!(config.terrain.surface.size, 200.0);
        assert_eq!(config.river.control_points.len(), 8);
        assert_eq!(config.river.divisions, 50);
        assert_eq!(config.river.curve, CurveKind::Centripetal);
        assert!(config.warnings().is_empty());
    }

    #[test]
    fn empty_document_is_default() {
        let config = LandscapeConfig::from_yaml("{}").unwrap();
        assert_eq!(config, LandscapeConfig::default());
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let yaml = "\
seed: 7
terrain:
  heightfield:
    resolution: 32
river:
  width: 6.0
  curve:
    type: uniform
    tension: 0.5
";
        let config = LandscapeConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.terrain.heightfield.resolution, 32);
        assert_eq!(config.terrain.heightfield.amplitude, 10.0);
        assert_eq!(config.terrain.surface, SurfaceParams::default());
        assert_eq!(config.river.width, 6.0);
        assert_eq!(config.river.depth, 0.8);
        assert_eq!(config.river.curve, CurveKind::Uniform { tension: 0.5 });
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let err = LandscapeConfig::from_yaml("terrain: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = LandscapeConfig::load(tmp.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn save_and_load_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scene.yaml");

        let mut config = LandscapeConfig {
            seed: Some(1234),
            ..LandscapeConfig::default()
        };
        config.terrain.heightfield.resolution = 64;
        config.river.control_points = vec![Vec3::ZERO, Vec3::new(5.0, 0.0, 5.0)];
        config.river.curve = CurveKind::Chordal;

        config.save(&path).unwrap();
        let loaded = LandscapeConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn degenerate_values_are_reported() {
        let mut config = LandscapeConfig::default();
        config.terrain.heightfield.resolution = 1;
        config.terrain.heightfield.amplitude = f32::NAN;
        config.terrain.surface.size = 0.0;
        config.river.control_points.truncate(1);
        config.river.width = -1.0;
        config.river.divisions = 0;

        let warnings = config.warnings();
        assert_eq!(warnings.len(), 6);
        assert!(warnings[0].contains("resolution = 1"));
        assert!(warnings[3].contains("1 entries"));
    }
}
