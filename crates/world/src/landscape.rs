use std::fmt;

use landscape_common::{Heightmap, MeshData, PathMask};
use landscape_noise::{NoiseField, NoiseSource};
use landscape_river::RiverChannel;
use landscape_terrain::{TerrainSurface, ZOffset, generate_heightmap, generate_path_mask};

use crate::config::LandscapeConfig;

/// A fully generated landscape: terrain, path mask and river.
///
/// Built in one pass from a config and a seed. Nothing is mutated after
/// generation; regenerate to change anything.
#[derive(Debug, Clone)]
pub struct Landscape {
    config: LandscapeConfig,
    seed: u64,
    z_offset: ZOffset,
    terrain: TerrainSurface,
    path_mask: PathMask,
    river: RiverChannel,
    river_mesh: MeshData,
}

impl Landscape {
    /// Generate with the built-in noise table.
    pub fn generate(config: &LandscapeConfig, seed: u64) -> Self {
        Self::generate_with(&NoiseField::new(), config, seed)
    }

    /// Generate with a caller-supplied noise source.
    pub fn generate_with<N: NoiseSource + ?Sized>(
        noise: &N,
        config: &LandscapeConfig,
        seed: u64,
    ) -> Self {
        let _span = tracing::info_span!("landscape", seed).entered();
        for warning in config.warnings() {
            tracing::warn!("{warning}");
        }

        let z_offset = ZOffset::from_seed(seed);
        let heightfield = &config.terrain.heightfield;
        let heightmap = generate_heightmap(noise, heightfield, z_offset);
        let path_mask = generate_path_mask(heightfield.resolution);
        let terrain = TerrainSurface::new(heightmap, config.terrain.surface);
        let river = RiverChannel::new(&config.river);
        let river_mesh = river.build_mesh();

        let landscape = Self {
            config: config.clone(),
            seed,
            z_offset,
            terrain,
            path_mask,
            river,
            river_mesh,
        };
        tracing::info!(
            z_offset = z_offset.0,
            hash = %format!("{:#018x}", landscape.state_hash()),
            "landscape generated"
        );
        landscape
    }

    pub fn config(&self) -> &LandscapeConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn z_offset(&self) -> ZOffset {
        self.z_offset
    }

    pub fn heightmap(&self) -> &Heightmap {
        self.terrain.heightmap()
    }

    pub fn path_mask(&self) -> &PathMask {
        &self.path_mask
    }

    pub fn terrain(&self) -> &TerrainSurface {
        &self.terrain
    }

    pub fn surface_mesh(&self) -> &MeshData {
        self.terrain.mesh()
    }

    pub fn river(&self) -> &RiverChannel {
        &self.river
    }

    pub fn river_mesh(&self) -> &MeshData {
        &self.river_mesh
    }

    /// FNV-1a hash over every generated buffer.
    ///
    /// Two landscapes with equal hashes were built from the same seed and
    /// produced bit-identical output.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.seed.to_le_bytes());
        mix(&mut h, &self.z_offset.0.to_le_bytes());
        for v in self.heightmap().as_slice() {
            mix(&mut h, &v.to_le_bytes());
        }
        mix(&mut h, self.path_mask.as_bytes());
        for mesh in [self.surface_mesh(), &self.river_mesh] {
            mix(&mut h, mesh.position_bytes());
            mix(&mut h, mesh.index_bytes());
        }
        h
    }

    pub fn summary(&self) -> LandscapeSummary {
        let surface = self.surface_mesh();
        LandscapeSummary {
            seed: self.seed,
            z_offset: self.z_offset.0,
            resolution: self.heightmap().resolution(),
            height_range: self.heightmap().min_max(),
            surface_vertices: surface.vertex_count(),
            surface_triangles: surface.triangle_count(),
            river_vertices: self.river_mesh.vertex_count(),
            river_triangles: self.river_mesh.triangle_count(),
            river_length: self.river.curve().approximate_length(200),
            state_hash: self.state_hash(),
        }
    }
}

/// Counts and ranges describing a generated landscape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandscapeSummary {
    pub seed: u64,
    pub z_offset: f64,
    pub resolution: usize,
    pub height_range: Option<(f32, f32)>,
    pub surface_vertices: usize,
    pub surface_triangles: usize,
    pub river_vertices: usize,
    pub river_triangles: usize,
    pub river_length: f32,
    pub state_hash: u64,
}

impl fmt::Display for LandscapeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "seed: {} (z offset {:.4})", self.seed, self.z_offset)?;
        match self.height_range {
            Some((lo, hi)) => writeln!(
                f,
                "terrain: {r}x{r}, heights {lo:.3} .. {hi:.3}",
                r = self.resolution
            )?,
            None => writeln!(f, "terrain: empty")?,
        }
        writeln!(
            f,
            "surface mesh: {} vertices, {} triangles",
            self.surface_vertices, self.surface_triangles
        )?;
        writeln!(
            f,
            "river mesh: {} vertices, {} triangles, length {:.2}",
            self.river_vertices, self.river_triangles, self.river_length
        )?;
        write!(f, "state hash: {:#018x}", self.state_hash)
    }
}
