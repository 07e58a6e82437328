use glam::Vec3;
use landscape_common::{Heightmap, MeshData};
use serde::{Deserialize, Serialize};

/// Placement of the displaced terrain grid in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceParams {
    /// Side length of the square terrain footprint in world units.
    pub size: f32,
    /// Translation applied to every vertex (the footprint center sits here).
    pub offset: Vec3,
}

impl Default for SurfaceParams {
    fn default() -> Self {
        Self {
            size: 200.0,
            offset: Vec3::new(-100.0, -5.0, -100.0),
        }
    }
}

/// Build the displaced grid mesh for a heightmap.
///
/// Vertex `(col, row)` lands at `x = −size/2 + col·step`, `z = −size/2 +
/// row·step` with `step = size / (res − 1)` and `y` the cell height, then the
/// offset is added. Each grid cell becomes two up-facing triangles.
/// Heightmaps with fewer than 2×2 cells produce an empty mesh.
pub fn build_surface_mesh(heightmap: &Heightmap, params: &SurfaceParams) -> MeshData {
    let res = heightmap.resolution();
    let _span = tracing::debug_span!("surface_mesh", resolution = res).entered();
    if res < 2 {
        tracing::warn!(resolution = res, "heightmap too small for a surface mesh");
        return MeshData::new();
    }

    let half = params.size * 0.5;
    let step = params.size / (res - 1) as f32;
    let cells = res - 1;
    let mut mesh = MeshData::with_capacity(res * res, cells * cells * 6);

    for (i, &h) in heightmap.as_slice().iter().enumerate() {
        let col = (i % res) as f32;
        let row = (i / res) as f32;
        let local = Vec3::new(col * step - half, h, row * step - half);
        mesh.positions.push((local + params.offset).to_array());
    }

    let res = res as u32;
    for iy in 0..res - 1 {
        for ix in 0..res - 1 {
            let a = ix + res * iy;
            let b = ix + res * (iy + 1);
            let c = ix + 1 + res * (iy + 1);
            let d = ix + 1 + res * iy;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    mesh.compute_normals();
    tracing::debug!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "surface mesh built"
    );
    mesh
}

/// Walkable terrain: the height field together with its world placement and mesh.
#[derive(Debug, Clone)]
pub struct TerrainSurface {
    heightmap: Heightmap,
    params: SurfaceParams,
    mesh: MeshData,
}

impl TerrainSurface {
    pub fn new(heightmap: Heightmap, params: SurfaceParams) -> Self {
        let mesh = build_surface_mesh(&heightmap, &params);
        Self {
            heightmap,
            params,
            mesh,
        }
    }

    pub fn heightmap(&self) -> &Heightmap {
        &self.heightmap
    }

    pub fn params(&self) -> &SurfaceParams {
        &self.params
    }

    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    /// Whether world position `(x, z)` lies over the terrain footprint.
    pub fn contains(&self, x: f32, z: f32) -> bool {
        self.normalized(x, z).is_some()
    }

    /// Ground height at world position `(x, z)`, bilinearly interpolated
    /// between the four surrounding grid vertices. `None` off the footprint.
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        let (u, v) = self.normalized(x, z)?;
        self.heightmap
            .sample_bilinear(u, v)
            .map(|h| h + self.params.offset.y)
    }

    fn normalized(&self, x: f32, z: f32) -> Option<(f32, f32)> {
        let size = self.params.size;
        if size <= 0.0 {
            return None;
        }
        let u = (x - self.params.offset.x) / size + 0.5;
        let v = (z - self.params.offset.z) / size + 0.5;
        ((0.0..=1.0).contains(&u) && (0.0..=1.0).contains(&v)).then_some((u, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(res: usize) -> Heightmap {
        let data = (0..res * res).map(|i| (i % res) as f32).collect();
        Heightmap::from_raw(res, data).unwrap()
    }

    #[test]
    fn grid_counts() {
        let mesh = build_surface_mesh(&Heightmap::flat(5), &SurfaceParams::default());
        assert_eq!(mesh.vertex_count(), 25);
        assert_eq!(mesh.indices.len(), 6 * 4 * 4);
        assert_eq!(mesh.normals.len(), 25);
    }

    #[test]
    fn flat_terrain_faces_up() {
        let mesh = build_surface_mesh(&Heightmap::flat(4), &SurfaceParams::default());
        for n in &mesh.normals {
            assert!((Vec3::from_array(*n) - Vec3::Y).length() < 1e-6);
        }
    }

    #[test]
    fn footprint_is_centered_on_offset() {
        let params = SurfaceParams {
            size: 10.0,
            offset: Vec3::new(1.0, 2.0, 3.0),
        };
        let mesh = build_surface_mesh(&Heightmap::flat(3), &params);
        let (lo, hi) = mesh.bounds().unwrap();
        assert_eq!(lo, Vec3::new(-4.0, 2.0, -2.0));
        assert_eq!(hi, Vec3::new(6.0, 2.0, 8.0));
    }

    #[test]
    fn degenerate_heightmaps_give_empty_mesh() {
        assert!(build_surface_mesh(&Heightmap::flat(0), &SurfaceParams::default()).is_empty());
        assert!(build_surface_mesh(&Heightmap::flat(1), &SurfaceParams::default()).is_empty());
    }

    #[test]
    fn height_at_matches_vertices() {
        let params = SurfaceParams {
            size: 4.0,
            offset: Vec3::new(0.0, -1.0, 0.0),
        };
        let surface = TerrainSurface::new(ramp(5), params);
        // column 3 sits at x = -2 + 3 = 1; its height is 3, lowered by 1
        assert_eq!(surface.height_at(1.0, 0.0), Some(2.0));
        for p in &surface.mesh().positions {
            let h = surface.height_at(p[0], p[2]).unwrap();
            assert!((h - p[1]).abs() < 1e-5);
        }
    }

    #[test]
    fn height_between_vertices_is_interpolated() {
        let params = SurfaceParams {
            size: 4.0,
            offset: Vec3::ZERO,
        };
        let surface = TerrainSurface::new(ramp(5), params);
        let h = surface.height_at(0.5, 0.25).unwrap();
        assert!((h - 2.5).abs() < 1e-5);
    }

    #[test]
    fn outside_footprint_is_none() {
        let surface = TerrainSurface::new(Heightmap::flat(4), SurfaceParams::default());
        assert!(surface.contains(-100.0, -100.0));
        assert!(!surface.contains(50.0, -100.0));
        assert_eq!(surface.height_at(0.5, -250.0), None);
    }
}
