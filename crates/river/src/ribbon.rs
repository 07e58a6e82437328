use glam::Vec3;
use landscape_common::MeshData;
use serde::{Deserialize, Serialize};

use crate::curve::{Curve, CurveKind};

/// Build a constant-width channel strip along a polyline.
///
/// Every segment gets its own four vertices (`current ± perp`, `next ±
/// perp`, all lowered by `depth`) and two triangles `(o, o+1, o+2)`,
/// `(o+1, o+3, o+2)`. Vertices are not shared between segments. With this
/// winding the face normals point down (−Y) for a strip in the XZ plane.
///
/// Fewer than two points yield an empty mesh.
pub fn build_ribbon(points: &[Vec3], width: f32, depth: f32) -> MeshData {
    let segments = points.len().saturating_sub(1);
    let mut mesh = MeshData::with_capacity(segments * 4, segments * 6);
    if segments == 0 {
        return mesh;
    }

    let half_width = width * 0.5;
    let drop = Vec3::new(0.0, depth, 0.0);

    for (i, pair) in points.windows(2).enumerate() {
        let (current, next) = (pair[0], pair[1]);
        let direction = (next - current).normalize_or_zero();
        let perpendicular = Vec3::new(-direction.z, 0.0, direction.x) * half_width;

        for v in [
            current + perpendicular,
            current - perpendicular,
            next + perpendicular,
            next - perpendicular,
        ] {
            mesh.positions.push((v - drop).to_array());
        }

        let offset = (i * 4) as u32;
        mesh.indices.extend_from_slice(&[
            offset,
            offset + 1,
            offset + 2,
            offset + 1,
            offset + 3,
            offset + 2,
        ]);
    }

    mesh.compute_normals();
    mesh
}

/// River channel layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverParams {
    /// Centerline control points, upstream first.
    pub control_points: Vec<Vec3>,
    pub curve: CurveKind,
    /// Channel width in world units.
    pub width: f32,
    /// How far the channel bed sits below the centerline.
    pub depth: f32,
    /// Number of curve segments sampled for the mesh.
    pub divisions: usize,
    /// Emit up-facing triangles instead of the default down-facing winding.
    pub flip_winding: bool,
}

impl Default for RiverParams {
    /// The river that winds from the lake past the pond and out of the valley.
    fn default() -> Self {
        Self {
            control_points: vec![
                Vec3::new(30.0, 0.0, 30.0),
                Vec3::new(25.0, 0.0, 20.0),
                Vec3::new(20.0, 0.0, 15.0),
                Vec3::new(15.0, 0.0, 15.0),
                Vec3::new(10.0, 0.0, 20.0),
                Vec3::new(5.0, 0.0, 25.0),
                Vec3::new(0.0, 0.0, 30.0),
                Vec3::new(-10.0, 0.0, 40.0),
            ],
            curve: CurveKind::Centripetal,
            width: 4.0,
            depth: 0.8,
            divisions: 50,
            flip_winding: false,
        }
    }
}

/// A river: its centerline curve plus the channel dimensions.
#[derive(Debug, Clone)]
pub struct RiverChannel {
    curve: Curve,
    width: f32,
    depth: f32,
    divisions: usize,
    flip_winding: bool,
}

impl RiverChannel {
    pub fn new(params: &RiverParams) -> Self {
        if params.control_points.len() < 2 {
            tracing::warn!(
                control_points = params.control_points.len(),
                "river needs at least two control points; channel will be empty"
            );
        }
        Self {
            curve: Curve::with_kind(params.control_points.clone(), params.curve),
            width: params.width,
            depth: params.depth,
            divisions: params.divisions,
            flip_winding: params.flip_winding,
        }
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Sampled centerline (`divisions + 1` points for a well-formed curve).
    pub fn centerline(&self) -> Vec<Vec3> {
        self.curve.points(self.divisions)
    }

    /// Channel bed mesh.
    pub fn build_mesh(&self) -> MeshData {
        let _span = tracing::debug_span!("river_mesh", divisions = self.divisions).entered();
        let mut mesh = build_ribbon(&self.centerline(), self.width, self.depth);
        if self.flip_winding {
            mesh.flip_winding();
        }
        tracing::debug!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "river mesh built"
        );
        mesh
    }
}
