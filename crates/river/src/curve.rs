use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Knot parameterization of a Catmull-Rom spline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CurveKind {
    /// Knot spacing `|Δ|^0.5`. Avoids cusps and self-intersections.
    #[default]
    Centripetal,
    /// Knot spacing `|Δ|`.
    Chordal,
    /// Uniform knots with tangents scaled by `tension`.
    Uniform { tension: f32 },
}

/// Smooth interpolating curve through an ordered list of control points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    points: Vec<Vec3>,
    kind: CurveKind,
}

impl Curve {
    /// Centripetal Catmull-Rom curve through `points`.
    pub fn new(points: Vec<Vec3>) -> Self {
        Self::with_kind(points, CurveKind::default())
    }

    pub fn with_kind(points: Vec<Vec3>, kind: CurveKind) -> Self {
        Self { points, kind }
    }

    pub fn control_points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    /// Point at parameter `t ∈ [0, 1]` (clamped).
    ///
    /// The parameter is spread evenly over segments, not over arc length.
    /// Returns `None` for curves with fewer than two control points.
    pub fn point_at(&self, t: f32) -> Option<Vec3> {
        let l = self.points.len();
        if l < 2 {
            return None;
        }

        let p = (l - 1) as f32 * t.clamp(0.0, 1.0);
        let mut seg = p.floor() as usize;
        let mut weight = p - seg as f32;
        if seg >= l - 1 {
            seg = l - 2;
            weight = 1.0;
        }

        let p1 = self.points[seg];
        let p2 = self.points[seg + 1];
        // Phantom end points mirror the neighbouring control point.
        let p0 = if seg > 0 {
            self.points[seg - 1]
        } else {
            p1 * 2.0 - p2
        };
        let p3 = if seg + 2 < l {
            self.points[seg + 2]
        } else {
            p2 * 2.0 - p1
        };

        let cubic = match self.kind {
            CurveKind::Centripetal => Cubic::nonuniform(p0, p1, p2, p3, 0.25),
            CurveKind::Chordal => Cubic::nonuniform(p0, p1, p2, p3, 0.5),
            CurveKind::Uniform { tension } => {
                Cubic::hermite(p1, p2, (p2 - p0) * tension, (p3 - p1) * tension)
            }
        };
        Some(cubic.eval(weight))
    }

    /// Sample `divisions + 1` points at evenly spaced parameters.
    ///
    /// Curves with fewer than two control points return their control points.
    pub fn points(&self, divisions: usize) -> Vec<Vec3> {
        if self.points.len() < 2 {
            return self.points.clone();
        }
        if divisions == 0 {
            return self.point_at(0.0).into_iter().collect();
        }
        (0..=divisions)
            .filter_map(|d| self.point_at(d as f32 / divisions as f32))
            .collect()
    }

    /// Length of the polyline through `divisions + 1` samples.
    pub fn approximate_length(&self, divisions: usize) -> f32 {
        self.points(divisions)
            .windows(2)
            .map(|w| w[0].distance(w[1]))
            .sum()
    }
}

/// Cubic `c0 + c1·t + c2·t² + c3·t³` with vector coefficients.
struct Cubic {
    c0: Vec3,
    c1: Vec3,
    c2: Vec3,
    c3: Vec3,
}

impl Cubic {
    /// Hermite segment from `x0` to `x1` with end tangents `t0`, `t1`.
    fn hermite(x0: Vec3, x1: Vec3, t0: Vec3, t1: Vec3) -> Self {
        Self {
            c0: x0,
            c1: t0,
            c2: -3.0 * x0 + 3.0 * x1 - 2.0 * t0 - t1,
            c3: 2.0 * x0 - 2.0 * x1 + t0 + t1,
        }
    }

    /// Non-uniform Catmull-Rom segment between `p1` and `p2`, knot spacing
    /// taken as `(squared distance)^pow`.
    fn nonuniform(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, pow: f32) -> Self {
        let mut dt0 = p0.distance_squared(p1).powf(pow);
        let mut dt1 = p1.distance_squared(p2).powf(pow);
        let mut dt2 = p2.distance_squared(p3).powf(pow);

        // Coincident points would divide by zero.
        if dt1 < 1e-4 {
            dt1 = 1.0;
        }
        if dt0 < 1e-4 {
            dt0 = dt1;
        }
        if dt2 < 1e-4 {
            dt2 = dt1;
        }

        let t1 = (p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1;
        let t2 = (p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2;
        Self::hermite(p1, p2, t1 * dt1, t2 * dt1)
    }

    fn eval(&self, t: f32) -> Vec3 {
        let t2 = t * t;
        let t3 = t2 * t;
        self.c0 + self.c1 * t + self.c2 * t2 + self.c3 * t3
    }
}
