use landscape_common::{PathMask, grid_cells};

/// Alpha gained per normalized unit of distance from the nearest centerline.
/// Larger values make narrower paths.
pub const FALLOFF: f64 = 800.0;

/// Distance from normalized point `(x, y)` to the nearest path centerline.
///
/// Four corridors cross the map: a horizontal and a vertical one through the
/// center, and two diagonals of slope ±0.7.
pub fn nearest_path_distance(x: f64, y: f64) -> f64 {
    let horizontal = (y * 0.8).abs();
    let vertical = (x * 0.8).abs();
    let diagonal_up = (y - x * 0.7).abs();
    let diagonal_down = (y + x * 0.7).abs();
    horizontal.min(vertical).min(diagonal_up).min(diagonal_down)
}

/// Alpha byte for normalized point `(x, y)`: 0 on a path, 255 away from paths.
pub fn path_alpha(x: f64, y: f64) -> u8 {
    // Truncating float-to-byte conversion, as texture uploads do.
    (nearest_path_distance(x, y) * FALLOFF).min(255.0) as u8
}

/// Generate the RGBA path blend mask for a `resolution × resolution` texture.
///
/// Texel `(row i, column j)` maps to `x = j / res · 2 − 1`,
/// `y = i / res · 2 − 1`, so the center texel of an even-sized grid sits
/// exactly at the origin.
pub fn generate_path_mask(resolution: usize) -> PathMask {
    let _span = tracing::debug_span!("path_mask", resolution).entered();

    let Some(len) = grid_cells(resolution).and_then(|c| c.checked_mul(PathMask::CHANNELS)) else {
        tracing::warn!(resolution, "path mask resolution overflows; returning empty mask");
        return PathMask::default();
    };

    let size = resolution as f64;
    let mut texels = Vec::with_capacity(len);
    for i in 0..resolution {
        let y = i as f64 / size * 2.0 - 1.0;
        for j in 0..resolution {
            let x = j as f64 / size * 2.0 - 1.0;
            texels.extend_from_slice(&[255, 255, 255, path_alpha(x, y)]);
        }
    }

    PathMask::from_raw(resolution, texels).unwrap_or_default()
}
