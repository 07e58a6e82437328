use landscape_common::{Heightmap, grid_cells};
use landscape_noise::NoiseSource;
use serde::{Deserialize, Serialize};

/// Number of noise layers accumulated into the height field.
pub const OCTAVES: u32 = 6;

/// Upper bound (exclusive) of the noise z offset derived from a seed.
pub const Z_OFFSET_RANGE: f64 = 100.0;

/// Inputs of the heightfield synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightfieldParams {
    /// Grid side length. Values below 2 produce a degenerate (but valid) grid.
    pub resolution: usize,
    /// Vertical scale of the first octave; halves every octave.
    pub amplitude: f32,
}

impl Default for HeightfieldParams {
    fn default() -> Self {
        Self {
            resolution: 128,
            amplitude: 10.0,
        }
    }
}

/// Position along the noise z axis that selects one 2D slice of the field.
///
/// Different offsets give unrelated terrains from the same noise table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZOffset(pub f64);

impl ZOffset {
    /// Map a seed to an offset in `[0, Z_OFFSET_RANGE)`.
    ///
    /// The seed is mixed with splitmix64 so neighbouring seeds land on
    /// unrelated slices.
    pub fn from_seed(seed: u64) -> Self {
        let mixed = splitmix64(seed);
        let unit = (mixed >> 11) as f64 / (1u64 << 53) as f64;
        Self(unit * Z_OFFSET_RANGE)
    }
}

/// Interior flattening multiplier for a cell at normalized distance `dist`
/// from the grid center: 1 at the center, 0.4 from `dist = 0.5` outwards.
pub fn flatten_factor(dist: f64) -> f64 {
    1.0 - (dist * 2.0).min(1.0).powi(3) * 0.6
}

/// Depth of the central valley bowl subtracted at normalized distance `dist`.
pub fn valley_depth(dist: f64, amplitude: f64) -> f64 {
    (dist * 3.0).powi(2) * amplitude * 0.1
}

/// Normalized distance of cell `(x, y)` from the grid center
/// (0 at the center, about 0.7 at the corners).
pub fn center_distance(x: usize, y: usize, resolution: usize) -> f64 {
    let res = resolution as f64;
    let nx = x as f64 / res - 0.5;
    let ny = y as f64 / res - 0.5;
    (nx * nx + ny * ny).sqrt()
}

/// Synthesize a height field from layered noise.
///
/// Each octave doubles the sampling period divisor (`quality`) and halves the
/// amplitude. After a cell receives an octave's noise it is flattened toward
/// the center and lowered into the valley bowl; this shaping runs every
/// octave on the running total, so its effect compounds.
pub fn generate_heightmap<N: NoiseSource + ?Sized>(
    noise: &N,
    params: &HeightfieldParams,
    z: ZOffset,
) -> Heightmap {
    let resolution = params.resolution;
    let _span = tracing::debug_span!("heightfield", resolution, z = z.0).entered();

    let Some(cells) = grid_cells(resolution) else {
        tracing::warn!(resolution, "heightfield resolution overflows; returning empty grid");
        return Heightmap::default();
    };
    if cells == 0 {
        tracing::warn!(resolution, "empty heightfield requested");
        return Heightmap::default();
    }
    let mut data = vec![0.0f32; cells];

    // Per-cell constants.
    let falloff: Vec<(f64, f64)> = (0..data.len())
        .map(|i| {
            let dist = center_distance(i % resolution, i / resolution, resolution);
            (dist, flatten_factor(dist))
        })
        .collect();

    let mut quality = 1.0f64;
    let mut amplitude = params.amplitude as f64;

    for octave in 0..OCTAVES {
        for (i, cell) in data.iter_mut().enumerate() {
            let x = (i % resolution) as f64;
            let y = (i / resolution) as f64;
            let (dist, flatten) = falloff[i];

            let n = noise.sample(x / quality, y / quality, z.0);
            *cell = (*cell as f64 + n * amplitude / quality) as f32;
            *cell = (*cell as f64 * flatten) as f32;
            *cell = (*cell as f64 - valley_depth(dist, amplitude)) as f32;
        }
        tracing::trace!(octave, quality, amplitude, "octave accumulated");

        quality *= 2.0;
        amplitude *= 0.5;
    }

    Heightmap::from_raw(resolution, data).unwrap_or_default()
}

/// Splitmix64 step used to spread seeds over the z range.
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use landscape_noise::NoiseField;

    struct FlatNoise;

    impl NoiseSource for FlatNoise {
        fn sample(&self, _x: f64, _y: f64, _z: f64) -> f64 {
            0.0
        }
    }

    struct ConstNoise(f64);

    impl NoiseSource for ConstNoise {
        fn sample(&self, _x: f64, _y: f64, _z: f64) -> f64 {
            self.0
        }
    }

    fn params(resolution: usize, amplitude: f32) -> HeightfieldParams {
        HeightfieldParams {
            resolution,
            amplitude,
        }
    }

    #[test]
    fn output_length_is_resolution_squared() {
        let h = generate_heightmap(&NoiseField::new(), &params(4, 10.0), ZOffset(12.5));
        assert_eq!(h.len(), 16);
        assert_eq!(h.resolution(), 4);
    }

    #[test]
    fn center_is_flattened_less_than_corner_is_lowered() {
        let center = center_distance(2, 2, 4);
        let corner = center_distance(0, 0, 4);
        assert_eq!(center, 0.0);
        assert!((corner - 0.5f64.hypot(0.5)).abs() < 1e-12);

        // Interior keeps its full value, edges are damped.
        assert_eq!(flatten_factor(center), 1.0);
        assert!((flatten_factor(corner) - 0.4).abs() < 1e-12);
        assert!(flatten_factor(center) > flatten_factor(corner));

        // Valley subtraction grows with distance.
        assert_eq!(valley_depth(center, 10.0), 0.0);
        assert!((valley_depth(corner, 10.0) - 4.5).abs() < 1e-9);
        assert!(valley_depth(corner, 10.0) > valley_depth(center, 10.0));
    }

    #[test]
    fn falloff_is_monotonic() {
        let mut prev_flatten = f64::INFINITY;
        let mut prev_valley = -1.0;
        for step in 0..=70 {
            let d = step as f64 / 100.0;
            assert!(flatten_factor(d) <= prev_flatten);
            assert!(valley_depth(d, 10.0) >= prev_valley);
            prev_flatten = flatten_factor(d);
            prev_valley = valley_depth(d, 10.0);
        }
    }

    #[test]
    fn flat_noise_leaves_only_the_valley() {
        let h = generate_heightmap(&FlatNoise, &params(4, 10.0), ZOffset(0.0));
        assert_eq!(h.get(2, 2), Some(0.0));
        for y in 0..4 {
            for x in 0..4 {
                if (x, y) != (2, 2) {
                    assert!(h.get(x, y).unwrap() < 0.0, "cell ({x}, {y}) not lowered");
                }
            }
        }
        assert_eq!(h.min_max().map(|(_, hi)| hi), Some(0.0));
    }

    #[test]
    fn shaping_is_reapplied_every_octave() {
        // With constant noise and no valley at the center the result is the
        // plain octave sum; at the corner it must match a per-octave replay.
        let amp = 8.0f64;
        let h = generate_heightmap(&ConstNoise(0.5), &params(4, amp as f32), ZOffset(0.0));

        let center: f64 = (0..OCTAVES)
            .map(|o| 0.5 * (amp / 2f64.powi(o as i32)) / 2f64.powi(o as i32))
            .sum();
        assert!((h.get(2, 2).unwrap() as f64 - center).abs() < 1e-4);

        let dist = center_distance(0, 0, 4);
        let mut expected = 0.0f64;
        let (mut q, mut a) = (1.0, amp);
        for _ in 0..OCTAVES {
            expected += 0.5 * a / q;
            expected *= flatten_factor(dist);
            expected -= valley_depth(dist, a);
            q *= 2.0;
            a *= 0.5;
        }
        assert!((h.get(0, 0).unwrap() as f64 - expected).abs() < 1e-4);

        // A single terminal pass would give a different corner height.
        let total: f64 = (0..OCTAVES).map(|o| 0.5 * amp / 4f64.powi(o as i32)).sum();
        let single_pass = total * flatten_factor(dist) - valley_depth(dist, amp);
        assert!((expected - single_pass).abs() > 0.1);
    }

    #[test]
    fn same_offset_is_reproducible() {
        let noise = NoiseField::new();
        let p = params(32, 10.0);
        let a = generate_heightmap(&noise, &p, ZOffset(42.0));
        let b = generate_heightmap(&noise, &p, ZOffset(42.0));
        assert_eq!(a, b);
    }

    #[test]
    fn different_offsets_diverge() {
        let noise = NoiseField::new();
        let p = params(16, 10.0);
        let a = generate_heightmap(&noise, &p, ZOffset(3.3));
        let b = generate_heightmap(&noise, &p, ZOffset(57.9));
        assert_ne!(a, b);
    }

    #[test]
    fn degenerate_resolutions_do_not_fail() {
        let noise = NoiseField::new();
        assert!(generate_heightmap(&noise, &params(0, 10.0), ZOffset(1.0)).is_empty());
        let single = generate_heightmap(&noise, &params(1, 10.0), ZOffset(1.0));
        assert_eq!(single.len(), 1);
        assert!(single.as_slice()[0].is_finite());
    }

    #[test]
    fn overflowing_resolution_gives_empty_grid() {
        let hm = generate_heightmap(&FlatNoise, &params(usize::MAX, 10.0), ZOffset(0.0));
        assert!(hm.is_empty());
        assert_eq!(hm.resolution(), 0);
    }

    #[test]
    fn seed_maps_into_range_deterministically() {
        for seed in [0u64, 1, 42, u64::MAX] {
            let z = ZOffset::from_seed(seed);
            assert!((0.0..Z_OFFSET_RANGE).contains(&z.0));
            assert_eq!(z, ZOffset::from_seed(seed));
        }
        assert_ne!(ZOffset::from_seed(1), ZOffset::from_seed(2));
    }
}
