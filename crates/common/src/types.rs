use serde::{Deserialize, Serialize};

/// A grid whose buffer length does not match its resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("grid of resolution {resolution} cannot hold {actual} values")]
pub struct GridLengthError {
    pub resolution: usize,
    pub actual: usize,
}

/// Number of cells in a square grid, or `None` if it does not fit in `usize`.
pub fn grid_cells(resolution: usize) -> Option<usize> {
    resolution.checked_mul(resolution)
}

/// Square grid of elevation values, row-major (`index = y * resolution + x`).
///
/// Values are world-space vertical displacements. A heightmap is produced once
/// per terrain and never mutated afterwards; consumers only read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHeightmap")]
pub struct Heightmap {
    resolution: usize,
    data: Vec<f32>,
}

#[derive(Deserialize)]
struct RawHeightmap {
    resolution: usize,
    data: Vec<f32>,
}

impl TryFrom<RawHeightmap> for Heightmap {
    type Error = GridLengthError;

    fn try_from(raw: RawHeightmap) -> Result<Self, Self::Error> {
        let actual = raw.data.len();
        Self::from_raw(raw.resolution, raw.data).ok_or(GridLengthError {
            resolution: raw.resolution,
            actual,
        })
    }
}

impl Heightmap {
    /// A heightmap of `resolution²` zero cells. Empty if `resolution²` overflows.
    pub fn flat(resolution: usize) -> Self {
        match grid_cells(resolution) {
            Some(cells) => Self {
                resolution,
                data: vec![0.0; cells],
            },
            None => Self::default(),
        }
    }

    /// Wrap raw row-major data. Returns `None` if the length is not `resolution²`.
    pub fn from_raw(resolution: usize, data: Vec<f32>) -> Option<Self> {
        (grid_cells(resolution) == Some(data.len())).then_some(Self { resolution, data })
    }

    /// Grid side length.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Number of cells (`resolution²`).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read-only access to the row-major cell values.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Height of the cell at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.resolution || y >= self.resolution {
            return None;
        }
        self.data.get(y * self.resolution + x).copied()
    }

    /// Lowest and highest cell value, or `None` for an empty grid.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut iter = self.data.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), h| (lo.min(h), hi.max(h))))
    }

    /// Bilinearly sample the grid at normalized coordinates `u, v` in `[0, 1]`,
    /// where `(0, 0)` is the first cell and `(1, 1)` the last.
    ///
    /// Coordinates outside the unit square are clamped to the border.
    pub fn sample_bilinear(&self, u: f32, v: f32) -> Option<f32> {
        match self.resolution {
            0 => None,
            1 => self.data.first().copied(),
            res => {
                let max = (res - 1) as f32;
                let fx = (u.clamp(0.0, 1.0)) * max;
                let fy = (v.clamp(0.0, 1.0)) * max;
                let x0 = (fx.floor() as usize).min(res - 2);
                let y0 = (fy.floor() as usize).min(res - 2);
                let tx = fx - x0 as f32;
                let ty = fy - y0 as f32;

                let h00 = self.data[y0 * res + x0];
                let h10 = self.data[y0 * res + x0 + 1];
                let h01 = self.data[(y0 + 1) * res + x0];
                let h11 = self.data[(y0 + 1) * res + x0 + 1];

                let top = h00 + (h10 - h00) * tx;
                let bottom = h01 + (h11 - h01) * tx;
                Some(top + (bottom - top) * ty)
            }
        }
    }
}

/// RGBA8 texture-like mask marking path corridors.
///
/// RGB is always 255; alpha is 0 on a path centerline and 255 far from any
/// path. Texels are row-major, four bytes each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPathMask")]
pub struct PathMask {
    resolution: usize,
    texels: Vec<u8>,
}

#[derive(Deserialize)]
struct RawPathMask {
    resolution: usize,
    texels: Vec<u8>,
}

impl TryFrom<RawPathMask> for PathMask {
    type Error = GridLengthError;

    fn try_from(raw: RawPathMask) -> Result<Self, Self::Error> {
        let actual = raw.texels.len();
        Self::from_raw(raw.resolution, raw.texels).ok_or(GridLengthError {
            resolution: raw.resolution,
            actual,
        })
    }
}

impl PathMask {
    /// Bytes per texel (RGBA8).
    pub const CHANNELS: usize = 4;

    /// Wrap raw RGBA bytes. Returns `None` if the length is not `resolution² × 4`.
    pub fn from_raw(resolution: usize, texels: Vec<u8>) -> Option<Self> {
        let expected = grid_cells(resolution).and_then(|c| c.checked_mul(Self::CHANNELS));
        (expected == Some(texels.len())).then_some(Self { resolution, texels })
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Number of texels (`resolution²`).
    pub fn texel_count(&self) -> usize {
        self.texels.len() / Self::CHANNELS
    }

    pub fn is_empty(&self) -> bool {
        self.texels.is_empty()
    }

    /// Raw RGBA8 bytes, ready to upload as a texture.
    pub fn as_bytes(&self) -> &[u8] {
        &self.texels
    }

    /// Alpha of the texel at column `x`, row `y`.
    pub fn alpha(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.resolution || y >= self.resolution {
            return None;
        }
        self.texels
            .get((y * self.resolution + x) * Self::CHANNELS + 3)
            .copied()
    }

    /// Path blend weight in `[0, 1]`: 1 on a centerline, 0 away from paths.
    pub fn path_weight(&self, x: usize, y: usize) -> Option<f32> {
        self.alpha(x, y).map(|a| 1.0 - a as f32 / 255.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_heightmap_has_square_length() {
        let h = Heightmap::flat(4);
        assert_eq!(h.len(), 16);
        assert_eq!(h.min_max(), Some((0.0, 0.0)));
    }

    #[test]
    fn from_raw_rejects_wrong_length() {
        assert!(Heightmap::from_raw(3, vec![0.0; 8]).is_none());
        assert!(Heightmap::from_raw(3, vec![0.0; 9]).is_some());
        assert!(PathMask::from_raw(2, vec![255; 15]).is_none());
        assert!(PathMask::from_raw(2, vec![255; 16]).is_some());
    }

    #[test]
    fn get_is_row_major() {
        let h = Heightmap::from_raw(2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(h.get(1, 0), Some(2.0));
        assert_eq!(h.get(0, 1), Some(3.0));
        assert_eq!(h.get(2, 0), None);
    }

    #[test]
    fn bilinear_hits_corners_and_midpoint() {
        let h = Heightmap::from_raw(2, vec![0.0, 2.0, 4.0, 6.0]).unwrap();
        assert_eq!(h.sample_bilinear(0.0, 0.0), Some(0.0));
        assert_eq!(h.sample_bilinear(1.0, 1.0), Some(6.0));
        assert_eq!(h.sample_bilinear(0.5, 0.5), Some(3.0));
        // clamped outside the unit square
        assert_eq!(h.sample_bilinear(-1.0, 2.0), Some(4.0));
    }

    #[test]
    fn bilinear_on_degenerate_grids() {
        assert_eq!(Heightmap::flat(0).sample_bilinear(0.5, 0.5), None);
        let single = Heightmap::from_raw(1, vec![7.0]).unwrap();
        assert_eq!(single.sample_bilinear(0.3, 0.9), Some(7.0));
    }

    #[test]
    fn deserializing_checks_grid_length() {
        let h: Heightmap = serde_json::from_str(r#"{"resolution":2,"data":[1.0,2.0,3.0,4.0]}"#)
            .unwrap();
        assert_eq!(h.sample_bilinear(0.5, 0.5), Some(2.5));

        let err = serde_json::from_str::<Heightmap>(r#"{"resolution":4,"data":[1.0]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("resolution 4 cannot hold 1 values"));

        let mask = serde_json::from_str::<PathMask>(r#"{"resolution":1,"texels":[255,255,255]}"#);
        assert!(mask.is_err());
    }

    #[test]
    fn serialized_grids_load_back() {
        let h = Heightmap::from_raw(2, vec![0.5, -1.0, 2.0, 3.25]).unwrap();
        let back: Heightmap = serde_json::from_str(&serde_json::to_string(&h).unwrap()).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn overflowing_resolution_is_rejected() {
        assert_eq!(grid_cells(usize::MAX), None);
        assert!(Heightmap::flat(usize::MAX).is_empty());
        assert!(Heightmap::from_raw(usize::MAX, Vec::new()).is_none());
        assert!(PathMask::from_raw(usize::MAX, Vec::new()).is_none());
        assert!(PathMask::from_raw(1 << (usize::BITS / 2 - 1), Vec::new()).is_none());
    }

    #[test]
    fn path_mask_alpha_and_weight() {
        let mask = PathMask::from_raw(1, vec![255, 255, 255, 0]).unwrap();
        assert_eq!(mask.texel_count(), 1);
        assert_eq!(mask.alpha(0, 0), Some(0));
        assert_eq!(mask.path_weight(0, 0), Some(1.0));
        assert_eq!(mask.alpha(1, 0), None);
    }
}
