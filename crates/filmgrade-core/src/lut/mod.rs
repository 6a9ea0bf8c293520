pub mod cube;

use std::path::Path;

use tracing::{debug, warn};

use crate::error::LutError;

/// Per-axis resolution of the identity cube used when a LUT can't be loaded.
pub const FALLBACK_SIZE: usize = 32;

/// Largest cube the loader accepts. Sizes follow the Adobe `.cube` range
/// `2..=MAX_SIZE`; a one-point cube is rejected as `InvalidSize`.
pub const MAX_SIZE: usize = 256;

/// Immutable 3D color lookup table.
///
/// Entries are RGBA in the 0..=255 range, stored flat with red varying
/// fastest: entry `(r, g, b)` lives at `(b * size² + g * size + r) * 4`.
/// `data.len() == size³ * 4` always holds.
#[derive(Clone, Debug, PartialEq)]
pub struct Lut {
    size: usize,
    data: Vec<f32>,
}

impl Lut {
    /// Identity cube: every entry maps its indices linearly back to 0..=255.
    ///
    /// `size` is clamped to `2..=MAX_SIZE`.
    pub fn identity(size: usize) -> Self {
        let size = size.clamp(2, MAX_SIZE);
        let max = (size - 1) as f32;
        let mut data = Vec::with_capacity(size * size * size * 4);
        for b in 0..size {
            for g in 0..size {
                for r in 0..size {
                    data.push(r as f32 * 255.0 / max);
                    data.push(g as f32 * 255.0 / max);
                    data.push(b as f32 * 255.0 / max);
                    data.push(255.0);
                }
            }
        }
        Self { size, data }
    }

    /// The 32³ identity cube substituted for unusable LUT sources.
    pub fn fallback() -> Self {
        Self::identity(FALLBACK_SIZE)
    }

    /// Build from flat RGBA entries, checking the `size³ * 4` invariant.
    pub(crate) fn from_entries(size: usize, data: Vec<f32>) -> Result<Self, LutError> {
        let expected = size * size * size;
        if data.len() != expected * 4 {
            return Err(LutError::RowCount {
                expected,
                found: data.len() / 4,
            });
        }
        Ok(Self { size, data })
    }

    /// Parse `.cube` text, substituting the identity cube on failure.
    pub fn from_cube_or_identity(text: &str) -> LutLoad {
        LutLoad::from_result(cube::parse(text))
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn entry_count(&self) -> usize {
        self.data.len() / 4
    }

    /// RGBA entry at the given quantized indices.
    pub fn entry(&self, r: usize, g: usize, b: usize) -> Option<[f32; 4]> {
        if r >= self.size || g >= self.size || b >= self.size {
            return None;
        }
        let offset = (b * self.size * self.size + g * self.size + r) * 4;
        let e = self.data.get(offset..offset + 4)?;
        Some([e[0], e[1], e[2], e[3]])
    }

    /// Nearest-neighbor lookup of a 0..=255 RGB triple.
    ///
    /// Each channel is quantized to `round(c / 255 * (size - 1))`; no
    /// interpolation between neighboring entries.
    pub fn sample(&self, rgb: [f32; 3]) -> [f32; 3] {
        let max = self.size.saturating_sub(1);
        let quantize = |c: f32| ((c / 255.0 * max as f32).round() as usize).min(max);
        let (r, g, b) = (quantize(rgb[0]), quantize(rgb[1]), quantize(rgb[2]));

        let offset = (b * self.size * self.size + g * self.size + r) * 4;
        if offset + 2 >= self.data.len() {
            return rgb;
        }
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ]
    }
}

/// Outcome of a forgiving LUT load: always a usable table, plus the reason
/// it had to fall back to identity, if it did.
#[derive(Debug)]
pub struct LutLoad {
    pub lut: Lut,
    pub error: Option<LutError>,
}

impl LutLoad {
    fn from_result(result: Result<Lut, LutError>) -> Self {
        match result {
            Ok(lut) => {
                debug!(size = lut.size(), "LUT loaded");
                Self { lut, error: None }
            }
            Err(err) => {
                warn!(%err, size = FALLBACK_SIZE, "LUT unusable, using identity");
                Self {
                    lut: Lut::fallback(),
                    error: Some(err),
                }
            }
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }

    pub fn into_lut(self) -> Lut {
        self.lut
    }
}

/// Read and parse a `.cube` file. Unreadable or malformed files yield the
/// identity cube together with the error.
pub fn read_cube_file(path: &Path) -> LutLoad {
    debug!(?path, "reading cube file");
    LutLoad::from_result(
        std::fs::read_to_string(path)
            .map_err(LutError::from)
            .and_then(|text| cube::parse(&text)),
    )
}
