use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::GradeError;

/// Range of the exposure, white balance, highlights and shadows sliders.
pub const TONE_RANGE: RangeInclusive<f32> = -100.0..=100.0;

/// Range of the grain slider.
pub const GRAIN_RANGE: RangeInclusive<f32> = 0.0..=100.0;

/// 8-bit RGBA image buffer.
///
/// Pixel data is stored as interleaved RGBARGBA... in display-referred sRGB,
/// one byte per channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    /// Flat pixel data: [R, G, B, A, R, G, B, A, ...].
    pub data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn from_data(width: u32, height: u32, data: Vec<u8>) -> Result<Self, GradeError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(GradeError::BufferLength {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Downsample so the longest edge fits within `max_edge` pixels.
    /// Uses box averaging over all four channels. Returns a clone if already small enough.
    pub fn downsample(&self, max_edge: u32) -> Self {
        let longest = self.width.max(self.height);
        if longest <= max_edge || max_edge == 0 {
            return self.clone();
        }

        let scale = max_edge as f32 / longest as f32;
        let new_w = (self.width as f32 * scale).round().max(1.0) as u32;
        let new_h = (self.height as f32 * scale).round().max(1.0) as u32;

        let mut data = Vec::with_capacity(new_w as usize * new_h as usize * 4);

        for dst_y in 0..new_h {
            for dst_x in 0..new_w {
                let src_x0 = (dst_x as f32 / scale) as u32;
                let src_y0 = (dst_y as f32 / scale) as u32;
                let src_x1 = (((dst_x + 1) as f32 / scale).ceil() as u32).min(self.width);
                let src_y1 = (((dst_y + 1) as f32 / scale).ceil() as u32).min(self.height);

                let mut sum = [0u32; 4];
                let mut count = 0u32;

                for sy in src_y0..src_y1 {
                    for sx in src_x0..src_x1 {
                        let idx = (sy as usize * self.width as usize + sx as usize) * 4;
                        for (acc, &v) in sum.iter_mut().zip(&self.data[idx..idx + 4]) {
                            *acc += v as u32;
                        }
                        count += 1;
                    }
                }

                if count > 0 {
                    for acc in sum {
                        data.push(((acc as f32 / count as f32).round()) as u8);
                    }
                } else {
                    data.extend_from_slice(&[0, 0, 0, 255]);
                }
            }
        }

        Self {
            width: new_w,
            height: new_h,
            data,
        }
    }
}

/// The five grading sliders. A plain value, copied into every pipeline run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentParams {
    /// Brightness offset, -100..=100 (255 at the top of the range).
    pub exposure: f32,
    /// Red/blue cast shift, -100..=100.
    #[serde(alias = "whiteBalance")]
    pub white_balance: f32,
    /// Push toward white (positive) or scale everything down (negative), -100..=100.
    pub highlights: f32,
    /// Lift dark channels (positive) or scale everything down (negative), -100..=100.
    pub shadows: f32,
    /// Film grain strength, 0..=100.
    pub grain: f32,
}

impl AdjustmentParams {
    /// Copy with every control clamped to its slider range. NaN becomes neutral.
    pub fn clamped(&self) -> Self {
        fn clamp(v: f32, range: &RangeInclusive<f32>) -> f32 {
            if v.is_nan() {
                return 0.0;
            }
            v.clamp(*range.start(), *range.end())
        }

        Self {
            exposure: clamp(self.exposure, &TONE_RANGE),
            white_balance: clamp(self.white_balance, &TONE_RANGE),
            highlights: clamp(self.highlights, &TONE_RANGE),
            shadows: clamp(self.shadows, &TONE_RANGE),
            grain: clamp(self.grain, &GRAIN_RANGE),
        }
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }
}
