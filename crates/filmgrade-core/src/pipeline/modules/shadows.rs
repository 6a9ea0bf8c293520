use crate::image_buf::AdjustmentParams;
use crate::pipeline::module::ToneModule;

/// Channels below this are lifted when shadows are positive.
const SHADOW_THRESHOLD: f32 = 128.0;

/// Positive values scale each channel below 128 by `1 + f`, gated per
/// channel. Zero and negative values scale every channel by `1 + f`.
pub struct Shadows;

impl ToneModule for Shadows {
    fn name(&self) -> &str {
        "shadows"
    }

    fn apply(&self, rgb: [f32; 3], params: &AdjustmentParams) -> [f32; 3] {
        let f = params.shadows / 100.0;
        if f > 0.0 {
            rgb.map(|c| if c < SHADOW_THRESHOLD { c * (1.0 + f) } else { c })
        } else {
            rgb.map(|c| c * (1.0 + f))
        }
    }
}
