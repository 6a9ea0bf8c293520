use crate::image_buf::AdjustmentParams;
use crate::pipeline::module::ToneModule;

/// Positive values pull every channel toward white by `f` of its remaining
/// headroom. Zero and negative values scale every channel by `1 + f`.
pub struct Highlights;

impl ToneModule for Highlights {
    fn name(&self) -> &str {
        "highlights"
    }

    fn apply(&self, rgb: [f32; 3], params: &AdjustmentParams) -> [f32; 3] {
        let f = params.highlights / 100.0;
        if f > 0.0 {
            rgb.map(|c| c + (255.0 - c) * f)
        } else {
            rgb.map(|c| c + c * f)
        }
    }
}
