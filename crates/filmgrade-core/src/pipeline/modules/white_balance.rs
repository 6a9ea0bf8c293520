use crate::image_buf::AdjustmentParams;
use crate::pipeline::module::ToneModule;

/// Red/blue cast shift. Green is left alone.
pub struct WhiteBalance;

impl ToneModule for WhiteBalance {
    fn name(&self) -> &str {
        "white_balance"
    }

    fn apply(&self, [r, g, b]: [f32; 3], params: &AdjustmentParams) -> [f32; 3] {
        let delta = params.white_balance * 2.0;
        [r + delta, g, b - delta]
    }
}
