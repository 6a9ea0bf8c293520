use crate::image_buf::AdjustmentParams;
use crate::pipeline::module::ToneModule;

pub struct Exposure;

impl ToneModule for Exposure {
    fn name(&self) -> &str {
        "exposure"
    }

    fn apply(&self, rgb: [f32; 3], params: &AdjustmentParams) -> [f32; 3] {
        if params.exposure == 0.0 {
            return rgb;
        }

        let delta = params.exposure * 2.55;
        rgb.map(|c| c + delta)
    }
}
