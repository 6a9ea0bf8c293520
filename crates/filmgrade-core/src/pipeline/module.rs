use crate::image_buf::AdjustmentParams;

/// One step of the tone adjuster.
///
/// Works on a single pixel's RGB in the 0..=255 domain. Values are not
/// clamped between steps, so a module may see (and return) out-of-range
/// channels.
pub trait ToneModule: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&self, rgb: [f32; 3], params: &AdjustmentParams) -> [f32; 3];
}
