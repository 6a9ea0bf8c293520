pub mod decode;
pub mod error;
pub mod grain;
pub mod image_buf;
pub mod lut;
pub mod pipeline;

pub use error::{GradeError, LutError};
pub use image_buf::{AdjustmentParams, PixelBuffer};
pub use lut::{Lut, LutLoad};
pub use pipeline::Pipeline;
