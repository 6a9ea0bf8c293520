use thiserror::Error;

/// Why a `.cube` source could not produce a well-formed [`crate::Lut`].
///
/// These never reach the pixel loop: the loader swaps in the identity
/// cube and reports the error alongside it.
#[derive(Debug, Error)]
pub enum LutError {
    #[error("no LUT_3D_SIZE directive found")]
    MissingSize,

    #[error("invalid LUT_3D_SIZE: {0}")]
    InvalidSize(String),

    #[error("expected {expected} data rows for the declared size, found {found}")]
    RowCount { expected: usize, found: usize },

    #[error("failed to read LUT source: {0}")]
    Io(#[from] std::io::Error),
}

/// Caller contract violations at the buffer boundary.
#[derive(Debug, Error)]
pub enum GradeError {
    #[error("expected {expected} bytes for {width}x{height} RGBA, got {actual}")]
    BufferLength {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("output buffer is {output_w}x{output_h} but input is {input_w}x{input_h}")]
    DimensionMismatch {
        input_w: u32,
        input_h: u32,
        output_w: u32,
        output_h: u32,
    },
}
