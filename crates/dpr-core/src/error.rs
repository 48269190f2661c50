use thiserror::Error;

#[derive(Error, Debug)]
pub enum DprError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Invalid image dimensions: {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("Invalid frame {index}: {reason}")]
    InvalidFrame { index: usize, reason: String },

    #[error("Empty image stack")]
    EmptyStack,

    #[error("Denoising failed: {0}")]
    Denoise(String),

    #[error("Processing cancelled after {completed} of {total} frames")]
    Cancelled { completed: usize, total: usize },

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

pub type Result<T> = std::result::Result<T, DprError>;
