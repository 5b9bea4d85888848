//! Error types for image ingestion, buffer construction and export.

use thiserror::Error;

/// Errors that can occur while loading, wrapping or exporting an image.
///
/// Rendering itself never fails: parameters are coerced rather than
/// rejected, and rendering without a loaded image is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PixelateError {
    /// The source bytes could not be decoded into an image.
    #[error("invalid source image: {reason}")]
    InvalidSource {
        /// Decoder message describing the failure.
        reason: String,
    },

    /// The image dimensions are invalid (zero or too large).
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// The width value.
        width: u32,
        /// The height value.
        height: u32,
        /// Why the dimensions are invalid.
        reason: &'static str,
    },

    /// A raw RGBA buffer does not hold exactly `width * height * 4` bytes.
    #[error("pixel buffer length {actual} does not match expected {expected}")]
    BufferLength {
        /// The expected length.
        expected: usize,
        /// The actual length.
        actual: usize,
    },

    /// PNG encoding of the rendered output failed.
    #[error("export error: {0}")]
    Export(String),
}
