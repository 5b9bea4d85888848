//! Image ingestion and PNG export.
//!
//! Decoding accepts any format enabled on the `image` dependency and
//! always yields RGBA8. Export writes 8-bit RGBA PNG with the `png` crate.

use std::io::Cursor;

use crate::buffer::PixelBuffer;
use crate::error::PixelateError;

/// File name suggested for downloads of the rendered image.
pub const EXPORT_FILE_NAME: &str = "pixelated_image.png";

/// Decode an encoded image (PNG, JPEG, GIF, BMP, WebP) into RGBA8.
///
/// Animated formats contribute their first frame only.
///
/// # Errors
///
/// Returns [`PixelateError::InvalidSource`] when the bytes are corrupt or in
/// an unsupported format, and [`PixelateError::InvalidDimensions`] when the
/// decoded image is empty or too large.
pub fn decode_image(bytes: &[u8]) -> Result<PixelBuffer, PixelateError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| PixelateError::InvalidSource {
        reason: e.to_string(),
    })?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    PixelBuffer::from_rgba(width, height, rgba.into_raw())
}

/// Encode `image` as an 8-bit RGBA PNG.
///
/// # Errors
///
/// Returns [`PixelateError::Export`] if the encoder fails.
pub fn encode_png(image: &PixelBuffer) -> Result<Vec<u8>, PixelateError> {
    let mut out = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut out, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);
        let mut writer = encoder
            .write_header()
            .map_err(|e| PixelateError::Export(e.to_string()))?;
        writer
            .write_image_data(image.as_bytes())
            .map_err(|e| PixelateError::Export(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| PixelateError::Export(e.to_string()))?;
    }
    Ok(out.into_inner())
}
