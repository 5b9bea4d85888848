//! Owned RGBA8 pixel storage shared by ingestion, the engine and exporters.

use crate::error::PixelateError;

/// Maximum accepted width or height. Caps CPU and memory use of a single
/// full-image recomputation.
pub const MAX_DIMENSION: u32 = 16_384;

/// Bytes per RGBA sample.
pub const CHANNELS: usize = 4;

/// A `width x height` image stored as row-major RGBA8 samples.
///
/// The backing vector always holds exactly `width * height * 4` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// Compute `width * height * 4`, rejecting zero, oversized and overflowing
/// dimensions.
fn checked_len(width: u32, height: u32) -> Result<usize, PixelateError> {
    if width == 0 || height == 0 {
        return Err(PixelateError::InvalidDimensions {
            width,
            height,
            reason: "width and height must be > 0",
        });
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(PixelateError::InvalidDimensions {
            width,
            height,
            reason: "dimensions must be <= 16384",
        });
    }
    (width as u64)
        .checked_mul(height as u64)
        .and_then(|v| v.checked_mul(CHANNELS as u64))
        .and_then(|v| usize::try_from(v).ok())
        .ok_or(PixelateError::InvalidDimensions {
            width,
            height,
            reason: "dimensions overflow buffer size calculation",
        })
}

impl PixelBuffer {
    /// Wrap raw RGBA8 bytes in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`PixelateError::InvalidDimensions`] for zero or oversized
    /// dimensions and [`PixelateError::BufferLength`] when `data` is not
    /// exactly `width * height * 4` bytes long.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixelate_core::PixelBuffer;
    /// let buf = PixelBuffer::from_rgba(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap();
    /// assert_eq!(buf.pixel(1, 0), [0, 0, 255, 255]);
    /// ```
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, PixelateError> {
        let expected = checked_len(width, height)?;
        if data.len() != expected {
            return Err(PixelateError::BufferLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A fully transparent buffer: every sample is `[0, 0, 0, 0]`.
    pub fn transparent(width: u32, height: u32) -> Result<Self, PixelateError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    /// A buffer filled with a single RGBA color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, PixelateError> {
        let len = checked_len(width, height)?;
        let data = rgba.iter().copied().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A transparent buffer with the same dimensions as `self`.
    pub(crate) fn blank_like(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            data: vec![0; self.data.len()],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes in row-major order.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the buffer, returning its raw RGBA8 bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Byte offset of the sample at `(x, y)`.
    #[inline]
    pub(crate) fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// The RGBA sample at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Overwrite the RGBA sample at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the buffer.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = self.offset(x, y);
        self.data[i..i + CHANNELS].copy_from_slice(&rgba);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_length_validation() {
        let err = PixelBuffer::from_rgba(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            PixelateError::BufferLength {
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(PixelBuffer::from_rgba(0, 4, Vec::new()).is_err());
        assert!(PixelBuffer::transparent(4, 0).is_err());
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        assert!(matches!(
            PixelBuffer::transparent(MAX_DIMENSION + 1, 1),
            Err(PixelateError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_filled_and_pixel_access() {
        let mut buf = PixelBuffer::filled(3, 2, [1, 2, 3, 4]).unwrap();
        assert_eq!(buf.as_bytes().len(), 3 * 2 * 4);
        assert_eq!(buf.pixel(2, 1), [1, 2, 3, 4]);
        buf.set_pixel(2, 1, [9, 9, 9, 9]);
        assert_eq!(buf.pixel(2, 1), [9, 9, 9, 9]);
        assert_eq!(buf.pixel(1, 1), [1, 2, 3, 4]);
    }

    #[test]
    #[should_panic]
    fn test_pixel_out_of_bounds_panics() {
        let buf = PixelBuffer::transparent(2, 2).unwrap();
        buf.pixel(2, 0);
    }
}
