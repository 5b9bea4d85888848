//! Color math for block averaging and brightness/contrast adjustment.
//!
//! Channels are plain sRGB byte values carried as `f64` so intermediate
//! results may leave the `0..=255` range until they are clamped.

use crate::buffer::PixelBuffer;

/// An RGB color with real-valued, not yet clamped channels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    #[inline]
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Apply `f` to each channel independently.
    #[inline]
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.r), f(self.g), f(self.b))
    }

    /// Arithmetic mean of the three channels.
    #[inline]
    pub fn mean(self) -> f64 {
        (self.r + self.g + self.b) / 3.0
    }

    /// Clamp and round to an opaque RGBA8 sample.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixelate_core::Color;
    /// assert_eq!(Color::new(300.0, -4.0, 89.6).to_rgba8(), [255, 0, 90, 255]);
    /// ```
    #[inline]
    pub fn to_rgba8(self) -> [u8; 4] {
        [
            clamp_channel(self.r),
            clamp_channel(self.g),
            clamp_channel(self.b),
            255,
        ]
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r as f64, g as f64, b as f64)
    }
}

/// Clamp a channel to `[0, 255]` and round it to the nearest integer.
///
/// NaN maps to 0.
#[inline]
pub fn clamp_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0).round() as u8
}

/// Mean RGB of the `block_size x block_size` window whose top-left corner is
/// `(origin_x, origin_y)`. Alpha is ignored.
///
/// The window must lie inside `source`; the engine only asks for whole
/// blocks.
///
/// # Examples
///
/// ```
/// use pixelate_core::{average_block, Color, PixelBuffer};
/// let buf = PixelBuffer::filled(4, 4, [10, 20, 30, 0]).unwrap();
/// assert_eq!(average_block(&buf, 2, 2, 2), Color::new(10.0, 20.0, 30.0));
/// ```
pub fn average_block(source: &PixelBuffer, origin_x: u32, origin_y: u32, block_size: u32) -> Color {
    debug_assert!(block_size >= 1);
    debug_assert!(origin_x + block_size <= source.width());
    debug_assert!(origin_y + block_size <= source.height());

    let data = source.as_bytes();
    let row_len = block_size as usize * 4;
    let mut sum = [0u64; 3];

    for y in origin_y..origin_y + block_size {
        let start = source.offset(origin_x, y);
        for px in data[start..start + row_len].chunks_exact(4) {
            sum[0] += px[0] as u64;
            sum[1] += px[1] as u64;
            sum[2] += px[2] as u64;
        }
    }

    let count = (block_size as u64 * block_size as u64) as f64;
    Color::new(
        sum[0] as f64 / count,
        sum[1] as f64 / count,
        sum[2] as f64 / count,
    )
}

/// Scale each channel by `contrast * (value * brightness)`, then clamp to
/// `[0, 255]` and round.
///
/// Both factors are multiplicative gains on the same value; contrast is not
/// taken relative to a midpoint.
pub fn adjust(color: Color, brightness: f64, contrast: f64) -> Color {
    color.map(|v| clamp_channel(contrast * (v * brightness)) as f64)
}
