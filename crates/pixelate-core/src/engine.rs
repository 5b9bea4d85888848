//! Block-averaging pixelation.
//!
//! The source is tiled into `block_size x block_size` squares starting at
//! the top-left corner. Each whole block is averaged, adjusted, passed
//! through the selected palette and written back as a solid color. Partial
//! blocks along the right and bottom edges are never drawn and stay
//! transparent in the output.

use crate::buffer::{PixelBuffer, CHANNELS};
use crate::color::{adjust, average_block};
use crate::palette::{PaletteFn, PaletteLibrary};
use crate::settings::Settings;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Stroke color of grid overlay lines: black at 10% opacity.
pub const GRID_STROKE: GridStroke = GridStroke {
    rgb: [0, 0, 0],
    alpha: 0.1,
};

/// Color and opacity used to draw grid lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStroke {
    pub rgb: [u8; 3],
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
}

/// A 1-pixel-wide line segment in image pixel coordinates.
///
/// Vertical lines have `x1 == x2`, horizontal ones `y1 == y2`. The end
/// coordinate is exclusive, matching the image extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLine {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl GridLine {
    #[inline]
    pub fn is_vertical(&self) -> bool {
        self.x1 == self.x2
    }
}

/// Grid lines emitted when `show_grid` is enabled. Kept separate from the
/// pixel output so the same buffer can be shown with or without it.
#[derive(Debug, Clone, PartialEq)]
pub struct GridOverlay {
    /// Vertical lines left to right, then horizontal lines top to bottom.
    pub lines: Vec<GridLine>,
    pub stroke: GridStroke,
}

impl GridOverlay {
    /// Lines on every `block_size` boundary of a `width x height` image.
    pub fn new(width: u32, height: u32, block_size: u32) -> Self {
        let step = block_size.max(1) as usize;
        let vertical = (0..width).step_by(step).map(|x| GridLine {
            x1: x,
            y1: 0,
            x2: x,
            y2: height,
        });
        let horizontal = (0..height).step_by(step).map(|y| GridLine {
            x1: 0,
            y1: y,
            x2: width,
            y2: y,
        });
        Self {
            lines: vertical.chain(horizontal).collect(),
            stroke: GRID_STROKE,
        }
    }

    /// Draw the overlay onto a copy of `image` with source-over blending.
    ///
    /// Lines are stroked one after another, so pixels where a vertical and
    /// a horizontal line cross are blended twice.
    pub fn composite(&self, image: &PixelBuffer) -> PixelBuffer {
        let mut out = image.clone();
        let alpha = self.stroke.alpha.clamp(0.0, 1.0);
        for line in &self.lines {
            let (xs, ys) = if line.is_vertical() {
                (line.x1..line.x1 + 1, line.y1..line.y2)
            } else {
                (line.x1..line.x2, line.y1..line.y1 + 1)
            };
            for y in ys.clone() {
                if y >= out.height() {
                    break;
                }
                for x in xs.clone() {
                    if x >= out.width() {
                        break;
                    }
                    let blended = blend_over(out.pixel(x, y), self.stroke.rgb, alpha);
                    out.set_pixel(x, y, blended);
                }
            }
        }
        out
    }
}

/// Source-over blend of an RGB stroke with opacity `alpha` onto `dst`.
fn blend_over(dst: [u8; 4], rgb: [u8; 3], alpha: f32) -> [u8; 4] {
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = alpha + dst_a * (1.0 - alpha);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let channel = |src: u8, d: u8| {
        let v = (src as f32 * alpha + d as f32 * dst_a * (1.0 - alpha)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    [
        channel(rgb[0], dst[0]),
        channel(rgb[1], dst[1]),
        channel(rgb[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ]
}

/// Result of a render: the pixelated image plus the optional grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendering {
    /// Same dimensions as the source. Pixels outside the whole-block area
    /// are `[0, 0, 0, 0]`.
    pub image: PixelBuffer,
    pub grid: Option<GridOverlay>,
}

impl Rendering {
    /// The image with the grid drawn in, or a plain copy when the grid is
    /// disabled.
    pub fn flatten(&self) -> PixelBuffer {
        match &self.grid {
            Some(grid) => grid.composite(&self.image),
            None => self.image.clone(),
        }
    }
}

/// Number of whole blocks `(rows, cols)` that fit in the source.
///
/// # Examples
///
/// ```
/// use pixelate_core::engine::block_grid;
/// assert_eq!(block_grid(15, 15, 10), (1, 1));
/// assert_eq!(block_grid(20, 30, 10), (3, 2));
/// assert_eq!(block_grid(5, 5, 10), (0, 0));
/// ```
#[inline]
pub fn block_grid(width: u32, height: u32, block_size: u32) -> (u32, u32) {
    let block = block_size.max(1);
    (height / block, width / block)
}

/// Pixelate `source` under `settings`.
///
/// Pure function of its inputs: repeated calls produce byte-identical
/// output. The returned buffer is freshly allocated and never aliases
/// `source`.
pub fn render(source: &PixelBuffer, settings: &Settings, palettes: &PaletteLibrary) -> Rendering {
    let width = source.width();
    let height = source.height();
    let block = settings.effective_block_size();
    let (rows, cols) = block_grid(width, height, block);

    tracing::debug!(
        width,
        height,
        block_size = block,
        rows,
        cols,
        palette = %settings.palette,
        "Rendering pixelation"
    );

    let mut image = source.blank_like();
    paint_blocks(
        source,
        settings,
        palettes.get(&settings.palette),
        &mut image,
        cfg!(feature = "parallel"),
    );

    let grid = settings
        .show_grid
        .then(|| GridOverlay::new(width, height, block));

    Rendering { image, grid }
}

/// Fill every whole block of `image` with the processed average of the
/// same block in `source`. Each band of `block` rows is independent; with
/// `parallel` set (and the `parallel` feature enabled) bands are painted on
/// the rayon pool.
fn paint_blocks(
    source: &PixelBuffer,
    settings: &Settings,
    transform: PaletteFn,
    image: &mut PixelBuffer,
    parallel: bool,
) {
    let block = settings.effective_block_size();
    let (rows, cols) = block_grid(source.width(), source.height(), block);
    if rows == 0 {
        return;
    }

    let stride = source.width() as usize * CHANNELS;
    let band_len = stride.saturating_mul(block as usize);
    let paint_band = |row: usize, band: &mut [u8]| {
        let origin_y = row as u32 * block;
        for col in 0..cols {
            let origin_x = col * block;
            let avg = average_block(source, origin_x, origin_y, block);
            let adjusted = adjust(avg, settings.brightness, settings.contrast);
            let rgba = transform(adjusted).to_rgba8();

            let start = origin_x as usize * CHANNELS;
            let end = start + block as usize * CHANNELS;
            for line in band.chunks_exact_mut(stride) {
                for px in line[start..end].chunks_exact_mut(CHANNELS) {
                    px.copy_from_slice(&rgba);
                }
            }
        }
    };

    let covered = &mut image.as_bytes_mut()[..band_len * rows as usize];

    #[cfg(feature = "parallel")]
    {
        if parallel {
            covered
                .par_chunks_exact_mut(band_len)
                .enumerate()
                .for_each(|(row, band)| paint_band(row, band));
            return;
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    covered
        .chunks_exact_mut(band_len)
        .enumerate()
        .for_each(|(row, band)| paint_band(row, band));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(block_size: u32) -> Settings {
        Settings {
            block_size,
            ..Settings::default()
        }
    }

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::transparent(width, height).unwrap();
        for y in 0..height {
            for x in 0..width {
                buf.set_pixel(x, y, [(x * 7 % 256) as u8, (y * 5 % 256) as u8, 90, 255]);
            }
        }
        buf
    }

    fn noisy(width: u32, height: u32) -> PixelBuffer {
        let mut state = 0x9E37_79B9_u32 ^ width.wrapping_mul(31) ^ height;
        let mut buf = PixelBuffer::transparent(width, height).unwrap();
        for y in 0..height {
            for x in 0..width {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                let [r, g, b, a] = state.to_le_bytes();
                buf.set_pixel(x, y, [r, g, b, a]);
            }
        }
        buf
    }

    #[test]
    fn test_block_grid_floors() {
        assert_eq!(block_grid(19, 21, 10), (2, 1));
        assert_eq!(block_grid(7, 3, 1), (3, 7));
        assert_eq!(block_grid(7, 3, 0), (3, 7));
    }

    #[test]
    fn test_render_uniform_blocks() {
        let mut src = PixelBuffer::filled(4, 2, [10, 20, 30, 255]).unwrap();
        for y in 0..2 {
            for x in 2..4 {
                src.set_pixel(x, y, [200, 100, 0, 255]);
            }
        }
        let out = render(&src, &settings(2), &PaletteLibrary::default());
        assert_eq!(out.image.pixel(0, 0), [10, 20, 30, 255]);
        assert_eq!(out.image.pixel(1, 1), [10, 20, 30, 255]);
        assert_eq!(out.image.pixel(3, 0), [200, 100, 0, 255]);
        assert!(out.grid.is_none());
    }

    #[test]
    fn test_render_averages_block() {
        let mut src = PixelBuffer::filled(2, 2, [0, 0, 0, 255]).unwrap();
        src.set_pixel(0, 0, [255, 255, 255, 255]);
        let out = render(&src, &settings(2), &PaletteLibrary::default());
        // 255 / 4 = 63.75 rounds to 64.
        assert_eq!(out.image.pixel(1, 1), [64, 64, 64, 255]);
    }

    #[test]
    fn test_render_leaves_partial_blocks_transparent() {
        let src = PixelBuffer::filled(7, 5, [9, 9, 9, 255]).unwrap();
        let out = render(&src, &settings(3), &PaletteLibrary::default());
        for y in 0..5 {
            for x in 0..7 {
                let expected = if x < 6 && y < 3 { [9, 9, 9, 255] } else { [0, 0, 0, 0] };
                assert_eq!(out.image.pixel(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_block_larger_than_image_draws_nothing() {
        let src = PixelBuffer::filled(4, 4, [255, 255, 255, 255]).unwrap();
        let out = render(&src, &settings(10), &PaletteLibrary::default());
        assert!(out.image.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_block_size_one_preserves_rgb() {
        let src = gradient(9, 4);
        let out = render(&src, &settings(1), &PaletteLibrary::default());
        assert_eq!(out.image, src);
    }

    #[test]
    fn test_render_is_deterministic() {
        let src = gradient(37, 23);
        let s = Settings {
            block_size: 4,
            brightness: 1.3,
            contrast: 0.9,
            palette: "sepia".into(),
            show_grid: true,
        };
        let palettes = PaletteLibrary::default();
        assert_eq!(render(&src, &s, &palettes), render(&src, &s, &palettes));
    }

    #[test]
    fn test_render_does_not_touch_source() {
        let src = gradient(12, 12);
        let before = src.clone();
        let _ = render(&src, &settings(5), &PaletteLibrary::default());
        assert_eq!(src, before);
    }

    #[test]
    fn test_grid_lines_cover_boundaries() {
        let grid = GridOverlay::new(25, 12, 10);
        assert_eq!(
            grid.lines,
            vec![
                GridLine { x1: 0, y1: 0, x2: 0, y2: 12 },
                GridLine { x1: 10, y1: 0, x2: 10, y2: 12 },
                GridLine { x1: 20, y1: 0, x2: 20, y2: 12 },
                GridLine { x1: 0, y1: 0, x2: 25, y2: 0 },
                GridLine { x1: 0, y1: 10, x2: 25, y2: 10 },
            ]
        );
        assert_eq!(grid.stroke, GRID_STROKE);
    }

    #[test]
    fn test_render_emits_grid_when_enabled() {
        let src = PixelBuffer::filled(20, 20, [1, 2, 3, 255]).unwrap();
        let s = Settings {
            show_grid: true,
            ..Settings::default()
        };
        let out = render(&src, &s, &PaletteLibrary::default());
        let grid = out.grid.expect("grid enabled");
        assert_eq!(grid.lines.len(), 4);
        assert!(grid.lines[..2].iter().all(GridLine::is_vertical));
    }

    #[test]
    fn test_composite_blends_lines_only() {
        let image = PixelBuffer::filled(4, 4, [200, 200, 200, 255]).unwrap();
        let grid = GridOverlay::new(4, 4, 2);
        let flat = grid.composite(&image);
        // Single line: 200 * 0.9 = 180.
        assert_eq!(flat.pixel(2, 1), [180, 180, 180, 255]);
        assert_eq!(flat.pixel(1, 2), [180, 180, 180, 255]);
        // Crossing: blended twice, 180 * 0.9 = 162.
        assert_eq!(flat.pixel(2, 2), [162, 162, 162, 255]);
        assert_eq!(flat.pixel(0, 0), [162, 162, 162, 255]);
        assert_eq!(flat.pixel(1, 1), [200, 200, 200, 255]);
        assert_eq!(image.pixel(2, 2), [200, 200, 200, 255]);
    }

    #[test]
    fn test_sequential_painter_matches_render() {
        let src = noisy(53, 41);
        let s = Settings {
            block_size: 6,
            brightness: 1.2,
            contrast: 0.8,
            palette: "vintage".into(),
            show_grid: false,
        };
        let palettes = PaletteLibrary::default();
        let mut sequential = src.blank_like();
        paint_blocks(&src, &s, palettes.get(&s.palette), &mut sequential, false);
        assert_eq!(render(&src, &s, &palettes).image, sequential);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let palettes = PaletteLibrary::default();
        for (width, height, block) in [(53, 41, 6), (64, 64, 8), (17, 90, 4), (7, 7, 3)] {
            let src = noisy(width, height);
            let s = Settings {
                block_size: block,
                brightness: 0.9,
                contrast: 1.4,
                palette: "neon".into(),
                show_grid: false,
            };
            let transform = palettes.get(&s.palette);
            let mut sequential = src.blank_like();
            let mut parallel = src.blank_like();
            paint_blocks(&src, &s, transform, &mut sequential, false);
            paint_blocks(&src, &s, transform, &mut parallel, true);
            assert_eq!(parallel, sequential, "{width}x{height} block {block}");
        }
    }

    #[test]
    fn test_composite_over_transparent() {
        let image = PixelBuffer::transparent(3, 1).unwrap();
        let flat = GridOverlay::new(3, 1, 3).composite(&image);
        // Horizontal line at y=0 plus vertical at x=0.
        assert_eq!(flat.pixel(1, 0), [0, 0, 0, 26]);
    }
}
