use std::time::Instant;

use napi::bindgen_prelude::*;
use napi::Task;
use napi_derive::napi;

use pixelate_core::{PaletteLibrary, PixelBuffer, SliderQueue, State};

fn to_napi_err(e: pixelate_core::PixelateError) -> Error {
    Error::from_reason(e.to_string())
}

/// A decoded RGBA image ready to be loaded into a `Pixelator`.
#[napi]
pub struct DecodedImage {
    inner: PixelBuffer,
}

#[napi]
impl DecodedImage {
    #[napi(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    #[napi(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }
}

/// A grid overlay line in image pixel coordinates.
#[napi(object)]
pub struct GridLine {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

/// Interactive pixelation session.
///
/// Immediate setters re-render on every call. The `queue*` setters are
/// meant for sliders: they collect changes and `flushPending()` (called
/// from a timer or animation frame) applies them once input has been quiet
/// for 50ms.
#[napi]
pub struct Pixelator {
    inner: pixelate_core::Pixelator,
    sliders: SliderQueue,
}

#[napi]
impl Pixelator {
    #[napi(constructor)]
    pub fn new() -> Self {
        Self {
            inner: pixelate_core::Pixelator::new(),
            sliders: SliderQueue::default(),
        }
    }

    /// @returns "idle" before the first successful load, "ready" afterwards.
    #[napi(getter)]
    pub fn state(&self) -> String {
        match self.inner.state() {
            State::Idle => "idle".to_string(),
            State::Ready => "ready".to_string(),
        }
    }

    /// Load a previously decoded image.
    #[napi]
    pub fn load(&mut self, image: &DecodedImage) {
        self.inner.load(image.inner.clone());
    }

    /// Load raw RGBA pixels.
    ///
    /// @param data - RGBA bytes (length must be width * height * 4).
    #[napi]
    pub fn load_rgba(&mut self, data: Buffer, width: u32, height: u32) -> Result<()> {
        let image = PixelBuffer::from_rgba(width, height, data.to_vec()).map_err(to_napi_err)?;
        self.inner.load(image);
        Ok(())
    }

    /// Decode and load an encoded image on the calling thread.
    /// Use `decodeImageAsync` + `load` to keep the event loop free.
    #[napi]
    pub fn load_image(&mut self, data: Buffer) -> Result<()> {
        self.inner.load_image(data.as_ref()).map_err(to_napi_err)?;
        Ok(())
    }

    #[napi]
    pub fn set_block_size(&mut self, size: i64) {
        self.sliders.discard_block_size();
        self.inner.set_block_size(size);
    }

    #[napi]
    pub fn set_brightness(&mut self, brightness: f64) {
        self.sliders.discard_brightness();
        self.inner.set_brightness(brightness);
    }

    #[napi]
    pub fn set_contrast(&mut self, contrast: f64) {
        self.sliders.discard_contrast();
        self.inner.set_contrast(contrast);
    }

    #[napi]
    pub fn set_palette(&mut self, palette: String) {
        self.inner.set_palette(palette);
    }

    #[napi]
    pub fn set_show_grid(&mut self, show_grid: bool) {
        self.inner.set_show_grid(show_grid);
    }

    /// Queue a block size change (debounced).
    #[napi]
    pub fn queue_block_size(&mut self, size: i64) {
        self.sliders.queue_block_size(size, Instant::now());
    }

    /// Queue a brightness change (debounced).
    #[napi]
    pub fn queue_brightness(&mut self, brightness: f64) {
        self.sliders.queue_brightness(brightness, Instant::now());
    }

    /// Queue a contrast change (debounced).
    #[napi]
    pub fn queue_contrast(&mut self, contrast: f64) {
        self.sliders.queue_contrast(contrast, Instant::now());
    }

    /// Apply queued changes if input has settled. Settings changed directly
    /// in the meantime are kept.
    ///
    /// @returns true when a re-render happened (false while idle).
    #[napi]
    pub fn flush_pending(&mut self) -> bool {
        match self.sliders.poll(Instant::now()) {
            Some(update) => self.inner.apply_sliders(&update).is_some(),
            None => false,
        }
    }

    /// Restore default settings and drop queued changes.
    #[napi]
    pub fn reset(&mut self) {
        self.sliders.clear();
        self.inner.reset();
    }

    #[napi(getter)]
    pub fn block_size(&self) -> u32 {
        self.inner.settings().block_size
    }

    #[napi(getter)]
    pub fn brightness(&self) -> f64 {
        self.inner.settings().brightness
    }

    #[napi(getter)]
    pub fn contrast(&self) -> f64 {
        self.inner.settings().contrast
    }

    #[napi(getter)]
    pub fn palette(&self) -> String {
        self.inner.settings().palette.clone()
    }

    #[napi(getter)]
    pub fn show_grid(&self) -> bool {
        self.inner.settings().show_grid
    }

    /// Rendered RGBA pixels (same size as the loaded image), or null while idle.
    #[napi]
    pub fn output(&self) -> Option<Buffer> {
        self.inner
            .output()
            .map(|out| Buffer::from(out.image.as_bytes().to_vec()))
    }

    /// Grid overlay lines, or null when the grid is off or nothing is loaded.
    /// Stroke them with rgba(0, 0, 0, 0.1).
    #[napi]
    pub fn grid_lines(&self) -> Option<Vec<GridLine>> {
        let grid = self.inner.output()?.grid.as_ref()?;
        Some(
            grid.lines
                .iter()
                .map(|l| GridLine {
                    x1: l.x1,
                    y1: l.y1,
                    x2: l.x2,
                    y2: l.y2,
                })
                .collect(),
        )
    }

    /// PNG bytes of the current output with the grid drawn in when enabled,
    /// or null while idle.
    #[napi]
    pub fn export_png(&self) -> Result<Option<Buffer>> {
        let png = self.inner.export_png().map_err(to_napi_err)?;
        Ok(png.map(Buffer::from))
    }
}

/// Names of the built-in palettes, default first.
#[napi]
pub fn palettes() -> Vec<String> {
    PaletteLibrary::default().names().map(str::to_string).collect()
}

// --- Async decoding (runs on libuv thread pool) ---

pub struct DecodeTask {
    data: Vec<u8>,
}

impl Task for DecodeTask {
    type Output = PixelBuffer;
    type JsValue = DecodedImage;

    fn compute(&mut self) -> Result<Self::Output> {
        pixelate_core::decode_image(&self.data).map_err(to_napi_err)
    }

    fn resolve(&mut self, _env: Env, output: Self::Output) -> Result<Self::JsValue> {
        Ok(DecodedImage { inner: output })
    }
}

/// Decode an encoded image (PNG, JPEG, GIF, BMP, WebP) off the main thread.
/// Returns a Promise<DecodedImage>; rejects on corrupt or unsupported input.
///
/// @param data - Encoded image bytes.
#[napi]
pub fn decode_image_async(data: Buffer) -> AsyncTask<DecodeTask> {
    AsyncTask::new(DecodeTask {
        data: data.to_vec(),
    })
}
