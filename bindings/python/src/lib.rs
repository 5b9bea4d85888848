use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyBytes;

use pixelate_core::{PaletteLibrary, PixelBuffer, Settings, State};

/// Convert a `PixelateError` into a Python `ValueError`.
fn to_py_err(e: pixelate_core::PixelateError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Interactive pixelation session.
///
/// Holds settings and the loaded image; every setter re-renders while an
/// image is loaded.
#[pyclass(name = "Pixelator")]
struct PyPixelator {
    inner: pixelate_core::Pixelator,
}

#[pymethods]
impl PyPixelator {
    #[new]
    #[pyo3(signature = (block_size = 10, brightness = 1.0, contrast = 1.0, palette = "default", show_grid = false))]
    fn new(block_size: i64, brightness: f64, contrast: f64, palette: &str, show_grid: bool) -> Self {
        let mut settings = Settings::default();
        settings.set_block_size(block_size);
        settings.set_brightness(brightness);
        settings.set_contrast(contrast);
        settings.set_palette(palette);
        settings.set_show_grid(show_grid);
        Self {
            inner: pixelate_core::Pixelator::with_settings(settings, PaletteLibrary::default()),
        }
    }

    /// Load raw RGBA pixels (length must be width * height * 4).
    fn load_rgba(&mut self, data: &[u8], width: u32, height: u32) -> PyResult<()> {
        let image = PixelBuffer::from_rgba(width, height, data.to_vec()).map_err(to_py_err)?;
        self.inner.load(image);
        Ok(())
    }

    /// Decode an encoded image (PNG, JPEG, GIF, BMP, WebP) and load it.
    ///
    /// Raises ValueError on corrupt input; the previous image stays loaded.
    fn load_image(&mut self, data: &[u8]) -> PyResult<()> {
        self.inner.load_image(data).map_err(to_py_err)?;
        Ok(())
    }

    /// "idle" before the first successful load, "ready" afterwards.
    #[getter]
    fn state(&self) -> &'static str {
        match self.inner.state() {
            State::Idle => "idle",
            State::Ready => "ready",
        }
    }

    #[getter]
    fn block_size(&self) -> u32 {
        self.inner.settings().block_size
    }

    #[setter]
    fn set_block_size(&mut self, size: i64) {
        self.inner.set_block_size(size);
    }

    #[getter]
    fn brightness(&self) -> f64 {
        self.inner.settings().brightness
    }

    #[setter]
    fn set_brightness(&mut self, brightness: f64) {
        self.inner.set_brightness(brightness);
    }

    #[getter]
    fn contrast(&self) -> f64 {
        self.inner.settings().contrast
    }

    #[setter]
    fn set_contrast(&mut self, contrast: f64) {
        self.inner.set_contrast(contrast);
    }

    #[getter]
    fn palette(&self) -> String {
        self.inner.settings().palette.clone()
    }

    #[setter]
    fn set_palette(&mut self, palette: String) {
        self.inner.set_palette(palette);
    }

    #[getter]
    fn show_grid(&self) -> bool {
        self.inner.settings().show_grid
    }

    #[setter]
    fn set_show_grid(&mut self, show_grid: bool) {
        self.inner.set_show_grid(show_grid);
    }

    /// Restore default settings.
    fn reset(&mut self) {
        self.inner.reset();
    }

    /// The rendered RGBA pixels as (bytes, width, height), or None while idle.
    fn output(&self, py: Python<'_>) -> Option<(Py<PyBytes>, u32, u32)> {
        self.inner.output().map(|out| {
            (
                PyBytes::new(py, out.image.as_bytes()).into(),
                out.image.width(),
                out.image.height(),
            )
        })
    }

    /// Grid overlay lines as (x1, y1, x2, y2) tuples, or None when disabled or idle.
    fn grid_lines(&self) -> Option<Vec<(u32, u32, u32, u32)>> {
        let grid = self.inner.output()?.grid.as_ref()?;
        Some(grid.lines.iter().map(|l| (l.x1, l.y1, l.x2, l.y2)).collect())
    }

    /// PNG bytes of the current output (grid included when enabled), or None while idle.
    fn export_png(&self, py: Python<'_>) -> PyResult<Option<Py<PyBytes>>> {
        let png = self.inner.export_png().map_err(to_py_err)?;
        Ok(png.map(|bytes| PyBytes::new(py, &bytes).into()))
    }
}

/// Pixelate raw RGBA pixels in one call.
///
/// Args:
///     data: Raw pixel bytes in RGBA order (length must be width * height * 4).
///     width: Image width in pixels.
///     height: Image height in pixels.
///     block_size: Block edge length in pixels (default 10, coerced to >= 1).
///     brightness: Brightness gain (default 1.0).
///     contrast: Contrast gain (default 1.0).
///     palette: Palette name (default "default"; unknown names pass through).
///
/// Returns:
///     A bytes object of length width * height * 4 with the pixelated image.
#[pyfunction]
#[pyo3(signature = (data, width, height, block_size = 10, brightness = 1.0, contrast = 1.0, palette = "default"))]
#[allow(clippy::too_many_arguments)]
fn pixelate_rgba(
    py: Python<'_>,
    data: &[u8],
    width: u32,
    height: u32,
    block_size: i64,
    brightness: f64,
    contrast: f64,
    palette: &str,
) -> PyResult<Py<PyBytes>> {
    let image = PixelBuffer::from_rgba(width, height, data.to_vec()).map_err(to_py_err)?;
    let mut settings = Settings::default();
    settings.set_block_size(block_size);
    settings.set_brightness(brightness);
    settings.set_contrast(contrast);
    settings.set_palette(palette);
    let out = py.allow_threads(|| pixelate_core::render(&image, &settings, &PaletteLibrary::default()));
    Ok(PyBytes::new(py, out.image.as_bytes()).into())
}

/// Names of the built-in palettes, default first.
#[pyfunction]
fn palettes() -> Vec<String> {
    PaletteLibrary::default().names().map(str::to_string).collect()
}

/// Pixel art generation (Rust-powered).
#[pymodule]
fn pixelate(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyPixelator>()?;
    m.add_function(wrap_pyfunction!(pixelate_rgba, m)?)?;
    m.add_function(wrap_pyfunction!(palettes, m)?)?;
    Ok(())
}
