//! Stateful pixelation session.
//!
//! A [`Pixelator`] owns the current [`Settings`], the loaded source image
//! and the latest [`Rendering`]. Every mutation while an image is loaded
//! recomputes the output from scratch; without an image, setters only
//! update settings and rendering is a no-op.
//!
//! Not synchronized. Hosts sharing one session across threads must
//! serialize access themselves.

use crate::buffer::PixelBuffer;
use crate::debounce::SliderUpdate;
use crate::engine::{self, Rendering};
#[cfg(feature = "codec")]
use crate::error::PixelateError;
use crate::palette::{PaletteFn, PaletteLibrary};
use crate::settings::Settings;

/// Lifecycle state of a [`Pixelator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No source image loaded.
    Idle,
    /// A source image is loaded and the output is current.
    Ready,
}

/// Pixelation session: settings, source image and latest output.
///
/// # Examples
///
/// ```
/// use pixelate_core::{PixelBuffer, Pixelator, State};
///
/// let mut px = Pixelator::new();
/// px.set_palette("negative");
/// assert_eq!(px.state(), State::Idle);
///
/// px.load(PixelBuffer::filled(20, 20, [255, 0, 0, 255]).unwrap());
/// let out = px.output().unwrap();
/// assert_eq!(out.image.pixel(5, 5), [0, 255, 255, 255]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pixelator {
    settings: Settings,
    palettes: PaletteLibrary,
    source: Option<PixelBuffer>,
    output: Option<Rendering>,
}

impl Pixelator {
    /// An idle session with default settings and the built-in palettes.
    pub fn new() -> Self {
        Self::default()
    }

    /// An idle session with explicit initial settings and palette registry.
    pub fn with_settings(settings: Settings, palettes: PaletteLibrary) -> Self {
        Self {
            settings: settings.coerced(),
            palettes,
            source: None,
            output: None,
        }
    }

    pub fn state(&self) -> State {
        if self.source.is_some() {
            State::Ready
        } else {
            State::Idle
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn palettes(&self) -> &PaletteLibrary {
        &self.palettes
    }

    /// Register an additional palette. Re-renders when the current palette
    /// name now resolves differently.
    pub fn register_palette(&mut self, name: &str, transform: PaletteFn) {
        self.palettes.register(name, transform);
        if self.settings.palette == name {
            self.refresh();
        }
    }

    pub fn source(&self) -> Option<&PixelBuffer> {
        self.source.as_ref()
    }

    /// The latest rendering, `None` while idle.
    pub fn output(&self) -> Option<&Rendering> {
        self.output.as_ref()
    }

    /// Replace the source image and render it.
    pub fn load(&mut self, image: PixelBuffer) -> Option<&Rendering> {
        tracing::debug!(
            width = image.width(),
            height = image.height(),
            "Loaded source image"
        );
        self.source = Some(image);
        self.refresh();
        self.output.as_ref()
    }

    /// Decode `bytes` and load the result.
    ///
    /// # Errors
    ///
    /// Returns the decode error and leaves the session untouched: a previous
    /// source image and output stay in place.
    #[cfg(feature = "codec")]
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<Option<&Rendering>, PixelateError> {
        match crate::codec::decode_image(bytes) {
            Ok(image) => Ok(self.load(image)),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load image");
                Err(e)
            }
        }
    }

    /// Recompute the output from the current source and settings.
    ///
    /// Returns `None` while idle.
    pub fn render(&mut self) -> Option<&Rendering> {
        self.refresh();
        self.output.as_ref()
    }

    fn refresh(&mut self) {
        if let Some(source) = &self.source {
            self.output = Some(engine::render(source, &self.settings, &self.palettes));
        }
    }

    pub fn set_block_size(&mut self, size: i64) {
        self.settings.set_block_size(size);
        self.refresh();
    }

    pub fn set_brightness(&mut self, brightness: f64) {
        self.settings.set_brightness(brightness);
        self.refresh();
    }

    pub fn set_contrast(&mut self, contrast: f64) {
        self.settings.set_contrast(contrast);
        self.refresh();
    }

    pub fn set_palette(&mut self, palette: impl Into<String>) {
        self.settings.set_palette(palette);
        self.refresh();
    }

    pub fn set_show_grid(&mut self, show_grid: bool) {
        self.settings.set_show_grid(show_grid);
        self.refresh();
    }

    /// Replace all settings at once with a single re-render.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings.coerced();
        self.refresh();
    }

    /// Apply settled slider values with a single re-render. Settings not
    /// named in `update` keep their current values. Returns the new output,
    /// or `None` while idle.
    pub fn apply_sliders(&mut self, update: &SliderUpdate) -> Option<&Rendering> {
        update.apply_to(&mut self.settings);
        self.render()
    }

    /// Restore default settings, re-rendering when an image is loaded.
    pub fn reset(&mut self) {
        tracing::debug!("Resetting settings to defaults");
        self.settings = Settings::default();
        self.refresh();
    }

    /// PNG bytes of the current output with the grid drawn in when enabled.
    /// `None` while idle.
    ///
    /// # Errors
    ///
    /// Returns [`PixelateError::Export`] if PNG encoding fails.
    #[cfg(feature = "codec")]
    pub fn export_png(&self) -> Result<Option<Vec<u8>>, PixelateError> {
        self.output
            .as_ref()
            .map(|rendering| crate::codec::encode_png(&rendering.flatten()))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::debounce::{SliderQueue, SLIDER_DEBOUNCE};
    use pretty_assertions::assert_eq;
    use std::time::Instant;

    fn red(size: u32) -> PixelBuffer {
        PixelBuffer::filled(size, size, [255, 0, 0, 255]).unwrap()
    }

    #[test]
    fn test_idle_setters_do_not_render() {
        let mut px = Pixelator::new();
        px.set_block_size(4);
        px.set_brightness(2.0);
        px.set_show_grid(true);
        assert_eq!(px.state(), State::Idle);
        assert!(px.output().is_none());
        assert!(px.render().is_none());
        assert_eq!(px.settings().block_size, 4);
    }

    #[test]
    fn test_load_moves_to_ready() {
        let mut px = Pixelator::new();
        assert!(px.load(red(20)).is_some());
        assert_eq!(px.state(), State::Ready);
        assert_eq!(px.output().unwrap().image.pixel(19, 19), [255, 0, 0, 255]);
    }

    #[test]
    fn test_setters_rerender_when_ready() {
        let mut px = Pixelator::new();
        px.load(red(20));
        px.set_brightness(0.5);
        assert_eq!(px.output().unwrap().image.pixel(0, 0), [128, 0, 0, 255]);
        px.set_show_grid(true);
        assert!(px.output().unwrap().grid.is_some());
        px.set_block_size(0);
        assert_eq!(px.settings().block_size, 1);
    }

    #[test]
    fn test_reset_restores_defaults_and_rerenders() {
        let mut px = Pixelator::new();
        px.load(red(20));
        let baseline = px.output().cloned();
        px.set_palette("negative");
        px.set_contrast(3.0);
        px.reset();
        assert_eq!(px.settings(), &Settings::default());
        assert_eq!(px.output().cloned(), baseline);
    }

    #[test]
    fn test_reset_while_idle_updates_settings() {
        let mut px = Pixelator::new();
        px.set_palette("sepia");
        px.reset();
        assert_eq!(px.settings().palette, "default");
        assert!(px.output().is_none());
    }

    #[test]
    fn test_register_palette_rerenders_current() {
        let mut px = Pixelator::new();
        px.load(red(10));
        px.set_palette("blue");
        assert_eq!(px.output().unwrap().image.pixel(0, 0), [255, 0, 0, 255]);
        px.register_palette("blue", |_| Color::new(0.0, 0.0, 255.0));
        assert_eq!(px.output().unwrap().image.pixel(0, 0), [0, 0, 255, 255]);
    }

    #[test]
    fn test_set_settings_coerces() {
        let mut px = Pixelator::new();
        px.set_settings(Settings {
            block_size: 0,
            brightness: -1.0,
            ..Settings::default()
        });
        assert_eq!(px.settings().block_size, 1);
        assert_eq!(px.settings().brightness, 0.0);
    }

    #[test]
    #[cfg(feature = "codec")]
    fn test_failed_load_keeps_previous_state() {
        let mut px = Pixelator::new();
        px.load(red(20));
        let before = px.output().cloned();
        assert!(px.load_image(b"not an image").is_err());
        assert_eq!(px.state(), State::Ready);
        assert_eq!(px.output().cloned(), before);
        assert_eq!(px.source(), Some(&red(20)));
    }

    #[test]
    #[cfg(feature = "codec")]
    fn test_failed_load_while_idle_stays_idle() {
        let mut px = Pixelator::new();
        assert!(px.load_image(&[]).is_err());
        assert_eq!(px.state(), State::Idle);
    }

    #[test]
    #[cfg(feature = "codec")]
    fn test_export_idle_is_none() {
        assert_eq!(Pixelator::new().export_png().unwrap(), None);
    }

    #[test]
    #[cfg(feature = "codec")]
    fn test_export_includes_grid() {
        let mut px = Pixelator::new();
        px.load(red(20));
        px.set_show_grid(true);
        let png = px.export_png().unwrap().expect("ready");
        let decoded = crate::codec::decode_image(&png).unwrap();
        assert_eq!(decoded.pixel(5, 5), [255, 0, 0, 255]);
        let on_line = decoded.pixel(10, 5);
        assert!(on_line[0] < 255);
        assert_eq!([on_line[1], on_line[2], on_line[3]], [0, 0, 255]);
    }

    #[test]
    fn test_queued_slider_keeps_direct_changes() {
        let t0 = Instant::now();
        let mut px = Pixelator::new();
        px.load(red(20));
        let mut sliders = SliderQueue::default();

        sliders.queue_brightness(1.5, t0);
        px.set_palette("sepia");
        px.set_show_grid(true);

        let update = sliders.poll(t0 + SLIDER_DEBOUNCE).unwrap();
        let out = px.apply_sliders(&update).unwrap();
        assert!(out.grid.is_some());
        assert_eq!(px.settings().palette, "sepia");
        assert_eq!(px.settings().brightness, 1.5);
    }

    #[test]
    fn test_direct_setter_keeps_other_queued_sliders() {
        let t0 = Instant::now();
        let mut px = Pixelator::new();
        px.load(red(20));
        let mut sliders = SliderQueue::default();

        sliders.queue_brightness(2.0, t0);
        sliders.queue_block_size(3, t0);
        px.set_block_size(5);
        sliders.discard_block_size();

        let update = sliders.poll(t0 + SLIDER_DEBOUNCE).unwrap();
        px.apply_sliders(&update);
        assert_eq!(px.settings().block_size, 5);
        assert_eq!(px.settings().brightness, 2.0);
    }

    #[test]
    fn test_apply_sliders_while_idle() {
        let mut px = Pixelator::new();
        let update = SliderUpdate {
            block_size: Some(0),
            ..SliderUpdate::default()
        };
        assert!(px.apply_sliders(&update).is_none());
        assert_eq!(px.settings().block_size, 1);
        assert_eq!(px.state(), State::Idle);
    }
}
