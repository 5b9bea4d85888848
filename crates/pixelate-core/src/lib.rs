//! # pixelate-core
//!
//! Pixel art generation in pure Rust.
//!
//! An image is tiled into square blocks. Each block is averaged, scaled by
//! brightness and contrast gains, passed through a named palette transform
//! and painted back as a solid color. An optional grid overlay marks the
//! block boundaries.
//!
//! ## Quick Start
//!
//! ```
//! use pixelate_core::{engine, PaletteLibrary, PixelBuffer, Settings};
//!
//! // 20x20 solid red image, 10px blocks, negative palette
//! let source = PixelBuffer::filled(20, 20, [255, 0, 0, 255]).unwrap();
//! let settings = Settings { palette: "negative".into(), ..Settings::default() };
//! let out = engine::render(&source, &settings, &PaletteLibrary::default());
//! assert_eq!(out.image.pixel(15, 15), [0, 255, 255, 255]);
//! assert!(out.grid.is_none());
//! ```
//!
//! For interactive hosts, [`Pixelator`] keeps settings and the source image
//! together and re-renders on every change.

pub mod buffer;
pub mod color;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod palette;
pub mod pixelator;
pub mod settings;

#[cfg(feature = "codec")]
pub mod codec;

// Re-export primary types at crate root.
pub use buffer::PixelBuffer;
pub use color::{adjust, average_block, clamp_channel, Color};
pub use debounce::{Debouncer, SliderQueue, SliderUpdate, SLIDER_DEBOUNCE};
pub use engine::{render, GridLine, GridOverlay, GridStroke, Rendering};
pub use error::PixelateError;
pub use palette::{PaletteFn, PaletteLibrary};
pub use pixelator::{Pixelator, State};
pub use settings::Settings;

#[cfg(feature = "codec")]
pub use codec::{decode_image, encode_png};
