//! Named palette transforms.
//!
//! A palette is a pure `fn(Color) -> Color` applied to the adjusted block
//! color. Transforms may leave `0..=255`; the final fill clamps again.
//! Lookups of unknown names fall back to [`identity`].

use std::collections::HashMap;

use crate::color::Color;

/// Signature shared by every palette transform.
pub type PaletteFn = fn(Color) -> Color;

/// Name of the pass-through palette.
pub const DEFAULT_PALETTE: &str = "default";

/// Built-in palettes in presentation order.
pub const BUILTIN_PALETTES: [(&str, PaletteFn); 16] = [
    (DEFAULT_PALETTE, identity),
    ("grayscale", grayscale),
    ("pastel", pastel),
    ("negative", negative),
    ("sepia", sepia),
    ("vibrant", vibrant),
    ("retro", retro),
    ("neon", neon),
    ("muted", muted),
    ("warm", warm),
    ("cool", cool),
    ("vintage", vintage),
    ("highContrast", high_contrast),
    ("nightMode", night_mode),
    ("blackAndWhite", black_and_white),
    ("solarized", solarized),
];

/// Registry mapping palette names to transforms.
///
/// # Examples
///
/// ```
/// use pixelate_core::{Color, PaletteLibrary};
/// let palettes = PaletteLibrary::default();
/// let negative = palettes.get("negative");
/// assert_eq!(negative(Color::new(10.0, 20.0, 30.0)), Color::new(245.0, 235.0, 225.0));
/// // Unknown names pass colors through unchanged.
/// let c = Color::new(1.0, 2.0, 3.0);
/// assert_eq!(palettes.get("no-such-palette")(c), c);
/// ```
#[derive(Debug, Clone)]
pub struct PaletteLibrary {
    transforms: HashMap<String, PaletteFn>,
    order: Vec<String>,
}

impl Default for PaletteLibrary {
    fn default() -> Self {
        let mut library = Self::empty();
        for (name, transform) in BUILTIN_PALETTES {
            library.register(name, transform);
        }
        library
    }
}

impl PaletteLibrary {
    /// A registry with no entries. Every lookup resolves to [`identity`].
    pub fn empty() -> Self {
        Self {
            transforms: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Add a palette, replacing any existing entry with the same name.
    /// Replacement keeps the original position in [`names`](Self::names).
    pub fn register(&mut self, name: impl Into<String>, transform: PaletteFn) -> &mut Self {
        let name = name.into();
        if self.transforms.insert(name.clone(), transform).is_none() {
            self.order.push(name);
        }
        self
    }

    /// The transform registered under `name`, or [`identity`].
    pub fn get(&self, name: &str) -> PaletteFn {
        match self.transforms.get(name) {
            Some(transform) => *transform,
            None => {
                tracing::debug!(palette = %name, "Unknown palette, using identity");
                identity
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Apply the palette named `name` to `color`.
    #[inline]
    pub fn apply(&self, name: &str, color: Color) -> Color {
        self.get(name)(color)
    }
}

pub fn identity(color: Color) -> Color {
    color
}

/// All channels replaced by the mean of R, G and B.
pub fn grayscale(color: Color) -> Color {
    let avg = color.mean();
    Color::new(avg, avg, avg)
}

pub fn pastel(color: Color) -> Color {
    color.map(|c| (c + 100.0).min(255.0))
}

pub fn negative(color: Color) -> Color {
    color.map(|c| 255.0 - c)
}

pub fn sepia(Color { r, g, b }: Color) -> Color {
    Color::new(
        (0.393 * r + 0.769 * g + 0.189 * b).min(255.0),
        (0.349 * r + 0.686 * g + 0.168 * b).min(255.0),
        (0.272 * r + 0.534 * g + 0.131 * b).min(255.0),
    )
}

pub fn vibrant(color: Color) -> Color {
    color.map(|c| (c * 1.2).min(255.0))
}

/// Darks boosted by 20%, lights cut by 20%. Unclamped.
pub fn retro(color: Color) -> Color {
    color.map(|c| if c < 128.0 { c * 1.2 } else { c * 0.8 })
}

// Same curve as pastel; kept as a distinct name.
pub fn neon(color: Color) -> Color {
    color.map(|c| (c + 100.0).min(255.0))
}

pub fn muted(color: Color) -> Color {
    color.map(|c| c * 0.8)
}

pub fn warm(Color { r, g, b }: Color) -> Color {
    Color::new((r + 50.0).min(255.0), g, (b - 50.0).max(0.0))
}

pub fn cool(Color { r, g, b }: Color) -> Color {
    Color::new((r - 50.0).max(0.0), g, (b + 50.0).min(255.0))
}

pub fn vintage(Color { r, g, b }: Color) -> Color {
    Color::new(
        (0.9 * r + 40.0).min(255.0),
        (0.85 * g + 30.0).min(255.0),
        (0.7 * b + 20.0).min(255.0),
    )
}

pub fn high_contrast(color: Color) -> Color {
    color.map(|c| if c > 128.0 { (c * 1.5).min(255.0) } else { c * 0.5 })
}

pub fn night_mode(Color { r, g, b }: Color) -> Color {
    Color::new(r * 0.5, g * 0.5, (b * 1.5).min(255.0))
}

/// Pure white when the channel mean exceeds 128, otherwise pure black.
pub fn black_and_white(color: Color) -> Color {
    let v = if color.mean() > 128.0 { 255.0 } else { 0.0 };
    Color::new(v, v, v)
}

pub fn solarized(color: Color) -> Color {
    color.map(|c| if c > 128.0 { 255.0 - c } else { c * 1.2 })
}
