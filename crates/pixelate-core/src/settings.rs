//! User-adjustable pixelation parameters.
//!
//! Values are never rejected. Out-of-range or unparseable input is coerced
//! to the nearest usable value so a slider or text field can feed raw
//! input straight through.

use serde::{Deserialize, Deserializer, Serialize};

use crate::palette::DEFAULT_PALETTE;

pub const DEFAULT_BLOCK_SIZE: u32 = 10;
pub const DEFAULT_BRIGHTNESS: f64 = 1.0;
pub const DEFAULT_CONTRAST: f64 = 1.0;

/// Parameters controlling a render.
///
/// Deserializes from a partial camelCase document; missing keys take their
/// defaults and numeric fields accept numbers or text of any range, coerced
/// like the setters:
///
/// ```
/// use pixelate_core::Settings;
/// let settings: Settings = serde_json::from_str(r#"{"blockSize": 4, "palette": "sepia"}"#).unwrap();
/// assert_eq!(settings.block_size, 4);
/// assert_eq!(settings.brightness, 1.0);
/// assert!(!settings.show_grid);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Edge length of a square block in source pixels. Coerced to `>= 1`.
    #[serde(deserialize_with = "lenient_block_size")]
    pub block_size: u32,
    /// Multiplicative gain.
    #[serde(deserialize_with = "lenient_brightness")]
    pub brightness: f64,
    /// Multiplicative gain applied together with brightness.
    #[serde(deserialize_with = "lenient_contrast")]
    pub contrast: f64,
    /// Palette name; unknown names render as the identity palette.
    pub palette: String,
    /// Emit grid overlay lines alongside the pixel output.
    pub show_grid: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            brightness: DEFAULT_BRIGHTNESS,
            contrast: DEFAULT_CONTRAST,
            palette: DEFAULT_PALETTE.to_string(),
            show_grid: false,
        }
    }
}

impl Settings {
    /// A copy with every field passed through its coercion rule.
    pub fn coerced(mut self) -> Self {
        self.block_size = coerce_block_size(self.block_size as i64);
        self.brightness = coerce_gain(self.brightness, DEFAULT_BRIGHTNESS);
        self.contrast = coerce_gain(self.contrast, DEFAULT_CONTRAST);
        self
    }

    /// Block size as used by the engine: never below 1.
    #[inline]
    pub fn effective_block_size(&self) -> u32 {
        self.block_size.max(1)
    }

    pub fn set_block_size(&mut self, size: i64) {
        self.block_size = coerce_block_size(size);
    }

    pub fn set_brightness(&mut self, brightness: f64) {
        self.brightness = coerce_gain(brightness, DEFAULT_BRIGHTNESS);
    }

    pub fn set_contrast(&mut self, contrast: f64) {
        self.contrast = coerce_gain(contrast, DEFAULT_CONTRAST);
    }

    pub fn set_palette(&mut self, palette: impl Into<String>) {
        self.palette = palette.into();
    }

    pub fn set_show_grid(&mut self, show_grid: bool) {
        self.show_grid = show_grid;
    }
}

/// Clamp a block size into `1..=u32::MAX`.
pub fn coerce_block_size(size: i64) -> u32 {
    size.clamp(1, u32::MAX as i64) as u32
}

/// Map a gain onto `[0, f64::MAX]`. NaN becomes `fallback`.
pub fn coerce_gain(gain: f64, fallback: f64) -> f64 {
    if gain.is_nan() {
        fallback
    } else {
        gain.clamp(0.0, f64::MAX)
    }
}

/// Parse a block size the way a form field would: leading whitespace is
/// skipped and the longest leading integer is used, so `"12px"` and
/// `"12.9"` both give 12. No leading digits at all gives 1.
///
/// ```
/// use pixelate_core::settings::parse_block_size;
/// assert_eq!(parse_block_size(" 12.9 "), 12);
/// assert_eq!(parse_block_size("12px"), 12);
/// assert_eq!(parse_block_size("-3"), 1);
/// assert_eq!(parse_block_size("big"), 1);
/// ```
pub fn parse_block_size(text: &str) -> u32 {
    let text = text.trim_start();
    let (negative, rest) = split_sign(text);
    let digits = leading_digits(rest);
    if digits == 0 || negative {
        return 1;
    }
    // Overflow can only mean "too many digits".
    rest[..digits]
        .parse::<u64>()
        .map_or(u32::MAX, |v| v.min(u32::MAX as u64) as u32)
        .max(1)
}

/// Parse a brightness or contrast gain from the longest leading decimal
/// number in `text` (`"1.5x"` gives 1.5). Text without one yields the
/// default gain of 1.0; negatives clamp to 0.
pub fn parse_gain(text: &str) -> f64 {
    float_prefix(text).map_or(DEFAULT_BRIGHTNESS, |v| coerce_gain(v, DEFAULT_BRIGHTNESS))
}

fn split_sign(text: &str) -> (bool, &str) {
    match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    }
}

fn leading_digits(text: &str) -> usize {
    text.bytes().take_while(u8::is_ascii_digit).count()
}

/// Longest leading `[sign] digits [. digits] [e [sign] digits]` or
/// `[sign] Infinity` in `text`, after leading whitespace.
fn float_prefix(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let (negative, rest) = split_sign(text);
    let sign = if negative { -1.0 } else { 1.0 };
    if rest.starts_with("Infinity") {
        return Some(sign * f64::INFINITY);
    }

    let int_digits = leading_digits(rest);
    let mut end = int_digits;
    let mut frac_digits = 0;
    if rest[end..].starts_with('.') {
        frac_digits = leading_digits(&rest[end + 1..]);
        end += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return None;
    }
    if matches!(rest.as_bytes().get(end), Some(b'e' | b'E')) {
        let (_, exp) = split_sign(&rest[end + 1..]);
        let exp_digits = leading_digits(exp);
        if exp_digits > 0 {
            end = rest.len() - exp.len() + exp_digits;
        }
    }
    rest[..end].parse::<f64>().ok().map(|v| sign * v)
}

/// A settings value as written in a document: any number, text, or
/// something else entirely.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseValue {
    Int(i64),
    Float(f64),
    Text(String),
    Other(#[allow(dead_code)] serde::de::IgnoredAny),
}

fn lenient_block_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(match LooseValue::deserialize(deserializer)? {
        LooseValue::Int(v) => coerce_block_size(v),
        LooseValue::Float(v) if v.is_nan() => 1,
        // Saturating cast: out-of-range floats land on the clamp bounds.
        LooseValue::Float(v) => coerce_block_size(v.trunc() as i64),
        LooseValue::Text(text) => parse_block_size(&text),
        LooseValue::Other(_) => DEFAULT_BLOCK_SIZE,
    })
}

fn lenient_gain<'de, D: Deserializer<'de>>(deserializer: D, fallback: f64) -> Result<f64, D::Error> {
    Ok(match LooseValue::deserialize(deserializer)? {
        LooseValue::Int(v) => coerce_gain(v as f64, fallback),
        LooseValue::Float(v) => coerce_gain(v, fallback),
        LooseValue::Text(text) => float_prefix(&text).map_or(fallback, |v| coerce_gain(v, fallback)),
        LooseValue::Other(_) => fallback,
    })
}

fn lenient_brightness<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    lenient_gain(deserializer, DEFAULT_BRIGHTNESS)
}

fn lenient_contrast<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    lenient_gain(deserializer, DEFAULT_CONTRAST)
}
