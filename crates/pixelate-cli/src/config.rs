//! Settings documents and command-line overrides.

use std::path::Path;

use anyhow::{Context, Result};
use pixelate_core::settings::{parse_block_size, parse_gain};
use pixelate_core::Settings;

/// Load a settings document. `.yaml`/`.yml` files are parsed as YAML,
/// anything else as JSON. Missing keys keep their defaults.
pub fn load_settings(path: &Path) -> Result<Settings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let settings: Settings = if is_yaml {
        serde_yaml::from_str(&text)
            .with_context(|| format!("Invalid YAML settings in {}", path.display()))?
    } else {
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON settings in {}", path.display()))?
    };
    tracing::debug!(path = %path.display(), ?settings, "Loaded settings file");
    Ok(settings.coerced())
}

/// Raw flag values. Numeric flags stay as text so malformed input is
/// coerced instead of rejected.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub block_size: Option<String>,
    pub brightness: Option<String>,
    pub contrast: Option<String>,
    pub palette: Option<String>,
    /// `Some(true)` for `--grid`, `Some(false)` for `--no-grid`.
    pub grid: Option<bool>,
}

impl Overrides {
    /// Apply every flag that was given on top of `settings`.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(size) = &self.block_size {
            settings.block_size = parse_block_size(size);
        }
        if let Some(brightness) = &self.brightness {
            settings.brightness = parse_gain(brightness);
        }
        if let Some(contrast) = &self.contrast {
            settings.contrast = parse_gain(contrast);
        }
        if let Some(palette) = &self.palette {
            settings.palette = palette.clone();
        }
        if let Some(grid) = self.grid {
            settings.show_grid = grid;
        }
        settings
    }
}
