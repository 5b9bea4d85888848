use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pixelate_core::codec::EXPORT_FILE_NAME;
use pixelate_core::{PaletteLibrary, Pixelator, Settings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use config::{load_settings, Overrides};

#[derive(Parser)]
#[command(name = "pixelate")]
#[command(about = "Turn images into block pixel art")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pixelate an image and write it as PNG
    Render {
        /// Input image (PNG, JPEG, GIF, BMP or WebP)
        input: PathBuf,

        /// Output PNG file path
        #[arg(short, long, default_value = EXPORT_FILE_NAME)]
        output: PathBuf,

        /// Settings file (YAML or JSON) applied before the flags below
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Block edge length in pixels (at least 1)
        #[arg(short, long)]
        block_size: Option<String>,

        /// Brightness gain (1.0 = unchanged)
        #[arg(long)]
        brightness: Option<String>,

        /// Contrast gain (1.0 = unchanged)
        #[arg(long)]
        contrast: Option<String>,

        /// Palette name, see `pixelate palettes`
        #[arg(short, long)]
        palette: Option<String>,

        /// Draw block grid lines into the output
        #[arg(short, long, conflicts_with = "no_grid")]
        grid: bool,

        /// Leave grid lines out even if the settings file enables them
        #[arg(long)]
        no_grid: bool,
    },
    /// List available palettes
    Palettes,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render {
            input,
            output,
            config,
            block_size,
            brightness,
            contrast,
            palette,
            grid,
            no_grid,
        } => {
            let overrides = Overrides {
                block_size,
                brightness,
                contrast,
                palette,
                grid: (grid || no_grid).then_some(grid),
            };
            run_render(&input, &output, config.as_deref(), &overrides)
        }
        Commands::Palettes => {
            for name in PaletteLibrary::default().names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

/// Load `input`, pixelate it and write the PNG export to `output`.
fn run_render(
    input: &Path,
    output: &Path,
    config: Option<&Path>,
    overrides: &Overrides,
) -> Result<()> {
    let base = match config {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };
    let settings = overrides.apply(base);

    let palettes = PaletteLibrary::default();
    if !palettes.contains(&settings.palette) {
        tracing::warn!(palette = %settings.palette, "Unknown palette, colors pass through unchanged");
    }

    let bytes = std::fs::read(input)
        .with_context(|| format!("Failed to read input image {}", input.display()))?;

    let mut session = Pixelator::with_settings(settings, palettes);
    session
        .load_image(&bytes)
        .with_context(|| format!("Failed to decode {}", input.display()))?;

    let png = session
        .export_png()?
        .context("No image loaded")?;
    std::fs::write(output, &png)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        block_size = session.settings().block_size,
        palette = %session.settings().palette,
        bytes = png.len(),
        "Wrote pixelated image"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelate_core::{decode_image, encode_png, PixelBuffer};
    use pretty_assertions::assert_eq;

    fn write_input(dir: &Path, width: u32, height: u32, rgba: [u8; 4]) -> PathBuf {
        let path = dir.join("input.png");
        let png = encode_png(&PixelBuffer::filled(width, height, rgba).unwrap()).unwrap();
        std::fs::write(&path, png).unwrap();
        path
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), 20, 20, [255, 0, 0, 255]);
        let output = dir.path().join("out.png");
        let overrides = Overrides {
            palette: Some("negative".into()),
            ..Overrides::default()
        };

        run_render(&input, &output, None, &overrides).unwrap();

        let result = decode_image(&std::fs::read(&output).unwrap()).unwrap();
        assert_eq!((result.width(), result.height()), (20, 20));
        assert_eq!(result.pixel(7, 13), [0, 255, 255, 255]);
    }

    #[test]
    fn test_render_with_config_and_grid() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), 15, 15, [200, 200, 200, 255]);
        let config = dir.path().join("settings.yml");
        std::fs::write(&config, "blockSize: 5\nshowGrid: true\n").unwrap();
        let output = dir.path().join("out.png");

        run_render(&input, &output, Some(&config), &Overrides::default()).unwrap();

        let result = decode_image(&std::fs::read(&output).unwrap()).unwrap();
        assert_eq!(result.pixel(2, 2), [200, 200, 200, 255]);
        assert_eq!(result.pixel(5, 2), [180, 180, 180, 255]);
    }

    #[test]
    fn test_no_grid_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), 15, 15, [200, 200, 200, 255]);
        let config = dir.path().join("settings.yml");
        std::fs::write(&config, "blockSize: 5\nshowGrid: true\n").unwrap();
        let output = dir.path().join("out.png");
        let overrides = Overrides {
            grid: Some(false),
            ..Overrides::default()
        };

        run_render(&input, &output, Some(&config), &overrides).unwrap();

        let result = decode_image(&std::fs::read(&output).unwrap()).unwrap();
        assert_eq!(result.pixel(5, 2), [200, 200, 200, 255]);
    }

    #[test]
    fn test_grid_flags_parse() {
        let cli = Cli::try_parse_from(["pixelate", "render", "in.png", "--no-grid"]).unwrap();
        let Commands::Render { grid, no_grid, .. } = cli.command else {
            panic!("expected render");
        };
        assert!(!grid);
        assert!(no_grid);
        assert!(Cli::try_parse_from(["pixelate", "render", "in.png", "-g", "--no-grid"]).is_err());
    }

    #[test]
    fn test_render_rejects_corrupt_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.png");
        std::fs::write(&input, b"not a png").unwrap();
        let output = dir.path().join("out.png");

        let err = run_render(&input, &output, None, &Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to decode"));
        assert!(!output.exists());
    }
}
