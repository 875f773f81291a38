//! Tile mosaic renderer.
//!
//! Loads a tile index layer from a YAML config and renders a viewport to
//! PNG, lists the tiles a viewport resolves to, or prints the index extent.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use map_common::BoundingBox;
use mosaic_render::commands;
use tile_index::TileIndexConfig;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "mosaic-render")]
#[command(about = "Render raster mosaics described by a tile index")]
struct Args {
    /// Tile index layer configuration (YAML)
    #[arg(short, long, env = "MOSAIC_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log level, used when RUST_LOG is unset
    #[arg(long, default_value = "info", env = "MOSAIC_LOG_LEVEL", global = true)]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "MOSAIC_LOG_FORMAT", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a viewport to an image file
    Render {
        /// Viewport envelope as minx,miny,maxx,maxy
        #[arg(long, allow_hyphen_values = true)]
        bbox: BoundingBox,

        /// Output width in pixels
        #[arg(long, default_value = "1024")]
        width: u32,

        /// Output height in pixels
        #[arg(long, default_value = "1024")]
        height: u32,

        /// Output file; the format follows the extension
        #[arg(short, long, default_value = "mosaic.png")]
        output: PathBuf,
    },

    /// List the tiles a viewport resolves to, as JSON
    Tiles {
        /// Query envelope as minx,miny,maxx,maxy
        #[arg(long, allow_hyphen_values = true)]
        bbox: BoundingBox,
    },

    /// Print the extent of the whole index
    Extent,
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_tracing(&args.log_level, args.log_format);

    let config_path = args
        .config
        .context("no tile index configuration given (use --config or MOSAIC_CONFIG)")?;
    let config = TileIndexConfig::from_yaml_file(&config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    info!(
        layer = %config.name,
        index = %config.index_path.display(),
        transform = config.transform.as_str(),
        "Loaded configuration"
    );

    match args.command {
        Command::Render {
            bbox,
            width,
            height,
            output,
        } => {
            let report = commands::render(config, bbox, width, height, &output)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Tiles { bbox } => {
            let listing = commands::tiles(config, bbox)?;
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        Command::Extent => match commands::extent(config)? {
            Some(extent) => println!("{}", extent),
            None => println!("empty index"),
        },
    }

    Ok(())
}

/// Logs go to stderr so command output on stdout stays machine readable.
fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiles_accepts_negative_bbox() {
        let args = Args::try_parse_from([
            "mosaic-render",
            "--config",
            "x.yaml",
            "tiles",
            "--bbox",
            "-125,24,-66,50",
        ])
        .unwrap();

        match args.command {
            Command::Tiles { bbox } => {
                assert_eq!(bbox, BoundingBox::new(-125.0, 24.0, -66.0, 50.0));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_render_accepts_negative_bbox() {
        let args = Args::try_parse_from([
            "mosaic-render",
            "render",
            "--bbox",
            "-10.5,-20,-1,-2",
            "--width",
            "64",
        ])
        .unwrap();

        match args.command {
            Command::Render {
                bbox,
                width,
                height,
                ..
            } => {
                assert_eq!(bbox, BoundingBox::new(-10.5, -20.0, -1.0, -2.0));
                assert_eq!((width, height), (64, 1024));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
