//! Binary entrypoint for the layer preview tools.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use layer_preview::config::Configuration;
use layer_preview::tasks::{label_window, viewer};

const DEFAULT_CONFIG: &str = "layer-preview.yaml";

#[derive(Debug, Parser)]
#[command(name = "layer-preview", about = "Aspect-fit image label and layered texture preview")]
struct Cli {
    /// Path to YAML config file [default: layer-preview.yaml, skipped if missing]
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (repeatable); ignored when RUST_LOG is set
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    /// Config path to load and whether the user named it explicitly.
    fn config_path(&self) -> (PathBuf, bool) {
        match &self.config {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG), false),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Composite the configured layers side by side on the GPU
    Preview,
    /// Show one image scaled to fit the window
    Label {
        /// Image to show; overrides label.image
        #[arg(long, value_name = "FILE")]
        image: Option<PathBuf>,
    },
}

fn build_filter(verbosity: u8, rust_log: Option<&str>) -> Result<EnvFilter> {
    let filter = match rust_log {
        Some(directives) => EnvFilter::builder().parse_lossy(directives),
        None => {
            // map -v to log level
            let level = match verbosity {
                0 => Level::INFO,
                1 => Level::DEBUG,
                _ => Level::TRACE,
            };
            EnvFilter::default().add_directive(format!("layer_preview={level}").parse()?)
        }
    };
    Ok(filter
        .add_directive("wgpu=warn".parse()?)
        .add_directive("winit=warn".parse()?))
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty());
    let filter = build_filter(verbosity, rust_log.as_deref())?;
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let (config_path, explicit) = cli.config_path();
    let mut cfg = Configuration::load(&config_path, !explicit)?;
    if let Command::Label { image: Some(image) } = &cli.command {
        cfg.label.image = Some(image.clone());
    }
    let cfg = cfg.validated().context("validating configuration")?;

    match cli.command {
        Command::Preview => {
            info!(layers = cfg.preview.layers.len(), "starting layer preview");
            viewer::run_windowed(cfg)
        }
        Command::Label { .. } => {
            info!("starting image label");
            label_window::run(cfg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn config_defaults_when_flag_absent() {
        let cli = Cli::try_parse_from(["layer-preview", "preview"]).unwrap();
        assert_eq!(cli.config_path(), (PathBuf::from(DEFAULT_CONFIG), false));
    }

    #[test]
    fn naming_the_default_file_is_still_explicit() {
        let cli =
            Cli::try_parse_from(["layer-preview", "--config", DEFAULT_CONFIG, "preview"]).unwrap();
        assert_eq!(cli.config_path(), (PathBuf::from(DEFAULT_CONFIG), true));

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join(DEFAULT_CONFIG);
        assert!(Configuration::load(&missing, false).is_err());
    }

    #[test]
    fn label_image_flag_parses() {
        let cli = Cli::try_parse_from(["layer-preview", "-vv", "label", "--image", "a.png"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Label { image } => assert_eq!(image, Some(PathBuf::from("a.png"))),
            Command::Preview => panic!("expected label subcommand"),
        }
    }

    #[test]
    fn verbosity_sets_level_without_rust_log() {
        let filter = build_filter(2, None).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn rust_log_wins_over_verbosity() {
        let filter = build_filter(2, Some("layer_preview=warn")).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }
}
