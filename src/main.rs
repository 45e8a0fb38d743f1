//! Binary entrypoint for the slider3d demo.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use slider3d::{Slider, SliderConfig, StyleKind};

/// Simple CLI
#[derive(Debug, Parser)]
#[command(name = "slider3d", about = "3D slideshow transitions")]
struct Cli {
    /// Directory of slide images (overrides the config slide list)
    #[arg(value_name = "DIR")]
    photos: Option<PathBuf>,

    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the transition style
    #[arg(long, value_name = "STYLE")]
    style: Option<String>,

    /// Override the step duration (ms)
    #[arg(long, value_name = "MILLIS")]
    duration_ms: Option<u64>,

    /// Advance automatically
    #[arg(long)]
    auto_play: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("slider3d={level}").parse()?)
        .add_directive("wgpu=warn".parse()?)
        .add_directive("winit=warn".parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

fn parse_style(raw: &str) -> Result<StyleKind> {
    serde_yaml::from_str(raw).with_context(|| format!("unknown style {raw:?}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut cfg = match &cli.config {
        Some(path) => slider3d::config::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SliderConfig::default(),
    };
    if let Some(style) = &cli.style {
        cfg.style = parse_style(style)?;
    }
    if let Some(ms) = cli.duration_ms {
        cfg.transition_duration = Duration::from_millis(ms);
    }
    if cli.auto_play {
        cfg.auto_play = true;
    }
    cfg.validate().context("validating configuration")?;

    let slides = match &cli.photos {
        Some(dir) => slider3d::slide::scan_slides(dir)
            .with_context(|| format!("scanning {}", dir.display()))?,
        None if !cfg.slides.is_empty() => cfg.slides.clone(),
        None => anyhow::bail!("no slides: pass an image directory or configure a slide list"),
    };
    info!(count = slides.len(), style = %cfg.style, "scanned slides");

    let slider = Slider::new(slides, cfg)?;
    slider3d::render::viewer::run_slider(slider)?;
    Ok(())
}
