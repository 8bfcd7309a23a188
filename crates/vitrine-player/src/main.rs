//! Vitrine - interactive 3D portfolio showcase
//!
//! Usage:
//!   vitrine [--config <vitrine.toml>] [--assets <dir>] [--fullscreen] [--width W --height H]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vitrine_core::ShowcaseConfig;
use vitrine_player::{PanelContent, ShowcaseApp, WindowOptions};
use winit::event_loop::{ControlFlow, EventLoop};

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(about = "Interactive 3D portfolio showcase")]
struct Args {
    /// Path to the showcase config
    #[arg(long, default_value = "vitrine.toml")]
    config: PathBuf,

    /// Asset root, overriding the config
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Launch in fullscreen mode
    #[arg(long)]
    fullscreen: bool,

    /// Window width in physical pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Window height in physical pixels
    #[arg(long, default_value_t = 720)]
    height: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = ShowcaseConfig::load_or_default(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;
    if let Some(assets) = args.assets {
        config.asset_root = assets;
    }
    if !config.asset_root.is_dir() {
        tracing::warn!(
            "Asset root {} does not exist; every load will fail",
            config.asset_root.display()
        );
    }

    let content = PanelContent::embedded()?;

    tracing::info!("Showcase \"{}\" from {}", config.title, config.asset_root.display());

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let options = WindowOptions {
        width: args.width.max(1),
        height: args.height.max(1),
        fullscreen: args.fullscreen,
    };
    let mut app = ShowcaseApp::new(config, options, content);
    event_loop.run_app(&mut app)?;

    Ok(())
}
