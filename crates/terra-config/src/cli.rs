//! Command-line argument parsing for Terra.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, SceneVariant};

/// Terra command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "terra", about = "Rotating Earth, moon and starfield")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// Enable vsync.
    #[arg(long)]
    pub vsync: Option<bool>,

    /// Scene to build.
    #[arg(long, value_enum)]
    pub variant: Option<SceneVariant>,

    /// Planet spin constant (radians per second).
    #[arg(long)]
    pub planet_spin: Option<f32>,

    /// Enable drag-to-orbit camera controls.
    #[arg(long)]
    pub orbit_controls: Option<bool>,

    /// Start the HTTP light tweak panel (debug builds only).
    #[arg(long)]
    pub debug_panel: Option<bool>,

    /// Directory to load scene textures from.
    #[arg(long)]
    pub texture_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(fs) = args.fullscreen {
            self.window.fullscreen = fs;
        }
        if let Some(vsync) = args.vsync {
            self.window.vsync = vsync;
        }
        if let Some(variant) = args.variant {
            self.scene.variant = variant;
        }
        if let Some(k) = args.planet_spin {
            self.scene.planet_spin = k;
        }
        if let Some(orbit) = args.orbit_controls {
            self.controls.orbit = orbit;
        }
        if let Some(panel) = args.debug_panel {
            self.debug.debug_panel = panel;
        }
        if let Some(ref dir) = args.texture_dir {
            self.assets.texture_dir = dir.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
