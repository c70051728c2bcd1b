//! Opens a window showing the rotating Earth.
//!
//! Configuration is loaded from `config.ron` in the platform config directory
//! and can be overridden with CLI flags, e.g.
//! `cargo run -p terra-app -- --width 1920 --height 1080 --orbit-controls true`.

use clap::Parser;
use terra_app::PlatformDirs;
use terra_config::{CliArgs, Config};
use tracing::{error, info};

fn main() {
    let args = CliArgs::parse();

    let dirs = PlatformDirs::resolve_and_create(args.config.clone()).unwrap_or_else(|e| {
        eprintln!("Failed to prepare terra directories: {e}");
        std::process::exit(1);
    });

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&dirs.config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    terra_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!(
        "Starting {:?} scene, textures from {}",
        config.scene.variant,
        config.assets.texture_dir.display()
    );

    if let Err(e) = terra_app::run(config) {
        error!("{e}");
        std::process::exit(1);
    }
}
