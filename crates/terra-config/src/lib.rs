//! Configuration system for Terra.
//!
//! Provides runtime-configurable settings that persist to disk as RON files.
//! Supports CLI overrides via clap, hot-reload detection, and forward/backward
//! compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AssetsConfig, CONFIG_FILE_NAME, CameraConfig, Config, ControlsConfig, DebugConfig,
    DirectionalLightConfig, LightsConfig, PointLightConfig, SceneConfig, SceneVariant,
    WindowConfig,
};
pub use error::ConfigError;
