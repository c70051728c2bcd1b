//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the persisted config inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Scene composition and animation constants.
    pub scene: SceneConfig,
    /// Camera projection and placement.
    pub camera: CameraConfig,
    /// Point and directional light placement.
    pub lights: LightsConfig,
    /// Asset locations.
    pub assets: AssetsConfig,
    /// Orbit camera controls.
    pub controls: ControlsConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Start in fullscreen mode.
    pub fullscreen: bool,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
    /// Upper bound applied to the display scale factor when sizing the
    /// backing buffer.
    pub max_pixel_ratio: f64,
}

/// Which scene the builder constructs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum SceneVariant {
    /// Planet, clouds, moon, starfield, atmosphere and lights.
    #[default]
    Earth,
    /// A single unlit red sphere.
    Minimal,
}

/// Scene composition and animation constants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Scene variant to build.
    pub variant: SceneVariant,
    /// Planet spin `k` in `rotation.y = -t * k` (radians per second).
    pub planet_spin: f32,
    /// Cloud shell spin (radians per second).
    pub cloud_spin: f32,
    /// Starfield parent spin (radians per second).
    pub star_spin: f32,
    /// Radius of the moon's circular orbit in the XZ plane.
    pub moon_orbit_radius: f32,
    /// Angular speed of the moon's orbit (radians per second).
    pub moon_orbit_speed: f32,
    /// Number of generated stars.
    pub star_count: u32,
    /// Edge length of the cube the stars are scattered in, centered on the origin.
    pub star_spread: f32,
    /// Seed for star placement.
    pub star_seed: u64,
    /// Star sprite size in world units.
    pub star_size: f32,
}

/// Camera projection and placement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_deg: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
    /// Distance from the origin along +Z.
    pub distance: f32,
}

/// Point light placement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PointLightConfig {
    /// World position.
    pub position: [f32; 3],
    /// Linear RGB color.
    pub color: [f32; 3],
    /// Intensity multiplier.
    pub intensity: f32,
    /// Cutoff distance (0 = unlimited).
    pub distance: f32,
}

/// Directional ("sun") light placement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DirectionalLightConfig {
    /// Position the light shines from, toward the origin.
    pub position: [f32; 3],
    /// Linear RGB color.
    pub color: [f32; 3],
    /// Intensity multiplier.
    pub intensity: f32,
}

/// Light configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightsConfig {
    /// The point light.
    pub point: PointLightConfig,
    /// The directional light.
    pub directional: DirectionalLightConfig,
    /// Draw the ring marker at the point light's position.
    pub show_helper: bool,
}

/// Asset locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory the scene textures are loaded from.
    pub texture_dir: PathBuf,
}

/// Orbit camera controls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    /// Enable drag-to-orbit and scroll-to-zoom.
    pub orbit: bool,
    /// Damping factor applied to orbit velocity each frame (0 disables damping).
    pub damping: f32,
    /// Radians of rotation per pixel of drag.
    pub rotate_speed: f32,
    /// Fractional distance change per scroll line.
    pub zoom_speed: f32,
    /// Closest allowed camera distance.
    pub min_distance: f32,
    /// Farthest allowed camera distance.
    pub max_distance: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Start the HTTP light tweak panel (debug builds only).
    pub debug_panel: bool,
    /// Port for the tweak panel.
    pub debug_port: u16,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            title: "Terra".to_string(),
            max_pixel_ratio: 2.0,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            variant: SceneVariant::Earth,
            planet_spin: 0.005,
            cloud_spin: 0.008,
            star_spin: 0.002,
            moon_orbit_radius: 1.5,
            moon_orbit_speed: 0.03,
            star_count: 15_000,
            star_spread: 10.0,
            star_seed: 42,
            star_size: 0.02,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: 45.0,
            near: 0.1,
            far: 1000.0,
            distance: 3.0,
        }
    }
}

impl Default for PointLightConfig {
    fn default() -> Self {
        Self {
            position: [2.0, 1.0, 2.0],
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
            distance: 0.0,
        }
    }
}

impl Default for DirectionalLightConfig {
    fn default() -> Self {
        Self {
            position: [5.0, 3.0, 5.0],
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
        }
    }
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            point: PointLightConfig::default(),
            directional: DirectionalLightConfig::default(),
            show_helper: true,
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            texture_dir: PathBuf::from("static").join("textures"),
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            orbit: false,
            damping: 0.05,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            min_distance: 0.8,
            max_distance: 10.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_panel: false,
            debug_port: 9999,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let config = read_config(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::Write {
            path: config_path.clone(),
            source,
        })?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = read_config(&config_dir.join(CONFIG_FILE_NAME))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
