//! Debug tweak panel for Terra.
//!
//! An HTTP server that exposes frame metrics and lets the light rig be
//! adjusted while the scene runs. Only compiled in debug builds.

#[cfg(debug_assertions)]
pub mod server;

#[cfg(debug_assertions)]
pub use server::{DebugServer, DebugServerError};


use serde::{Deserialize, Serialize};
use terra_config::{DirectionalLightConfig, LightsConfig, PointLightConfig};

/// Environment variable that overrides the configured port.
pub const DEBUG_PORT_ENV: &str = "TERRA_DEBUG_PORT";

/// State shared between the frame loop and the debug server.
/// The frame loop publishes metrics each frame and picks up light edits.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DebugState {
    pub frame_count: u64,
    pub frame_time_ms: f64,
    pub fps: f64,
    pub uptime_seconds: f64,
    pub window_width: u32,
    pub window_height: u32,
    pub buffer_width: u32,
    pub buffer_height: u32,
    pub camera_aspect: f32,
    pub textures_loaded: u32,
    pub quit_requested: bool,
    #[serde(skip)]
    pub lights: LightsConfig,
    /// Set when `lights` was edited over HTTP and not yet applied to the scene.
    #[serde(skip)]
    pub lights_dirty: bool,
}

impl DebugState {
    pub fn with_lights(lights: LightsConfig) -> Self {
        Self {
            lights,
            ..Default::default()
        }
    }

    /// Take pending light edits, if any.
    pub fn take_light_edits(&mut self) -> Option<LightsConfig> {
        if !self.lights_dirty {
            return None;
        }
        self.lights_dirty = false;
        Some(self.lights.clone())
    }
}

/// Partial update to a point light. Absent fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PointLightPatch {
    pub position: Option<[f32; 3]>,
    pub color: Option<[f32; 3]>,
    pub intensity: Option<f32>,
    pub distance: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DirectionalLightPatch {
    pub position: Option<[f32; 3]>,
    pub color: Option<[f32; 3]>,
    pub intensity: Option<f32>,
}

/// Body of `POST /lights`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LightsPatch {
    pub point: Option<PointLightPatch>,
    pub directional: Option<DirectionalLightPatch>,
}

impl PointLightPatch {
    fn apply(&self, light: &mut PointLightConfig) {
        if let Some(position) = self.position {
            light.position = position;
        }
        if let Some(color) = self.color {
            light.color = color;
        }
        if let Some(intensity) = self.intensity {
            light.intensity = intensity.max(0.0);
        }
        if let Some(distance) = self.distance {
            light.distance = distance.max(0.0);
        }
    }
}

impl DirectionalLightPatch {
    fn apply(&self, light: &mut DirectionalLightConfig) {
        if let Some(position) = self.position {
            light.position = position;
        }
        if let Some(color) = self.color {
            light.color = color;
        }
        if let Some(intensity) = self.intensity {
            light.intensity = intensity.max(0.0);
        }
    }
}

impl LightsPatch {
    /// Apply to `lights`. Returns `true` if anything was specified.
    pub fn apply(&self, lights: &mut LightsConfig) -> bool {
        if let Some(point) = &self.point {
            point.apply(&mut lights.point);
        }
        if let Some(directional) = &self.directional {
            directional.apply(&mut lights.directional);
        }
        self.point.is_some() || self.directional.is_some()
    }
}

/// Port from `TERRA_DEBUG_PORT`, falling back to `default`.
pub fn debug_port(default: u16) -> u16 {
    parse_port(std::env::var(DEBUG_PORT_ENV).ok().as_deref(), default)
}

fn parse_port(value: Option<&str>, default: u16) -> u16 {
    value
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
