//! Point and directional lights, the point-light helper, and their GPU form.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use terra_config::{DirectionalLightConfig, LightsConfig, PointLightConfig};

/// Ambient term added so unlit hemispheres stay faintly visible.
pub const AMBIENT: f32 = 0.04;

/// Omnidirectional light at a position.
#[derive(Clone, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    /// Linear RGB, not premultiplied by intensity.
    pub color: Vec3,
    pub intensity: f32,
    /// Cutoff radius. `0.0` means the light reaches everywhere unattenuated.
    pub distance: f32,
}

impl PointLight {
    pub fn from_config(config: &PointLightConfig) -> Self {
        Self {
            position: Vec3::from(config.position),
            color: Vec3::from(config.color),
            intensity: config.intensity,
            distance: config.distance,
        }
    }
}

/// Attenuation at `distance` from a point light with cutoff `range`, in `[0, 1]`.
///
/// A zero range disables falloff. Otherwise inverse-square with a smooth
/// window reaching exactly zero at the cutoff.
pub fn attenuation(distance: f32, range: f32) -> f32 {
    if range <= 0.0 {
        return 1.0;
    }
    if distance >= range {
        return 0.0;
    }
    let inv_sq = 1.0 / (distance * distance + 1.0);
    let ratio = distance / range;
    let t = (1.0 - ratio * ratio).max(0.0);
    inv_sq * t * t
}

/// Infinitely distant light shining from `position` toward the origin.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl DirectionalLight {
    pub fn from_config(config: &DirectionalLightConfig) -> Self {
        Self {
            position: Vec3::from(config.position),
            color: Vec3::from(config.color),
            intensity: config.intensity,
        }
    }

    /// Unit vector pointing from the surface toward the light. Falls back to +Y
    /// when the light sits at the origin.
    pub fn to_light(&self) -> Vec3 {
        self.position.try_normalize().unwrap_or(Vec3::Y)
    }
}

/// Wireframe marker drawn at the point light's position in its color.
#[derive(Clone, Debug, PartialEq)]
pub struct PointLightHelper {
    pub size: f32,
}

impl Default for PointLightHelper {
    fn default() -> Self {
        Self { size: 0.1 }
    }
}

/// The scene's light rig.
#[derive(Clone, Debug, PartialEq)]
pub struct Lights {
    pub point: PointLight,
    pub directional: DirectionalLight,
    pub helper: Option<PointLightHelper>,
}

impl Lights {
    pub fn from_config(config: &LightsConfig) -> Self {
        Self {
            point: PointLight::from_config(&config.point),
            directional: DirectionalLight::from_config(&config.directional),
            helper: config.show_helper.then(PointLightHelper::default),
        }
    }

    /// Write the current values back into a config section.
    pub fn to_config(&self) -> LightsConfig {
        LightsConfig {
            point: PointLightConfig {
                position: self.point.position.to_array(),
                color: self.point.color.to_array(),
                intensity: self.point.intensity,
                distance: self.point.distance,
            },
            directional: DirectionalLightConfig {
                position: self.directional.position.to_array(),
                color: self.directional.color.to_array(),
                intensity: self.directional.intensity,
            },
            show_helper: self.helper.is_some(),
        }
    }

    pub fn to_uniform(&self) -> LightsUniform {
        let p = &self.point;
        let d = &self.directional;
        let to_sun = d.to_light();
        LightsUniform {
            point_position_range: [p.position.x, p.position.y, p.position.z, p.distance],
            point_color_intensity: [p.color.x, p.color.y, p.color.z, p.intensity],
            sun_direction_intensity: [to_sun.x, to_sun.y, to_sun.z, d.intensity],
            sun_color_ambient: [d.color.x, d.color.y, d.color.z, AMBIENT],
        }
    }
}

/// GPU-side light block, 64 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LightsUniform {
    /// xyz = position, w = cutoff range (0 = none).
    pub point_position_range: [f32; 4],
    /// xyz = color, w = intensity.
    pub point_color_intensity: [f32; 4],
    /// xyz = unit vector toward the sun, w = intensity.
    pub sun_direction_intensity: [f32; 4],
    /// xyz = sun color, w = ambient.
    pub sun_color_ambient: [f32; 4],
}

impl LightsUniform {
    /// Lights that contribute nothing; used by the unlit variant.
    pub fn dark() -> Self {
        Self::zeroed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_default_config() {
        let lights = Lights::from_config(&LightsConfig::default());
        assert_eq!(lights.point.position, Vec3::new(2.0, 1.0, 2.0));
        assert_eq!(lights.point.intensity, 1.0);
        assert_eq!(lights.directional.position, Vec3::new(5.0, 3.0, 5.0));
        assert_eq!(lights.helper, Some(PointLightHelper { size: 0.1 }));
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = LightsConfig::default();
        config.point.color = [1.0, 0.5, 0.25];
        config.show_helper = false;
        assert_eq!(Lights::from_config(&config).to_config(), config);
    }

    #[test]
    fn test_sun_direction_points_at_light() {
        let light = DirectionalLight::from_config(&DirectionalLightConfig::default());
        let dir = light.to_light();
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!((dir - Vec3::new(5.0, 3.0, 5.0).normalize()).length() < 1e-6);
    }

    #[test]
    fn test_sun_at_origin_falls_back() {
        let light = DirectionalLight {
            position: Vec3::ZERO,
            color: Vec3::ONE,
            intensity: 1.0,
        };
        assert_eq!(light.to_light(), Vec3::Y);
    }

    #[test]
    fn test_unlimited_range_has_no_falloff() {
        assert_eq!(attenuation(0.0, 0.0), 1.0);
        assert_eq!(attenuation(100.0, 0.0), 1.0);
    }

    #[test]
    fn test_attenuation_windowed() {
        assert_eq!(attenuation(5.0, 5.0), 0.0);
        assert_eq!(attenuation(6.0, 5.0), 0.0);
        assert!((attenuation(0.0, 5.0) - 1.0).abs() < 1e-6);
        let near = attenuation(1.0, 5.0);
        let far = attenuation(3.0, 5.0);
        assert!(near > far && far > 0.0);
    }

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<LightsUniform>(), 64);
        let uniform = Lights::from_config(&LightsConfig::default()).to_uniform();
        assert_eq!(uniform.point_position_range, [2.0, 1.0, 2.0, 0.0]);
        assert_eq!(uniform.point_color_intensity[3], 1.0);
        assert_eq!(uniform.sun_color_ambient[3], AMBIENT);
        assert_eq!(LightsUniform::dark().point_color_intensity, [0.0; 4]);
    }
}
