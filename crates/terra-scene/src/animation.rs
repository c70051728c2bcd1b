//! Time-driven motion.
//!
//! Every value is a pure function of elapsed time, so frame rate only
//! changes how often the scene is sampled, never how fast it moves.

use glam::Vec3;

use crate::scene::{Role, Scene};

pub const DEFAULT_MOON_ORBIT_RADIUS: f32 = 1.5;
pub const DEFAULT_MOON_ORBIT_SPEED: f32 = 0.03;

/// Y rotation of a body spinning at `spin` radians per second.
pub fn planet_rotation_y(t: f32, spin: f32) -> f32 {
    -t * spin
}

/// Moon position on its circular orbit in the XZ plane.
pub fn moon_position(t: f32, radius: f32, speed: f32) -> Vec3 {
    let angle = speed * t;
    Vec3::new(-angle.cos() * radius, 0.0, -angle.sin() * radius)
}

/// Pose every animated node for elapsed time `t` in seconds.
pub fn animate(scene: &mut Scene, t: f32) {
    let motion = scene.motion;
    if let Some(planet) = scene.node_mut(Role::Planet) {
        planet.transform.rotation.y = planet_rotation_y(t, motion.planet_spin);
    }
    if let Some(clouds) = scene.node_mut(Role::Clouds) {
        clouds.transform.rotation.y = planet_rotation_y(t, motion.cloud_spin);
    }
    if let Some(stars) = scene.node_mut(Role::Stars) {
        stars.transform.rotation.y = planet_rotation_y(t, motion.star_spin);
    }
    if let Some(moon) = scene.node_mut(Role::Moon) {
        moon.transform.position =
            moon_position(t, motion.moon_orbit_radius, motion.moon_orbit_speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_config::{Config, SceneVariant};

    #[test]
    fn test_planet_rotation() {
        assert_eq!(planet_rotation_y(0.0, 0.005), 0.0);
        assert!((planet_rotation_y(100.0, 0.005) + 0.5).abs() < 1e-6);
        assert!((planet_rotation_y(100.0, 0.008) + 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_moon_orbit() {
        let start = moon_position(0.0, DEFAULT_MOON_ORBIT_RADIUS, DEFAULT_MOON_ORBIT_SPEED);
        assert!((start - Vec3::new(-1.5, 0.0, 0.0)).length() < 1e-6);

        // A quarter orbit takes (π/2) / 0.03 seconds.
        let quarter = std::f32::consts::FRAC_PI_2 / DEFAULT_MOON_ORBIT_SPEED;
        let p = moon_position(quarter, DEFAULT_MOON_ORBIT_RADIUS, DEFAULT_MOON_ORBIT_SPEED);
        assert!((p - Vec3::new(0.0, 0.0, -1.5)).length() < 1e-4);

        for t in [0.0, 1.0, 17.5, 400.0] {
            let p = moon_position(t, 1.5, 0.03);
            assert!((p.length() - 1.5).abs() < 1e-5);
            assert_eq!(p.y, 0.0);
        }
    }

    #[test]
    fn test_animate_earth_scene() {
        let mut scene = Scene::earth(&Config::default());
        animate(&mut scene, 200.0);

        let rot = |role| scene.node(role).unwrap().transform.rotation.y;
        assert!((rot(Role::Planet) + 1.0).abs() < 1e-5);
        assert!((rot(Role::Clouds) + 1.6).abs() < 1e-5);
        assert!((rot(Role::Stars) + 0.4).abs() < 1e-5);
        assert_eq!(rot(Role::Atmosphere), 0.0);

        let moon = scene.node(Role::Moon).unwrap().transform.position;
        assert!((moon - moon_position(200.0, 1.5, 0.03)).length() < 1e-6);
    }

    #[test]
    fn test_animate_is_frame_rate_independent() {
        let config = Config::default();
        let mut coarse = Scene::earth(&config);
        let mut fine = Scene::earth(&config);
        animate(&mut coarse, 10.0);
        for i in 0..=600 {
            animate(&mut fine, i as f32 / 60.0);
        }
        let planet = |s: &Scene| s.node(Role::Planet).unwrap().transform.rotation.y;
        assert!((planet(&coarse) - planet(&fine)).abs() < 1e-5);
    }

    #[test]
    fn test_animate_minimal_scene_is_static() {
        let mut config = Config::default();
        config.scene.variant = SceneVariant::Minimal;
        let mut scene = Scene::build(&config);
        animate(&mut scene, 50.0);
        assert_eq!(
            scene.node(Role::Sphere).unwrap().transform,
            crate::scene::Transform::default()
        );
    }
}
