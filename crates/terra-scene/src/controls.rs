//! Orbit camera controls: drag to rotate around a target, scroll to zoom,
//! with optional damping so motion eases out after input stops.

use std::f32::consts::PI;

use glam::Vec3;
use terra_config::ControlsConfig;
use terra_render::PerspectiveCamera;

/// Keeps the polar angle off the poles so `look_at` never degenerates.
pub const POLAR_EPSILON: f32 = 0.01;

/// Remaining motion below this is treated as settled.
const SETTLE_EPSILON: f32 = 1e-6;

/// Camera orbiting a fixed target on a sphere.
///
/// `theta` is the azimuth around +Y measured from +Z, `phi` the polar angle
/// from +Y. Input accumulates into pending deltas which [`OrbitControls::update`]
/// applies, either all at once or a `damping` fraction per call.
#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub target: Vec3,
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
    /// Fraction of pending motion applied per update. `0` applies everything immediately.
    pub damping: f32,
    /// Radians per pixel of drag.
    pub rotate_speed: f32,
    /// Fractional distance change per scroll line.
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pending_theta: f32,
    pending_phi: f32,
    pending_scale: f32,
}

impl OrbitControls {
    /// Controls orbiting the origin, starting from the camera's current position.
    pub fn from_config(config: &ControlsConfig, camera: &PerspectiveCamera) -> Self {
        let mut controls = Self {
            target: Vec3::ZERO,
            radius: 1.0,
            theta: 0.0,
            phi: PI / 2.0,
            damping: config.damping.clamp(0.0, 1.0),
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed.clamp(0.0, 0.99),
            min_distance: config.min_distance,
            max_distance: config.max_distance.max(config.min_distance),
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_scale: 1.0,
        };
        controls.sync_from(camera);
        controls
    }

    /// Re-derive the spherical position from where the camera is now.
    pub fn sync_from(&mut self, camera: &PerspectiveCamera) {
        let offset = camera.position - self.target;
        self.radius = offset.length().clamp(self.min_distance, self.max_distance);
        self.theta = offset.x.atan2(offset.z);
        self.phi = if offset.length_squared() > 0.0 {
            (offset.y / offset.length()).clamp(-1.0, 1.0).acos()
        } else {
            PI / 2.0
        };
        self.phi = self.phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
    }

    /// Queue a drag of `(dx, dy)` pixels. Dragging right or down moves the
    /// camera left or up around the target.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.pending_theta -= dx * self.rotate_speed;
        self.pending_phi -= dy * self.rotate_speed;
    }

    /// Queue a scroll of `lines`. Positive zooms in.
    pub fn zoom(&mut self, lines: f32) {
        self.pending_scale *= (1.0 - self.zoom_speed).powf(lines);
    }

    /// Whether queued motion remains to be applied.
    pub fn is_moving(&self) -> bool {
        self.pending_theta.abs() > SETTLE_EPSILON
            || self.pending_phi.abs() > SETTLE_EPSILON
            || (self.pending_scale - 1.0).abs() > SETTLE_EPSILON
    }

    /// Apply pending motion and place `camera`. Returns `true` if the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let moving = self.is_moving();
        let step = if self.damping > 0.0 { self.damping } else { 1.0 };

        self.theta += self.pending_theta * step;
        self.phi = (self.phi + self.pending_phi * step).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        let scale = self.pending_scale.powf(step);
        self.radius = (self.radius * scale).clamp(self.min_distance, self.max_distance);

        if self.damping > 0.0 {
            self.pending_theta *= 1.0 - self.damping;
            self.pending_phi *= 1.0 - self.damping;
            self.pending_scale = self.pending_scale.powf(1.0 - self.damping);
        } else {
            self.pending_theta = 0.0;
            self.pending_phi = 0.0;
            self.pending_scale = 1.0;
        }
        if !self.is_moving() {
            self.pending_theta = 0.0;
            self.pending_phi = 0.0;
            self.pending_scale = 1.0;
        }

        let position = self.target + self.offset();
        let moved = moving || (camera.position - position).length_squared() > SETTLE_EPSILON;
        camera.position = position;
        camera.look_at(self.target);
        moved
    }

    /// Camera offset from the target for the current spherical coordinates.
    pub fn offset(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at_z3() -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::default();
        camera.position = Vec3::new(0.0, 0.0, 3.0);
        camera.look_at(Vec3::ZERO);
        camera
    }

    fn undamped() -> ControlsConfig {
        ControlsConfig {
            damping: 0.0,
            ..ControlsConfig::default()
        }
    }

    #[test]
    fn test_from_camera_position() {
        let camera = camera_at_z3();
        let controls = OrbitControls::from_config(&ControlsConfig::default(), &camera);
        assert!((controls.radius - 3.0).abs() < 1e-5);
        assert!(controls.theta.abs() < 1e-6);
        assert!((controls.phi - PI / 2.0).abs() < 1e-6);
        assert!((controls.offset() - camera.position).length() < 1e-5);
    }

    #[test]
    fn test_idle_update_keeps_camera() {
        let mut camera = camera_at_z3();
        let mut controls = OrbitControls::from_config(&ControlsConfig::default(), &camera);
        assert!(!controls.update(&mut camera));
        assert!((camera.position - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_rotate_keeps_distance_and_faces_target() {
        let mut camera = camera_at_z3();
        let mut controls = OrbitControls::from_config(&undamped(), &camera);
        controls.rotate(-100.0, 0.0);
        assert!(controls.update(&mut camera));
        assert!((camera.position.length() - 3.0).abs() < 1e-4);
        assert!(camera.position.x > 0.0);
        let to_target = (-camera.position).normalize();
        assert!((camera.forward() - to_target).length() < 1e-4);
    }

    #[test]
    fn test_polar_angle_clamped() {
        let mut camera = camera_at_z3();
        let mut controls = OrbitControls::from_config(&undamped(), &camera);
        controls.rotate(0.0, 1.0e6);
        controls.update(&mut camera);
        assert!((controls.phi - POLAR_EPSILON).abs() < 1e-6);
        controls.rotate(0.0, -1.0e6);
        controls.update(&mut camera);
        assert!((controls.phi - (PI - POLAR_EPSILON)).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_clamped_to_distance_range() {
        let mut camera = camera_at_z3();
        let config = undamped();
        let mut controls = OrbitControls::from_config(&config, &camera);
        controls.zoom(1.0);
        controls.update(&mut camera);
        assert!((controls.radius - 2.7).abs() < 1e-4);

        controls.zoom(500.0);
        controls.update(&mut camera);
        assert_eq!(controls.radius, config.min_distance);

        controls.zoom(-500.0);
        controls.update(&mut camera);
        assert_eq!(controls.radius, config.max_distance);
    }

    #[test]
    fn test_damping_eases_out() {
        let mut camera = camera_at_z3();
        let mut controls = OrbitControls::from_config(&ControlsConfig::default(), &camera);
        controls.rotate(-200.0, 0.0);
        let target_theta = 200.0 * controls.rotate_speed;

        controls.update(&mut camera);
        let first = controls.theta;
        assert!((first - target_theta * 0.05).abs() < 1e-5);

        for _ in 0..1000 {
            controls.update(&mut camera);
        }
        assert!(!controls.is_moving());
        assert!((controls.theta - target_theta).abs() < 1e-3);
    }
}
