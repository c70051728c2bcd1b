//! CPU mirrors of the WGSL uniform blocks.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::lights::{Lights, LightsUniform};
use crate::material::Shading;
use crate::scene::{Node, Scene, Shape};

/// Group 0, 208 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub lights: LightsUniform,
}

impl FrameUniform {
    pub fn from_scene(scene: &Scene) -> Self {
        let camera = &scene.camera;
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            view: camera.view_matrix().to_cols_array_2d(),
            camera_position: camera.position.extend(1.0).to_array(),
            lights: scene
                .lights
                .as_ref()
                .map_or_else(LightsUniform::dark, Lights::to_uniform),
        }
    }
}

/// Group 1 binding 0, 112 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct NodeUniform {
    pub model: [[f32; 4]; 4],
    pub color_opacity: [f32; 4],
    /// x = bump scale, y = point size.
    pub params: [f32; 4],
    /// x = shading mode.
    pub mode: [u32; 4],
}

pub fn shading_mode(shading: Shading) -> u32 {
    match shading {
        Shading::Unlit => 0,
        Shading::Lit => 1,
        Shading::Rim => 2,
    }
}

impl NodeUniform {
    pub fn from_node(node: &Node) -> Self {
        let material = &node.material;
        let point_size = match &node.shape {
            Shape::Points { size, .. } => *size,
            Shape::Sphere(_) => 0.0,
        };
        Self {
            model: node.transform.matrix().to_cols_array_2d(),
            color_opacity: material.color.extend(material.opacity).to_array(),
            params: [material.bump_scale, point_size, 0.0, 0.0],
            mode: [shading_mode(material.shading), 0, 0, 0],
        }
    }

    /// Helper rings placed on the point light, drawn in its color.
    pub fn light_helper(lights: &Lights, size: f32) -> Self {
        let model = Mat4::from_scale_rotation_translation(
            Vec3::splat(size),
            glam::Quat::IDENTITY,
            lights.point.position,
        );
        Self {
            model: model.to_cols_array_2d(),
            color_opacity: lights.point.color.extend(1.0).to_array(),
            params: [0.0; 4],
            mode: [shading_mode(Shading::Unlit), 0, 0, 0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Role;
    use terra_config::{Config, LightsConfig};

    #[test]
    fn test_uniform_sizes() {
        assert_eq!(std::mem::size_of::<FrameUniform>(), 208);
        assert_eq!(std::mem::size_of::<NodeUniform>(), 112);
    }

    #[test]
    fn test_node_uniform_from_planet() {
        let mut scene = Scene::earth(&Config::default());
        crate::animation::animate(&mut scene, 100.0);
        let planet = scene.node(Role::Planet).unwrap();
        let uniform = NodeUniform::from_node(planet);
        assert_eq!(uniform.mode[0], 1);
        assert_eq!(uniform.params[0], 0.3);
        assert_eq!(uniform.color_opacity, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(uniform.model, planet.transform.matrix().to_cols_array_2d());
    }

    #[test]
    fn test_node_uniform_from_stars() {
        let scene = Scene::earth(&Config::default());
        let uniform = NodeUniform::from_node(scene.node(Role::Stars).unwrap());
        assert_eq!(uniform.params[1], 0.02);
        assert_eq!(uniform.mode[0], 0);
    }

    #[test]
    fn test_frame_uniform_without_lights_is_dark() {
        let scene = Scene::minimal(&Config::default());
        let uniform = FrameUniform::from_scene(&scene);
        assert_eq!(uniform.lights, LightsUniform::dark());
        assert_eq!(uniform.camera_position, [0.0, 0.0, 3.0, 1.0]);
    }

    #[test]
    fn test_light_helper_follows_point_light() {
        let lights = Lights::from_config(&LightsConfig::default());
        let uniform = NodeUniform::light_helper(&lights, 0.1);
        let model = Mat4::from_cols_array_2d(&uniform.model);
        let p = model.transform_point3(Vec3::X);
        assert!((p - Vec3::new(2.1, 1.0, 2.0)).length() < 1e-6);
    }
}
