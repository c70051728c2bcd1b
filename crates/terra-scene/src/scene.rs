//! Scene graph construction.
//!
//! The graph is flat: every node hangs off the root and is addressed by its
//! [`Role`]. It is built once at startup; afterwards only transforms (and
//! texture slots as maps arrive) change.

use std::path::{Path, PathBuf};

use glam::{EulerRot, Mat4, Quat, Vec3};
use terra_config::{Config, SceneConfig, SceneVariant};
use terra_render::{PerspectiveCamera, TextureHandle};

use crate::geometry::SphereGeometry;
use crate::lights::Lights;
use crate::material::{Material, Shading, Side, TextureSlot};
use crate::starfield::StarfieldGenerator;

pub const PLANET_RADIUS: f32 = 0.6;
pub const CLOUD_RADIUS: f32 = 0.63;
pub const MOON_RADIUS: f32 = 0.1;
pub const ATMOSPHERE_RADIUS: f32 = 0.65;
pub const SPHERE_SEGMENTS: u32 = 32;

pub const PLANET_BUMP_SCALE: f32 = 0.3;
pub const MOON_BUMP_SCALE: f32 = 0.02;
pub const ATMOSPHERE_COLOR: Vec3 = Vec3::new(0.3, 0.6, 1.0);

const MINIMAL_NEAR: f32 = 1.0;

/// What a node represents. Each role appears at most once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Planet,
    Clouds,
    Moon,
    Stars,
    Atmosphere,
    /// The minimal variant's lone sphere.
    Sphere,
}

/// Position, Euler rotation (XYZ order, radians) and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Local-to-world matrix: translate · rotate · scale.
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

/// Geometry attached to a node.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Sphere(SphereGeometry),
    /// Camera-facing sprites of `size` world units at each position.
    Points { positions: Vec<Vec3>, size: f32 },
}

#[derive(Clone, Debug)]
pub struct Node {
    pub role: Role,
    pub transform: Transform,
    pub shape: Shape,
    pub material: Material,
    /// Image files requested for this node's material, relative to the texture directory.
    pub textures: Vec<(TextureSlot, &'static str)>,
}

impl Node {
    fn sphere(role: Role, radius: f32, material: Material) -> Self {
        Self {
            role,
            transform: Transform::default(),
            shape: Shape::Sphere(SphereGeometry::new(
                radius,
                SPHERE_SEGMENTS,
                SPHERE_SEGMENTS,
            )),
            material,
            textures: Vec::new(),
        }
    }

    fn with_texture(mut self, slot: TextureSlot, file: &'static str) -> Self {
        self.textures.push((slot, file));
        self
    }
}

/// A texture the scene wants loaded into a node's material slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureRequest {
    pub role: Role,
    pub slot: TextureSlot,
    pub file: &'static str,
}

impl TextureRequest {
    pub fn path(&self, texture_dir: &Path) -> PathBuf {
        texture_dir.join(self.file)
    }

    /// Cache key: the same file may be needed in two color spaces.
    pub fn texture_name(&self) -> String {
        format!("{}:{:?}", self.file, self.slot.color_space())
    }
}

/// Per-frame animation constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    pub planet_spin: f32,
    pub cloud_spin: f32,
    pub star_spin: f32,
    pub moon_orbit_radius: f32,
    pub moon_orbit_speed: f32,
}

impl From<&SceneConfig> for Motion {
    fn from(config: &SceneConfig) -> Self {
        Self {
            planet_spin: config.planet_spin,
            cloud_spin: config.cloud_spin,
            star_spin: config.star_spin,
            moon_orbit_radius: config.moon_orbit_radius,
            moon_orbit_speed: config.moon_orbit_speed,
        }
    }
}

pub struct Scene {
    pub variant: SceneVariant,
    pub nodes: Vec<Node>,
    /// `None` for scenes that use only unlit materials.
    pub lights: Option<Lights>,
    pub camera: PerspectiveCamera,
    pub motion: Motion,
}

impl Scene {
    /// Build the scene selected by `config.scene.variant`.
    pub fn build(config: &Config) -> Self {
        match config.scene.variant {
            SceneVariant::Earth => Self::earth(config),
            SceneVariant::Minimal => Self::minimal(config),
        }
    }

    /// Planet, cloud shell, moon, starfield, atmosphere, and the light rig.
    pub fn earth(config: &Config) -> Self {
        let scene_config = &config.scene;

        let planet = Node::sphere(
            Role::Planet,
            PLANET_RADIUS,
            Material::standard().with_bump_scale(PLANET_BUMP_SCALE),
        )
        .with_texture(TextureSlot::Map, "earthmap.jpg")
        .with_texture(TextureSlot::Bump, "earthbump.jpg");

        let clouds = Node::sphere(Role::Clouds, CLOUD_RADIUS, Material::standard().transparent())
            .with_texture(TextureSlot::Map, "cloudalpha.jpg")
            .with_texture(TextureSlot::Alpha, "cloudalpha.jpg");

        let mut moon = Node::sphere(
            Role::Moon,
            MOON_RADIUS,
            Material::standard().with_bump_scale(MOON_BUMP_SCALE),
        )
        .with_texture(TextureSlot::Map, "moon.jpg")
        .with_texture(TextureSlot::Bump, "moonbump.jpg");
        moon.transform.position = Vec3::new(-scene_config.moon_orbit_radius, 0.0, 0.0);

        let star_positions = StarfieldGenerator::new(
            scene_config.star_seed,
            scene_config.star_count,
            scene_config.star_spread,
        )
        .generate();
        let stars = Node {
            role: Role::Stars,
            transform: Transform::default(),
            shape: Shape::Points {
                positions: star_positions,
                size: scene_config.star_size,
            },
            material: Material::basic(Vec3::ONE).transparent(),
            textures: vec![(TextureSlot::Map, "stars.png")],
        };

        let atmosphere = Node::sphere(
            Role::Atmosphere,
            ATMOSPHERE_RADIUS,
            Material::new(Shading::Rim)
                .with_color(ATMOSPHERE_COLOR)
                .additive()
                .with_side(Side::Back),
        );

        let camera_config = &config.camera;
        let mut camera = PerspectiveCamera::new(
            camera_config.fov_deg,
            initial_aspect(config),
            camera_config.near,
            camera_config.far,
        );
        camera.position = Vec3::new(0.0, 0.0, camera_config.distance);
        camera.look_at(Vec3::ZERO);

        tracing::info!(
            stars = scene_config.star_count,
            planet_spin = scene_config.planet_spin,
            "Built earth scene"
        );

        Self {
            variant: SceneVariant::Earth,
            nodes: vec![planet, clouds, moon, stars, atmosphere],
            lights: Some(Lights::from_config(&config.lights)),
            camera,
            motion: Motion::from(scene_config),
        }
    }

    /// One red unlit sphere of radius 1, camera at z = 3 with a near plane of 1.
    pub fn minimal(config: &Config) -> Self {
        let sphere = Node::sphere(Role::Sphere, 1.0, Material::basic(Vec3::new(1.0, 0.0, 0.0)));

        let mut camera = PerspectiveCamera::new(
            config.camera.fov_deg,
            initial_aspect(config),
            MINIMAL_NEAR,
            config.camera.far,
        );
        camera.position = Vec3::new(0.0, 0.0, config.camera.distance);
        camera.look_at(Vec3::ZERO);

        tracing::info!("Built minimal scene");

        Self {
            variant: SceneVariant::Minimal,
            nodes: vec![sphere],
            lights: None,
            camera,
            motion: Motion::from(&config.scene),
        }
    }

    pub fn node(&self, role: Role) -> Option<&Node> {
        self.nodes.iter().find(|n| n.role == role)
    }

    pub fn node_mut(&mut self, role: Role) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.role == role)
    }

    /// Every texture the scene's materials want, in node order.
    pub fn texture_requests(&self) -> Vec<TextureRequest> {
        self.nodes
            .iter()
            .flat_map(|node| {
                node.textures.iter().map(|&(slot, file)| TextureRequest {
                    role: node.role,
                    slot,
                    file,
                })
            })
            .collect()
    }

    /// Plug a loaded texture into the requesting node. Returns `false` if the node is gone.
    pub fn attach_texture(&mut self, request: &TextureRequest, texture: TextureHandle) -> bool {
        match self.node_mut(request.role) {
            Some(node) => {
                node.material.attach(request.slot, texture);
                true
            }
            None => false,
        }
    }
}

fn initial_aspect(config: &Config) -> f32 {
    config.window.width.max(1) as f32 / config.window.height.max(1) as f32
}
