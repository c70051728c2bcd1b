//! Surface materials and their texture slots.

use glam::Vec3;
use terra_render::{ColorSpace, TextureHandle};

/// Where a texture plugs into a material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    /// Base color (sRGB). Also the sprite for points.
    Map,
    /// Height field used to perturb normals.
    Bump,
    /// Opacity mask; the green channel scales alpha.
    Alpha,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 3] = [TextureSlot::Map, TextureSlot::Bump, TextureSlot::Alpha];

    pub fn index(self) -> usize {
        match self {
            TextureSlot::Map => 0,
            TextureSlot::Bump => 1,
            TextureSlot::Alpha => 2,
        }
    }

    pub fn color_space(self) -> ColorSpace {
        match self {
            TextureSlot::Map => ColorSpace::Srgb,
            TextureSlot::Bump | TextureSlot::Alpha => ColorSpace::Linear,
        }
    }
}

/// How a surface responds to light.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shading {
    /// Flat color times map.
    Unlit,
    /// Diffuse response to the point and directional lights.
    Lit,
    /// View-dependent rim glow.
    Rim,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blending {
    Opaque,
    /// Standard alpha blending.
    Normal,
    Additive,
}

/// Which faces are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Linear RGB tint.
    pub color: Vec3,
    pub opacity: f32,
    pub shading: Shading,
    pub blending: Blending,
    pub side: Side,
    pub depth_write: bool,
    pub bump_scale: f32,
    maps: [Option<TextureHandle>; 3],
}

impl Material {
    pub fn new(shading: Shading) -> Self {
        Self {
            color: Vec3::ONE,
            opacity: 1.0,
            shading,
            blending: Blending::Opaque,
            side: Side::Front,
            depth_write: true,
            bump_scale: 1.0,
            maps: [None; 3],
        }
    }

    /// Unlit solid color.
    pub fn basic(color: Vec3) -> Self {
        Self {
            color,
            ..Self::new(Shading::Unlit)
        }
    }

    /// Lit surface.
    pub fn standard() -> Self {
        Self::new(Shading::Lit)
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn with_bump_scale(mut self, scale: f32) -> Self {
        self.bump_scale = scale;
        self
    }

    /// Alpha-blended with depth writes off.
    pub fn transparent(mut self) -> Self {
        self.blending = Blending::Normal;
        self.depth_write = false;
        self
    }

    /// Additive with depth writes off.
    pub fn additive(mut self) -> Self {
        self.blending = Blending::Additive;
        self.depth_write = false;
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    /// Plug a loaded texture into `slot`, replacing any previous one.
    pub fn attach(&mut self, slot: TextureSlot, texture: TextureHandle) {
        self.maps[slot.index()] = Some(texture);
    }

    pub fn has_map(&self, slot: TextureSlot) -> bool {
        self.maps[slot.index()].is_some()
    }

    pub fn map(&self, slot: TextureSlot) -> Option<TextureHandle> {
        self.maps[slot.index()]
    }

    pub fn is_transparent(&self) -> bool {
        self.blending != Blending::Opaque
    }
}
