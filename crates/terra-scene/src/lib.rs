//! The Earth scene: graph construction, animation, camera controls, resize
//! handling and the wgpu renderer that draws it.

pub mod animation;
pub mod clock;
pub mod controls;
pub mod geometry;
pub mod lights;
pub mod material;
pub mod renderer;
pub mod resize;
pub mod scene;
pub mod starfield;

pub use animation::{animate, moon_position, planet_rotation_y};
pub use clock::{Clock, ManualClock, SystemClock};
pub use controls::OrbitControls;
pub use geometry::{MeshData, SphereGeometry, ring_lines};
pub use lights::{DirectionalLight, Lights, LightsUniform, PointLight, PointLightHelper};
pub use material::{Blending, Material, Shading, Side, TextureSlot};
pub use renderer::SceneRenderer;
pub use resize::{RenderTarget, handle_resize};
pub use scene::{Motion, Node, Role, Scene, Shape, TextureRequest, Transform};
pub use starfield::StarfieldGenerator;
