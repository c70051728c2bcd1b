//! wgpu rendering foundation: device and surface, viewport sizing, camera,
//! depth buffer, frame encoding, buffers and textures.

pub mod buffer;
pub mod camera;
pub mod depth;
pub mod gpu;
pub mod loader;
pub mod pass;
pub mod surface;
pub mod texture;

pub use buffer::{
    BufferAllocator, InstanceBuffer, MeshBuffer, PointInstance, VertexPosition,
    VertexPositionNormalUv,
};
pub use camera::PerspectiveCamera;
pub use depth::DepthBuffer;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use loader::{DecodedImage, LoadRequest, LoadResult, TextureLoader};
pub use pass::{FrameEncoder, RenderPassBuilder, SPACE_BLACK};
pub use surface::{DEFAULT_MAX_PIXEL_RATIO, DrawingBuffer, Viewport};
pub use texture::{ColorSpace, GpuTexture, TextureError, TextureHandle, TextureManager};
