//! GPU texture upload, mipmap generation and handle lookup.
//!
//! [`TextureManager`] turns decoded RGBA images into sampled GPU textures and
//! hands out [`TextureHandle`]s. A 1×1 white texture is always available for
//! materials whose maps have not arrived (or never will).

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::loader::DecodedImage;

/// Index of an uploaded texture within a [`TextureManager`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

impl TextureHandle {
    /// Rebuild a handle from [`TextureHandle::index`]. Only meaningful for the
    /// manager that issued it.
    pub fn from_index(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// How texel values are interpreted when sampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    /// Color maps; decoded to linear by the sampler.
    Srgb,
    /// Data maps such as bump heights and alpha masks.
    Linear,
}

impl ColorSpace {
    pub fn format(self) -> wgpu::TextureFormat {
        match self {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// An uploaded texture.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub dimensions: (u32, u32),
    pub format: wgpu::TextureFormat,
    pub mip_level_count: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// Pixel data length doesn't match width × height × 4.
    #[error("texture data size ({actual}) does not match expected ({expected}) for {width}x{height}")]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },

    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    /// Reading or decoding the image file failed.
    #[error("failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    /// Larger than the device's `max_texture_dimension_2d`.
    #[error("texture {width}x{height} exceeds the device limit of {max}")]
    TooLarge { width: u32, height: u32, max: u32 },
}

/// Number of mip levels for a full chain down to 1×1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

const BLIT_SHADER_SOURCE: &str = r#"
@group(0) @binding(0) var src_texture: texture_2d<f32>;
@group(0) @binding(1) var src_sampler: sampler;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) idx: u32) -> VertexOutput {
    let uv = vec2<f32>(f32((idx << 1u) & 2u), f32(idx & 2u));
    var out: VertexOutput;
    out.position = vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(uv.x, 1.0 - uv.y);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(src_texture, src_sampler, in.uv);
}
"#;

/// Owns every scene texture plus the shared sampler.
pub struct TextureManager {
    textures: Vec<GpuTexture>,
    by_name: HashMap<String, TextureHandle>,
    sampler: wgpu::Sampler,
    white: TextureHandle,
    blit_shader: wgpu::ShaderModule,
    blit_bind_group_layout: wgpu::BindGroupLayout,
    blit_pipeline_layout: wgpu::PipelineLayout,
    blit_pipelines: HashMap<wgpu::TextureFormat, wgpu::RenderPipeline>,
}

impl TextureManager {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        // Equirectangular maps wrap around the sphere horizontally.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("terra-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        let blit_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("mipmap-bind-group-layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mipmap-shader"),
            source: wgpu::ShaderSource::Wgsl(BLIT_SHADER_SOURCE.into()),
        });

        let blit_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mipmap-pipeline-layout"),
            bind_group_layouts: &[&blit_bind_group_layout],
            immediate_size: 0,
        });

        let mut manager = Self {
            textures: Vec::new(),
            by_name: HashMap::new(),
            sampler,
            white: TextureHandle(0),
            blit_shader,
            blit_bind_group_layout,
            blit_pipeline_layout,
            blit_pipelines: HashMap::new(),
        };
        manager.white = manager.insert_white(device, queue);
        manager
    }

    fn insert_white(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> TextureHandle {
        let format = ColorSpace::Linear.format();
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("white-1x1"),
                size: wgpu::Extent3d {
                    width: 1,
                    height: 1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &[255, 255, 255, 255],
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.push(
            "placeholder-white",
            GpuTexture {
                texture,
                view,
                dimensions: (1, 1),
                format,
                mip_level_count: 1,
            },
        )
    }

    fn push(&mut self, name: &str, texture: GpuTexture) -> TextureHandle {
        let handle = TextureHandle(self.textures.len() as u32);
        self.textures.push(texture);
        self.by_name.insert(name.to_string(), handle);
        handle
    }

    /// Upload a decoded image. Uploading the same name twice returns the first handle.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        image: &DecodedImage,
        color_space: ColorSpace,
    ) -> Result<TextureHandle, TextureError> {
        if let Some(&existing) = self.by_name.get(name) {
            return Ok(existing);
        }

        let (width, height) = (image.width, image.height);
        validate(image, device.limits().max_texture_dimension_2d)?;

        let format = color_space.format();
        let mip_levels = mip_level_count(width, height);
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(name),
            size,
            mip_level_count: mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: None,
            },
            size,
        );

        if mip_levels > 1 {
            self.generate_mipmaps(device, queue, &texture, format, mip_levels);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let handle = self.push(
            name,
            GpuTexture {
                texture,
                view,
                dimensions: (width, height),
                format,
                mip_level_count: mip_levels,
            },
        );
        log::info!("Uploaded texture '{name}' ({width}x{height}, {mip_levels} mips)");
        Ok(handle)
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&GpuTexture> {
        self.textures.get(handle.0 as usize)
    }

    pub fn find(&self, name: &str) -> Option<TextureHandle> {
        self.by_name.get(name).copied()
    }

    /// View for `handle`, or the white placeholder when absent.
    pub fn view_or_white(&self, handle: Option<TextureHandle>) -> &wgpu::TextureView {
        let texture = handle
            .and_then(|h| self.get(h))
            .unwrap_or(&self.textures[self.white.0 as usize]);
        &texture.view
    }

    pub fn white(&self) -> TextureHandle {
        self.white
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    fn generate_mipmaps(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &wgpu::Texture,
        format: wgpu::TextureFormat,
        mip_count: u32,
    ) {
        let pipeline = self
            .blit_pipelines
            .entry(format)
            .or_insert_with(|| {
                device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("mipmap-pipeline"),
                    layout: Some(&self.blit_pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &self.blit_shader,
                        entry_point: Some("vs_main"),
                        buffers: &[],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    primitive: wgpu::PrimitiveState::default(),
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    fragment: Some(wgpu::FragmentState {
                        module: &self.blit_shader,
                        entry_point: Some("fs_main"),
                        targets: &[Some(format.into())],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    }),
                    multiview_mask: None,
                    cache: None,
                })
            })
            .clone();

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("mipmap-encoder"),
        });

        for level in 1..mip_count {
            let src_view = texture.create_view(&wgpu::TextureViewDescriptor {
                base_mip_level: level - 1,
                mip_level_count: Some(1),
                ..Default::default()
            });
            let dst_view = texture.create_view(&wgpu::TextureViewDescriptor {
                base_mip_level: level,
                mip_level_count: Some(1),
                ..Default::default()
            });

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("mipmap-bind-group"),
                layout: &self.blit_bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&src_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("mipmap-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &dst_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });
            pass.set_pipeline(&pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}

fn validate(image: &DecodedImage, max_dimension: u32) -> Result<(), TextureError> {
    let (width, height) = (image.width, image.height);
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroDimensions { width, height });
    }
    if width > max_dimension || height > max_dimension {
        return Err(TextureError::TooLarge {
            width,
            height,
            max: max_dimension,
        });
    }
    let expected = width as usize * height as usize * 4;
    if image.pixels.len() != expected {
        return Err(TextureError::DataSizeMismatch {
            actual: image.pixels.len(),
            expected,
            width,
            height,
        });
    }
    Ok(())
}

/// Create a test GPU device and queue. Returns `None` if no GPU is available.
#[cfg(test)]
pub(crate) fn create_test_device_queue() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .ok()?;
        adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32) -> DecodedImage {
        DecodedImage {
            width,
            height,
            pixels: vec![200; (width * height * 4) as usize],
        }
    }

    #[test]
    fn test_mip_level_count() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(4, 4), 3);
        assert_eq!(mip_level_count(2048, 1024), 12);
        assert_eq!(mip_level_count(1000, 500), 10);
    }

    #[test]
    fn test_color_space_formats() {
        assert_eq!(
            ColorSpace::Srgb.format(),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        assert_eq!(ColorSpace::Linear.format(), wgpu::TextureFormat::Rgba8Unorm);
    }

    #[test]
    fn test_validate_rejects_bad_images() {
        assert!(matches!(
            validate(&solid(0, 4), 8192),
            Err(TextureError::ZeroDimensions { .. })
        ));
        let mut short = solid(4, 4);
        short.pixels.truncate(32);
        assert!(matches!(
            validate(&short, 8192),
            Err(TextureError::DataSizeMismatch { expected: 64, .. })
        ));
        assert!(matches!(
            validate(&solid(9, 2), 8),
            Err(TextureError::TooLarge {
                width: 9,
                height: 2,
                max: 8
            })
        ));
        assert!(validate(&solid(8, 8), 8).is_ok());
        assert!(validate(&solid(4, 4), 8192).is_ok());
    }

    #[test]
    fn test_upload_over_device_limit_is_rejected() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let mut manager = TextureManager::new(&device, &queue);
        let max = device.limits().max_texture_dimension_2d;

        let wide = solid(max + 8, 1);
        let result = manager.upload(&device, &queue, "earthmap", &wide, ColorSpace::Srgb);
        assert!(matches!(result, Err(TextureError::TooLarge { max: m, .. }) if m == max));
        assert_eq!(manager.find("earthmap"), None);
        assert_eq!(manager.len(), 1);

        let tall = solid(1, max + 8);
        assert!(
            manager
                .upload(&device, &queue, "moonbump", &tall, ColorSpace::Linear)
                .is_err()
        );
    }

    #[test]
    fn test_manager_starts_with_white_placeholder() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let manager = TextureManager::new(&device, &queue);
        assert_eq!(manager.len(), 1);
        let white = manager.get(manager.white()).unwrap();
        assert_eq!(white.dimensions, (1, 1));
    }

    #[test]
    fn test_upload_and_deduplicate() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let mut manager = TextureManager::new(&device, &queue);
        let image = solid(8, 4);

        let first = manager
            .upload(&device, &queue, "earthmap", &image, ColorSpace::Srgb)
            .unwrap();
        let second = manager
            .upload(&device, &queue, "earthmap", &image, ColorSpace::Srgb)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(manager.find("earthmap"), Some(first));

        let tex = manager.get(first).unwrap();
        assert_eq!(tex.dimensions, (8, 4));
        assert_eq!(tex.mip_level_count, 4);
        assert_eq!(tex.format, wgpu::TextureFormat::Rgba8UnormSrgb);
    }

    #[test]
    fn test_upload_rejects_mismatched_data() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let mut manager = TextureManager::new(&device, &queue);
        let mut image = solid(4, 4);
        image.pixels.pop();
        let result = manager.upload(&device, &queue, "bad", &image, ColorSpace::Linear);
        assert!(matches!(result, Err(TextureError::DataSizeMismatch { .. })));
        assert!(manager.find("bad").is_none());
    }
}
