//! Bind group layouts and render pipelines for every material variant.

use terra_render::{DepthBuffer, PointInstance, VertexPosition, VertexPositionNormalUv};

use super::shaders::{LINE_SHADER_SOURCE, MESH_SHADER_SOURCE, POINTS_SHADER_SOURCE};
use super::uniforms::{FrameUniform, NodeUniform};
use crate::material::{Blending, Material, Side};

/// Premultiplied-free additive blend: `src · α + dst`.
pub const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::Zero,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

pub fn blend_state(blending: Blending) -> Option<wgpu::BlendState> {
    match blending {
        Blending::Opaque => None,
        Blending::Normal => Some(wgpu::BlendState::ALPHA_BLENDING),
        Blending::Additive => Some(ADDITIVE_BLENDING),
    }
}

/// Drawing the back side means culling front faces.
pub fn cull_mode(side: Side) -> wgpu::Face {
    match side {
        Side::Front => wgpu::Face::Back,
        Side::Back => wgpu::Face::Front,
    }
}

const BLENDINGS: [Blending; 3] = [Blending::Opaque, Blending::Normal, Blending::Additive];
const SIDES: [Side; 2] = [Side::Front, Side::Back];

fn mesh_variant_index(blending: Blending, side: Side, depth_write: bool) -> usize {
    let b = match blending {
        Blending::Opaque => 0,
        Blending::Normal => 1,
        Blending::Additive => 2,
    };
    let s = match side {
        Side::Front => 0,
        Side::Back => 1,
    };
    (b * SIDES.len() + s) * 2 + usize::from(depth_write)
}

fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    size: usize,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: std::num::NonZeroU64::new(size as u64),
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

/// Every pipeline the scene needs, sharing one pipeline layout.
pub struct ScenePipelines {
    /// Group 0: frame uniform.
    pub frame_bind_group_layout: wgpu::BindGroupLayout,
    /// Group 1: node uniform, sampler, map, bump, alpha.
    pub node_bind_group_layout: wgpu::BindGroupLayout,
    mesh: Vec<wgpu::RenderPipeline>,
    pub points: wgpu::RenderPipeline,
    pub lines: wgpu::RenderPipeline,
}

impl ScenePipelines {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let frame_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("terra-frame-bgl"),
                entries: &[uniform_entry(
                    0,
                    wgpu::ShaderStages::VERTEX_FRAGMENT,
                    std::mem::size_of::<FrameUniform>(),
                )],
            });

        let node_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("terra-node-bgl"),
                entries: &[
                    uniform_entry(
                        0,
                        wgpu::ShaderStages::VERTEX_FRAGMENT,
                        std::mem::size_of::<NodeUniform>(),
                    ),
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                    texture_entry(2),
                    texture_entry(3),
                    texture_entry(4),
                ],
            });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("terra-scene-pipeline-layout"),
            bind_group_layouts: &[&frame_bind_group_layout, &node_bind_group_layout],
            immediate_size: 0,
        });

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("terra-mesh-shader"),
            source: wgpu::ShaderSource::Wgsl(MESH_SHADER_SOURCE.into()),
        });
        let points_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("terra-points-shader"),
            source: wgpu::ShaderSource::Wgsl(POINTS_SHADER_SOURCE.into()),
        });
        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("terra-line-shader"),
            source: wgpu::ShaderSource::Wgsl(LINE_SHADER_SOURCE.into()),
        });

        let mut mesh = Vec::with_capacity(BLENDINGS.len() * SIDES.len() * 2);
        for blending in BLENDINGS {
            for side in SIDES {
                for depth_write in [false, true] {
                    mesh.push(create_pipeline(
                        device,
                        &layout,
                        PipelineDesc {
                            label: "terra-mesh-pipeline",
                            shader: &mesh_shader,
                            vs_entry: "vs_mesh",
                            fs_entry: "fs_mesh",
                            buffers: &[VertexPositionNormalUv::layout()],
                            topology: wgpu::PrimitiveTopology::TriangleList,
                            cull_mode: Some(cull_mode(side)),
                            blend: blend_state(blending),
                            depth_write,
                            surface_format,
                        },
                    ));
                }
            }
        }

        let points = create_pipeline(
            device,
            &layout,
            PipelineDesc {
                label: "terra-points-pipeline",
                shader: &points_shader,
                vs_entry: "vs_points",
                fs_entry: "fs_points",
                buffers: &[PointInstance::layout()],
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                depth_write: false,
                surface_format,
            },
        );

        let lines = create_pipeline(
            device,
            &layout,
            PipelineDesc {
                label: "terra-line-pipeline",
                shader: &line_shader,
                vs_entry: "vs_line",
                fs_entry: "fs_line",
                buffers: &[VertexPosition::layout()],
                topology: wgpu::PrimitiveTopology::LineList,
                cull_mode: None,
                blend: None,
                depth_write: true,
                surface_format,
            },
        );

        tracing::debug!(
            "Created {} mesh pipelines plus points and lines for {:?}",
            mesh.len(),
            surface_format
        );

        Self {
            frame_bind_group_layout,
            node_bind_group_layout,
            mesh,
            points,
            lines,
        }
    }

    /// The sphere pipeline matching a material's blending, side and depth writes.
    pub fn mesh(&self, material: &Material) -> &wgpu::RenderPipeline {
        &self.mesh[mesh_variant_index(material.blending, material.side, material.depth_write)]
    }
}

struct PipelineDesc<'a> {
    label: &'static str,
    shader: &'a wgpu::ShaderModule,
    vs_entry: &'static str,
    fs_entry: &'static str,
    buffers: &'a [wgpu::VertexBufferLayout<'static>],
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
    blend: Option<wgpu::BlendState>,
    depth_write: bool,
    surface_format: wgpu::TextureFormat,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    desc: PipelineDesc<'_>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: desc.shader,
            entry_point: Some(desc.vs_entry),
            buffers: desc.buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: desc.topology,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: desc.cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(DepthBuffer::stencil_state(desc.depth_write)),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: desc.shader,
            entry_point: Some(desc.fs_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.surface_format,
                blend: desc.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}
