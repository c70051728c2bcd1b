//! GPU renderer for a [`Scene`].
//!
//! Owns one draw per node plus the optional light helper. Geometry is
//! uploaded once; uniforms are rewritten every frame, and a node's bind
//! group is rebuilt only when its material gains a texture.

mod pipeline;
mod shaders;
mod uniforms;

pub use pipeline::{ADDITIVE_BLENDING, ScenePipelines, blend_state, cull_mode};
pub use shaders::{LINE_SHADER_SOURCE, MESH_SHADER_SOURCE, POINTS_SHADER_SOURCE};
pub use uniforms::{FrameUniform, NodeUniform, shading_mode};

use terra_render::{
    BufferAllocator, InstanceBuffer, MeshBuffer, PointInstance, TextureHandle, TextureManager,
};

use crate::geometry::ring_lines;
use crate::material::{Blending, Material, TextureSlot};
use crate::scene::{Node, Role, Scene, Shape};

const HELPER_RING_SEGMENTS: u32 = 32;

/// Sort key: opaque spheres, then stars, then alpha-blended, then additive.
pub fn draw_rank(node: &Node) -> u8 {
    match (&node.shape, node.material.blending) {
        (Shape::Sphere(_), Blending::Opaque) => 0,
        (Shape::Points { .. }, _) => 1,
        (Shape::Sphere(_), Blending::Normal) => 2,
        (Shape::Sphere(_), Blending::Additive) => 3,
    }
}

enum DrawGeometry {
    Mesh(MeshBuffer),
    Points(InstanceBuffer),
}

struct NodeDraw {
    role: Role,
    geometry: DrawGeometry,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    bound_maps: [Option<TextureHandle>; 3],
    material: Material,
}

struct HelperDraw {
    vertices: wgpu::Buffer,
    vertex_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    size: f32,
}

pub struct SceneRenderer {
    pipelines: ScenePipelines,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    draws: Vec<NodeDraw>,
    helper: Option<HelperDraw>,
}

fn maps_of(material: &Material) -> [Option<TextureHandle>; 3] {
    TextureSlot::ALL.map(|slot| material.map(slot))
}

fn node_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    textures: &TextureManager,
    uniform_buffer: &wgpu::Buffer,
    maps: [Option<TextureHandle>; 3],
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("terra-node-bg"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(textures.sampler()),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(
                    textures.view_or_white(maps[TextureSlot::Map.index()]),
                ),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(
                    textures.view_or_white(maps[TextureSlot::Bump.index()]),
                ),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::TextureView(
                    textures.view_or_white(maps[TextureSlot::Alpha.index()]),
                ),
            },
        ],
    })
}

impl SceneRenderer {
    pub fn new(
        device: &wgpu::Device,
        textures: &TextureManager,
        surface_format: wgpu::TextureFormat,
        scene: &Scene,
    ) -> Self {
        let pipelines = ScenePipelines::new(device, surface_format);
        let allocator = BufferAllocator::new(device);

        let frame_buffer =
            allocator.create_uniform("terra-frame-uniform", &FrameUniform::from_scene(scene));
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("terra-frame-bg"),
            layout: &pipelines.frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let mut nodes: Vec<&Node> = scene.nodes.iter().collect();
        nodes.sort_by_key(|node| draw_rank(node));

        let draws = nodes
            .into_iter()
            .map(|node| {
                let label = format!("terra-{:?}", node.role).to_lowercase();
                let geometry = match &node.shape {
                    Shape::Sphere(sphere) => {
                        let mesh = sphere.build();
                        DrawGeometry::Mesh(allocator.create_mesh(
                            &label,
                            &mesh.vertices,
                            &mesh.indices,
                        ))
                    }
                    Shape::Points { positions, .. } => {
                        let instances: Vec<PointInstance> = positions
                            .iter()
                            .map(|p| PointInstance {
                                position: p.to_array(),
                            })
                            .collect();
                        DrawGeometry::Points(allocator.create_instances(&label, &instances))
                    }
                };
                let uniform_buffer = allocator
                    .create_uniform(&format!("{label}-uniform"), &NodeUniform::from_node(node));
                let bound_maps = maps_of(&node.material);
                let bind_group = node_bind_group(
                    device,
                    &pipelines.node_bind_group_layout,
                    textures,
                    &uniform_buffer,
                    bound_maps,
                );
                NodeDraw {
                    role: node.role,
                    geometry,
                    uniform_buffer,
                    bind_group,
                    bound_maps,
                    material: node.material.clone(),
                }
            })
            .collect();

        let helper = scene.lights.as_ref().and_then(|lights| {
            let helper = lights.helper.as_ref()?;
            let rings = ring_lines(1.0, HELPER_RING_SEGMENTS);
            let uniform_buffer = allocator.create_uniform(
                "terra-light-helper-uniform",
                &NodeUniform::light_helper(lights, helper.size),
            );
            let bind_group = node_bind_group(
                device,
                &pipelines.node_bind_group_layout,
                textures,
                &uniform_buffer,
                [None; 3],
            );
            Some(HelperDraw {
                vertices: allocator.create_vertex_buffer("terra-light-helper", &rings),
                vertex_count: rings.len() as u32,
                uniform_buffer,
                bind_group,
                size: helper.size,
            })
        });

        tracing::info!(
            draws = scene.nodes.len(),
            helper = helper.is_some(),
            "Scene renderer ready"
        );

        Self {
            pipelines,
            frame_buffer,
            frame_bind_group,
            draws,
            helper,
        }
    }

    /// Rebuild bind groups for nodes whose texture slots changed since the
    /// last call. Returns how many were rebuilt.
    pub fn sync_materials(
        &mut self,
        device: &wgpu::Device,
        textures: &TextureManager,
        scene: &Scene,
    ) -> usize {
        let mut rebuilt = 0;
        for draw in &mut self.draws {
            let Some(node) = scene.node(draw.role) else {
                continue;
            };
            let maps = maps_of(&node.material);
            if maps == draw.bound_maps {
                continue;
            }
            draw.bind_group = node_bind_group(
                device,
                &self.pipelines.node_bind_group_layout,
                textures,
                &draw.uniform_buffer,
                maps,
            );
            draw.bound_maps = maps;
            draw.material = node.material.clone();
            rebuilt += 1;
        }
        if rebuilt > 0 {
            tracing::debug!(rebuilt, "Rebound material textures");
        }
        rebuilt
    }

    /// Upload this frame's camera, lights and node transforms.
    pub fn prepare(&self, queue: &wgpu::Queue, scene: &Scene) {
        queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniform::from_scene(scene)),
        );
        for draw in &self.draws {
            if let Some(node) = scene.node(draw.role) {
                queue.write_buffer(
                    &draw.uniform_buffer,
                    0,
                    bytemuck::bytes_of(&NodeUniform::from_node(node)),
                );
            }
        }
        if let (Some(helper), Some(lights)) = (&self.helper, &scene.lights) {
            queue.write_buffer(
                &helper.uniform_buffer,
                0,
                bytemuck::bytes_of(&NodeUniform::light_helper(lights, helper.size)),
            );
        }
    }

    pub fn render(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);

        for draw in &self.draws {
            render_pass.set_bind_group(1, &draw.bind_group, &[]);
            match &draw.geometry {
                DrawGeometry::Mesh(mesh) => {
                    render_pass.set_pipeline(self.pipelines.mesh(&draw.material));
                    mesh.draw(render_pass);
                }
                DrawGeometry::Points(instances) => {
                    render_pass.set_pipeline(&self.pipelines.points);
                    render_pass.set_vertex_buffer(0, instances.buffer.slice(..));
                    render_pass.draw(0..6, 0..instances.count);
                }
            }
        }

        if let Some(helper) = &self.helper {
            render_pass.set_pipeline(&self.pipelines.lines);
            render_pass.set_bind_group(1, &helper.bind_group, &[]);
            render_pass.set_vertex_buffer(0, helper.vertices.slice(..));
            render_pass.draw(0..helper.vertex_count, 0..1);
        }
    }

    /// Roles in the order they are drawn.
    pub fn draw_order(&self) -> Vec<Role> {
        self.draws.iter().map(|d| d.role).collect()
    }

    pub fn has_light_helper(&self) -> bool {
        self.helper.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_config::Config;
    use terra_render::{DecodedImage, TextureManager};

    fn create_test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
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

    #[test]
    fn test_draw_rank_orders_transparency_last() {
        let scene = Scene::earth(&Config::default());
        let mut nodes: Vec<&Node> = scene.nodes.iter().collect();
        nodes.sort_by_key(|node| draw_rank(node));
        let order: Vec<Role> = nodes.iter().map(|n| n.role).collect();
        assert_eq!(
            order,
            vec![
                Role::Planet,
                Role::Moon,
                Role::Stars,
                Role::Clouds,
                Role::Atmosphere
            ]
        );
    }

    #[test]
    fn test_renderer_builds_for_earth_scene() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let textures = TextureManager::new(&device, &queue);
        let scene = Scene::earth(&Config::default());
        let renderer = SceneRenderer::new(
            &device,
            &textures,
            wgpu::TextureFormat::Bgra8UnormSrgb,
            &scene,
        );
        assert_eq!(renderer.draw_order().len(), 5);
        assert!(renderer.has_light_helper());
        renderer.prepare(&queue, &scene);
    }

    #[test]
    fn test_sync_materials_rebinds_only_changed_nodes() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let mut textures = TextureManager::new(&device, &queue);
        let mut scene = Scene::earth(&Config::default());
        let mut renderer = SceneRenderer::new(
            &device,
            &textures,
            wgpu::TextureFormat::Bgra8UnormSrgb,
            &scene,
        );
        assert_eq!(renderer.sync_materials(&device, &textures, &scene), 0);

        let image = DecodedImage {
            width: 2,
            height: 2,
            pixels: vec![128; 16],
        };
        let request = scene.texture_requests().remove(0);
        let handle = textures
            .upload(
                &device,
                &queue,
                &request.texture_name(),
                &image,
                request.slot.color_space(),
            )
            .unwrap();
        assert!(scene.attach_texture(&request, handle));

        assert_eq!(renderer.sync_materials(&device, &textures, &scene), 1);
        assert_eq!(renderer.sync_materials(&device, &textures, &scene), 0);
    }

    #[test]
    fn test_minimal_scene_has_no_helper() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let textures = TextureManager::new(&device, &queue);
        let scene = Scene::minimal(&Config::default());
        let renderer = SceneRenderer::new(
            &device,
            &textures,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            &scene,
        );
        assert_eq!(renderer.draw_order(), vec![Role::Sphere]);
        assert!(!renderer.has_light_helper());
    }
}
