use crate::shaders;
use crate::targets::{DEPTH_FORMAT, FrameTargets, HDR_FORMAT};
use bytemuck::{Pod, Zeroable};
use glowgrid_scene::{AreaLight, MeshHandle, Scene};
use std::collections::BTreeMap;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct AreaLightUniform {
    position: [f32; 4],
    color: [f32; 4],
    half_width: [f32; 4],
    half_height: [f32; 4],
    normal: [f32; 4],
}

impl AreaLightUniform {
    pub(crate) fn from_light(light: &AreaLight) -> Self {
        let p = light.position();
        let (hw, hh) = light.half_extents();
        let n = light.emission_direction();
        let [r, g, b] = light.color.to_linear();
        Self {
            position: [p.x, p.y, p.z, light.intensity],
            color: [r, g, b, 1.0],
            half_width: hw.extend(0.0).to_array(),
            half_height: hh.extend(0.0).to_array(),
            normal: n.extend(0.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    camera_position: [f32; 4],
    camera_forward: [f32; 4],
    fog_color: [f32; 4],
    fog_range: [f32; 4],
    lights: [AreaLightUniform; 2],
}

impl FrameUniforms {
    pub(crate) fn from_scene(scene: &Scene) -> Self {
        let [r, g, b] = scene.fog.color.to_linear();
        let [rect, mouse] = scene.lights();
        Self {
            view_proj: scene.camera.view_projection().to_cols_array_2d(),
            camera_position: scene.camera.position.extend(1.0).to_array(),
            camera_forward: scene.camera.forward().extend(0.0).to_array(),
            fog_color: [r, g, b, 1.0],
            fog_range: [scene.fog.near, scene.fog.far, 0.0, 0.0],
            lights: [
                AreaLightUniform::from_light(rect),
                AreaLightUniform::from_light(mouse),
            ],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
    /// x: roughness, y: metalness.
    material: [f32; 4],
}

/// Group mesh instances by geometry, resolving each material to a linear
/// color plus its roughness and metalness.
pub(crate) fn instance_batches(scene: &Scene) -> BTreeMap<u32, Vec<InstanceData>> {
    let mut batches: BTreeMap<u32, Vec<InstanceData>> = BTreeMap::new();
    for mesh in scene.meshes() {
        let Some(material) = scene.material(mesh.material) else {
            tracing::warn!(material = mesh.material.0, "mesh references missing material");
            continue;
        };
        let [r, g, b] = material.color.to_linear();
        let cols = mesh.transform.matrix().to_cols_array_2d();
        batches.entry(mesh.mesh.0).or_default().push(InstanceData {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color: [r, g, b, 1.0],
            material: [material.roughness, material.metalness, 0.0, 0.0],
        });
    }
    batches
}

/// GPU buffers for one geometry and all of its instances.
struct MeshBatch {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
}

/// Draws the scene's meshes into the HDR target.
///
/// Geometry and instances are uploaded once; meshes never move after
/// construction. Only the frame uniforms change per frame.
pub struct ScenePass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    batches: Vec<MeshBatch>,
}

impl ScenePass {
    pub fn new(device: &wgpu::Device, scene: &Scene, sample_count: u32) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_uniform_buffer"),
            contents: bytemuck::bytes_of(&FrameUniforms::from_scene(scene)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                            7 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        });

        let mut batches = Vec::new();
        for (mesh, instances) in instance_batches(scene) {
            let Some(geometry) = scene.geometry(MeshHandle(mesh)) else {
                tracing::warn!(mesh, "instances reference missing geometry");
                continue;
            };
            let data = geometry.build();
            let vertices: Vec<Vertex> = data
                .positions
                .iter()
                .zip(&data.normals)
                .map(|(&position, &normal)| Vertex { position, normal })
                .collect();
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("sphere_vertex_buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("sphere_index_buffer"),
                contents: bytemuck::cast_slice(&data.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("instance_buffer"),
                contents: bytemuck::cast_slice(&instances),
                usage: wgpu::BufferUsages::VERTEX,
            });
            tracing::debug!(
                mesh,
                vertices = vertices.len(),
                instances = instances.len(),
                "uploaded mesh batch"
            );
            batches.push(MeshBatch {
                vertex_buffer,
                index_buffer,
                index_count: data.indices.len() as u32,
                instance_buffer,
                instance_count: instances.len() as u32,
            });
        }

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            batches,
        }
    }

    /// Upload this frame's camera, fog and light values.
    pub fn update(&self, queue: &wgpu::Queue, scene: &Scene) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::from_scene(scene)),
        );
    }

    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, targets: &FrameTargets) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(targets.color_attachment())],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &targets.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        for batch in &self.batches {
            pass.set_vertex_buffer(0, batch.vertex_buffer.slice(..));
            pass.set_vertex_buffer(1, batch.instance_buffer.slice(..));
            pass.set_index_buffer(batch.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..batch.index_count, 0, 0..batch.instance_count);
        }
    }
}
