//! Instanced point rendering for the particle field.
//!
//! Positions, colors and sizes live in three vertex buffers stepped per
//! instance; each instance expands to a six-vertex quad in the shader. Only
//! the position buffer is rewritten per frame.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::{additive_blend, layer_bind_group_layout, DEPTH_FORMAT, PARTICLE_SHADER};
use crate::config::ParticleParams;
use crate::particles::ParticleField;

/// Rasterized width floor so distant particles stay visible.
pub const MIN_POINT_PIXELS: f32 = 1.0;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct PointUniforms {
    /// x: size scale, y: opacity, z: minimum size in pixels, w: projection[1][1]
    pub params: [f32; 4],
    /// xy: surface size in pixels
    pub viewport: [f32; 4],
}

pub(crate) struct ParticleRenderer {
    pipeline: wgpu::RenderPipeline,
    position_buffer: wgpu::Buffer,
    color_buffer: wgpu::Buffer,
    size_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    count: u32,
    size_scale: f32,
    opacity: f32,
}

impl ParticleRenderer {
    pub fn new(
        device: &wgpu::Device,
        frame_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
        field: &ParticleField,
        params: &ParticleParams,
    ) -> Self {
        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Positions"),
            contents: bytemuck::cast_slice(field.positions()),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let color_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Colors"),
            contents: bytemuck::cast_slice(field.colors()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let size_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Sizes"),
            contents: bytemuck::cast_slice(field.sizes()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniforms = PointUniforms {
            params: [params.size_scale, params.opacity, MIN_POINT_PIXELS, 1.0],
            viewport: [1.0, 1.0, 0.0, 0.0],
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let points_layout = layer_bind_group_layout(device, "Particle Bind Group Layout");
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Bind Group"),
            layout: &points_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(PARTICLE_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Pipeline Layout"),
            bind_group_layouts: &[frame_layout, &points_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[
                    instance_layout(&POSITION_ATTRIBUTES),
                    instance_layout(&COLOR_ATTRIBUTES),
                    instance_layout(&SIZE_ATTRIBUTES),
                ],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(additive_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            position_buffer,
            color_buffer,
            size_buffer,
            uniform_buffer,
            bind_group,
            count: field.len() as u32,
            size_scale: params.size_scale,
            opacity: params.opacity,
        }
    }

    /// Overwrite the position buffer. Extra values beyond the initial count
    /// are ignored.
    pub fn upload_positions(&self, queue: &wgpu::Queue, positions: &[f32]) {
        let len = positions.len().min(self.count as usize * 3);
        queue.write_buffer(
            &self.position_buffer,
            0,
            bytemuck::cast_slice(&positions[..len]),
        );
    }

    /// Refresh the size uniforms for the current projection and surface.
    pub fn update_uniforms(&self, queue: &wgpu::Queue, focal: f32, width: u32, height: u32) {
        let uniforms = PointUniforms {
            params: [self.size_scale, self.opacity, MIN_POINT_PIXELS, focal],
            viewport: [width as f32, height as f32, 0.0, 0.0],
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, frame_bind_group: &wgpu::BindGroup) {
        if self.count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, frame_bind_group, &[]);
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.position_buffer.slice(..));
        pass.set_vertex_buffer(1, self.color_buffer.slice(..));
        pass.set_vertex_buffer(2, self.size_buffer.slice(..));
        pass.draw(0..6, 0..self.count);
    }
}

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const COLOR_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
const SIZE_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32];

fn instance_layout(attributes: &'static [wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'static> {
    let stride: u64 = attributes.iter().map(|a| a.format.size()).sum();
    wgpu::VertexBufferLayout {
        array_stride: stride,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes,
    }
}
