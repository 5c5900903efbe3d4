//! Glass panel, edge outline and rim glow pipelines.
//!
//! The glass and glow share the plane's vertex and index buffers; the outline
//! has its own line-list buffer. Each layer keeps a uniform buffer with its
//! transform and material, rewritten from the [`Scene`] every frame.

use wgpu::util::DeviceExt;

use super::{
    additive_blend, layer_bind_group_layout, LayerUniforms, DEPTH_FORMAT, EDGE_SHADER,
    GLASS_SHADER, GLOW_SHADER,
};
use crate::scene::{MeshVertex, Scene};

const MESH_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
const LINE_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

/// One uniform buffer and its bind group.
struct LayerBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl LayerBinding {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        uniforms: LayerUniforms,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }

    fn write(&self, queue: &wgpu::Queue, uniforms: LayerUniforms) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&uniforms));
    }
}

struct PipelineSpec<'a> {
    label: &'a str,
    source: &'a str,
    vertex_layout: wgpu::VertexBufferLayout<'a>,
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
    blend: wgpu::BlendState,
    depth_write: bool,
    depth_compare: wgpu::CompareFunction,
}

pub(crate) struct PanelRenderer {
    glass_pipeline: wgpu::RenderPipeline,
    edge_pipeline: wgpu::RenderPipeline,
    glow_pipeline: wgpu::RenderPipeline,
    mesh_vertices: wgpu::Buffer,
    mesh_indices: wgpu::Buffer,
    index_count: u32,
    edge_vertices: wgpu::Buffer,
    edge_vertex_count: u32,
    glass: LayerBinding,
    edges: LayerBinding,
    glow: LayerBinding,
}

impl PanelRenderer {
    pub fn new(
        device: &wgpu::Device,
        frame_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
        scene: &Scene,
    ) -> Self {
        let layer_layout = layer_bind_group_layout(device, "Layer Bind Group Layout");
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Panel Pipeline Layout"),
            bind_group_layouts: &[frame_layout, &layer_layout],
            push_constant_ranges: &[],
        });

        let mesh_layout = || wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &MESH_ATTRIBUTES,
        };
        let create = |spec: PipelineSpec<'_>| {
            create_pipeline(device, &pipeline_layout, surface_format, spec)
        };

        let glass_pipeline = create(PipelineSpec {
            label: "Glass Pipeline",
            source: GLASS_SHADER,
            vertex_layout: mesh_layout(),
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            blend: wgpu::BlendState::ALPHA_BLENDING,
            depth_write: true,
            depth_compare: wgpu::CompareFunction::Less,
        });
        let edge_pipeline = create(PipelineSpec {
            label: "Edge Pipeline",
            source: EDGE_SHADER,
            vertex_layout: wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &LINE_ATTRIBUTES,
            },
            topology: wgpu::PrimitiveTopology::LineList,
            cull_mode: None,
            blend: wgpu::BlendState::ALPHA_BLENDING,
            depth_write: false,
            depth_compare: wgpu::CompareFunction::LessEqual,
        });
        let glow_pipeline = create(PipelineSpec {
            label: "Glow Pipeline",
            source: GLOW_SHADER,
            vertex_layout: mesh_layout(),
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            blend: additive_blend(),
            depth_write: false,
            depth_compare: wgpu::CompareFunction::LessEqual,
        });

        let mesh_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Panel Vertices"),
            contents: bytemuck::cast_slice(&scene.geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let mesh_indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Panel Indices"),
            contents: bytemuck::cast_slice(&scene.geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let edge_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Edge Vertices"),
            contents: bytemuck::cast_slice(&scene.edges.segments),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let glass = LayerBinding::new(
            device,
            &layer_layout,
            "Glass Layer",
            LayerUniforms::glass(&scene.glass),
        );
        let edges = LayerBinding::new(
            device,
            &layer_layout,
            "Edge Layer",
            LayerUniforms::edges(&scene.edges),
        );
        let glow = LayerBinding::new(
            device,
            &layer_layout,
            "Glow Layer",
            LayerUniforms::glow(&scene.glow),
        );

        Self {
            glass_pipeline,
            edge_pipeline,
            glow_pipeline,
            mesh_vertices,
            mesh_indices,
            index_count: scene.geometry.indices.len() as u32,
            edge_vertices,
            edge_vertex_count: scene.edges.segments.len() as u32,
            glass,
            edges,
            glow,
        }
    }

    /// Push the current layer transforms and materials.
    pub fn update(&self, queue: &wgpu::Queue, scene: &Scene) {
        self.glass.write(queue, LayerUniforms::glass(&scene.glass));
        self.edges.write(queue, LayerUniforms::edges(&scene.edges));
        self.glow.write(queue, LayerUniforms::glow(&scene.glow));
    }

    /// Draw glass, then outline, then glow.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, frame_bind_group: &wgpu::BindGroup) {
        pass.set_bind_group(0, frame_bind_group, &[]);

        pass.set_pipeline(&self.glass_pipeline);
        pass.set_bind_group(1, &self.glass.bind_group, &[]);
        pass.set_vertex_buffer(0, self.mesh_vertices.slice(..));
        pass.set_index_buffer(self.mesh_indices.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..self.index_count, 0, 0..1);

        pass.set_pipeline(&self.edge_pipeline);
        pass.set_bind_group(1, &self.edges.bind_group, &[]);
        pass.set_vertex_buffer(0, self.edge_vertices.slice(..));
        pass.draw(0..self.edge_vertex_count, 0..1);

        pass.set_pipeline(&self.glow_pipeline);
        pass.set_bind_group(1, &self.glow.bind_group, &[]);
        pass.set_vertex_buffer(0, self.mesh_vertices.slice(..));
        pass.set_index_buffer(self.mesh_indices.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    surface_format: wgpu::TextureFormat,
    spec: PipelineSpec<'_>,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(spec.label),
        source: wgpu::ShaderSource::Wgsl(spec.source.into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(spec.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[spec.vertex_layout],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(spec.blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: spec.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: spec.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: spec.depth_write,
            depth_compare: spec.depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
