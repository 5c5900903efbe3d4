//! GPU state: surface, pipelines and the per-frame draw.
//!
//! One render pass draws the 3D scene in this order:
//!
//! 1. particles (additive, depth write)
//! 2. glass panel (alpha blended, depth write)
//! 3. edge outline and rim glow (depth test only)
//!
//! When the `egui` feature is on, a queued overlay frame is painted on top in
//! a second pass that preserves the scene.

#[cfg(feature = "egui")]
mod egui_integration;
mod panel;
mod particles;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::window::Window;

#[cfg(feature = "egui")]
pub use egui_integration::{EguiFrameOutput, EguiIntegration};

use crate::config::ParticleParams;
use crate::error::GpuError;
use crate::particles::ParticleField;
use crate::render_loop::FrameTarget;
use crate::scene::{EdgeLayer, GlassLayer, GlowLayer, Scene};

use panel::PanelRenderer;
use particles::ParticleRenderer;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub const PARTICLE_SHADER: &str = include_str!("../shaders/particles.wgsl");
pub const GLASS_SHADER: &str = include_str!("../shaders/glass.wgsl");
pub const EDGE_SHADER: &str = include_str!("../shaders/edges.wgsl");
pub const GLOW_SHADER: &str = include_str!("../shaders/glow.wgsl");

const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// Camera and lights, shared by every pipeline at group 0.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    camera_position: [f32; 4],
    /// rgb premultiplied by intensity
    ambient: [f32; 4],
    light_position: [f32; 4],
    /// rgb premultiplied by intensity
    light_color: [f32; 4],
}

impl FrameUniforms {
    pub fn from_scene(scene: &Scene) -> Self {
        let camera = &scene.camera;
        let ambient = scene.ambient.color * scene.ambient.intensity;
        let light = scene.point_light.color * scene.point_light.intensity;
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            view: camera.view_matrix().to_cols_array_2d(),
            camera_position: camera.position.extend(1.0).to_array(),
            ambient: ambient.extend(1.0).to_array(),
            light_position: scene.point_light.position.extend(1.0).to_array(),
            light_color: light.extend(1.0).to_array(),
        }
    }
}

/// Per-layer transform and material at group 1.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct LayerUniforms {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    /// rgb color, a opacity
    color: [f32; 4],
    params: [f32; 4],
}

impl LayerUniforms {
    pub fn glass(layer: &GlassLayer) -> Self {
        Self {
            model: layer.transform.matrix().to_cols_array_2d(),
            normal_matrix: layer.transform.normal_matrix().to_cols_array_2d(),
            color: layer.color.extend(layer.opacity).to_array(),
            params: [layer.roughness, layer.metalness, 0.0, 0.0],
        }
    }

    pub fn edges(layer: &EdgeLayer) -> Self {
        Self {
            model: layer.transform.matrix().to_cols_array_2d(),
            normal_matrix: layer.transform.normal_matrix().to_cols_array_2d(),
            color: layer.color.extend(layer.opacity).to_array(),
            params: [layer.linewidth, 0.0, 0.0, 0.0],
        }
    }

    pub fn glow(layer: &GlowLayer) -> Self {
        Self {
            model: layer.transform.matrix().to_cols_array_2d(),
            normal_matrix: layer.transform.normal_matrix().to_cols_array_2d(),
            color: layer.color.extend(1.0).to_array(),
            params: [layer.intensity, layer.rim_bias, 0.0, 0.0],
        }
    }
}

/// `src * src_alpha + dst`.
pub(crate) fn additive_blend() -> wgpu::BlendState {
    wgpu::BlendState {
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
    }
}

/// A single uniform buffer visible to both shader stages.
pub(crate) fn layer_bind_group_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    depth_texture: wgpu::TextureView,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    particles: ParticleRenderer,
    panel: PanelRenderer,
    #[cfg(feature = "egui")]
    egui: EguiIntegration,
    #[cfg(feature = "egui")]
    overlay: Option<EguiFrameOutput>,
}

impl GpuState {
    pub async fn new(
        window: Arc<Window>,
        scene: &Scene,
        field: &ParticleField,
        params: &ParticleParams,
    ) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let info = adapter.get_info();
        tracing::info!(adapter = %info.name, backend = ?info.backend, "GPU adapter selected");

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        let frame_layout = layer_bind_group_layout(&device, "Frame Bind Group Layout");
        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniforms"),
            contents: bytemuck::bytes_of(&FrameUniforms::from_scene(scene)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let particles =
            ParticleRenderer::new(&device, &frame_layout, config.format, field, params);
        let panel = PanelRenderer::new(&device, &frame_layout, config.format, scene);
        tracing::info!(particles = field.len(), format = ?config.format, "renderer ready");

        #[cfg(feature = "egui")]
        let egui = EguiIntegration::new(&device, config.format, &window);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_texture,
            frame_buffer,
            frame_bind_group,
            particles,
            panel,
            #[cfg(feature = "egui")]
            egui,
            #[cfg(feature = "egui")]
            overlay: None,
        })
    }

    /// Reconfigure the surface. Zero sizes are ignored.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = create_depth_texture(&self.device, &self.config);
        }
    }

    /// Reconfigure with the current size, after a lost or outdated surface.
    pub fn reconfigure(&mut self) {
        self.resize(winit::dpi::PhysicalSize::new(
            self.config.width,
            self.config.height,
        ));
    }

    #[cfg(feature = "egui")]
    pub fn egui(&mut self) -> &mut EguiIntegration {
        &mut self.egui
    }

    /// Paint `frame` over the scene on the next draw.
    #[cfg(feature = "egui")]
    pub fn queue_overlay(&mut self, frame: EguiFrameOutput) {
        self.overlay = Some(frame);
    }

    fn render(&mut self, scene: &Scene) -> Result<(), wgpu::SurfaceError> {
        self.queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::from_scene(scene)),
        );
        let focal = scene.camera.projection_matrix().y_axis.y;
        self.particles
            .update_uniforms(&self.queue, focal, self.config.width, self.config.height);
        self.panel.update(&self.queue, scene);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.particles.draw(&mut render_pass, &self.frame_bind_group);
            self.panel.draw(&mut render_pass, &self.frame_bind_group);
        }

        #[cfg(feature = "egui")]
        if let Some(overlay) = self.overlay.take() {
            self.egui.paint(
                &self.device,
                &self.queue,
                &mut encoder,
                &view,
                &overlay,
                [self.config.width, self.config.height],
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

impl FrameTarget for GpuState {
    type Error = wgpu::SurfaceError;

    fn upload_positions(&mut self, positions: &[f32]) {
        self.particles.upload_positions(&self.queue, positions);
    }

    fn draw(&mut self, scene: &Scene) -> Result<(), Self::Error> {
        self.render(scene)
    }
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LandingConfig;
    use crate::scene::rim_intensity;
    use crate::viewport::Viewport;
    use glam::{Vec3, Vec4};

    fn validate_wgsl(source: &str) -> naga::Module {
        let module = naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|e| panic!("WGSL parse error:\n{}", e.emit_to_string(source)));
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .unwrap_or_else(|e| panic!("WGSL validation error: {e:?}"));
        module
    }

    fn entry_points(module: &naga::Module) -> Vec<&str> {
        module.entry_points.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_shaders_validate() {
        for source in [PARTICLE_SHADER, GLASS_SHADER, EDGE_SHADER, GLOW_SHADER] {
            let module = validate_wgsl(source);
            let names = entry_points(&module);
            assert!(names.contains(&"vs_main"));
            assert!(names.contains(&"fs_main"));
        }
    }

    #[test]
    fn test_uniform_sizes_match_wgsl() {
        // Frame: 2 mat4 + 4 vec4.
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 192);
        // Layer: 2 mat4 + 2 vec4.
        assert_eq!(std::mem::size_of::<LayerUniforms>(), 160);
        assert_eq!(std::mem::size_of::<particles::PointUniforms>(), 32);
        // Uniform buffers need 16-byte multiples.
        assert_eq!(std::mem::size_of::<FrameUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<LayerUniforms>() % 16, 0);
    }

    #[test]
    fn test_frame_uniforms_premultiply_lights() {
        let scene = Scene::build(Viewport::new(1280.0, 720.0), &LandingConfig::default());
        let frame = FrameUniforms::from_scene(&scene);
        assert_eq!(frame.ambient, [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(frame.light_color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(frame.light_position, [5.0, 5.0, 5.0, 1.0]);
        assert_eq!(frame.camera_position, [0.0, 0.0, 50.0, 1.0]);
    }

    #[test]
    fn test_layer_uniforms_follow_resize() {
        let config = LandingConfig::default();
        let mut scene = Scene::build(Viewport::new(800.0, 600.0), &config);
        let before = LayerUniforms::glass(&scene.glass);
        scene.on_resize(Viewport::new(1600.0, 1200.0));
        let after = LayerUniforms::glass(&scene.glass);

        assert_ne!(before.model, after.model);
        // x scale doubles with the viewport width.
        assert!((after.model[0][0] - 2.0 * before.model[0][0]).abs() < 1e-4);
        assert_eq!(after.color[3], config.glass.opacity);
    }

    #[test]
    fn test_glow_uniforms_carry_rim_parameters() {
        let scene = Scene::build(Viewport::new(800.0, 600.0), &LandingConfig::default());
        let glow = LayerUniforms::glow(&scene.glow);
        assert_eq!(glow.params[0], scene.glow.intensity);
        assert_eq!(glow.params[1], scene.glow.rim_bias);
    }

    #[test]
    fn test_glow_normal_faces_viewer() {
        // The shader transforms the plane normal into view space and compares
        // it with +Z; for the landing camera that matches the CPU falloff.
        let scene = Scene::build(Viewport::new(800.0, 600.0), &LandingConfig::default());
        let normal_matrix = scene.glow.transform.normal_matrix();
        let world = (normal_matrix * Vec4::new(0.0, 0.0, 1.0, 0.0)).truncate();
        let view = (scene.camera.view_matrix() * world.extend(0.0))
            .truncate()
            .normalize();
        assert!((view - Vec3::Z).length() < 1e-5);

        let expected = rim_intensity(Vec3::Z, Vec3::Z, scene.glow.rim_bias);
        let f = scene.glow.rim_bias - view.dot(Vec3::Z);
        assert!((f * f * f * f - expected).abs() < 1e-6);
        assert!(expected < 0.01);
    }
}
