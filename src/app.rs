//! Landing builder and window event handling.

use std::path::PathBuf;
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::LandingConfig;
use crate::context::LandingContext;
use crate::error::LandingError;
use crate::gpu::GpuState;
#[cfg(feature = "egui")]
use crate::overlay::Overlay;
use crate::presentation::Presentation;
use crate::render_loop::{FrameStatus, RenderLoop};
use crate::stage::{PointerEvent, Stage};
use crate::time::Time;
use crate::viewport::Viewport;

/// Frames between frame-rate log lines.
const FPS_LOG_FRAMES: u64 = 300;

/// The landing scene builder.
///
/// Use method chaining to configure, then call `.run()` to open the window.
///
/// ```ignore
/// Landing::new()
///     .with_particle_count(20_000)
///     .with_assets_dir("assets")
///     .run()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Landing {
    config: LandingConfig,
}

impl Landing {
    /// A landing scene with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: LandingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_particle_count(mut self, count: u32) -> Self {
        self.config.particles.count = count;
        self
    }

    /// Seed the particle field for a reproducible layout.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.particles.seed = Some(seed);
        self
    }

    /// Directory holding `product1.png` ... `productN.png`.
    pub fn with_assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.assets.dir = dir.into();
        self
    }

    pub fn config(&self) -> &LandingConfig {
        &self.config
    }

    /// Open the window and run until it is closed.
    pub fn run(self) -> Result<(), LandingError> {
        self.config.validate()?;

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self.config);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Everything that exists once the window is up.
struct Session {
    window: Arc<Window>,
    gpu: GpuState,
    context: LandingContext,
    stage: Stage,
    presentation: Presentation,
    #[cfg(feature = "egui")]
    overlay: Overlay,
    time: Time,
    render_loop: RenderLoop,
}

impl Session {
    fn start(event_loop: &ActiveEventLoop, config: &LandingConfig) -> Result<Self, LandingError> {
        let window_attrs = Window::default_attributes()
            .with_title(config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                config.window.width,
                config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let viewport = Viewport::from_physical(window.inner_size(), window.scale_factor());
        let context = LandingContext::new(viewport, config);
        tracing::info!(
            particles = context.particles.len(),
            width = viewport.width,
            height = viewport.height,
            "landing scene built"
        );

        let gpu = pollster::block_on(GpuState::new(
            window.clone(),
            &context.scene,
            &context.particles,
            &config.particles,
        ))?;

        let mut stage = Stage::landing_page(viewport);
        let presentation = Presentation::start(&mut stage, config)?;

        Ok(Self {
            window,
            gpu,
            context,
            stage,
            presentation,
            #[cfg(feature = "egui")]
            overlay: Overlay::new(config),
            time: Time::new(),
            render_loop: RenderLoop::new(),
        })
    }

    fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.gpu.resize(size);
        let viewport = Viewport::from_physical(size, self.window.scale_factor());
        if viewport.is_visible() {
            self.context.resize(viewport);
            self.stage.set_viewport(viewport);
        }
    }

    fn dispatch(&mut self, events: Vec<PointerEvent>) {
        for event in events {
            self.presentation.handle_pointer(&mut self.stage, event);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let dt = self.time.update();
        if self.time.frame() % FPS_LOG_FRAMES == 0 {
            tracing::debug!(fps = self.time.fps(), frame = self.time.frame(), "frame rate");
        }
        self.presentation.update(dt, &mut self.stage);

        #[cfg(feature = "egui")]
        {
            let egui = self.gpu.egui();
            egui.begin_frame(&self.window);
            self.overlay.paint(&egui.ctx, &self.stage);
            let frame = egui.end_frame(&self.window);
            self.gpu.queue_overlay(frame);
        }

        match self.render_loop.frame(&mut self.context, &mut self.gpu) {
            Ok(FrameStatus::Rendered) => self.window.request_redraw(),
            Ok(FrameStatus::Stopped) => event_loop.exit(),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gpu.reconfigure();
                self.window.request_redraw();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("GPU out of memory, closing");
                self.render_loop.stop();
                event_loop.exit();
            }
            Err(err) => {
                tracing::warn!(%err, "frame skipped");
                self.window.request_redraw();
            }
        }
    }
}

struct App {
    config: LandingConfig,
    session: Option<Session>,
    error: Option<LandingError>,
}

impl App {
    fn new(config: LandingConfig) -> Self {
        Self {
            config,
            session: None,
            error: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() || self.error.is_some() {
            return;
        }
        match Session::start(event_loop, &self.config) {
            Ok(session) => {
                session.window.request_redraw();
                self.session = Some(session);
            }
            Err(err) => {
                tracing::error!(%err, "startup failed");
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(session) = &mut self.session else {
            return;
        };

        #[cfg(feature = "egui")]
        let consumed = session.gpu.egui().on_window_event(&session.window, &event);
        #[cfg(not(feature = "egui"))]
        let consumed = false;

        match event {
            WindowEvent::CloseRequested => {
                session.render_loop.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => session.resize(physical_size),
            WindowEvent::CursorMoved { position, .. } if !consumed => {
                let logical = position.to_logical::<f32>(session.window.scale_factor());
                let events = session.stage.pointer_moved(logical.x, logical.y);
                session.dispatch(events);
            }
            WindowEvent::CursorLeft { .. } => {
                let events = session.stage.pointer_left();
                session.dispatch(events);
            }
            WindowEvent::RedrawRequested => session.redraw(event_loop),
            _ => {}
        }
    }
}
