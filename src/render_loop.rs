//! The per-frame redraw loop.
//!
//! [`RenderLoop::frame`] is called once per display refresh. Each call ticks
//! the particle field, uploads positions if they changed, and draws the scene
//! through a [`FrameTarget`]. The loop owns a running flag: after
//! [`RenderLoop::stop`] every further call returns [`FrameStatus::Stopped`]
//! without touching the context, and the window closes.

use crate::context::LandingContext;
use crate::scene::Scene;

/// Rendering backend seen from the loop.
pub trait FrameTarget {
    type Error;

    /// Replace the GPU copy of the particle positions.
    fn upload_positions(&mut self, positions: &[f32]);

    /// Draw one frame of `scene` from its camera.
    fn draw(&mut self, scene: &Scene) -> Result<(), Self::Error>;
}

/// Outcome of one [`RenderLoop::frame`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Rendered,
    Stopped,
}

/// Continuous redraw driver with deterministic shutdown.
#[derive(Debug)]
pub struct RenderLoop {
    running: bool,
    frames: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            running: true,
            frames: 0,
        }
    }

    /// Run one frame against `target`.
    pub fn frame<T: FrameTarget>(
        &mut self,
        ctx: &mut LandingContext,
        target: &mut T,
    ) -> Result<FrameStatus, T::Error> {
        if !self.running {
            return Ok(FrameStatus::Stopped);
        }

        ctx.particles.tick();
        if ctx.particles.take_dirty() {
            target.upload_positions(ctx.particles.positions());
        }
        target.draw(&ctx.scene)?;

        self.frames += 1;
        Ok(FrameStatus::Rendered)
    }

    /// Request shutdown. Takes effect on the next [`frame`](Self::frame).
    pub fn stop(&mut self) {
        if self.running {
            tracing::debug!(frames = self.frames, "render loop stopping");
        }
        self.running = false;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames rendered so far.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}
