//! Frame timing.
//!
//! Tracks elapsed time, frame delta, frame count and FPS for the render loop
//! and feeds the presentation tweens.
//!
//! Long stalls (a dragged window, a breakpoint) are smoothed: any delta above
//! [`LAG_THRESHOLD`] is replaced by [`LAG_SUBSTITUTE`] so tweens resume where
//! they left off instead of jumping to their end.
//!
//! # Example
//!
//! ```ignore
//! use glassfall::time::Time;
//!
//! let mut time = Time::new();
//!
//! // Once per frame:
//! let dt = time.update();
//! presentation.update(dt, &mut stage);
//! ```

use std::time::{Duration, Instant};

/// Deltas longer than this are treated as a stall.
pub const LAG_THRESHOLD: f32 = 0.5;

/// Delta used in place of a stall.
pub const LAG_SUBSTITUTE: f32 = 1.0 / 30.0;

/// Time tracking for the render loop.
#[derive(Debug)]
pub struct Time {
    /// When the last frame occurred.
    last_frame: Instant,
    /// Smoothed time accumulated across frames, in seconds.
    elapsed_secs: f32,
    /// Smoothed time since the last frame, in seconds.
    delta_secs: f32,
    /// Total frames since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    /// How often to update FPS calculation.
    fps_update_interval: Duration,
    /// Fixed delta time for deterministic updates (optional).
    fixed_delta: Option<f32>,
}

impl Time {
    /// Create a new time tracker starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            fixed_delta: None,
        }
    }

    /// Update timing values. Call once per frame.
    ///
    /// Returns the (smoothed) delta time in seconds.
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();
        let raw_delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.delta_secs = smooth_lag(self.fixed_delta.unwrap_or(raw_delta));
        self.elapsed_secs += self.delta_secs;
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.delta_secs
    }

    /// Total smoothed time in seconds since start.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Time since last frame in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Set a fixed delta time for deterministic updates.
    ///
    /// Pass `None` to use real frame timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

fn smooth_lag(delta: f32) -> f32 {
    if delta > LAG_THRESHOLD {
        LAG_SUBSTITUTE
    } else {
        delta.max(0.0)
    }
}
