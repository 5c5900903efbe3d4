//! # Glassfall
//!
//! A decorative landing scene: a field of falling gold particles behind a
//! translucent glass panel with a glowing outline, an intro title that fades
//! in, and a product grid that reveals itself and responds to the pointer.
//!
//! ## Quick Start
//!
//! ```ignore
//! use glassfall::prelude::*;
//!
//! fn main() -> Result<(), LandingError> {
//!     Landing::new()
//!         .with_assets_dir("assets")
//!         .run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Particle field
//!
//! [`ParticleField`] holds fixed-size position, color and size arrays. Every
//! frame [`ParticleField::tick`] moves each particle down by a constant step
//! and recycles particles that fall below the floor to the top of the spawn
//! volume. Spawn bounds are fixed when the field is created.
//!
//! ### Scene
//!
//! [`Scene`] composes the camera, lights, and the three-layer glass panel
//! (glass, edge outline, rim glow). [`Scene::on_resize`] keeps all three
//! layers in step with the viewport.
//!
//! ### Presentation
//!
//! [`Presentation`] drives the page overlay through a [`Document`]: it builds
//! the product grid, fades the intro in, swaps it for the grid, and runs
//! hover tweens on each item. [`Stage`] is the in-crate document the overlay
//! paints.
//!
//! ## Configuration
//!
//! Every tunable lives in [`LandingConfig`], loadable from TOML:
//!
//! ```toml
//! [particles]
//! count = 20000
//! color = 0xd4af37
//!
//! [product_grid]
//! columns = 3
//! ```

mod app;
pub mod camera;
pub mod config;
pub mod context;
pub mod error;
mod gpu;
pub mod images;
#[cfg(feature = "egui")]
mod overlay;
pub mod particles;
pub mod presentation;
pub mod render_loop;
pub mod scene;
pub mod stage;
pub mod time;
pub mod tween;
pub mod viewport;

pub use app::Landing;
pub use camera::Camera;
pub use config::LandingConfig;
pub use context::LandingContext;
pub use error::{ConfigError, GpuError, LandingError, TextureError};
pub use glam::{Vec2, Vec3, Vec4};
pub use particles::{ParticleField, SpawnBounds};
pub use presentation::{Phase, Presentation};
pub use render_loop::{FrameStatus, FrameTarget, RenderLoop};
pub use scene::Scene;
pub use stage::{Document, ElementId, PointerEvent, Stage};
pub use tween::{Ease, Property, TweenScheduler};
pub use viewport::Viewport;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use glassfall::prelude::*;
/// ```
pub mod prelude {
    pub use crate::app::Landing;
    pub use crate::config::LandingConfig;
    pub use crate::context::LandingContext;
    pub use crate::error::LandingError;
    pub use crate::particles::ParticleField;
    pub use crate::presentation::Presentation;
    pub use crate::render_loop::{FrameTarget, RenderLoop};
    pub use crate::scene::Scene;
    pub use crate::stage::{Document, Stage};
    pub use crate::time::Time;
    pub use crate::viewport::Viewport;
    pub use crate::{Vec2, Vec3, Vec4};
}
