//! Adjustable parameters for the landing scene.
//!
//! Every knob the scene exposes lives in [`LandingConfig`]. All sections have
//! documented defaults, so an empty TOML file (or no file at all) produces the
//! stock scene.
//!
//! # Example
//!
//! ```ignore
//! let config = LandingConfig::from_toml_str(r#"
//!     [glowing_edges]
//!     color = 0x88ccff
//!     opacity = 0.8
//!
//!     [product_grid]
//!     columns = 3
//! "#)?;
//! ```

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::Deserialize;

use crate::error::ConfigError;

/// Convert a `0xRRGGBB` color to normalized RGB.
pub fn hex_to_rgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct LandingConfig {
    pub window: WindowParams,
    pub particles: ParticleParams,
    pub glass: GlassParams,
    pub glowing_edges: GlowingEdgesParams,
    pub product_grid: ProductGridParams,
    pub presentation: PresentationParams,
    pub assets: AssetParams,
}

/// Window creation parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowParams {
    pub title: String,
    /// Initial inner width in logical pixels.
    pub width: u32,
    /// Initial inner height in logical pixels.
    pub height: u32,
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            title: "Glassfall".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Particle backdrop parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParticleParams {
    /// Number of particles, allocated once at startup.
    pub count: u32,
    /// Shared particle color as `0xRRGGBB`.
    pub color: u32,
    /// Sprite opacity (0-1).
    pub opacity: f32,
    /// Multiplier applied to every particle's size attribute.
    pub size_scale: f32,
    /// Fixed RNG seed for reproducible spawns. Random when unset.
    pub seed: Option<u64>,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            count: 50_000,
            color: 0xd4af37,
            opacity: 0.6,
            size_scale: 1.0,
            seed: None,
        }
    }
}

/// Glass panel material parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlassParams {
    pub color: u32,
    /// Panel opacity (0-1). Low values let the particles show through.
    pub opacity: f32,
    /// Surface roughness (0-1); rough glass gets a weaker highlight.
    pub roughness: f32,
    /// Metalness (0-1); tints the highlight with the panel color.
    pub metalness: f32,
}

impl Default for GlassParams {
    fn default() -> Self {
        Self {
            color: 0xffffff,
            opacity: 0.12,
            roughness: 1.0,
            metalness: 1.0,
        }
    }
}

/// Glowing edge and rim glow parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlowingEdgesParams {
    /// Color of the glowing edges.
    pub color: u32,
    /// Opacity of the glowing edges (0-1).
    pub opacity: f32,
    /// Width of the glowing edges. Rendering is device-dependent.
    pub linewidth: f32,
    /// Intensity of the rim glow effect (0-1).
    pub glow_intensity: f32,
}

impl Default for GlowingEdgesParams {
    fn default() -> Self {
        Self {
            color: 0xffffff,
            opacity: 0.5,
            linewidth: 100.0,
            glow_intensity: 0.1,
        }
    }
}

/// Product grid layout parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProductGridParams {
    /// Number of columns in the product grid.
    pub columns: u32,
    /// Spacing between products, in pixels.
    pub spacing: f32,
    /// Width and height of each product item, in pixels.
    pub item_size: f32,
    /// Number of products shown.
    pub item_count: u32,
}

impl Default for ProductGridParams {
    fn default() -> Self {
        Self {
            columns: 4,
            spacing: 90.0,
            item_size: 220.0,
            item_count: 12,
        }
    }
}

/// Timing and hover parameters for the presentation sequence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PresentationParams {
    /// Delay before the intro fade starts, in seconds.
    pub intro_delay: f32,
    /// Intro fade duration, in seconds.
    pub intro_fade: f32,
    /// Product grid fade-in duration, in seconds.
    pub grid_fade: f32,
    /// Final grid opacity (0-1).
    pub grid_opacity: f32,
    /// Hover tween duration, in seconds.
    pub hover_duration: f32,
    /// Item scale while hovered.
    pub hover_scale: f32,
    /// Vertical item offset while hovered, in pixels (negative is up).
    pub hover_lift: f32,
    /// Image scale inside a hovered item.
    pub hover_image_scale: f32,
}

impl Default for PresentationParams {
    fn default() -> Self {
        Self {
            intro_delay: 0.01,
            intro_fade: 2.0,
            grid_fade: 2.0,
            grid_opacity: 1.0,
            hover_duration: 0.5,
            hover_scale: 1.08,
            hover_lift: -10.0,
            hover_image_scale: 1.1,
        }
    }
}

/// Asset locations.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetParams {
    /// Directory holding `product1.png` .. `productN.png`.
    pub dir: PathBuf,
}

impl Default for AssetParams {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets"),
        }
    }
}

impl LandingConfig {
    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check every value against its valid range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        unit("particles.opacity", self.particles.opacity)?;
        positive("particles.size_scale", self.particles.size_scale)?;
        nonzero("particles.count", self.particles.count)?;

        unit("glass.opacity", self.glass.opacity)?;
        unit("glass.roughness", self.glass.roughness)?;
        unit("glass.metalness", self.glass.metalness)?;

        unit("glowing_edges.opacity", self.glowing_edges.opacity)?;
        unit("glowing_edges.glow_intensity", self.glowing_edges.glow_intensity)?;
        positive("glowing_edges.linewidth", self.glowing_edges.linewidth)?;

        nonzero("product_grid.columns", self.product_grid.columns)?;
        nonzero("product_grid.item_count", self.product_grid.item_count)?;
        positive("product_grid.item_size", self.product_grid.item_size)?;
        range("product_grid.spacing", self.product_grid.spacing, 0.0, f32::MAX)?;

        let p = &self.presentation;
        range("presentation.intro_delay", p.intro_delay, 0.0, f32::MAX)?;
        range("presentation.intro_fade", p.intro_fade, 0.0, f32::MAX)?;
        range("presentation.grid_fade", p.grid_fade, 0.0, f32::MAX)?;
        range("presentation.hover_duration", p.hover_duration, 0.0, f32::MAX)?;
        unit("presentation.grid_opacity", p.grid_opacity)?;
        positive("presentation.hover_scale", p.hover_scale)?;
        positive("presentation.hover_image_scale", p.hover_image_scale)?;

        nonzero("window.width", self.window.width)?;
        nonzero("window.height", self.window.height)?;
        Ok(())
    }
}

fn range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    // NaN fails both comparisons, so it is rejected too.
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value, min, max })
    }
}

fn unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    range(field, value, 0.0, 1.0)
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    range(field, value, f32::MIN_POSITIVE, f32::MAX)
}

fn nonzero(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::Zero(field))
    } else {
        Ok(())
    }
}
