//! Error types for Glassfall.
//!
//! Startup is the only place things can fail: the GPU backend, the window,
//! the configuration file and the stage elements the presentation needs.
//! Everything that runs per frame is a total function.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found; ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
}

/// Errors produced while loading or validating a [`LandingConfig`](crate::config::LandingConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file '{}': {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A numeric parameter is outside its valid range.
    #[error("{field} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted path of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
        /// Inclusive lower bound.
        min: f32,
        /// Inclusive upper bound.
        max: f32,
    },
    /// A count that must be at least one is zero.
    #[error("{0} must be at least 1")]
    Zero(&'static str),
}

/// Errors that can occur while loading product images.
#[derive(Debug, Error)]
pub enum TextureError {
    /// Failed to open or decode the image file.
    #[error("failed to load image '{}': {source}", path.display())]
    ImageLoad {
        /// File that was being loaded.
        path: PathBuf,
        /// Underlying decoder error.
        source: image::ImageError,
    },
}

/// Errors that can occur when running the landing scene.
#[derive(Debug, Error)]
pub enum LandingError {
    /// Failed to create event loop.
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// Configuration was rejected.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// A stage element the presentation depends on does not exist.
    #[error("stage element '{0}' is missing")]
    MissingElement(&'static str),
}
