//! Viewport dimensions.

use winit::dpi::{LogicalSize, PhysicalSize};

/// Viewport size in logical pixels (the page's CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Convert a physical surface size using the window's scale factor.
    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let logical: LogicalSize<f32> = size.to_logical(scale_factor);
        Self::new(logical.width, logical.height)
    }

    /// Width over height. Falls back to 1.0 for a collapsed viewport.
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Whether both dimensions are non-zero (minimized windows report 0x0).
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect() {
        assert_eq!(Viewport::new(1600.0, 800.0).aspect(), 2.0);
        assert_eq!(Viewport::new(100.0, 0.0).aspect(), 1.0);
    }

    #[test]
    fn test_from_physical_applies_scale_factor() {
        let viewport = Viewport::from_physical(PhysicalSize::new(2560, 1440), 2.0);
        assert_eq!(viewport, Viewport::new(1280.0, 720.0));
    }

    #[test]
    fn test_is_visible() {
        assert!(Viewport::new(1.0, 1.0).is_visible());
        assert!(!Viewport::new(0.0, 720.0).is_visible());
    }
}
