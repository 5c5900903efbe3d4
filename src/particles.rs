//! The falling particle backdrop.
//!
//! A [`ParticleField`] holds flat position, color and size arrays laid out the
//! way the GPU consumes them (`3N`, `3N` and `N` floats). The arrays are
//! allocated once; [`ParticleField::tick`] drifts every particle down by
//! [`DRIFT_STEP`] and recycles the ones that fall past the floor back to the
//! top, in place.
//!
//! ```ignore
//! let mut field = ParticleField::initialize(
//!     50_000,
//!     Viewport::new(1280.0, 720.0),
//!     hex_to_rgb(0xd4af37),
//!     StdRng::from_entropy(),
//! );
//!
//! // Once per frame:
//! field.tick();
//! if field.take_dirty() {
//!     gpu.upload_positions(field.positions());
//! }
//! ```

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::viewport::Viewport;

/// Distance every particle falls per tick.
pub const DRIFT_STEP: f32 = 0.05;

/// Half of the z spawn range; z is drawn from `[-HALF_DEPTH, HALF_DEPTH]`.
pub const HALF_DEPTH: f32 = 25.0;

/// Smallest particle size.
pub const MIN_SIZE: f32 = 0.02;

/// Width of the size range; sizes are drawn from `[MIN_SIZE, MIN_SIZE + SIZE_SPAN]`.
pub const SIZE_SPAN: f32 = 0.05;

/// Spawn and recycle bounds, fixed when the field is initialized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnBounds {
    /// x is drawn from `[-half_width, half_width]`.
    pub half_width: f32,
    /// Initial y is drawn from `[0, top]`.
    pub top: f32,
    /// y a recycled particle restarts from.
    pub reset_y: f32,
    /// Particles strictly below this y are recycled.
    pub floor: f32,
    /// z is drawn from `[-half_depth, half_depth]`.
    pub half_depth: f32,
}

impl SpawnBounds {
    /// Bounds for a viewport of `W x H` pixels.
    pub fn from_viewport(viewport: Viewport) -> Self {
        Self {
            half_width: viewport.width * 0.05,
            top: viewport.height * 0.1,
            reset_y: viewport.height * 0.05,
            floor: -viewport.height * 0.05,
            half_depth: HALF_DEPTH,
        }
    }
}

/// Fixed-size particle set with a per-frame drift-and-recycle update.
#[derive(Debug, Clone)]
pub struct ParticleField {
    positions: Vec<f32>,
    colors: Vec<f32>,
    sizes: Vec<f32>,
    bounds: SpawnBounds,
    rng: StdRng,
    dirty: bool,
}

impl ParticleField {
    /// Allocate `count` particles spread over the spawn volume of `viewport`.
    ///
    /// All particles share `color`. Sizes are uniform in `[0.02, 0.07]`.
    pub fn initialize(count: usize, viewport: Viewport, color: Vec3, mut rng: StdRng) -> Self {
        let bounds = SpawnBounds::from_viewport(viewport);
        let mut positions = Vec::with_capacity(count * 3);
        let mut colors = Vec::with_capacity(count * 3);
        let mut sizes = Vec::with_capacity(count);

        for _ in 0..count {
            positions.push(centered(&mut rng, bounds.half_width));
            positions.push(rng.gen::<f32>() * bounds.top);
            positions.push(centered(&mut rng, bounds.half_depth));

            colors.extend_from_slice(&color.to_array());

            sizes.push(rng.gen::<f32>() * SIZE_SPAN + MIN_SIZE);
        }

        Self {
            positions,
            colors,
            sizes,
            bounds,
            rng,
            dirty: true,
        }
    }

    /// Same as [`initialize`](Self::initialize) with a seeded RNG.
    pub fn with_seed(count: usize, viewport: Viewport, color: Vec3, seed: u64) -> Self {
        Self::initialize(count, viewport, color, StdRng::seed_from_u64(seed))
    }

    /// Advance one frame: drift every particle down and recycle the ones
    /// that fell below the floor.
    pub fn tick(&mut self) {
        let bounds = self.bounds;
        for p in self.positions.chunks_exact_mut(3) {
            p[1] -= DRIFT_STEP;
            if p[1] < bounds.floor {
                p[0] = centered(&mut self.rng, bounds.half_width);
                p[1] = bounds.reset_y;
                p[2] = centered(&mut self.rng, bounds.half_depth);
            }
        }
        self.dirty = true;
    }

    /// Returns whether positions changed since the last call, and clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Flat `[x, y, z, x, y, z, ...]` positions.
    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Flat `[r, g, b, ...]` colors.
    #[inline]
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    #[inline]
    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    /// Position of particle `index`.
    pub fn position(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.positions[index * 3..index * 3 + 3])
    }

    #[inline]
    pub fn bounds(&self) -> SpawnBounds {
        self.bounds
    }
}

/// Uniform sample in `[-half, half]`. Never panics, even for `half == 0`.
fn centered(rng: &mut StdRng, half: f32) -> f32 {
    (rng.gen::<f32>() - 0.5) * 2.0 * half
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOLD: Vec3 = Vec3::new(0.83, 0.69, 0.22);

    fn field(count: usize, w: f32, h: f32) -> ParticleField {
        ParticleField::with_seed(count, Viewport::new(w, h), GOLD, 7)
    }

    fn assert_in_bounds(field: &ParticleField) {
        let b = field.bounds();
        for i in 0..field.len() {
            let p = field.position(i);
            assert!(p.x >= -b.half_width && p.x <= b.half_width, "x out of range: {}", p.x);
            assert!(p.z >= -b.half_depth && p.z <= b.half_depth, "z out of range: {}", p.z);
        }
    }

    #[test]
    fn test_array_lengths() {
        let field = field(1000, 1280.0, 720.0);
        assert_eq!(field.len(), 1000);
        assert_eq!(field.positions().len(), 3000);
        assert_eq!(field.colors().len(), 3000);
        assert_eq!(field.sizes().len(), 1000);
    }

    #[test]
    fn test_initial_distribution() {
        let field = field(5000, 1280.0, 720.0);
        assert_in_bounds(&field);
        for i in 0..field.len() {
            let y = field.position(i).y;
            assert!((0.0..=72.0).contains(&y), "y out of range: {y}");
        }
        for &size in field.sizes() {
            assert!((MIN_SIZE..=MIN_SIZE + SIZE_SPAN).contains(&size));
        }
    }

    #[test]
    fn test_shared_color() {
        let field = field(64, 800.0, 600.0);
        for rgb in field.colors().chunks_exact(3) {
            assert_eq!(rgb, GOLD.to_array());
        }
    }

    #[test]
    fn test_tick_drifts_or_recycles() {
        let mut field = field(2000, 400.0, 300.0);
        let reset_y = field.bounds().reset_y;

        for _ in 0..400 {
            let before: Vec<f32> = (0..field.len()).map(|i| field.position(i).y).collect();
            field.tick();
            for (i, &y0) in before.iter().enumerate() {
                let y = field.position(i).y;
                assert!(
                    y == y0 - DRIFT_STEP || y == reset_y,
                    "particle {i}: {y0} -> {y}"
                );
            }
        }
    }

    #[test]
    fn test_bounds_hold_under_repeated_ticks() {
        let mut field = field(1000, 640.0, 480.0);
        for _ in 0..2000 {
            field.tick();
        }
        assert_in_bounds(&field);
    }

    #[test]
    fn test_threshold_is_strict() {
        // H = 1 puts the floor at exactly -0.05, one drift step below zero.
        let mut field = field(1, 100.0, 1.0);
        let bounds = field.bounds();
        field.positions[1] = 0.0;

        field.tick();
        assert_eq!(field.position(0).y, bounds.floor);

        field.tick();
        assert_eq!(field.position(0).y, bounds.reset_y);
    }

    #[test]
    fn test_dirty_flag() {
        let mut field = field(4, 100.0, 100.0);
        assert!(field.take_dirty());
        assert!(!field.take_dirty());
        field.tick();
        assert!(field.take_dirty());
    }

    #[test]
    fn test_tick_never_reallocates() {
        let mut field = field(256, 100.0, 100.0);
        let ptr = field.positions().as_ptr();
        for _ in 0..500 {
            field.tick();
        }
        assert_eq!(field.positions().as_ptr(), ptr);
        assert_eq!(field.len(), 256);
    }

    #[test]
    fn test_zero_viewport_does_not_panic() {
        let mut field = field(16, 0.0, 0.0);
        field.tick();
        assert_eq!(field.position(0).x, 0.0);
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = field(100, 300.0, 200.0);
        let b = field(100, 300.0, 200.0);
        assert_eq!(a.positions(), b.positions());
    }
}
