//! Owned scene state.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{hex_to_rgb, LandingConfig};
use crate::particles::ParticleField;
use crate::scene::Scene;
use crate::viewport::Viewport;

/// The scene and its particle backdrop, passed explicitly to every
/// component that reads or updates them.
#[derive(Debug, Clone)]
pub struct LandingContext {
    pub scene: Scene,
    pub particles: ParticleField,
}

impl LandingContext {
    /// Build the scene and spawn the particle field for `viewport`.
    pub fn new(viewport: Viewport, config: &LandingConfig) -> Self {
        let params = &config.particles;
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let particles = ParticleField::initialize(
            params.count as usize,
            viewport,
            hex_to_rgb(params.color),
            rng,
        );

        Self {
            scene: Scene::build(viewport, config),
            particles,
        }
    }

    /// React to a viewport change. Particles keep their spawn bounds and
    /// their buffers; only scene transforms change.
    pub fn resize(&mut self, viewport: Viewport) {
        self.scene.on_resize(viewport);
    }
}
