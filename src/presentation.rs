//! Intro fade and product grid reveal.
//!
//! The sequence runs once:
//!
//! 1. **Pending**: a short delay after startup.
//! 2. **FadingIntro**: the welcome screen fades to full opacity.
//! 3. **Revealed**: the welcome screen is hidden, the product grid is shown
//!    and fades in. Items respond to the pointer from here on.
//!
//! Hovering an item lifts and enlarges it with an elastic overshoot and
//! zooms its image; leaving eases both back. Each item's tweens are
//! independent of every other item's.

use crate::config::{LandingConfig, PresentationParams, ProductGridParams};
use crate::error::LandingError;
use crate::stage::{
    BoxShadow, Document, ElementId, ElementKind, ImageSource, PointerEvent, StyleProperty,
    PRODUCT_GRID, WELCOME_SCREEN,
};
use crate::tween::{Ease, Property, TweenScheduler};

/// Ease of the hover lift.
pub const HOVER_EASE: Ease = Ease::ElasticOut {
    amplitude: 1.0,
    period: 0.7,
};

/// Ease used to settle back after the pointer leaves, and for image zoom.
pub const SETTLE_EASE: Ease = Ease::Power2Out;

/// Shadow under a hovered item.
pub const HOVER_SHADOW: BoxShadow = BoxShadow {
    offset_y: 15.0,
    blur: 30.0,
    alpha: 0.2,
};

/// Shadow under an item at rest.
pub const REST_SHADOW: BoxShadow = BoxShadow {
    offset_y: 5.0,
    blur: 15.0,
    alpha: 0.1,
};

/// Where the sequence is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Waiting for the intro fade to start.
    Pending { delay_remaining: f32 },
    FadingIntro,
    Revealed,
}

/// Tween completions the sequencer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cue {
    IntroFaded,
}

/// A grid cell and the image inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductItem {
    pub item: ElementId,
    pub image: ElementId,
}

/// Drives the intro and product grid.
#[derive(Debug)]
pub struct Presentation {
    params: PresentationParams,
    intro: ElementId,
    grid: ElementId,
    items: Vec<ProductItem>,
    tweens: TweenScheduler<Cue>,
    phase: Phase,
}

impl Presentation {
    /// Build the product grid on `doc` and schedule the intro.
    ///
    /// Fails if the page lacks the welcome screen or the product grid.
    pub fn start<D: Document>(doc: &mut D, config: &LandingConfig) -> Result<Self, LandingError> {
        let intro = doc
            .element_by_name(WELCOME_SCREEN)
            .ok_or(LandingError::MissingElement(WELCOME_SCREEN))?;
        let grid = doc
            .element_by_name(PRODUCT_GRID)
            .ok_or(LandingError::MissingElement(PRODUCT_GRID))?;

        let items = build_product_grid(doc, grid, &config.product_grid);
        tracing::debug!(items = items.len(), "product grid built");

        Ok(Self {
            params: config.presentation.clone(),
            intro,
            grid,
            items,
            tweens: TweenScheduler::new(),
            phase: Phase::Pending {
                delay_remaining: config.presentation.intro_delay,
            },
        })
    }

    /// Advance the sequence and every running tween by `dt` seconds.
    pub fn update<D: Document>(&mut self, mut dt: f32, doc: &mut D) {
        if let Phase::Pending { delay_remaining } = self.phase {
            let remaining = delay_remaining - dt;
            if remaining > 0.0 {
                self.phase = Phase::Pending {
                    delay_remaining: remaining,
                };
                return;
            }
            self.begin_intro_fade(doc);
            // Only the part of the frame past the delay counts toward the fade.
            dt = -remaining;
        }

        for cue in self.tweens.advance(dt, doc) {
            match cue {
                Cue::IntroFaded => self.reveal_grid(doc),
            }
        }
    }

    fn begin_intro_fade<D: Document>(&mut self, doc: &mut D) {
        self.phase = Phase::FadingIntro;
        self.tweens.to(
            doc,
            self.intro,
            &[(Property::Opacity, 1.0)],
            self.params.intro_fade,
            Ease::default(),
            Some(Cue::IntroFaded),
        );
        tracing::debug!("intro fade started");
    }

    fn reveal_grid<D: Document>(&mut self, doc: &mut D) {
        doc.set_hidden(self.intro, true);
        doc.set_hidden(self.grid, false);
        self.tweens.to(
            doc,
            self.grid,
            &[(Property::Opacity, self.params.grid_opacity)],
            self.params.grid_fade,
            Ease::default(),
            None,
        );
        self.phase = Phase::Revealed;
        tracing::debug!("product grid revealed");
    }

    /// Route a pointer event from the stage.
    pub fn handle_pointer<D: Document>(&mut self, doc: &mut D, event: PointerEvent) {
        match event {
            PointerEvent::Enter(id) => self.pointer_enter(doc, id),
            PointerEvent::Leave(id) => self.pointer_leave(doc, id),
        }
    }

    /// Lift and enlarge the item under the pointer.
    pub fn pointer_enter<D: Document>(&mut self, doc: &mut D, id: ElementId) {
        let Some(product) = self.product(id) else {
            return;
        };
        if self.phase != Phase::Revealed {
            return;
        }
        let p = &self.params;
        self.tweens.to(
            doc,
            product.item,
            &shadow_tracks(p.hover_scale, p.hover_lift, HOVER_SHADOW),
            p.hover_duration,
            HOVER_EASE,
            None,
        );
        self.tweens.to(
            doc,
            product.image,
            &[(Property::Scale, p.hover_image_scale)],
            p.hover_duration,
            SETTLE_EASE,
            None,
        );
    }

    /// Ease the item back to rest.
    pub fn pointer_leave<D: Document>(&mut self, doc: &mut D, id: ElementId) {
        let Some(product) = self.product(id) else {
            return;
        };
        if self.phase != Phase::Revealed {
            return;
        }
        let duration = self.params.hover_duration;
        self.tweens.to(
            doc,
            product.item,
            &shadow_tracks(1.0, 0.0, REST_SHADOW),
            duration,
            SETTLE_EASE,
            None,
        );
        self.tweens.to(
            doc,
            product.image,
            &[(Property::Scale, 1.0)],
            duration,
            SETTLE_EASE,
            None,
        );
    }

    fn product(&self, item: ElementId) -> Option<ProductItem> {
        self.items.iter().copied().find(|p| p.item == item)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn items(&self) -> &[ProductItem] {
        &self.items
    }

    pub fn intro(&self) -> ElementId {
        self.intro
    }

    pub fn grid(&self) -> ElementId {
        self.grid
    }

    /// Whether `id` has a tween in flight.
    pub fn is_animating(&self, id: ElementId) -> bool {
        self.tweens.is_animating(id)
    }
}

fn shadow_tracks(scale: f32, lift: f32, shadow: BoxShadow) -> [(Property, f32); 5] {
    [
        (Property::Scale, scale),
        (Property::TranslateY, lift),
        (Property::ShadowOffsetY, shadow.offset_y),
        (Property::ShadowBlur, shadow.blur),
        (Property::ShadowAlpha, shadow.alpha),
    ]
}

/// Style the grid container and append one item per product.
fn build_product_grid<D: Document>(
    doc: &mut D,
    grid: ElementId,
    params: &ProductGridParams,
) -> Vec<ProductItem> {
    doc.set_style(
        grid,
        &[
            StyleProperty::GridColumns(params.columns),
            StyleProperty::Gap(params.spacing),
        ],
    );

    (1..=params.item_count)
        .map(|i| {
            let item = doc.create_element(ElementKind::Item);
            doc.set_style(
                item,
                &[
                    StyleProperty::Width(params.item_size),
                    StyleProperty::Height(params.item_size),
                    StyleProperty::Shadow(REST_SHADOW),
                ],
            );

            let image = doc.create_element(ElementKind::Image);
            doc.set_image(
                image,
                ImageSource {
                    src: format!("product{i}.png"),
                    alt: format!("Product {i}"),
                },
            );
            doc.append_child(item, image);
            doc.append_child(grid, item);

            doc.register_pointer_handlers(item);
            ProductItem { item, image }
        })
        .collect()
}
