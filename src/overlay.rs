//! Egui painter for the stage.
//!
//! Draws the welcome screen while it is shown and the product grid once it
//! is revealed. Item cards follow their animated style: scaled about their
//! center, lifted by `translate_y`, cast a soft shadow, and clip their zoomed
//! image. Element and container opacity multiply.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::LandingConfig;
use crate::images::{self, ProductImage};
use crate::stage::{BoxShadow, Document, ElementId, Rect, Stage, Style, PRODUCT_GRID, WELCOME_SCREEN};

/// Corner radius of item cards in points.
const CARD_RADIUS: f32 = 8.0;

/// Rings used to approximate a blurred shadow.
const SHADOW_STEPS: usize = 6;

const TITLE_SIZE: f32 = 56.0;
const SUBTITLE_SIZE: f32 = 18.0;

/// Paints the intro overlay and product grid with egui.
pub struct Overlay {
    title: String,
    assets_dir: PathBuf,
    textures: HashMap<String, egui::TextureHandle>,
}

impl Overlay {
    pub fn new(config: &LandingConfig) -> Self {
        Self {
            title: config.window.title.clone(),
            assets_dir: config.assets.dir.clone(),
            textures: HashMap::new(),
        }
    }

    /// Paint the stage behind every egui window.
    pub fn paint(&mut self, ctx: &egui::Context, stage: &Stage) {
        self.ensure_textures(ctx, stage);

        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Background,
            egui::Id::new("glassfall-stage"),
        ));

        if let Some(intro) = stage.element_by_name(WELCOME_SCREEN) {
            if !stage.is_hidden(intro) {
                self.paint_intro(&painter, stage, intro);
            }
        }
        if let Some(grid) = stage.element_by_name(PRODUCT_GRID) {
            if !stage.is_hidden(grid) {
                self.paint_grid(&painter, stage, grid);
            }
        }
    }

    /// Decode any product image not yet uploaded to egui.
    fn ensure_textures(&mut self, ctx: &egui::Context, stage: &Stage) {
        let Some(grid) = stage.element_by_name(PRODUCT_GRID) else {
            return;
        };
        let missing: Vec<String> = image_sources(stage, grid)
            .into_iter()
            .filter(|src| !self.textures.contains_key(src))
            .collect();
        if missing.is_empty() {
            return;
        }

        for (src, image) in images::load_all(&self.assets_dir, missing.iter().map(String::as_str)) {
            let handle = ctx.load_texture(src.clone(), color_image(&image), egui::TextureOptions::LINEAR);
            self.textures.insert(src, handle);
        }
        tracing::debug!(textures = self.textures.len(), "product textures uploaded");
    }

    fn paint_intro(&self, painter: &egui::Painter, stage: &Stage, intro: ElementId) {
        let opacity = stage.style(intro).opacity.clamp(0.0, 1.0);
        if opacity <= 0.0 {
            return;
        }
        let viewport = stage.viewport();
        let center = egui::pos2(viewport.width * 0.5, viewport.height * 0.5);

        painter.text(
            center,
            egui::Align2::CENTER_CENTER,
            &self.title,
            egui::FontId::proportional(TITLE_SIZE),
            egui::Color32::from_white_alpha(alpha(opacity)),
        );
        painter.text(
            center + egui::vec2(0.0, TITLE_SIZE),
            egui::Align2::CENTER_CENTER,
            "Welcome",
            egui::FontId::proportional(SUBTITLE_SIZE),
            egui::Color32::from_white_alpha(alpha(opacity * 0.7)),
        );
    }

    fn paint_grid(&self, painter: &egui::Painter, stage: &Stage, grid: ElementId) {
        let grid_opacity = stage.style(grid).opacity.clamp(0.0, 1.0);
        if grid_opacity <= 0.0 {
            return;
        }

        for (item, cell) in stage.grid_cells(grid) {
            let element = stage.element(item);
            if element.hidden {
                continue;
            }
            let style = &element.style;
            let opacity = grid_opacity * style.opacity.clamp(0.0, 1.0);
            let card = to_egui(transformed_rect(cell, style));

            paint_shadow(painter, card, style.shadow, opacity);
            painter.rect_filled(
                card,
                CARD_RADIUS,
                egui::Color32::from_white_alpha(alpha(opacity * 0.08)),
            );

            for &child in &element.children {
                let image = stage.element(child);
                let Some(source) = &image.image else {
                    continue;
                };
                let Some(texture) = self.textures.get(&source.src) else {
                    continue;
                };
                let rect = to_egui(scaled_rect(
                    transformed_rect(cell, style),
                    image.style.scale,
                ));
                painter.with_clip_rect(card).image(
                    texture.id(),
                    rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::from_white_alpha(alpha(opacity * image.style.opacity)),
                );
            }
        }
    }
}

/// `cell` scaled about its center by `style.scale`, then moved by
/// `style.translate_y`.
pub fn transformed_rect(cell: Rect, style: &Style) -> Rect {
    let mut rect = scaled_rect(cell, style.scale);
    rect.y += style.translate_y;
    rect
}

/// `rect` scaled about its center.
pub fn scaled_rect(rect: Rect, scale: f32) -> Rect {
    let (cx, cy) = rect.center();
    let width = rect.width * scale;
    let height = rect.height * scale;
    Rect {
        x: cx - width * 0.5,
        y: cy - height * 0.5,
        width,
        height,
    }
}

/// Stacked rings, widest and faintest first, standing in for a blur.
fn paint_shadow(painter: &egui::Painter, card: egui::Rect, shadow: BoxShadow, opacity: f32) {
    if shadow.alpha <= 0.0 || opacity <= 0.0 {
        return;
    }
    let base = card.translate(egui::vec2(0.0, shadow.offset_y));
    let ring_alpha = shadow.alpha * opacity / SHADOW_STEPS as f32;
    for step in (0..SHADOW_STEPS).rev() {
        let spread = shadow.blur * 0.5 * step as f32 / SHADOW_STEPS as f32;
        painter.rect_filled(
            base.expand(spread),
            CARD_RADIUS + spread,
            egui::Color32::from_black_alpha(alpha(ring_alpha)),
        );
    }
}

fn image_sources(stage: &Stage, grid: ElementId) -> Vec<String> {
    stage
        .element(grid)
        .children
        .iter()
        .flat_map(|&item| stage.element(item).children.iter())
        .filter_map(|&child| stage.element(child).image.as_ref())
        .map(|image| image.src.clone())
        .collect()
}

fn color_image(image: &ProductImage) -> egui::ColorImage {
    egui::ColorImage::from_rgba_unmultiplied(
        [image.width as usize, image.height as usize],
        &image.data,
    )
}

fn alpha(opacity: f32) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn to_egui(rect: Rect) -> egui::Rect {
    egui::Rect::from_min_size(
        egui::pos2(rect.x, rect.y),
        egui::vec2(rect.width, rect.height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::Presentation;
    use crate::viewport::Viewport;

    fn cell() -> Rect {
        Rect {
            x: 100.0,
            y: 100.0,
            width: 200.0,
            height: 200.0,
        }
    }

    #[test]
    fn test_rest_style_is_identity() {
        assert_eq!(transformed_rect(cell(), &Style::default()), cell());
    }

    #[test]
    fn test_scale_keeps_center() {
        let style = Style {
            scale: 1.1,
            ..Style::default()
        };
        let rect = transformed_rect(cell(), &style);
        assert_eq!(rect.center(), cell().center());
        assert!((rect.width - 220.0).abs() < 1e-4);
    }

    #[test]
    fn test_lift_moves_up() {
        let style = Style {
            translate_y: -10.0,
            ..Style::default()
        };
        let rect = transformed_rect(cell(), &style);
        assert_eq!(rect.y, 90.0);
        assert_eq!(rect.x, 100.0);
    }

    #[test]
    fn test_alpha() {
        assert_eq!(alpha(0.0), 0);
        assert_eq!(alpha(1.0), 255);
        assert_eq!(alpha(2.0), 255);
        assert_eq!(alpha(-1.0), 0);
    }

    #[test]
    fn test_image_sources_in_item_order() {
        let mut stage = Stage::landing_page(Viewport::new(1920.0, 1080.0));
        let presentation = Presentation::start(&mut stage, &LandingConfig::default()).unwrap();
        let sources = image_sources(&stage, presentation.grid());
        assert_eq!(sources.len(), 12);
        assert_eq!(sources[0], "product1.png");
        assert_eq!(sources[11], "product12.png");
    }

    #[test]
    fn test_paint_runs_headless() {
        let mut config = LandingConfig::default();
        config.assets.dir = PathBuf::from("no-such-assets");
        let mut stage = Stage::landing_page(Viewport::new(1280.0, 720.0));
        let mut presentation = Presentation::start(&mut stage, &config).unwrap();
        for _ in 0..150 {
            presentation.update(1.0 / 60.0, &mut stage);
        }

        let mut overlay = Overlay::new(&config);
        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| overlay.paint(ctx, &stage));
        assert_eq!(overlay.textures.len(), 12);
    }
}
