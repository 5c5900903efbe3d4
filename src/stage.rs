//! The page the presentation runs on.
//!
//! [`Stage`] is a small retained element tree: a full-screen intro overlay,
//! the product grid container, and whatever items the presentation appends.
//! Elements carry a `hidden` flag, a [`Style`] the tweens animate, an optional
//! image, and whether they receive pointer enter/leave events. The overlay
//! painter draws it; [`Stage::pointer_moved`] turns cursor motion into
//! [`PointerEvent`]s by hit-testing the grid layout.
//!
//! The presentation only talks to it through the [`Document`] trait.

use crate::tween::{Animatable, Property};
use crate::viewport::Viewport;

/// Name of the intro overlay element.
pub const WELCOME_SCREEN: &str = "welcome-screen";

/// Name of the product grid container.
pub const PRODUCT_GRID: &str = "product-grid";

/// Handle to a stage element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Full-screen overlay.
    Overlay,
    /// Container laying its children out in a grid.
    Grid,
    /// Grid cell.
    Item,
    /// Image filling its parent.
    Image,
}

/// Drop shadow below an element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxShadow {
    /// Vertical offset in pixels.
    pub offset_y: f32,
    /// Blur radius in pixels.
    pub blur: f32,
    /// Shadow opacity (black).
    pub alpha: f32,
}

impl BoxShadow {
    pub const NONE: Self = Self {
        offset_y: 0.0,
        blur: 0.0,
        alpha: 0.0,
    };
}

/// Visual state of an element.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub opacity: f32,
    pub scale: f32,
    /// Vertical offset in pixels, negative is up.
    pub translate_y: f32,
    pub shadow: BoxShadow,
    pub width: Option<f32>,
    pub height: Option<f32>,
    /// Column count for grid containers.
    pub grid_columns: Option<u32>,
    /// Gap between grid cells in pixels.
    pub gap: Option<f32>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            scale: 1.0,
            translate_y: 0.0,
            shadow: BoxShadow::NONE,
            width: None,
            height: None,
            grid_columns: None,
            gap: None,
        }
    }
}

/// A single style assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StyleProperty {
    Opacity(f32),
    Scale(f32),
    TranslateY(f32),
    Shadow(BoxShadow),
    Width(f32),
    Height(f32),
    GridColumns(u32),
    Gap(f32),
}

/// Image shown by an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone)]
pub struct Element {
    pub name: Option<String>,
    pub kind: ElementKind,
    pub hidden: bool,
    pub style: Style,
    pub children: Vec<ElementId>,
    pub image: Option<ImageSource>,
    pub pointer_tracked: bool,
}

impl Element {
    fn new(kind: ElementKind) -> Self {
        Self {
            name: None,
            kind,
            hidden: false,
            style: Style::default(),
            children: Vec::new(),
            image: None,
            pointer_tracked: false,
        }
    }
}

/// Pointer transitions delivered to tracked elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Enter(ElementId),
    Leave(ElementId),
}

/// Axis-aligned rectangle in logical pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}

/// Space kept clear between a shrunk grid and the viewport edge.
pub const GRID_MARGIN: f32 = 20.0;

/// Lay out `count` cells row-major in a grid centered in `viewport`.
///
/// A grid larger than the viewport (less [`GRID_MARGIN`] on each side) has
/// its cells and gaps scaled down uniformly until it fits; the window cannot
/// scroll, so nothing may fall outside it.
pub fn grid_layout(
    columns: u32,
    gap: f32,
    cell: (f32, f32),
    count: usize,
    viewport: Viewport,
) -> Vec<Rect> {
    if count == 0 || columns == 0 {
        return Vec::new();
    }
    let columns = columns as usize;
    let used_columns = columns.min(count);
    let rows = count.div_ceil(columns);

    let span = |n: usize, size: f32, gap: f32| n as f32 * size + (n - 1) as f32 * gap;
    let fit = if viewport.is_visible() {
        let room_w = (viewport.width - 2.0 * GRID_MARGIN).max(1.0);
        let room_h = (viewport.height - 2.0 * GRID_MARGIN).max(1.0);
        (room_w / span(used_columns, cell.0, gap))
            .min(room_h / span(rows, cell.1, gap))
            .min(1.0)
    } else {
        1.0
    };
    let (w, h) = (cell.0 * fit, cell.1 * fit);
    let gap = gap * fit;

    let total_w = span(used_columns, w, gap);
    let total_h = span(rows, h, gap);
    let origin_x = (viewport.width - total_w) * 0.5;
    let origin_y = (viewport.height - total_h) * 0.5;

    (0..count)
        .map(|i| Rect {
            x: origin_x + (i % columns) as f32 * (w + gap),
            y: origin_y + (i / columns) as f32 * (h + gap),
            width: w,
            height: h,
        })
        .collect()
}

/// Capabilities the presentation needs from its page.
pub trait Document: Animatable {
    fn element_by_name(&self, name: &str) -> Option<ElementId>;
    fn create_element(&mut self, kind: ElementKind) -> ElementId;
    fn append_child(&mut self, parent: ElementId, child: ElementId);
    fn set_hidden(&mut self, id: ElementId, hidden: bool);
    fn is_hidden(&self, id: ElementId) -> bool;
    fn set_style(&mut self, id: ElementId, properties: &[StyleProperty]);
    fn style(&self, id: ElementId) -> &Style;
    fn set_image(&mut self, id: ElementId, image: ImageSource);
    /// Start delivering pointer enter/leave events for `id`.
    fn register_pointer_handlers(&mut self, id: ElementId);
}

/// Retained element tree with pointer hit testing.
#[derive(Debug, Clone)]
pub struct Stage {
    elements: Vec<Element>,
    viewport: Viewport,
    hovered: Option<ElementId>,
}

impl Stage {
    /// An empty stage.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            elements: Vec::new(),
            viewport,
            hovered: None,
        }
    }

    /// The landing page: a transparent intro overlay and a hidden,
    /// transparent product grid.
    pub fn landing_page(viewport: Viewport) -> Self {
        let mut stage = Self::new(viewport);

        let intro = stage.create_named(ElementKind::Overlay, WELCOME_SCREEN);
        stage.elements[intro.0].style.opacity = 0.0;

        let grid = stage.create_named(ElementKind::Grid, PRODUCT_GRID);
        stage.elements[grid.0].style.opacity = 0.0;
        stage.elements[grid.0].hidden = true;

        stage
    }

    /// Create an element reachable through [`Document::element_by_name`].
    pub fn create_named(&mut self, kind: ElementKind, name: &str) -> ElementId {
        let id = self.create_element(kind);
        self.elements[id.0].name = Some(name.to_string());
        id
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Element currently under the pointer, if it is tracked.
    pub fn hovered(&self) -> Option<ElementId> {
        self.hovered
    }

    /// Cell rectangles of `grid`'s item children.
    pub fn grid_cells(&self, grid: ElementId) -> Vec<(ElementId, Rect)> {
        let container = &self.elements[grid.0];
        let items: Vec<ElementId> = container
            .children
            .iter()
            .copied()
            .filter(|c| self.elements[c.0].kind == ElementKind::Item)
            .collect();
        let Some(&first) = items.first() else {
            return Vec::new();
        };

        let first_style = &self.elements[first.0].style;
        let cell = (
            first_style.width.unwrap_or(0.0),
            first_style.height.unwrap_or(0.0),
        );
        let columns = container.style.grid_columns.unwrap_or(1);
        let gap = container.style.gap.unwrap_or(0.0);

        items
            .iter()
            .copied()
            .zip(grid_layout(columns, gap, cell, items.len(), self.viewport))
            .collect()
    }

    /// Grid containers currently shown.
    fn visible_grids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.kind == ElementKind::Grid && !e.hidden)
            .map(|(i, _)| ElementId(i))
    }

    /// Move the pointer to `(x, y)` in logical pixels.
    pub fn pointer_moved(&mut self, x: f32, y: f32) -> Vec<PointerEvent> {
        let under = self
            .visible_grids()
            .flat_map(|grid| self.grid_cells(grid))
            .find(|(id, rect)| self.elements[id.0].pointer_tracked && rect.contains(x, y))
            .map(|(id, _)| id);
        self.hover(under)
    }

    /// The pointer left the window.
    pub fn pointer_left(&mut self) -> Vec<PointerEvent> {
        self.hover(None)
    }

    fn hover(&mut self, under: Option<ElementId>) -> Vec<PointerEvent> {
        if under == self.hovered {
            return Vec::new();
        }
        let mut events = Vec::with_capacity(2);
        if let Some(previous) = self.hovered {
            events.push(PointerEvent::Leave(previous));
        }
        if let Some(next) = under {
            events.push(PointerEvent::Enter(next));
        }
        self.hovered = under;
        events
    }
}

impl Document for Stage {
    fn element_by_name(&self, name: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .position(|e| e.name.as_deref() == Some(name))
            .map(ElementId)
    }

    fn create_element(&mut self, kind: ElementKind) -> ElementId {
        self.elements.push(Element::new(kind));
        ElementId(self.elements.len() - 1)
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) {
        let children = &mut self.elements[parent.0].children;
        if !children.contains(&child) {
            children.push(child);
        }
    }

    fn set_hidden(&mut self, id: ElementId, hidden: bool) {
        self.elements[id.0].hidden = hidden;
    }

    fn is_hidden(&self, id: ElementId) -> bool {
        self.elements[id.0].hidden
    }

    fn set_style(&mut self, id: ElementId, properties: &[StyleProperty]) {
        let style = &mut self.elements[id.0].style;
        for property in properties {
            match *property {
                StyleProperty::Opacity(v) => style.opacity = v,
                StyleProperty::Scale(v) => style.scale = v,
                StyleProperty::TranslateY(v) => style.translate_y = v,
                StyleProperty::Shadow(v) => style.shadow = v,
                StyleProperty::Width(v) => style.width = Some(v),
                StyleProperty::Height(v) => style.height = Some(v),
                StyleProperty::GridColumns(v) => style.grid_columns = Some(v),
                StyleProperty::Gap(v) => style.gap = Some(v),
            }
        }
    }

    fn style(&self, id: ElementId) -> &Style {
        &self.elements[id.0].style
    }

    fn set_image(&mut self, id: ElementId, image: ImageSource) {
        self.elements[id.0].image = Some(image);
    }

    fn register_pointer_handlers(&mut self, id: ElementId) {
        self.elements[id.0].pointer_tracked = true;
    }
}

impl Animatable for Stage {
    fn property(&self, target: ElementId, property: Property) -> f32 {
        let style = &self.elements[target.0].style;
        match property {
            Property::Opacity => style.opacity,
            Property::Scale => style.scale,
            Property::TranslateY => style.translate_y,
            Property::ShadowOffsetY => style.shadow.offset_y,
            Property::ShadowBlur => style.shadow.blur,
            Property::ShadowAlpha => style.shadow.alpha,
        }
    }

    fn set_property(&mut self, target: ElementId, property: Property, value: f32) {
        let style = &mut self.elements[target.0].style;
        match property {
            Property::Opacity => style.opacity = value,
            Property::Scale => style.scale = value,
            Property::TranslateY => style.translate_y = value,
            Property::ShadowOffsetY => style.shadow.offset_y = value,
            Property::ShadowBlur => style.shadow.blur = value,
            Property::ShadowAlpha => style.shadow.alpha = value,
        }
    }
}
