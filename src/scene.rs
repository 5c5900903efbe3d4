//! Scene composition: camera, lights, and the layered glass panel.
//!
//! The panel is three layers sharing one unit-plane geometry:
//!
//! | Layer | Depth | Scale | Blending |
//! |-------|-------|-------|----------|
//! | Glass | `z = 10` | panel size | alpha |
//! | Edge outline | `z = 11.1` | panel size | alpha |
//! | Rim glow | `z = 11.1` | 1.1 x panel size | additive, front faces only |
//!
//! Panel size is `8.5 * 0.01 * viewport`. [`Scene::on_resize`] recomputes it
//! and rescales all three layers together, so the outline and glow always
//! track the glass.

use glam::{Mat4, Vec3};

use crate::camera::Camera;
use crate::config::{hex_to_rgb, GlassParams, GlowingEdgesParams, LandingConfig};
use crate::viewport::Viewport;

/// Panel size relative to the viewport, before [`PANEL_UNIT_SCALE`].
pub const PANEL_FACTOR: f32 = 8.5;

/// Pixel to world conversion applied to the panel size.
pub const PANEL_UNIT_SCALE: f32 = 0.01;

/// Depth of the glass panel.
pub const PANEL_DEPTH: f32 = 10.0;

/// Depth of the edge outline and rim glow.
pub const OVERLAY_DEPTH: f32 = 11.1;

/// Rim glow size relative to the panel.
pub const GLOW_SCALE: f32 = 1.1;

/// Constant `k` in the rim falloff `(k - dot(n, v))^4`.
pub const RIM_BIAS: f32 = 0.7;

/// A triangle-mesh vertex with its normal.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Indexed triangle geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneGeometry {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u16>,
}

impl PlaneGeometry {
    /// A 1x1 plane centered on the origin, facing +Z.
    pub fn unit() -> Self {
        let normal = [0.0, 0.0, 1.0];
        let corners = [[-0.5, -0.5], [0.5, -0.5], [0.5, 0.5], [-0.5, 0.5]];
        Self {
            vertices: corners
                .iter()
                .map(|&[x, y]| MeshVertex {
                    position: [x, y, 0.0],
                    normal,
                })
                .collect(),
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    /// Line segments along the mesh boundary.
    ///
    /// An edge is on the boundary when exactly one triangle uses it, so the
    /// diagonal shared by the plane's two triangles is left out. Returns a
    /// flat list of segment endpoints (two per edge).
    pub fn boundary_edges(&self) -> Vec<[f32; 3]> {
        let mut edges: Vec<((u16, u16), u32)> = Vec::new();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = (a.min(b), a.max(b));
                match edges.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, uses)) => *uses += 1,
                    None => edges.push((key, 1)),
                }
            }
        }

        edges
            .into_iter()
            .filter(|&(_, uses)| uses == 1)
            .flat_map(|((a, b), _)| {
                [
                    self.vertices[a as usize].position,
                    self.vertices[b as usize].position,
                ]
            })
            .collect()
    }
}

/// Uniform light from every direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

/// Omnidirectional light at a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
}

/// Translation plus non-uniform scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, glam::Quat::IDENTITY, self.translation)
    }

    /// Inverse-transpose of [`matrix`](Self::matrix), for transforming normals.
    pub fn normal_matrix(&self) -> Mat4 {
        self.matrix().inverse().transpose()
    }
}

/// The translucent glass surface.
#[derive(Debug, Clone, PartialEq)]
pub struct GlassLayer {
    pub transform: Transform,
    pub color: Vec3,
    pub opacity: f32,
    pub roughness: f32,
    pub metalness: f32,
}

/// Outline drawn from the panel boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLayer {
    pub transform: Transform,
    /// Segment endpoints in panel-local space.
    pub segments: Vec<[f32; 3]>,
    pub color: Vec3,
    pub opacity: f32,
    /// Requested line width. Rasterized width is device-dependent.
    pub linewidth: f32,
}

/// View-dependent rim brightening over the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct GlowLayer {
    pub transform: Transform,
    pub color: Vec3,
    pub intensity: f32,
    pub rim_bias: f32,
}

/// Rim glow intensity for a surface normal seen along `view_axis`.
///
/// `(k - dot(normal, view_axis))^4`; both vectors are expected normalized.
pub fn rim_intensity(normal: Vec3, view_axis: Vec3, k: f32) -> f32 {
    let f = k - normal.dot(view_axis);
    f * f * f * f
}

/// Everything the renderer draws besides the particles.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub camera: Camera,
    pub ambient: AmbientLight,
    pub point_light: PointLight,
    pub geometry: PlaneGeometry,
    pub glass: GlassLayer,
    pub edges: EdgeLayer,
    pub glow: GlowLayer,
    viewport: Viewport,
}

impl Scene {
    /// Compose the scene for the current viewport.
    pub fn build(viewport: Viewport, config: &LandingConfig) -> Self {
        let geometry = PlaneGeometry::unit();
        let size = panel_scale(viewport);

        let GlassParams {
            color,
            opacity,
            roughness,
            metalness,
        } = config.glass;
        let glass = GlassLayer {
            transform: Transform {
                translation: Vec3::new(0.0, 0.0, PANEL_DEPTH),
                scale: size,
            },
            color: hex_to_rgb(color),
            opacity,
            roughness,
            metalness,
        };

        let GlowingEdgesParams {
            color: edge_color,
            opacity: edge_opacity,
            linewidth,
            glow_intensity,
        } = config.glowing_edges;
        let edges = EdgeLayer {
            transform: Transform {
                translation: Vec3::new(0.0, 0.0, OVERLAY_DEPTH),
                scale: size,
            },
            segments: geometry.boundary_edges(),
            color: hex_to_rgb(edge_color),
            opacity: edge_opacity,
            linewidth,
        };

        let glow = GlowLayer {
            transform: Transform {
                translation: Vec3::new(0.0, 0.0, OVERLAY_DEPTH),
                scale: glow_scale(size),
            },
            color: hex_to_rgb(edge_color),
            intensity: glow_intensity,
            rim_bias: RIM_BIAS,
        };

        Self {
            camera: Camera::new(viewport.aspect()),
            ambient: AmbientLight {
                color: Vec3::ONE,
                intensity: 0.5,
            },
            point_light: PointLight {
                color: Vec3::ONE,
                intensity: 1.0,
                position: Vec3::new(5.0, 5.0, 5.0),
            },
            geometry,
            glass,
            edges,
            glow,
            viewport,
        }
    }

    /// Track a new viewport size: camera aspect and all panel layers.
    ///
    /// Collapsed viewports are ignored so the last visible layout survives a
    /// minimize.
    pub fn on_resize(&mut self, viewport: Viewport) {
        if !viewport.is_visible() {
            return;
        }
        self.viewport = viewport;
        self.camera.aspect = viewport.aspect();

        let size = panel_scale(viewport);
        self.glass.transform.scale = size;
        self.edges.transform.scale = size;
        self.glow.transform.scale = glow_scale(size);

        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            "scene resized"
        );
    }

    /// Viewport the scene was last laid out for.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}

/// Panel world size for a viewport.
fn panel_scale(viewport: Viewport) -> Vec3 {
    Vec3::new(
        viewport.width * PANEL_FACTOR * PANEL_UNIT_SCALE,
        viewport.height * PANEL_FACTOR * PANEL_UNIT_SCALE,
        1.0,
    )
}

fn glow_scale(panel: Vec3) -> Vec3 {
    Vec3::new(panel.x * GLOW_SCALE, panel.y * GLOW_SCALE, GLOW_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(w: f32, h: f32) -> Scene {
        Scene::build(Viewport::new(w, h), &LandingConfig::default())
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-4
    }

    #[test]
    fn test_panel_size_follows_viewport() {
        let scene = scene(1000.0, 800.0);
        assert!(approx(scene.glass.transform.scale, Vec3::new(85.0, 68.0, 1.0)));
        assert_eq!(scene.glass.transform.translation.z, PANEL_DEPTH);
    }

    #[test]
    fn test_layers_track_panel() {
        let scene = scene(1280.0, 720.0);
        let panel = scene.glass.transform.scale;
        assert_eq!(scene.edges.transform.scale, panel);
        assert!(approx(
            scene.glow.transform.scale,
            Vec3::new(panel.x * 1.1, panel.y * 1.1, 1.1)
        ));
        assert_eq!(scene.edges.transform.translation.z, OVERLAY_DEPTH);
        assert_eq!(scene.glow.transform.translation.z, OVERLAY_DEPTH);
    }

    #[test]
    fn test_lights_are_fixed() {
        let scene = scene(800.0, 600.0);
        assert_eq!(scene.ambient.intensity, 0.5);
        assert_eq!(scene.point_light.intensity, 1.0);
        assert_eq!(scene.point_light.position, Vec3::new(5.0, 5.0, 5.0));
    }

    #[test]
    fn test_resize_rescales_all_layers() {
        let mut scene = scene(800.0, 600.0);
        scene.on_resize(Viewport::new(1600.0, 900.0));

        let expected = Vec3::new(1600.0 * 0.085, 900.0 * 0.085, 1.0);
        assert!(approx(scene.glass.transform.scale, expected));
        assert_eq!(scene.edges.transform.scale, scene.glass.transform.scale);
        assert!(approx(scene.glow.transform.scale, glow_scale(expected)));
        assert_eq!(scene.camera.aspect, 1600.0 / 900.0);
    }

    #[test]
    fn test_resize_is_idempotent() {
        let mut once = scene(800.0, 600.0);
        once.on_resize(Viewport::new(1024.0, 768.0));

        let mut twice = once.clone();
        twice.on_resize(Viewport::new(1024.0, 768.0));

        assert_eq!(once, twice);
    }

    #[test]
    fn test_resize_to_build_size_matches_build() {
        let built = scene(1024.0, 768.0);
        let mut resized = scene(640.0, 480.0);
        resized.on_resize(Viewport::new(1024.0, 768.0));
        assert_eq!(built, resized);
    }

    #[test]
    fn test_collapsed_viewport_ignored() {
        let mut scene = scene(800.0, 600.0);
        let before = scene.clone();
        scene.on_resize(Viewport::new(0.0, 0.0));
        assert_eq!(scene, before);
    }

    #[test]
    fn test_boundary_edges_skip_diagonal() {
        let edges = PlaneGeometry::unit().boundary_edges();
        assert_eq!(edges.len(), 8);

        for pair in edges.chunks_exact(2) {
            let (a, b) = (Vec3::from(pair[0]), Vec3::from(pair[1]));
            // Boundary edges of an axis-aligned square are axis-aligned.
            let d = (a - b).abs();
            assert!(d.x == 0.0 || d.y == 0.0, "diagonal edge {a} -> {b}");
        }
    }

    #[test]
    fn test_rim_intensity() {
        // Facing the viewer: (0.7 - 1)^4
        let facing = rim_intensity(Vec3::Z, Vec3::Z, RIM_BIAS);
        assert!((facing - 0.0081).abs() < 1e-6);

        // Grazing: (0.7 - 0)^4, much brighter.
        let grazing = rim_intensity(Vec3::X, Vec3::Z, RIM_BIAS);
        assert!((grazing - 0.2401).abs() < 1e-6);
        assert!(grazing > facing);
    }

    #[test]
    fn test_edge_params_from_config() {
        let scene = scene(800.0, 600.0);
        assert_eq!(scene.edges.color, Vec3::ONE);
        assert_eq!(scene.edges.opacity, 0.5);
        assert_eq!(scene.edges.linewidth, 100.0);
        assert_eq!(scene.glow.intensity, 0.1);
    }
}
