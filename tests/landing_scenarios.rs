//! End-to-end scenarios for the landing scene without a window.
//!
//! These drive the particle field, scene, render loop and presentation the
//! way the event loop does, with a recording frame target in place of the GPU.

use glassfall::config::LandingConfig;
use glassfall::render_loop::{FrameStatus, FrameTarget, RenderLoop};
use glassfall::scene::Scene;
use glassfall::stage::{grid_layout, Document, PointerEvent, Stage, PRODUCT_GRID};
use glassfall::{LandingContext, ParticleField, Phase, Presentation, Vec3, Viewport};

const DT: f32 = 1.0 / 60.0;

fn run_presentation(stage: &mut Stage, presentation: &mut Presentation, seconds: f32) {
    let frames = (seconds / DT).ceil() as usize;
    for _ in 0..frames {
        presentation.update(DT, stage);
    }
}

// ============================================================================
// Particle field
// ============================================================================

#[test]
fn test_recycled_particles_restart_at_reset_height() {
    let viewport = Viewport::new(100.0, 100.0);
    let mut field = ParticleField::with_seed(4, viewport, Vec3::ONE, 42);
    let mut previous: Vec<f32> = (0..4).map(|i| field.position(i).y).collect();
    let mut recycled = 0;

    for _ in 0..1_000 {
        field.tick();
        for (i, prev) in previous.iter_mut().enumerate() {
            let p = field.position(i);
            if p.y > *prev {
                assert_eq!(p.y, 5.0);
                assert!(*prev - 0.05 < -5.0);
                recycled += 1;
            } else {
                assert!((*prev - p.y - 0.05).abs() < 1e-4);
            }
            assert!(p.x.abs() <= 5.0);
            assert!(p.z.abs() <= 25.0);
            *prev = p.y;
        }
    }

    assert!(recycled >= 4, "only {recycled} recycles");
}

#[test]
fn test_full_field_stays_in_bounds() {
    let viewport = Viewport::new(1920.0, 1080.0);
    let mut field = ParticleField::with_seed(50_000, viewport, Vec3::ONE, 7);
    let bounds = field.bounds();

    for _ in 0..10 {
        field.tick();
    }
    for i in 0..field.len() {
        let p = field.position(i);
        assert!(p.x.abs() <= bounds.half_width);
        assert!(p.z.abs() <= bounds.half_depth);
        assert!(p.y >= bounds.floor && p.y <= bounds.top);
    }
}

// ============================================================================
// Scene and render loop
// ============================================================================

#[derive(Default)]
struct Recorder {
    uploads: usize,
    draws: usize,
    last_glass_scale: Option<Vec3>,
}

impl FrameTarget for Recorder {
    type Error = std::convert::Infallible;

    fn upload_positions(&mut self, _positions: &[f32]) {
        self.uploads += 1;
    }

    fn draw(&mut self, scene: &Scene) -> Result<(), Self::Error> {
        self.draws += 1;
        self.last_glass_scale = Some(scene.glass.transform.scale);
        Ok(())
    }
}

#[test]
fn test_resize_between_frames() {
    let mut config = LandingConfig::default();
    config.particles.count = 100;
    config.particles.seed = Some(1);
    let mut ctx = LandingContext::new(Viewport::new(800.0, 600.0), &config);
    let mut target = Recorder::default();
    let mut render_loop = RenderLoop::new();

    render_loop.frame(&mut ctx, &mut target).unwrap();
    ctx.resize(Viewport::new(1600.0, 900.0));
    ctx.resize(Viewport::new(1600.0, 900.0));
    render_loop.frame(&mut ctx, &mut target).unwrap();

    let scale = target.last_glass_scale.unwrap();
    assert!((scale.x - 1600.0 * 0.085).abs() < 1e-3);
    assert!((scale.y - 900.0 * 0.085).abs() < 1e-3);
    assert_eq!(ctx.scene.edges.transform.scale, scale);
    assert_eq!(target.uploads, 2);
}

#[test]
fn test_close_stops_rendering() {
    let mut config = LandingConfig::default();
    config.particles.count = 10;
    config.particles.seed = Some(2);
    let mut ctx = LandingContext::new(Viewport::new(640.0, 480.0), &config);
    let mut target = Recorder::default();
    let mut render_loop = RenderLoop::new();

    for _ in 0..5 {
        render_loop.frame(&mut ctx, &mut target).unwrap();
    }
    render_loop.stop();
    assert_eq!(render_loop.frame(&mut ctx, &mut target).unwrap(), FrameStatus::Stopped);
    assert_eq!(target.draws, 5);
}

// ============================================================================
// Presentation
// ============================================================================

#[test]
fn test_intro_gives_way_to_grid() {
    let config = LandingConfig::default();
    let mut stage = Stage::landing_page(Viewport::new(1920.0, 1080.0));
    let mut presentation = Presentation::start(&mut stage, &config).unwrap();

    run_presentation(&mut stage, &mut presentation, 2.1);

    assert_eq!(presentation.phase(), Phase::Revealed);
    assert!(stage.is_hidden(presentation.intro()));
    assert!(!stage.is_hidden(presentation.grid()));
}

#[test]
fn test_grid_is_three_rows_of_four() {
    let config = LandingConfig::default();
    let mut stage = Stage::landing_page(Viewport::new(1920.0, 1080.0));
    Presentation::start(&mut stage, &config).unwrap();
    let grid = stage.element_by_name(PRODUCT_GRID).unwrap();

    let cells = stage.grid_cells(grid);
    assert_eq!(cells.len(), 12);

    let mut rows: Vec<f32> = cells.iter().map(|(_, r)| r.y).collect();
    rows.dedup();
    assert_eq!(rows.len(), 3);
    for row in cells.chunks(4) {
        assert!(row.iter().all(|(_, r)| r.y == row[0].1.y));
        assert!(row.windows(2).all(|w| (w[1].1.x - w[0].1.x - 310.0).abs() < 1e-3));
    }
    assert!(cells.iter().all(|(_, r)| r.width == 220.0 && r.height == 220.0));

    let expected = grid_layout(4, 90.0, (220.0, 220.0), 12, stage.viewport());
    let actual: Vec<_> = cells.iter().map(|(_, r)| *r).collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_grid_fits_default_window() {
    let config = LandingConfig::default();
    let viewport = Viewport::new(config.window.width as f32, config.window.height as f32);
    let mut stage = Stage::landing_page(viewport);
    let presentation = Presentation::start(&mut stage, &config).unwrap();

    let cells = stage.grid_cells(presentation.grid());
    assert_eq!(cells.len(), 12);
    for (_, r) in &cells {
        assert!(r.x >= 0.0 && r.x + r.width <= viewport.width, "{r:?}");
        assert!(r.y >= 0.0 && r.y + r.height <= viewport.height, "{r:?}");
    }

    // Every cell stays reachable by the pointer.
    let (item, rect) = cells[0];
    let (x, y) = rect.center();
    assert_eq!(stage.pointer_moved(x, y), Vec::new());
    stage.set_hidden(presentation.grid(), false);
    assert_eq!(stage.pointer_moved(x, y), vec![PointerEvent::Enter(item)]);
}

#[test]
fn test_hover_from_pointer_motion() {
    let config = LandingConfig::default();
    let mut stage = Stage::landing_page(Viewport::new(1920.0, 1080.0));
    let mut presentation = Presentation::start(&mut stage, &config).unwrap();
    run_presentation(&mut stage, &mut presentation, 2.1);

    let (item, rect) = stage.grid_cells(presentation.grid())[5];
    let (x, y) = rect.center();
    let events = stage.pointer_moved(x, y);
    assert_eq!(events, vec![PointerEvent::Enter(item)]);
    for event in events {
        presentation.handle_pointer(&mut stage, event);
    }
    let events = stage.pointer_left();
    assert_eq!(events, vec![PointerEvent::Leave(item)]);
    for event in events {
        presentation.handle_pointer(&mut stage, event);
    }

    run_presentation(&mut stage, &mut presentation, 0.6);
    assert_eq!(stage.style(item).scale, 1.0);
    assert_eq!(stage.style(item).translate_y, 0.0);
}

#[test]
fn test_config_file_rejects_percent_opacity() {
    let err = LandingConfig::from_toml_str(
        r#"
        [presentation]
        grid_opacity = 100.0
        "#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("presentation.grid_opacity"));

    let config = LandingConfig::from_toml_str(
        r#"
        [particles]
        count = 4
        seed = 5
        "#,
    )
    .unwrap();
    assert_eq!(config.particles.count, 4);
    assert_eq!(config.particles.seed, Some(5));
}
