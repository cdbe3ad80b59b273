use super::*;
use crate::foundation::error::SkyResult;
use crate::render::surface::{InMemorySurface, SurfaceStatus};

#[derive(Default)]
struct RecordingSurface {
    width: u32,
    height: u32,
    rects: Vec<(i64, i64, u32, u32, Rgba8)>,
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) -> SkyResult<()> {
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn present(&mut self, _frame: &PixelBuffer) -> SkyResult<()> {
        Ok(())
    }

    fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgba8) {
        self.rects.push((x, y, width, height, color));
    }

    fn show_status(&mut self, _status: SurfaceStatus) {}
}

/// Left half opaque, right half fully transparent.
fn half_transparent(width: u32, height: u32) -> PixelBuffer {
    let mut buf = PixelBuffer::new(width, height).unwrap();
    for y in 0..i64::from(height) {
        for x in 0..i64::from(width / 2) {
            buf.set(x, y, Rgba8::rgb((x * 3) as u8, (y * 5) as u8, 77)).unwrap();
        }
    }
    buf
}

fn pointer(x: i32, y: i32) -> PointerState {
    PointerState { active: true, x, y }
}

#[test]
fn painted_pixels_stay_inside_radius_and_bounds() {
    let source = half_transparent(40, 30);
    let opts = ScatterOpts {
        count: 3000,
        sample_radius: 12.0,
        scatter_radius: 9.5,
        pixel_size: 1,
    };
    for (seed, p) in [(1u64, pointer(20, 15)), (2, pointer(0, 0)), (3, pointer(39, 29))] {
        let mut surface = RecordingSurface::default();
        let mut overlay = ScatterOverlay::seeded(seed);
        let stats = overlay.draw(&source, &mut surface, p, &opts);
        assert_eq!(stats.painted + stats.rejected, opts.count);
        assert_eq!(surface.rects.len() as u32, stats.painted);

        for &(x, y, w, h, color) in &surface.rects {
            assert_eq!((w, h), (1, 1));
            assert!(source.contains(x, y), "({x}, {y}) out of bounds");
            let (dx, dy) = ((x - i64::from(p.x)) as f64, (y - i64::from(p.y)) as f64);
            assert!((dx * dx + dy * dy).sqrt() <= f64::from(opts.scatter_radius));
            assert_ne!(color.a, 0);
        }
    }
}

#[test]
fn fully_transparent_source_paints_nothing() {
    let source = PixelBuffer::new(16, 16).unwrap();
    let mut surface = RecordingSurface::default();
    let stats = ScatterOverlay::seeded(9).draw(
        &source,
        &mut surface,
        pointer(8, 8),
        &ScatterOpts::default(),
    );
    assert_eq!(stats.painted, 0);
    assert_eq!(stats.rejected, ScatterOpts::default().count);
    assert!(surface.rects.is_empty());
}

#[test]
fn inactive_pointer_is_a_no_op() {
    let source = half_transparent(8, 8);
    let mut surface = RecordingSurface::default();
    let idle = PointerState {
        active: false,
        x: 2,
        y: 2,
    };
    let stats =
        ScatterOverlay::seeded(4).draw(&source, &mut surface, idle, &ScatterOpts::default());
    assert_eq!(stats, ScatterStats::default());
    assert!(surface.rects.is_empty());
}

#[test]
fn same_seed_is_reproducible() {
    let source = half_transparent(32, 32);
    let opts = ScatterOpts {
        count: 200,
        ..ScatterOpts::default()
    };
    let run = |seed| {
        let mut surface = RecordingSurface::default();
        ScatterOverlay::seeded(seed).draw(&source, &mut surface, pointer(10, 10), &opts);
        surface.rects
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn zero_radius_copies_pointer_pixel_onto_itself() {
    let source = PixelBuffer::filled(5, 5, Rgba8::rgb(9, 9, 9)).unwrap();
    let mut surface = InMemorySurface::new();
    surface.resize(5, 5).unwrap();
    let opts = ScatterOpts {
        count: 10,
        sample_radius: 0.0,
        scatter_radius: 0.0,
        pixel_size: 2,
    };
    let stats = ScatterOverlay::seeded(0).draw(&source, &mut surface, pointer(4, 4), &opts);
    assert_eq!(stats.painted, 10);
    assert_eq!(surface.frame().get(4, 4).unwrap(), Rgba8::rgb(9, 9, 9));
    assert_eq!(surface.frame().get(3, 3).unwrap(), Rgba8::TRANSPARENT);
}

#[test]
fn huge_radius_is_sampled_without_overflow() {
    let source = half_transparent(16, 16);
    let opts = ScatterOpts {
        count: 200,
        sample_radius: 4.0e9,
        scatter_radius: ScatterOpts::MAX_RADIUS,
        pixel_size: 1,
    };
    opts.validate().unwrap();
    let mut surface = RecordingSurface::default();
    let stats = ScatterOverlay::seeded(1).draw(&source, &mut surface, pointer(8, 8), &opts);
    assert_eq!(stats.painted + stats.rejected, opts.count);
    assert_eq!(surface.rects.len() as u32, stats.painted);
}
