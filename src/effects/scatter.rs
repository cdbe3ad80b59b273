use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ScatterOpts;
use crate::foundation::buffer::PixelBuffer;
use crate::foundation::core::{PointerState, Rgba8};
use crate::render::surface::Surface;

/// Counters for one [`ScatterOverlay::draw`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScatterStats {
    pub painted: u32,
    pub rejected: u32,
}

/// Hover effect that resamples pixels near the pointer and repaints them at random nearby spots.
///
/// Generic over the RNG so tests can use a seeded generator and get reproducible output.
#[derive(Debug)]
pub struct ScatterOverlay<R = StdRng> {
    rng: R,
}

impl ScatterOverlay<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_os_rng() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl<R: Rng> ScatterOverlay<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Paint `opts.count` scatter attempts onto `surface`.
    ///
    /// Samples are read from `source` (the unmodified base image) and painted in surface space;
    /// the caller keeps surface and source the same size. Nothing happens while the pointer is
    /// inactive.
    pub fn draw(
        &mut self,
        source: &PixelBuffer,
        surface: &mut dyn Surface,
        pointer: PointerState,
        opts: &ScatterOpts,
    ) -> ScatterStats {
        let mut stats = ScatterStats::default();
        if !pointer.active || source.is_empty() {
            return stats;
        }
        let (px, py) = (i64::from(pointer.x), i64::from(pointer.y));

        for _ in 0..opts.count {
            let (sx, sy) = self.disk_offset(opts.sample_radius);
            let color = match source.get(px + sx, py + sy) {
                Ok(c) if c.a != 0 => c,
                _ => {
                    stats.rejected += 1;
                    continue;
                }
            };

            let (dx, dy) = self.disk_offset(opts.scatter_radius);
            let (dest_x, dest_y) = (px + dx, py + dy);
            if !source.contains(dest_x, dest_y) {
                stats.rejected += 1;
                continue;
            }
            paint(surface, dest_x, dest_y, opts.pixel_size, color);
            stats.painted += 1;
        }
        stats
    }

    /// Uniform integer offset inside the closed disk of `radius` (rejection sampling).
    fn disk_offset(&mut self, radius: f32) -> (i64, i64) {
        let r = f64::from(radius.max(0.0));
        let extent = r.floor() as i64;
        let r2 = r * r;
        loop {
            let dx = self.rng.random_range(-extent..=extent);
            let dy = self.rng.random_range(-extent..=extent);
            let (fx, fy) = (dx as f64, dy as f64);
            if fx * fx + fy * fy <= r2 {
                return (dx, dy);
            }
        }
    }
}

fn paint(surface: &mut dyn Surface, x: i64, y: i64, size: u32, color: Rgba8) {
    surface.fill_rect(x, y, size.max(1), size.max(1), color);
}

#[cfg(test)]
#[path = "../../tests/unit/effects/scatter.rs"]
mod tests;
