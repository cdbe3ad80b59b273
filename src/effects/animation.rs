//! Frame-driven displacement of light pixels.
//!
//! Both effects only fire when light pixels make up a large enough share of the image (the
//! dominance test); otherwise the input is handed back borrowed and nothing is allocated.

use std::borrow::Cow;
use std::f64::consts::PI;

use crate::config::{AnimationType, EffectConfig};
use crate::foundation::buffer::PixelBuffer;
use crate::foundation::core::{FrameIndex, Rgba8};
use crate::foundation::error::SkyResult;

/// Color written where a light pixel moved away from. Alpha comes from the moved pixel.
pub const FILL_RGB: [u8; 3] = [100, 150, 255];

const SHAKE_SPEED: f64 = 0.3;
const SHAKE_AMPLITUDE: f64 = 5.0;
const CAROUSEL_DEGREES_PER_FRAME: f64 = 0.5;

/// Light = every color channel strictly above `threshold`.
#[inline]
pub fn is_light(px: Rgba8, threshold: u8) -> bool {
    px.r > threshold && px.g > threshold && px.b > threshold
}

/// Share of light pixels in `[0, 1]`; `0.0` for an empty buffer.
pub fn light_fraction(buf: &PixelBuffer, threshold: u8) -> f64 {
    let total = buf.pixel_count();
    if total == 0 {
        return 0.0;
    }
    let light = buf
        .as_bytes()
        .chunks_exact(4)
        .filter(|px| is_light(Rgba8::from_slice(px), threshold))
        .count();
    light as f64 / total as f64
}

/// Dominance test gating both animations.
pub fn dominates(buf: &PixelBuffer, threshold: u8, min_percent: f64) -> bool {
    !buf.is_empty() && light_fraction(buf, threshold) * 100.0 >= min_percent
}

fn round_half_up(v: f64) -> i64 {
    (v + 0.5).floor() as i64
}

/// `(tx, ty)` translation of the shake effect for `frame`.
pub fn shake_offset(frame: FrameIndex) -> (i64, i64) {
    let t = frame.0 as f64 * SHAKE_SPEED;
    (
        round_half_up((t + PI / 4.0).sin() * SHAKE_AMPLITUDE),
        round_half_up((t + PI / 3.0).cos() * SHAKE_AMPLITUDE),
    )
}

/// Horizontal carousel offset for `frame`, before wrapping by `width`.
pub fn carousel_offset(frame: FrameIndex, width: u32) -> u64 {
    let turns = frame.0 as f64 * CAROUSEL_DEGREES_PER_FRAME / 360.0;
    (turns * f64::from(width)).floor() as u64
}

/// Apply the configured animation for `frame`.
///
/// Returns `Cow::Borrowed(input)` when the animation is disabled or the dominance test fails, and
/// a single freshly allocated buffer otherwise.
pub fn apply_animation<'a>(
    input: &'a PixelBuffer,
    frame: FrameIndex,
    cfg: &EffectConfig,
) -> SkyResult<Cow<'a, PixelBuffer>> {
    match cfg.animation {
        AnimationType::None => Ok(Cow::Borrowed(input)),
        _ if !dominates(
            input,
            cfg.light_pixel_threshold,
            cfg.light_object_threshold_percent,
        ) =>
        {
            Ok(Cow::Borrowed(input))
        }
        AnimationType::Shake => {
            apply_shake(input, frame, cfg.light_pixel_threshold).map(Cow::Owned)
        }
        AnimationType::Carousel => {
            apply_carousel(input, frame, cfg.light_pixel_threshold).map(Cow::Owned)
        }
    }
}

/// Shake every light pixel by [`shake_offset`], clamping destinations to the buffer edges.
pub fn apply_shake(
    input: &PixelBuffer,
    frame: FrameIndex,
    threshold: u8,
) -> SkyResult<PixelBuffer> {
    let (tx, ty) = shake_offset(frame);
    let max_x = i64::from(input.width()) - 1;
    let max_y = i64::from(input.height()) - 1;
    displace(input, threshold, |x, y| {
        ((x + tx).clamp(0, max_x), (y + ty).clamp(0, max_y))
    })
}

/// Rotate every light pixel horizontally by [`carousel_offset`], wrapping around the row.
pub fn apply_carousel(
    input: &PixelBuffer,
    frame: FrameIndex,
    threshold: u8,
) -> SkyResult<PixelBuffer> {
    let width = i64::from(input.width());
    if width == 0 {
        return Ok(input.clone());
    }
    let offset = (carousel_offset(frame, input.width()) % width as u64) as i64;
    displace(input, threshold, |x, y| ((x + offset) % width, y))
}

/// Row-major scan over `input`: every light pixel is copied to `dest(x, y)` in the output and its
/// source position is filled with [`FILL_RGB`]. Later writes win, so a pixel that lands on its
/// own position ends up as fill.
fn displace(
    input: &PixelBuffer,
    threshold: u8,
    dest: impl Fn(i64, i64) -> (i64, i64),
) -> SkyResult<PixelBuffer> {
    let mut out = input.clone();
    for y in 0..i64::from(input.height()) {
        for x in 0..i64::from(input.width()) {
            let px = input.get(x, y)?;
            if !is_light(px, threshold) {
                continue;
            }
            let (dx, dy) = dest(x, y);
            out.set(dx, dy, px)?;
            out.set(x, y, Rgba8::new(FILL_RGB[0], FILL_RGB[1], FILL_RGB[2], px.a))?;
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/animation.rs"]
mod tests;
