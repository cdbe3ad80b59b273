use crate::config::ColorGradeParams;
use crate::foundation::buffer::PixelBuffer;
use crate::foundation::core::Rgba8;
use crate::foundation::error::SkyResult;

/// Perceived brightness used by every stage: mean of r, g, b normalized to `[0, 1]`.
#[inline]
pub fn brightness(px: Rgba8) -> f32 {
    (f32::from(px.r) + f32::from(px.g) + f32::from(px.b)) / 3.0 / 255.0
}

/// Grade a single pixel.
///
/// Pixels brighter than `white_threshold` are pulled toward white, pixels darker than
/// `blue_threshold` are pulled toward pure blue, everything else is returned as is. Alpha is never
/// touched.
pub fn grade_pixel(px: Rgba8, params: &ColorGradeParams) -> Rgba8 {
    let b = brightness(px);
    if b > params.white_threshold {
        let amt = (b - params.white_threshold) / (1.0 - params.white_threshold);
        let k = amt * params.white_intensity;
        Rgba8::new(
            toward(px.r, 255.0, k),
            toward(px.g, 255.0, k),
            toward(px.b, 255.0, k),
            px.a,
        )
    } else if b < params.blue_threshold {
        let amt = (params.blue_threshold - b) / params.blue_threshold;
        let k = amt * params.blue_intensity;
        Rgba8::new(
            toward(px.r, 0.0, k),
            toward(px.g, 0.0, k),
            toward(px.b, 255.0, k),
            px.a,
        )
    } else {
        px
    }
}

#[inline]
fn toward(v: u8, target: f32, k: f32) -> u8 {
    let v = f32::from(v);
    (v + (target - v) * k).round().clamp(0.0, 255.0) as u8
}

/// CPU reference implementation of the color grade.
pub fn apply_color_grade(input: &PixelBuffer, params: &ColorGradeParams) -> SkyResult<PixelBuffer> {
    let mut out = input.clone();
    grade_in_place(&mut out, params)?;
    Ok(out)
}

pub fn grade_in_place(buf: &mut PixelBuffer, params: &ColorGradeParams) -> SkyResult<()> {
    params.validate()?;
    for px in buf.as_bytes_mut().chunks_exact_mut(4) {
        let graded = grade_pixel(Rgba8::from_slice(px), params);
        px.copy_from_slice(&graded.to_array());
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/effects/color_grade.rs"]
mod tests;
