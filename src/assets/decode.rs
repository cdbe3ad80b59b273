use crate::assets::LoaderOpts;
use crate::foundation::buffer::PixelBuffer;
use crate::foundation::error::{SkyError, SkyResult};

/// Decode any format the `image` crate understands into straight-alpha RGBA8.
pub fn decode_image(bytes: &[u8]) -> SkyResult<image::RgbaImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| SkyError::decode(format!("decode image from memory: {e}")))?;
    Ok(dyn_img.to_rgba8())
}

/// Capture decoded pixels into a base buffer, enforcing the loader's limits.
pub fn capture_pixels(img: image::RgbaImage, opts: &LoaderOpts) -> SkyResult<PixelBuffer> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(SkyError::pixel_read(format!(
            "image has no pixels ({width}x{height})"
        )));
    }
    let pixels = u64::from(width) * u64::from(height);
    if pixels > opts.max_pixels {
        return Err(SkyError::pixel_read(format!(
            "{width}x{height} image exceeds the {} pixel budget",
            opts.max_pixels
        )));
    }
    PixelBuffer::from_raw(width, height, img.into_raw())
}
