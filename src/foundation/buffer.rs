use crate::foundation::core::Rgba8;
use crate::foundation::error::{SkyError, SkyResult};

/// Width x height RGBA8 pixels, straight alpha, row-major, tightly packed.
///
/// `pixels.len() == width * height * 4` holds for every value of this type; all constructors
/// check it. The default value is the empty 0x0 buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Transparent black buffer.
    pub fn new(width: u32, height: u32) -> SkyResult<Self> {
        Self::filled(width, height, Rgba8::TRANSPARENT)
    }

    /// Buffer with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: Rgba8) -> SkyResult<Self> {
        let len = byte_len(width, height)?;
        let pixels = color.to_array().repeat(len / 4);
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Wrap existing RGBA8 bytes.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> SkyResult<Self> {
        let expected = byte_len(width, height)?;
        if pixels.len() != expected {
            return Err(SkyError::validation(format!(
                "pixel data for {width}x{height} must be {expected} bytes, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height)
    }

    pub fn get(&self, x: i64, y: i64) -> SkyResult<Rgba8> {
        let i = self.offset(x, y)?;
        Ok(Rgba8::from_slice(&self.pixels[i..i + 4]))
    }

    pub fn set(&mut self, x: i64, y: i64, color: Rgba8) -> SkyResult<()> {
        let i = self.offset(x, y)?;
        self.pixels[i..i + 4].copy_from_slice(&color.to_array());
        Ok(())
    }

    /// Byte offset of `(x, y)`, which the caller guarantees is in bounds.
    #[inline]
    pub(crate) fn offset_unchecked(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    fn offset(&self, x: i64, y: i64) -> SkyResult<usize> {
        if !self.contains(x, y) {
            return Err(SkyError::bounds(x, y, self.width, self.height));
        }
        Ok(self.offset_unchecked(x as u32, y as u32))
    }
}

fn byte_len(width: u32, height: u32) -> SkyResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| SkyError::validation(format!("{width}x{height} buffer size overflows")))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/buffer.rs"]
mod tests;
