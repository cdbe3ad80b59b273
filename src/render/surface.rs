use crate::foundation::buffer::PixelBuffer;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{SkyError, SkyResult};

/// Text status a surface shows instead of a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceStatus {
    Loading,
    Error(String),
}

/// Presentation target the render loop draws into.
///
/// Pixel coordinates are in surface space, which matches the loaded image once the loop has
/// called [`Surface::resize`].
pub trait Surface {
    /// Current `(width, height)` in pixels.
    fn size(&self) -> (u32, u32);
    /// Resize to match a newly loaded image. Contents are cleared.
    fn resize(&mut self, width: u32, height: u32) -> SkyResult<()>;
    /// Replace the visible contents with `frame`.
    fn present(&mut self, frame: &PixelBuffer) -> SkyResult<()>;
    /// Composite a solid rectangle over the current contents. Out-of-bounds parts are clipped.
    fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgba8);
    /// Show a status message in place of a frame.
    fn show_status(&mut self, status: SurfaceStatus);
}

/// Headless surface backed by a [`PixelBuffer`], for tests, the CLI and debugging.
#[derive(Clone, Debug, Default)]
pub struct InMemorySurface {
    frame: PixelBuffer,
    status: Option<SurfaceStatus>,
    presents: u64,
}

impl InMemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the visible pixels.
    pub fn frame(&self) -> &PixelBuffer {
        &self.frame
    }

    pub fn status(&self) -> Option<&SurfaceStatus> {
        self.status.as_ref()
    }

    /// Number of successful [`Surface::present`] calls.
    pub fn presents(&self) -> u64 {
        self.presents
    }
}

impl Surface for InMemorySurface {
    fn size(&self) -> (u32, u32) {
        (self.frame.width(), self.frame.height())
    }

    fn resize(&mut self, width: u32, height: u32) -> SkyResult<()> {
        self.frame = PixelBuffer::new(width, height)?;
        Ok(())
    }

    fn present(&mut self, frame: &PixelBuffer) -> SkyResult<()> {
        if (frame.width(), frame.height()) != self.size() {
            return Err(SkyError::validation(format!(
                "frame is {}x{} but surface is {}x{}",
                frame.width(),
                frame.height(),
                self.frame.width(),
                self.frame.height()
            )));
        }
        self.frame
            .as_bytes_mut()
            .copy_from_slice(frame.as_bytes());
        self.status = None;
        self.presents += 1;
        Ok(())
    }

    fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgba8) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + i64::from(width)).min(i64::from(self.frame.width()));
        let y1 = (y + i64::from(height)).min(i64::from(self.frame.height()));
        for py in y0..y1 {
            for px in x0..x1 {
                let i = self.frame.offset_unchecked(px as u32, py as u32);
                let dst = &mut self.frame.as_bytes_mut()[i..i + 4];
                let out = source_over(color, Rgba8::from_slice(dst));
                dst.copy_from_slice(&out.to_array());
            }
        }
    }

    fn show_status(&mut self, status: SurfaceStatus) {
        self.status = Some(status);
    }
}

/// Straight-alpha source-over compositing.
fn source_over(src: Rgba8, dst: Rgba8) -> Rgba8 {
    match src.a {
        255 => return src,
        0 => return dst,
        _ => {}
    }
    let sa = f32::from(src.a) / 255.0;
    let da = f32::from(dst.a) / 255.0;
    let oa = sa + da * (1.0 - sa);
    let channel = |s: u8, d: u8| {
        let c = (f32::from(s) * sa + f32::from(d) * da * (1.0 - sa)) / oa;
        c.round().clamp(0.0, 255.0) as u8
    };
    Rgba8::new(
        channel(src.r, dst.r),
        channel(src.g, dst.g),
        channel(src.b, dst.b),
        (oa * 255.0).round().clamp(0.0, 255.0) as u8,
    )
}
