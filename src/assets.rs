use std::path::PathBuf;
use std::sync::Arc;

use crate::foundation::buffer::PixelBuffer;
use crate::foundation::error::{SkyError, SkyResult};

pub mod decode;

pub use decode::{capture_pixels, decode_image};

/// Where a source image comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

impl ImageSource {
    pub fn bytes(data: impl Into<Arc<[u8]>>) -> Self {
        Self::Bytes(data.into())
    }

    /// Short human-readable description for logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Path(p) => p.display().to_string(),
            Self::Bytes(b) => format!("<{} bytes>", b.len()),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(p: PathBuf) -> Self {
        Self::Path(p)
    }
}

/// Limits applied when capturing decoded pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoaderOpts {
    /// Largest `width * height` accepted.
    pub max_pixels: u64,
}

impl Default for LoaderOpts {
    fn default() -> Self {
        Self {
            max_pixels: 1 << 26,
        }
    }
}

/// Turns an [`ImageSource`] into a base buffer.
///
/// Failures are [`SkyError::Decode`] when the source cannot be read or decoded and
/// [`SkyError::PixelRead`] when the decoded pixels cannot be captured.
pub trait ImageLoader: Send + Sync {
    fn load(&self, source: &ImageSource) -> SkyResult<PixelBuffer>;
}

/// Loader backed by the filesystem and the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsImageLoader {
    opts: LoaderOpts,
}

impl FsImageLoader {
    pub fn new(opts: LoaderOpts) -> Self {
        Self { opts }
    }

    pub fn opts(&self) -> LoaderOpts {
        self.opts
    }
}

impl ImageLoader for FsImageLoader {
    fn load(&self, source: &ImageSource) -> SkyResult<PixelBuffer> {
        let decoded = match source {
            ImageSource::Path(path) => {
                let bytes = std::fs::read(path).map_err(|e| {
                    SkyError::decode(format!("read image '{}': {e}", path.display()))
                })?;
                decode_image(&bytes)?
            }
            ImageSource::Bytes(bytes) => decode_image(bytes)?,
        };
        capture_pixels(decoded, &self.opts)
    }
}
