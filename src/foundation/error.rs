pub type SkyResult<T> = Result<T, SkyError>;

#[derive(thiserror::Error, Debug)]
pub enum SkyError {
    /// The image source could not be read or decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The decoded image exists but its pixels may not be captured.
    #[error("pixel read error: {0}")]
    PixelRead(String),

    /// The GPU path could not create its device, shader or pipeline.
    #[error("gpu init error: {0}")]
    GpuInit(String),

    /// A pixel coordinate fell outside the buffer. Effect code clamps before indexing, so this
    /// always points at a logic bug.
    #[error("pixel ({x}, {y}) is outside a {width}x{height} buffer")]
    Bounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SkyError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn pixel_read(msg: impl Into<String>) -> Self {
        Self::PixelRead(msg.into())
    }

    pub fn gpu_init(msg: impl Into<String>) -> Self {
        Self::GpuInit(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn bounds(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self::Bounds {
            x,
            y,
            width,
            height,
        }
    }
}
