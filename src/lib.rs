//! skyfx renders animated "sky" effects from a still image.
//!
//! A source image is captured once into an immutable base [`PixelBuffer`]. Every display refresh
//! the [`RenderLoop`] asks the [`EffectPipeline`] for a fresh frame derived from that base
//! (shake/carousel animation, then brightness-threshold color grading), presents it on a
//! [`Surface`], and paints the hover [`ScatterOverlay`] on top while the pointer is inside.
//!
//! - Configure effects with [`EffectConfig`] (serde, validated).
//! - Grade on the CPU, or on the GPU with the `gpu` feature ([`BackendKind`]).
//! - Drive ticks with a [`FrameScheduler`]; [`ManualScheduler`] suits headless hosts.
#![forbid(unsafe_code)]

mod foundation;

/// Image sources and decoding.
pub mod assets;
/// Effect configuration.
pub mod config;
pub mod effects;
/// Per-frame effect composition.
pub mod pipeline;
/// Color grade backends and presentation surfaces.
pub mod render;
/// The render loop and its scheduler.
pub mod session;

pub use crate::foundation::buffer::PixelBuffer;
pub use crate::foundation::core::{FrameCounter, FrameIndex, PointerState, Rgba8};
pub use crate::foundation::error::{SkyError, SkyResult};

pub use crate::assets::{FsImageLoader, ImageLoader, ImageSource, LoaderOpts};
pub use crate::config::{AnimationType, ColorGradeParams, EffectConfig, HoverBehavior, ScatterOpts};
pub use crate::effects::scatter::{ScatterOverlay, ScatterStats};
pub use crate::pipeline::EffectPipeline;
pub use crate::render::backend::{
    BackendKind, ColorGradeBackend, ColorGradeStage, CpuColorGrade, create_backend,
};
#[cfg(feature = "gpu")]
pub use crate::render::gpu::GpuColorGrade;
pub use crate::render::surface::{InMemorySurface, Surface, SurfaceStatus};
pub use crate::session::render_loop::{
    LoadFailure, LoadFailureKind, LoadTicket, LoopState, LoopStats, RenderLoop,
};
pub use crate::session::scheduler::{FrameHandle, FrameScheduler, ManualScheduler};
