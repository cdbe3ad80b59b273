//! Per-frame pixel effects.
//!
//! - [`color_grade`]: brightness-threshold whitening/bluening (CPU reference).
//! - [`animation`]: shake and carousel displacement of light pixels.
//! - [`scatter`]: pointer-driven resampling painted straight onto a surface.

pub mod animation;
pub mod color_grade;
pub mod scatter;
