/// Color grade backends and the GPU degradation policy.
pub mod backend;
/// wgpu color grade backend (feature `gpu`).
#[cfg(feature = "gpu")]
pub mod gpu;
/// Presentation surfaces.
pub mod surface;
