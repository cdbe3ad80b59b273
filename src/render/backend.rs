use crate::config::ColorGradeParams;
use crate::effects::color_grade::apply_color_grade;
use crate::foundation::buffer::PixelBuffer;
use crate::foundation::error::{SkyError, SkyResult};

/// An implementation of the color grade described in [`crate::effects::color_grade`].
///
/// Implementations must produce a buffer of the input's dimensions with alpha untouched, and
/// agree with [`CpuColorGrade`] within one LSB per channel.
pub trait ColorGradeBackend {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn grade(&mut self, input: &PixelBuffer, params: &ColorGradeParams) -> SkyResult<PixelBuffer>;
}

/// Direct per-pixel loop; always available.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuColorGrade;

impl ColorGradeBackend for CpuColorGrade {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn grade(&mut self, input: &PixelBuffer, params: &ColorGradeParams) -> SkyResult<PixelBuffer> {
        apply_color_grade(input, params)
    }
}

/// Available backend kinds.
///
/// - `Cpu` is always available.
/// - `Gpu` requires the `gpu` cargo feature.
/// - `Auto` picks `Gpu` when the feature is compiled in, `Cpu` otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Cpu,
    Gpu,
    Auto,
}

/// Create a color grade backend.
pub fn create_backend(kind: BackendKind) -> SkyResult<Box<dyn ColorGradeBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(CpuColorGrade)),
        BackendKind::Gpu => gpu_backend(),
        BackendKind::Auto => {
            if cfg!(feature = "gpu") {
                gpu_backend()
            } else {
                Ok(Box::new(CpuColorGrade))
            }
        }
    }
}

#[cfg(feature = "gpu")]
fn gpu_backend() -> SkyResult<Box<dyn ColorGradeBackend>> {
    Ok(Box::new(crate::render::gpu::GpuColorGrade::new()))
}

#[cfg(not(feature = "gpu"))]
fn gpu_backend() -> SkyResult<Box<dyn ColorGradeBackend>> {
    Err(SkyError::validation(
        "gpu backend requested but skyfx was built without the `gpu` feature",
    ))
}

/// Color grade stage with the GPU degradation policy.
///
/// The primary backend is used until it reports [`SkyError::GpuInit`]. From then on the stage
/// grades on the CPU for the rest of its life; the failure is logged once and the frame that hit
/// it is graded on the CPU too.
pub struct ColorGradeStage {
    primary: Box<dyn ColorGradeBackend>,
    fallback: CpuColorGrade,
    degraded: bool,
}

impl ColorGradeStage {
    pub fn new(primary: Box<dyn ColorGradeBackend>) -> Self {
        Self {
            primary,
            fallback: CpuColorGrade,
            degraded: false,
        }
    }

    pub fn from_kind(kind: BackendKind) -> SkyResult<Self> {
        Ok(Self::new(create_backend(kind)?))
    }

    pub fn cpu() -> Self {
        Self::new(Box::new(CpuColorGrade))
    }

    /// True once the primary backend failed to initialize.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Name of the backend that will grade the next frame.
    pub fn active_backend(&self) -> &'static str {
        if self.degraded {
            self.fallback.name()
        } else {
            self.primary.name()
        }
    }

    pub fn grade(
        &mut self,
        input: &PixelBuffer,
        params: &ColorGradeParams,
    ) -> SkyResult<PixelBuffer> {
        if !self.degraded {
            match self.primary.grade(input, params) {
                Err(SkyError::GpuInit(msg)) => {
                    tracing::warn!(
                        backend = self.primary.name(),
                        error = %msg,
                        "color grade backend unavailable; falling back to cpu"
                    );
                    self.degraded = true;
                }
                other => return other,
            }
        }
        self.fallback.grade(input, params)
    }
}

impl std::fmt::Debug for ColorGradeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorGradeStage")
            .field("primary", &self.primary.name())
            .field("degraded", &self.degraded)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
