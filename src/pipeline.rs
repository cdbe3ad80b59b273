use crate::config::EffectConfig;
use crate::effects::animation::apply_animation;
use crate::foundation::buffer::PixelBuffer;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::SkyResult;
use crate::render::backend::{BackendKind, ColorGradeStage};

/// Per-frame effect composition: animation first, then color grade.
///
/// The base buffer is only ever read. Each successful frame allocates the graded output, plus one
/// intermediate buffer when the animation fires.
#[derive(Debug)]
pub struct EffectPipeline {
    color_grade: ColorGradeStage,
    fallbacks: u64,
}

impl EffectPipeline {
    pub fn new(color_grade: ColorGradeStage) -> Self {
        Self {
            color_grade,
            fallbacks: 0,
        }
    }

    /// Pipeline with a CPU color grade.
    pub fn cpu() -> Self {
        Self::new(ColorGradeStage::cpu())
    }

    pub fn with_backend(kind: BackendKind) -> SkyResult<Self> {
        Ok(Self::new(ColorGradeStage::from_kind(kind)?))
    }

    /// Render one frame, falling back to an unmodified copy of `base` on error.
    ///
    /// Errors are logged and counted in [`EffectPipeline::fallbacks`]; use
    /// [`EffectPipeline::try_render`] to observe them directly.
    #[tracing::instrument(skip_all, fields(frame = frame.0))]
    pub fn render(
        &mut self,
        base: &PixelBuffer,
        frame: FrameIndex,
        config: &EffectConfig,
    ) -> PixelBuffer {
        match self.try_render(base, frame, config) {
            Ok(out) => out,
            Err(err) => {
                self.fallbacks += 1;
                tracing::error!(error = %err, "effect pipeline failed; presenting base image");
                base.clone()
            }
        }
    }

    pub fn try_render(
        &mut self,
        base: &PixelBuffer,
        frame: FrameIndex,
        config: &EffectConfig,
    ) -> SkyResult<PixelBuffer> {
        let working = apply_animation(base, frame, config)?;
        self.color_grade.grade(&working, &config.color_grade)
    }

    /// Number of frames that were replaced by the base image because of an error.
    pub fn fallbacks(&self) -> u64 {
        self.fallbacks
    }

    pub fn color_grade(&self) -> &ColorGradeStage {
        &self.color_grade
    }
}

impl Default for EffectPipeline {
    fn default() -> Self {
        Self::cpu()
    }
}
