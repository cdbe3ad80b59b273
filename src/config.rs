//! Effect configuration.
//!
//! Every field has a default so partial JSON documents are accepted; [`EffectConfig::validate`]
//! is the single place where ranges are enforced.

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{SkyError, SkyResult};

/// Geometric animation applied before color grading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationType {
    None,
    #[default]
    Shake,
    Carousel,
}

/// What the loop does while the pointer is over the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoverBehavior {
    /// Stop advancing and keep showing the last rendered frame.
    Freeze,
    /// Keep animating and scatter pixels around the pointer.
    #[default]
    Scatter,
    /// Ignore the pointer.
    None,
}

/// Brightness-threshold color grading parameters, all in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ColorGradeParams {
    pub white_intensity: f32,
    pub white_threshold: f32,
    pub blue_intensity: f32,
    pub blue_threshold: f32,
}

impl Default for ColorGradeParams {
    fn default() -> Self {
        Self {
            white_intensity: 1.0,
            white_threshold: 0.5,
            blue_intensity: 1.0,
            blue_threshold: 0.1,
        }
    }
}

impl ColorGradeParams {
    /// Parameters that leave every pixel untouched.
    pub fn neutral() -> Self {
        Self {
            white_intensity: 0.0,
            blue_intensity: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SkyResult<()> {
        for (name, v) in [
            ("white_intensity", self.white_intensity),
            ("white_threshold", self.white_threshold),
            ("blue_intensity", self.blue_intensity),
            ("blue_threshold", self.blue_threshold),
        ] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(SkyError::validation(format!(
                    "color_grade.{name} must be finite and in [0, 1], got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Hover scatter parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScatterOpts {
    /// Sample/paint attempts per frame.
    pub count: u32,
    /// Radius around the pointer that pixels are sampled from.
    pub sample_radius: f32,
    /// Radius around the pointer that sampled pixels are painted into.
    pub scatter_radius: f32,
    /// Edge length of each painted block.
    pub pixel_size: u32,
}

impl Default for ScatterOpts {
    fn default() -> Self {
        Self {
            count: 2000,
            sample_radius: 30.0,
            scatter_radius: 45.0,
            pixel_size: 1,
        }
    }
}

impl ScatterOpts {
    /// Largest accepted radius; no image dimension can exceed it.
    pub const MAX_RADIUS: f32 = u32::MAX as f32;

    pub fn validate(&self) -> SkyResult<()> {
        for (name, v) in [
            ("sample_radius", self.sample_radius),
            ("scatter_radius", self.scatter_radius),
        ] {
            if !v.is_finite() || !(0.0..=Self::MAX_RADIUS).contains(&v) {
                return Err(SkyError::validation(format!(
                    "scatter.{name} must be in [0, {}], got {v}",
                    Self::MAX_RADIUS
                )));
            }
        }
        if self.pixel_size == 0 {
            return Err(SkyError::validation("scatter.pixel_size must be >= 1"));
        }
        Ok(())
    }
}

/// Full per-session effect configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    pub animation: AnimationType,
    pub color_grade: ColorGradeParams,
    /// Minimum share of light pixels (percent) for an animation to fire.
    pub light_object_threshold_percent: f64,
    /// A pixel is light when r, g and b are all above this value.
    pub light_pixel_threshold: u8,
    pub hover: HoverBehavior,
    /// When set, effects see `frame mod cycle_period` instead of the raw counter.
    pub cycle_period: Option<u64>,
    pub scatter: ScatterOpts,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            animation: AnimationType::default(),
            color_grade: ColorGradeParams::default(),
            light_object_threshold_percent: 5.0,
            light_pixel_threshold: 200,
            hover: HoverBehavior::default(),
            cycle_period: None,
            scatter: ScatterOpts::default(),
        }
    }
}

impl EffectConfig {
    pub fn validate(&self) -> SkyResult<()> {
        self.color_grade.validate()?;
        self.scatter.validate()?;
        let pct = self.light_object_threshold_percent;
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return Err(SkyError::validation(format!(
                "light_object_threshold_percent must be in [0, 100], got {pct}"
            )));
        }
        if self.cycle_period == Some(0) {
            return Err(SkyError::validation("cycle_period must be > 0 when set"));
        }
        Ok(())
    }

    pub fn from_json_str(s: &str) -> SkyResult<Self> {
        let cfg: Self = serde_json::from_str(s).context("parse effect config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_path(path: &Path) -> SkyResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read effect config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }
}
