/// Absolute 0-based frame index handed to frame-driven effects.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Straight-alpha RGBA8 pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (not premultiplied into r/g/b).
    pub a: u8,
}

impl Rgba8 {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_slice(px: &[u8]) -> Self {
        Self::new(px[0], px[1], px[2], px[3])
    }
}

/// Cursor position over the surface plus whether the cursor is currently inside it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerState {
    pub active: bool,
    pub x: i32,
    pub y: i32,
}

impl PointerState {
    /// Build a pointer state with coordinates clamped to `[0, width-1] x [0, height-1]`.
    ///
    /// A zero-sized area clamps to the origin.
    pub fn clamped(active: bool, x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            active,
            x: clamp_axis(x, width),
            y: clamp_axis(y, height),
        }
    }
}

fn clamp_axis(v: i32, extent: u32) -> i32 {
    let max = i32::try_from(extent.saturating_sub(1)).unwrap_or(i32::MAX);
    v.clamp(0, max)
}

/// Number of frames rendered since the current image finished loading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameCounter(u64);

impl FrameCounter {
    pub fn new() -> Self {
        Self(0)
    }

    /// Counter positioned at `value`, as if `value` frames had been rendered.
    pub fn starting_at(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn advance(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Frame index handed to the effects: `counter mod cycle` when a cycle is set.
    pub fn phase(self, cycle_period: Option<u64>) -> FrameIndex {
        match cycle_period {
            Some(period) if period > 0 => FrameIndex(self.0 % period),
            _ => FrameIndex(self.0),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
