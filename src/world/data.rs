use kurbo::Point;

use crate::foundation::core::{MAX_SECONDS, Rgb};

/// One color-cycling descriptor: rotate palette entries `[low, high]` at
/// `rate / CYCLE_RATE_DIVISOR` steps per real second.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CycleSpec {
    /// First palette index of the cycled range (inclusive).
    pub low: usize,
    /// Last palette index of the cycled range (inclusive).
    pub high: usize,
    /// Rotation speed, scaled by [`crate::CYCLE_RATE_DIVISOR`].
    pub rate: f64,
    /// 0 = forward, 2 = reversed. Other values are tolerated but warned
    /// about at load time and treated as forward.
    pub reverse: i64,
}

impl CycleSpec {
    /// Number of palette entries covered by the cycle.
    pub fn size(&self) -> usize {
        self.high.saturating_sub(self.low) + 1
    }
}

/// An imported color table plus its cycling descriptors.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PaletteInfo {
    /// Stable id within the world.
    #[serde(default)]
    pub id: i64,
    /// Display name (usually the source file name).
    #[serde(default)]
    pub name: String,
    /// Ordered fixed-size color table; pixel values index into it.
    #[serde(default)]
    pub colors: Vec<Rgb>,
    /// Cycling descriptors applied while this palette is active.
    #[serde(default)]
    pub cycles: Vec<CycleSpec>,
}

/// A named pixel-index layer that events can place over the base image.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayInfo {
    /// Stable id within the world.
    #[serde(default)]
    pub id: i64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Overlay width in pixels.
    #[serde(default)]
    pub width: u32,
    /// Overlay height in pixels.
    #[serde(default)]
    pub height: u32,
    /// Row-major palette indices; 0 is treated as transparent.
    #[serde(default)]
    pub pixels: Vec<u32>,
}

/// A scripted overlay placement that moves linearly from `startPosition`
/// to `endPosition` over `durationSeconds`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfo {
    /// Stable id within the world.
    #[serde(default)]
    pub id: i64,
    /// Display name; unnamed events stay out of the status line.
    #[serde(default)]
    pub name: String,
    /// How long one occurrence runs.
    #[serde(default = "default_event_duration")]
    pub duration_seconds: f64,
    /// Overlay placed by this event, -1 for none.
    #[serde(default = "none_id")]
    pub overlay_id: i64,
    /// Top-left position at progress 0.
    #[serde(default)]
    pub start_position: Point,
    /// Top-left position at progress 1.
    #[serde(default)]
    pub end_position: Point,
}

impl Default for EventInfo {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            duration_seconds: default_event_duration(),
            overlay_id: none_id(),
            start_position: Point::ZERO,
            end_position: Point::ZERO,
        }
    }
}

fn default_event_duration() -> f64 {
    5.0
}

fn none_id() -> i64 {
    -1
}

/// One time span of a mode claiming a palette.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModePaletteInfo {
    /// Stable id within the owning mode.
    #[serde(default)]
    pub id: i64,
    /// Claimed palette, -1 for none.
    #[serde(default = "none_id")]
    pub palette_id: i64,
    /// Span start, seconds-of-day.
    #[serde(default)]
    pub start_seconds: f64,
    /// Span end, seconds-of-day.
    #[serde(default = "default_span_end")]
    pub end_seconds: f64,
}

impl Default for ModePaletteInfo {
    fn default() -> Self {
        Self {
            id: 0,
            palette_id: none_id(),
            start_seconds: 0.0,
            end_seconds: default_span_end(),
        }
    }
}

fn default_span_end() -> f64 {
    MAX_SECONDS - 1.0
}

/// A named, reusable sequence of time-bounded palette assignments: an
/// authored "look" across the day.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeInfo {
    /// Stable id within the world.
    #[serde(default)]
    pub id: i64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Palette spans, kept sorted ascending by `startSeconds`.
    #[serde(default)]
    pub mode_palette_infos: Vec<ModePaletteInfo>,
}

/// Aggregate root: the full authored scene. Owned exclusively by
/// [`crate::World`] and mutated only through its methods.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldData {
    /// Scene name (usually the base image file name).
    #[serde(default)]
    pub name: String,
    /// Base image width in pixels.
    #[serde(default)]
    pub width: u32,
    /// Base image height in pixels.
    #[serde(default)]
    pub height: u32,
    /// Base image palette indices, row-major, `width * height` entries.
    #[serde(default)]
    pub pixels: Vec<u32>,
    /// Imported palettes.
    #[serde(default)]
    pub palette_infos: Vec<PaletteInfo>,
    /// Imported overlays.
    #[serde(default)]
    pub overlays: Vec<OverlayInfo>,
    /// Authored events.
    #[serde(default)]
    pub events: Vec<EventInfo>,
    /// Authored modes.
    #[serde(default)]
    pub modes: Vec<ModeInfo>,
}

/// Smallest id greater than every id in `items` (at least 1).
pub fn next_id<T, F>(items: &[T], id_of: F) -> i64
where
    F: Fn(&T) -> i64,
{
    let mut id = 1;
    for item in items {
        if id_of(item) >= id {
            id = id_of(item) + 1;
        }
    }

    id
}
