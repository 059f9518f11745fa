//! Dayglow animates indexed-palette pixel art over a simulated day.
//!
//! A scene is a base pixel-index image plus palettes (with classic
//! color-cycling descriptors), positioned overlay layers, scripted
//! overlay events, and "modes" (time-indexed palette sequences). Given a
//! seconds-of-day value, the engine deterministically resolves which
//! palette, which mode blend, and which overlay events apply, then
//! rasterizes straight-alpha RGBA pixels.
//!
//! # Pipeline overview
//!
//! 1. **Schedule**: `Scheduler + now -> CurrentModes + ScheduleEvents`
//!    (what is active, and how far along)
//! 2. **Blend**: resolve each side's palette spans, cross-fade color
//!    tables, rotate color cycles
//! 3. **Composite**: rasterize base indices and blit event overlays into
//!    the frame buffer
//! 4. **Drive** (optional): [`WorldRunner`] maps wall-clock time onto the
//!    simulated day and supports scrubbing
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: schedule generation is seeded by the
//!   calendar date; the same date always reproduces the same day.
//! - **No IO in the frame loop**: persistence and imports happen at the
//!   edges, through [`WorldStore`] and the import module.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod foundation;
mod import;
mod render;
mod schedule;
mod world;

pub use foundation::core::{CYCLE_RATE_DIVISOR, FrameRgba, MAX_SECONDS, Point, Rgb, Vec2};
pub use foundation::error::{DayglowError, DayglowResult};
pub use foundation::math::{Rng64, lerp, map_linear};
pub use foundation::time::{
    date_string_from_epoch, day_seconds_from_epoch, make_time_string, midnight_from_epoch,
    seconds_from_time_string,
};
pub use import::dpaint::convert as convert_dpaint;
pub use import::lbm::{LbmData, LbmLayer, parse_pixel_json};
pub use render::compositor::{blit_overlay, rasterize_base};
pub use render::palette::{apply_cycles, blend_colors};
pub use schedule::day::{DaySchedule, ModePlan, generate_day};
pub use schedule::scheduler::{
    CurrentModes, EventTrigger, ScheduleEvent, ScheduleSource, Scheduler,
};
pub use world::data::{
    CycleSpec, EventInfo, ModeInfo, ModePaletteInfo, OverlayInfo, PaletteInfo, WorldData, next_id,
};
pub use world::runner::WorldRunner;
pub use world::store::{
    JsonFileStore, WORLD_DATA_TYPE, WORLD_DATA_VERSION, WorldStore, parse_import, parse_stored,
    serialize_world,
};
pub use world::world::{SpanStatus, World, pan_offset};
