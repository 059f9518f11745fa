use kurbo::Vec2;

use crate::foundation::core::{FrameRgba, MAX_SECONDS, Rgb};
use crate::foundation::error::{DayglowError, DayglowResult};
use crate::foundation::math::{lerp, map_linear};
use crate::import::lbm::LbmData;
use crate::render::{compositor, palette};
use crate::schedule::scheduler::{EventTrigger, Scheduler};
use crate::world::data::{
    CycleSpec, EventInfo, ModeInfo, ModePaletteInfo, OverlayInfo, PaletteInfo, WorldData, next_id,
};
use crate::world::store::{self, WorldStore};

/// Invariant status of one mode-palette span, recomputed by
/// [`World::sort_mode_palettes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpanStatus {
    /// Span is ordered and does not overlap its neighbors.
    Good,
    /// Span is inverted or overlaps an adjacent span.
    Bad,
}

// Resolved palette state for one side of a mode blend.
#[derive(Clone, Debug, Default)]
struct ModePalette {
    colors: Vec<Rgb>,
    cycles: Vec<CycleSpec>,
    mode_label: String,
    palette_label: String,
}

#[derive(Clone, Debug, Default)]
struct DrawStatus {
    error: String,
    events: Vec<String>,
    overlays: Vec<String>,
}

/// Owns the authoritative scene data and renders frames from it.
///
/// Every mutation method validates its input, applies the edit, re-checks
/// any span list it touched, persists the aggregate through the
/// configured store, and notifies the registered observers.
#[derive(Default)]
pub struct World {
    data: WorldData,
    scheduler: Scheduler,
    current_colors: Vec<Rgb>,
    pixel_data: Vec<u8>,
    mode_palette_statuses: Vec<Vec<SpanStatus>>,
    is_bad: bool,
    first_draw: bool,
    store: Option<Box<dyn WorldStore>>,
    observers: Vec<Box<dyn FnMut()>>,
}

impl World {
    /// An empty world with no store attached.
    pub fn new() -> Self {
        Self {
            first_draw: true,
            ..Self::default()
        }
    }

    /// A world backed by `store`, hydrated from whatever the store holds.
    /// A missing or unreadable payload leaves the world empty; the error
    /// is logged, never fatal.
    pub fn with_store(store: Box<dyn WorldStore>) -> Self {
        let mut world = Self::new();

        match store.load() {
            Ok(Some(json)) => {
                let ingested = store::parse_stored(&json)
                    .and_then(|(value, version)| world.ingest(value, version));
                if let Err(err) = ingested {
                    tracing::error!(%err, "error parsing stored world data");
                }
            }
            Ok(None) => {}
            Err(err) => tracing::error!(%err, "error reading world store"),
        }

        world.store = Some(store);
        world
    }

    /// Load a world from an exported envelope. Rejects wrong container
    /// types and missing payloads without partial state.
    pub fn from_json(json: &str) -> DayglowResult<Self> {
        let mut world = Self::new();
        let (value, version) = store::parse_import(json)?;
        world.ingest(value, version)?;
        Ok(world)
    }

    /// The scene data.
    pub fn data(&self) -> &WorldData {
        &self.data
    }

    /// The schedule resolver.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Whether any mode's span list currently violates the ordering
    /// invariant (gates drawing, never persistence).
    pub fn is_bad(&self) -> bool {
        self.is_bad
    }

    /// Per-mode, per-span invariant statuses, parallel to
    /// `data().modes`.
    pub fn mode_palette_statuses(&self) -> &[Vec<SpanStatus>] {
        &self.mode_palette_statuses
    }

    /// The last rendered frame's RGBA bytes.
    pub fn pixel_data(&self) -> &[u8] {
        &self.pixel_data
    }

    /// The last rendered frame as an owned buffer.
    pub fn frame_rgba(&self) -> FrameRgba {
        FrameRgba {
            width: self.data.width,
            height: self.data.height,
            data: self.pixel_data.clone(),
        }
    }

    /// Register a change observer. All registered observers fire after
    /// every mutation.
    pub fn on_change(&mut self, observer: impl FnMut() + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Attach (or replace) the persistence store.
    pub fn set_store(&mut self, store: Box<dyn WorldStore>) {
        self.store = Some(store);
    }

    /// Install a single ad-hoc event trigger.
    pub fn make(&mut self, trigger: EventTrigger) {
        self.scheduler.make(trigger);
    }

    /// Generate and install the ambient day schedule for `date`.
    pub fn make_day(&mut self, date: &str) {
        let Self {
            scheduler, data, ..
        } = self;
        scheduler.make_day(data, date);
    }

    /// Pin a mode for preview.
    pub fn set_mode(&mut self, id: i64) {
        self.scheduler.set_mode(id);
    }

    /// Pin a palette for preview.
    pub fn set_palette(&mut self, id: i64) {
        self.scheduler.set_palette(id);
    }

    /// Pin an overlay for preview.
    pub fn set_overlay(&mut self, id: i64) {
        self.scheduler.set_overlay(id);
    }

    /// Drop any installed schedule or pin.
    pub fn clear_schedule(&mut self) {
        self.scheduler.clear();
    }

    /// Render one frame at `now_seconds` of the simulated day
    /// (`real_seconds` drives the palette cycles) and return the status
    /// line describing what was drawn.
    #[tracing::instrument(skip(self))]
    pub fn frame(&mut self, now_seconds: f64, real_seconds: f64) -> String {
        let mut mode_status = String::new();
        let mut palette_status = String::new();

        let current = self.scheduler.current_modes(&self.data, now_seconds);
        let start_side = current
            .start_mode
            .as_ref()
            .and_then(|mode| self.mode_palette(mode, now_seconds));
        let end_side = current
            .end_mode
            .as_ref()
            .and_then(|mode| self.mode_palette(mode, now_seconds));

        if let Some(start) = start_side {
            let mut colors;
            if let Some(end) = end_side {
                colors = palette::blend_colors(&start.colors, &end.colors, current.progress);
                mode_status = format!("{} => {}", start.mode_label, end.mode_label);
                palette_status = format!("{} => {}", start.palette_label, end.palette_label);
            } else {
                colors = start.colors;
                mode_status = start.mode_label;
                palette_status = start.palette_label;
            }

            // TODO: blend the two sides' cycles instead of keeping the
            // start side's only.
            palette::apply_cycles(&mut colors, &start.cycles, real_seconds);
            self.current_colors = colors;
        }

        let draw_status = self.draw(now_seconds);

        let mut status_parts = Vec::new();
        if !draw_status.error.is_empty() {
            status_parts.push(draw_status.error);
        } else {
            if !mode_status.is_empty() {
                status_parts.push(format!("Mode: {mode_status}"));
            }

            if !palette_status.is_empty() {
                status_parts.push(format!("Palette: {palette_status}"));
            }

            if !draw_status.events.is_empty() {
                status_parts.push(format!(
                    "{}: {}",
                    pluralize("Event", draw_status.events.len()),
                    draw_status.events.join(", ")
                ));
            }

            if !draw_status.overlays.is_empty() {
                status_parts.push(format!(
                    "{}: {}",
                    pluralize("Overlay", draw_status.overlays.len()),
                    draw_status.overlays.join(", ")
                ));
            }
        }

        status_parts.join(" - ")
    }

    // Resolve a mode's palette at a point in time: the span containing
    // `now` wins outright, otherwise the bracketing spans blend across
    // their gap. Falls back to the first loaded palette when no span
    // resolves.
    fn mode_palette(&self, mode_info: &ModeInfo, now_seconds: f64) -> Option<ModePalette> {
        let palette_infos = &self.data.palette_infos;
        let mut mode_label = String::new();
        let mut start_span: Option<&ModePaletteInfo> = None;
        let mut end_span: Option<&ModePaletteInfo> = None;

        for span in &mode_info.mode_palette_infos {
            if span.palette_id == -1 {
                continue;
            }

            if now_seconds >= span.start_seconds {
                start_span = Some(span);
                if now_seconds < span.end_seconds {
                    end_span = None;
                    break;
                }
            } else if start_span.is_some() {
                end_span = Some(span);
                break;
            } else {
                start_span = Some(span);
                break;
            }
        }

        let find_palette = |id: i64| palette_infos.iter().find(|palette| palette.id == id);
        let mut start_palette = start_span.and_then(|span| find_palette(span.palette_id));
        let end_palette = end_span.and_then(|span| find_palette(span.palette_id));

        if start_palette.is_some() {
            mode_label = mode_info.name.clone();
        } else {
            start_palette = palette_infos.first();
        }

        let start_palette = start_palette?;

        if let (Some(start_span), Some(end_span), Some(end_palette)) =
            (start_span, end_span, end_palette)
        {
            let progress = map_linear(
                now_seconds,
                start_span.end_seconds,
                end_span.start_seconds,
                0.0,
                1.0,
                true,
            );

            Some(ModePalette {
                colors: palette::blend_colors(&start_palette.colors, &end_palette.colors, progress),
                cycles: start_palette.cycles.clone(),
                mode_label,
                palette_label: format!("{} -> {}", start_palette.name, end_palette.name),
            })
        } else {
            Some(ModePalette {
                colors: start_palette.colors.clone(),
                cycles: start_palette.cycles.clone(),
                mode_label,
                palette_label: start_palette.name.clone(),
            })
        }
    }

    fn draw(&mut self, now_seconds: f64) -> DrawStatus {
        let mut status = DrawStatus::default();

        if self.data.width == 0 || self.data.height == 0 {
            status.error = "No base pixels.".to_string();
            return status;
        }

        if self.current_colors.is_empty() {
            status.error = "No palette.".to_string();
            return status;
        }

        if self.is_bad && !self.first_draw {
            status.error = "The palette sequence in the current mode has overlaps.".to_string();
            return status;
        }

        self.first_draw = false;

        compositor::rasterize_base(&self.data.pixels, &self.current_colors, &mut self.pixel_data);

        let schedule_events = self.scheduler.get_events(&self.data, now_seconds);
        for schedule_event in schedule_events {
            let event_info = &schedule_event.event_info;
            let Some(overlay) = self
                .data
                .overlays
                .iter()
                .find(|overlay| overlay.id == event_info.overlay_id)
            else {
                continue;
            };

            if !event_info.name.is_empty() {
                status.events.push(event_info.name.clone());
            }

            status.overlays.push(overlay.name.clone());

            let base = event_info
                .start_position
                .lerp(event_info.end_position, schedule_event.progress);

            compositor::blit_overlay(
                &mut self.pixel_data,
                self.data.width,
                self.data.height,
                overlay,
                &self.current_colors,
                base.x.round() as i64,
                base.y.round() as i64,
            );
        }

        status
    }

    /// Replace the base image from normalized import data. Extra layers
    /// become overlays and the image's palette is loaded alongside.
    pub fn load_image(&mut self, data: &LbmData) -> DayglowResult<()> {
        let Some(base_layer) = data.layers.first() else {
            tracing::error!("image has no layers");
            return Err(DayglowError::validation("image has no layers"));
        };

        let expected = data.width as usize * data.height as usize;
        if base_layer.pixels.len() != expected {
            tracing::error!(
                pixels = base_layer.pixels.len(),
                width = data.width,
                height = data.height,
                "bad image size"
            );
            return Err(DayglowError::validation(format!(
                "pixel count {} does not match {}x{}",
                base_layer.pixels.len(),
                data.width,
                data.height
            )));
        }

        self.data.name = data.name.clone();
        self.data.width = data.width;
        self.data.height = data.height;
        self.data.pixels = base_layer.pixels.clone();

        for layer in &data.layers[1..] {
            let id = next_id(&self.data.overlays, |overlay| overlay.id);
            self.data.overlays.push(OverlayInfo {
                id,
                name: layer.name.clone(),
                width: data.width,
                height: data.height,
                pixels: layer.pixels.clone(),
            });
        }

        self.update_for_image();
        self.load_colors(data);
        Ok(())
    }

    /// Add every layer of `data` as an overlay.
    pub fn load_overlay(&mut self, data: &LbmData) -> DayglowResult<()> {
        if data.layers.is_empty() {
            tracing::error!("overlay has no layers");
            return Err(DayglowError::validation("overlay has no layers"));
        }

        for layer in &data.layers {
            let id = next_id(&self.data.overlays, |overlay| overlay.id);
            self.data.overlays.push(OverlayInfo {
                id,
                name: layer.name.clone(),
                width: data.width,
                height: data.height,
                pixels: layer.pixels.clone(),
            });
        }

        self.handle_change();
        Ok(())
    }

    /// Add `data`'s color table as a new palette. Degenerate cycles are
    /// dropped; an invalid `reverse` value is logged and kept.
    pub fn load_colors(&mut self, data: &LbmData) {
        let cycles: Vec<CycleSpec> = data
            .cycles
            .iter()
            .copied()
            .filter(|cycle| cycle.low != cycle.high)
            .collect();

        for cycle in &cycles {
            if cycle.reverse != 0 && cycle.reverse != 2 {
                tracing::warn!(reverse = cycle.reverse, "bad reverse value");
            }
        }

        self.data.palette_infos.push(PaletteInfo {
            id: next_id(&self.data.palette_infos, |palette| palette.id),
            name: data.name.clone(),
            colors: data.colors.clone(),
            cycles,
        });

        self.handle_change();
    }

    /// Delete a palette; mode spans referencing it fall back to "none".
    pub fn delete_palette(&mut self, palette_index: usize) {
        if palette_index >= self.data.palette_infos.len() {
            return;
        }

        let palette_info = self.data.palette_infos.remove(palette_index);
        for mode in &mut self.data.modes {
            for span in &mut mode.mode_palette_infos {
                if span.palette_id == palette_info.id {
                    span.palette_id = -1;
                }
            }
        }

        self.handle_change();
    }

    /// Edit a palette in place.
    pub fn update_palette(&mut self, palette_index: usize, edit: impl FnOnce(&mut PaletteInfo)) {
        if let Some(palette_info) = self.data.palette_infos.get_mut(palette_index) {
            edit(palette_info);
            self.handle_change();
        }
    }

    /// Delete an overlay; events referencing it fall back to "none".
    pub fn delete_overlay(&mut self, overlay_index: usize) {
        if overlay_index >= self.data.overlays.len() {
            return;
        }

        let overlay_info = self.data.overlays.remove(overlay_index);
        for event_info in &mut self.data.events {
            if event_info.overlay_id == overlay_info.id {
                event_info.overlay_id = -1;
            }
        }

        self.handle_change();
    }

    /// Edit an overlay in place.
    pub fn update_overlay(&mut self, overlay_index: usize, edit: impl FnOnce(&mut OverlayInfo)) {
        if let Some(overlay_info) = self.data.overlays.get_mut(overlay_index) {
            edit(overlay_info);
            self.handle_change();
        }
    }

    /// Look up an event by id.
    pub fn get_event_info(&self, id: i64) -> Option<&EventInfo> {
        self.data.events.iter().find(|event| event.id == id)
    }

    /// Add an empty event and return its id.
    pub fn add_event(&mut self) -> i64 {
        let id = next_id(&self.data.events, |event| event.id);
        self.data.events.push(EventInfo {
            id,
            name: format!("Event {id}"),
            ..EventInfo::default()
        });

        self.handle_change();
        id
    }

    /// Edit an event in place.
    pub fn update_event(&mut self, event_index: usize, edit: impl FnOnce(&mut EventInfo)) {
        if let Some(event_info) = self.data.events.get_mut(event_index) {
            edit(event_info);
            self.handle_change();
        }
    }

    /// Delete an event.
    pub fn delete_event(&mut self, event_index: usize) {
        if event_index >= self.data.events.len() {
            return;
        }

        self.data.events.remove(event_index);
        self.handle_change();
    }

    /// Add an empty mode and return its id.
    pub fn add_mode(&mut self) -> i64 {
        let id = next_id(&self.data.modes, |mode| mode.id);
        self.data.modes.push(ModeInfo {
            id,
            name: format!("Mode {id}"),
            mode_palette_infos: Vec::new(),
        });

        self.handle_change();
        id
    }

    /// Edit a mode in place.
    pub fn update_mode(&mut self, mode_index: usize, edit: impl FnOnce(&mut ModeInfo)) {
        if let Some(mode_info) = self.data.modes.get_mut(mode_index) {
            edit(mode_info);
            self.handle_change();
        }
    }

    /// Delete a mode.
    pub fn delete_mode(&mut self, mode_index: usize) {
        if mode_index >= self.data.modes.len() {
            return;
        }

        self.data.modes.remove(mode_index);
        self.sort_mode_palettes();
        self.handle_change();
    }

    /// Append a palette span to a mode. The previous last span is closed
    /// off to one minute and the new span starts shortly after it,
    /// running to the end of the day.
    pub fn add_mode_palette(&mut self, mode_index: usize) {
        let Some(mode_info) = self.data.modes.get_mut(mode_index) else {
            return;
        };

        let mut seconds = 0.0;
        if let Some(last) = mode_info.mode_palette_infos.last_mut() {
            last.end_seconds = last.start_seconds + 60.0;
            seconds = last.end_seconds + 5.0;
        }

        mode_info.mode_palette_infos.push(ModePaletteInfo {
            id: next_id(&mode_info.mode_palette_infos, |span| span.id),
            palette_id: -1,
            start_seconds: seconds,
            end_seconds: MAX_SECONDS - 1.0,
        });

        self.sort_mode_palettes();
        self.handle_change();
    }

    /// Edit one palette span in place; the span list is re-sorted and
    /// re-flagged afterward.
    pub fn update_mode_palette(
        &mut self,
        mode_index: usize,
        span_index: usize,
        edit: impl FnOnce(&mut ModePaletteInfo),
    ) {
        let Some(mode_info) = self.data.modes.get_mut(mode_index) else {
            return;
        };
        let Some(span) = mode_info.mode_palette_infos.get_mut(span_index) else {
            return;
        };

        edit(span);
        self.sort_mode_palettes();
        self.handle_change();
    }

    /// Delete one palette span.
    pub fn delete_mode_palette(&mut self, mode_index: usize, span_index: usize) {
        let Some(mode_info) = self.data.modes.get_mut(mode_index) else {
            return;
        };
        if span_index >= mode_info.mode_palette_infos.len() {
            return;
        }

        mode_info.mode_palette_infos.remove(span_index);
        self.sort_mode_palettes();
        self.handle_change();
    }

    /// Sort every mode's spans ascending by start and recompute the
    /// "bad" flags: a span is bad when inverted or overlapping an
    /// adjacent span. Bad data still persists; only drawing is gated.
    pub fn sort_mode_palettes(&mut self) {
        self.mode_palette_statuses.clear();
        // TODO: track badness per mode instead of one world-wide flag.
        self.is_bad = false;

        for mode in &mut self.data.modes {
            let spans = &mut mode.mode_palette_infos;
            spans.sort_by(|a, b| a.start_seconds.total_cmp(&b.start_seconds));

            let mut statuses = vec![SpanStatus::Good; spans.len()];
            for i in 0..spans.len() {
                if spans[i].end_seconds < spans[i].start_seconds {
                    statuses[i] = SpanStatus::Bad;
                    self.is_bad = true;
                }

                if i + 1 < spans.len() && spans[i].end_seconds > spans[i + 1].start_seconds {
                    statuses[i] = SpanStatus::Bad;
                    statuses[i + 1] = SpanStatus::Bad;
                    self.is_bad = true;
                }
            }

            self.mode_palette_statuses.push(statuses);
        }
    }

    /// Serialize the aggregate into the persistence envelope.
    pub fn serialize(&self) -> DayglowResult<String> {
        store::serialize_world(&self.data)
    }

    /// Replace the aggregate from a data payload of the given schema
    /// version, upgrading legacy payloads first.
    pub fn ingest(&mut self, value: serde_json::Value, version: u32) -> DayglowResult<()> {
        let data = store::ingest_value(value, version)?;
        self.data = data;
        self.sort_mode_palettes();
        self.update_for_image();
        Ok(())
    }

    /// Import an exported envelope, replacing the aggregate. The live
    /// state is untouched when the envelope is rejected.
    pub fn import_json(&mut self, json: &str) -> DayglowResult<()> {
        let (value, version) = store::parse_import(json)?;
        self.ingest(value, version)?;
        self.handle_change();
        Ok(())
    }

    fn update_for_image(&mut self) {
        self.first_draw = true;
        self.pixel_data =
            vec![0; 4 * self.data.width as usize * self.data.height as usize];
    }

    fn handle_change(&mut self) {
        self.persist();
        for observer in &mut self.observers {
            observer();
        }
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };

        match store::serialize_world(&self.data) {
            Ok(json) => {
                if let Err(err) = store.save(&json) {
                    tracing::warn!(%err, "saving world failed");
                }
            }
            Err(err) => tracing::warn!(%err, "serializing world failed"),
        }
    }
}

/// Slow presentational pan: a triangle wave over wall-clock milliseconds
/// translating an oversized surface inside its container by up to half
/// the overflow per axis. Pure; presenters apply the returned offset.
pub fn pan_offset(real_millis: f64, surface: Vec2, container: Vec2) -> Vec2 {
    let mut pan_factor = (real_millis * 0.000_000_1) % 2.0;
    if pan_factor > 1.0 {
        pan_factor = 2.0 - pan_factor;
    }

    let diff_x = surface.x - container.x;
    let diff_y = surface.y - container.y;

    let mut pan = Vec2::ZERO;
    if diff_x > 0.0 {
        pan.x = lerp(-diff_x / 2.0, diff_x / 2.0, pan_factor).round();
    }

    if diff_y > 0.0 {
        pan.y = lerp(-diff_y / 2.0, diff_y / 2.0, pan_factor).round();
    }

    pan
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/world/world.rs"]
mod tests;
