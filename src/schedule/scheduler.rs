use crate::foundation::core::MAX_SECONDS;
use crate::foundation::math::map_linear;
use crate::schedule::day::{DaySchedule, ModePlan, generate_day};
use crate::world::data::{EventInfo, ModeInfo, ModePaletteInfo, WorldData};

/// One installed event occurrence. Either an explicit progress (scrubbing
/// via external controls) or a start time whose progress is derived at
/// query time from the event's duration.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EventTrigger {
    /// Referenced [`EventInfo`] id.
    pub event_info_id: i64,
    /// Explicit progress in `[0, 1]`, passed through as-is.
    pub progress: Option<f64>,
    /// Occurrence start, seconds-of-day.
    pub start_seconds: f64,
}

impl EventTrigger {
    /// Trigger that starts at `start_seconds` and runs for the event's
    /// duration.
    pub fn at(event_info_id: i64, start_seconds: f64) -> Self {
        Self {
            event_info_id,
            progress: None,
            start_seconds,
        }
    }

    /// Trigger pinned to an explicit progress.
    pub fn with_progress(event_info_id: i64, progress: f64) -> Self {
        Self {
            event_info_id,
            progress: Some(progress),
            start_seconds: 0.0,
        }
    }
}

/// A resolved schedule entry: which event, and how far along it is.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleEvent {
    /// The resolved event (synthetic for a pinned overlay).
    pub event_info: EventInfo,
    /// Progress in `[0, 1]`.
    pub progress: f64,
}

/// Where the current schedule comes from. Exactly one source is active at
/// a time; installing any source replaces the previous one.
#[derive(Clone, Debug, PartialEq)]
pub enum ScheduleSource {
    /// Ad-hoc triggers installed via [`Scheduler::make`].
    Triggers(Vec<EventTrigger>),
    /// Generated ambient schedule from [`Scheduler::make_day`].
    DayPlan(DaySchedule),
    /// Editor preview: a single pinned mode.
    PinnedMode(i64),
    /// Editor preview: a single pinned palette.
    PinnedPalette(i64),
    /// Editor preview: a single pinned overlay at the origin.
    PinnedOverlay(i64),
}

impl Default for ScheduleSource {
    fn default() -> Self {
        Self::Triggers(Vec::new())
    }
}

/// The mode(s) active at a point in time. `end_mode` is present only when
/// blending across the gap between two generated plans.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CurrentModes {
    /// Mode in effect (or the blend's start side).
    pub start_mode: Option<ModeInfo>,
    /// Blend end side, if a gap between plans is being crossed.
    pub end_mode: Option<ModeInfo>,
    /// Blend progress in `[0, 1]`; 0 when not blending.
    pub progress: f64,
}

/// Owns the time-indexed schedule and answers "what is active now"
/// queries against a [`WorldData`].
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    source: ScheduleSource,
}

impl Scheduler {
    /// New scheduler with nothing installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active schedule source.
    pub fn source(&self) -> &ScheduleSource {
        &self.source
    }

    /// Install a single ad-hoc trigger, replacing any existing schedule.
    pub fn make(&mut self, trigger: EventTrigger) {
        self.source = ScheduleSource::Triggers(vec![trigger]);
    }

    /// Generate and install the ambient schedule for `date` (seeded, so
    /// the same date reproduces the same layout).
    pub fn make_day(&mut self, data: &WorldData, date: &str) {
        self.source = ScheduleSource::DayPlan(generate_day(data, date));
    }

    /// Pin a single mode for preview, clearing everything else.
    pub fn set_mode(&mut self, id: i64) {
        self.source = ScheduleSource::PinnedMode(id);
    }

    /// Pin a single palette for preview, clearing everything else.
    pub fn set_palette(&mut self, id: i64) {
        self.source = ScheduleSource::PinnedPalette(id);
    }

    /// Pin a single overlay for preview, clearing everything else.
    pub fn set_overlay(&mut self, id: i64) {
        self.source = ScheduleSource::PinnedOverlay(id);
    }

    /// Drop any installed schedule or pin.
    pub fn clear(&mut self) {
        self.source = ScheduleSource::default();
    }

    /// Resolve every installed trigger that is live at `now_seconds`.
    /// Entries outside their window are dropped, not returned as empty.
    pub fn get_events(&self, data: &WorldData, now_seconds: f64) -> Vec<ScheduleEvent> {
        let mut events = Vec::new();

        match &self.source {
            ScheduleSource::Triggers(triggers)
            | ScheduleSource::DayPlan(DaySchedule { triggers, .. }) => {
                for trigger in triggers {
                    let Some(event_info) = data
                        .events
                        .iter()
                        .find(|event| event.id == trigger.event_info_id)
                    else {
                        continue;
                    };

                    if let Some(progress) = trigger.progress {
                        events.push(ScheduleEvent {
                            event_info: event_info.clone(),
                            progress,
                        });
                        continue;
                    }

                    if event_info.duration_seconds <= 0.0 {
                        continue;
                    }

                    let progress =
                        (now_seconds - trigger.start_seconds) / event_info.duration_seconds;
                    if (0.0..=1.0).contains(&progress) {
                        events.push(ScheduleEvent {
                            event_info: event_info.clone(),
                            progress,
                        });
                    }
                }
            }
            ScheduleSource::PinnedOverlay(overlay_id) => {
                // Pseudo-event pinning the overlay at the origin all day.
                events.push(ScheduleEvent {
                    event_info: EventInfo {
                        id: -1,
                        duration_seconds: MAX_SECONDS,
                        overlay_id: *overlay_id,
                        ..EventInfo::default()
                    },
                    progress: 0.0,
                });
            }
            ScheduleSource::PinnedMode(_) | ScheduleSource::PinnedPalette(_) => {}
        }

        events
    }

    /// Resolve the mode(s) active at `now_seconds`. A pinned palette wins
    /// over a pinned mode, which wins over the generated plan; with no
    /// plans the first defined mode holds all day.
    pub fn current_modes(&self, data: &WorldData, now_seconds: f64) -> CurrentModes {
        match &self.source {
            ScheduleSource::PinnedPalette(palette_id) => CurrentModes {
                start_mode: Some(synthetic_palette_mode(*palette_id)),
                end_mode: None,
                progress: 0.0,
            },
            ScheduleSource::PinnedMode(mode_id) => CurrentModes {
                start_mode: data.modes.iter().find(|mode| mode.id == *mode_id).cloned(),
                end_mode: None,
                progress: 0.0,
            },
            ScheduleSource::DayPlan(schedule) if !schedule.plans.is_empty() => {
                resolve_plans(data, &schedule.plans, now_seconds)
            }
            _ => CurrentModes {
                start_mode: data.modes.first().cloned(),
                end_mode: None,
                progress: 0.0,
            },
        }
    }
}

/// Wrap a palette as a single-span mode covering the whole day, so the
/// compositor can resolve a pinned palette through the same path as any
/// other mode.
fn synthetic_palette_mode(palette_id: i64) -> ModeInfo {
    ModeInfo {
        id: -1,
        name: String::new(),
        mode_palette_infos: vec![ModePaletteInfo {
            id: -1,
            palette_id,
            start_seconds: 0.0,
            end_seconds: MAX_SECONDS - 1.0,
        }],
    }
}

/// Containment-first scan over sorted, non-overlapping plans: the first
/// plan containing `now` wins outright; otherwise blend between the last
/// plan before `now` and the first one after it.
fn resolve_plans(data: &WorldData, plans: &[ModePlan], now_seconds: f64) -> CurrentModes {
    let mut start_plan: Option<&ModePlan> = None;
    let mut end_plan: Option<&ModePlan> = None;

    for plan in plans {
        if now_seconds >= plan.start_seconds {
            start_plan = Some(plan);
            if now_seconds < plan.end_seconds {
                end_plan = None;
                break;
            }
        } else if start_plan.is_some() {
            end_plan = Some(plan);
            break;
        } else {
            start_plan = Some(plan);
            break;
        }
    }

    let find_mode =
        |id: i64| -> Option<ModeInfo> { data.modes.iter().find(|mode| mode.id == id).cloned() };

    let start_mode = start_plan.and_then(|plan| find_mode(plan.mode_id));
    let (end_mode, progress) = match (start_plan, end_plan) {
        (Some(start), Some(end)) => (
            find_mode(end.mode_id),
            map_linear(
                now_seconds,
                start.end_seconds,
                end.start_seconds,
                0.0,
                1.0,
                true,
            ),
        ),
        _ => (None, 0.0),
    };

    CurrentModes {
        start_mode,
        end_mode,
        progress,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/scheduler.rs"]
mod tests;
