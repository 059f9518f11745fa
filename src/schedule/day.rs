use crate::foundation::core::MAX_SECONDS;
use crate::foundation::math::{Rng64, seed_from_str};
use crate::schedule::scheduler::EventTrigger;
use crate::world::data::WorldData;

const HOUR: f64 = 3600.0;
const MINUTE: f64 = 60.0;

/// A generated span assigning a mode to a portion of the simulated day.
/// Produced only by [`generate_day`]; never persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModePlan {
    /// Assigned mode.
    pub mode_id: i64,
    /// Plan start, seconds-of-day.
    pub start_seconds: f64,
    /// Plan end, seconds-of-day.
    pub end_seconds: f64,
}

/// A full generated day: event triggers sorted by start time plus mode
/// plans covering the day with gaps to blend across.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DaySchedule {
    /// Generated event occurrences, ascending by start time.
    pub triggers: Vec<EventTrigger>,
    /// Generated mode plans, ascending and non-overlapping.
    pub plans: Vec<ModePlan>,
}

/// Generate the ambient schedule for one calendar day. Seeded by the date
/// string, so the same date always yields the same layout.
pub fn generate_day(data: &WorldData, date: &str) -> DaySchedule {
    let mut rng = Rng64::new(seed_from_str(date));

    let mut triggers = Vec::new();
    for event in &data.events {
        if event.duration_seconds <= 0.0 {
            continue;
        }

        // One candidate start per hour bucket, skipping any placement that
        // would overlap the previous occurrence or run past the day.
        let mut bucket = 0.0;
        let mut prev_end = 0.0;
        while bucket < MAX_SECONDS {
            let start = bucket + rng.next_range(0.0, HOUR);
            if start >= prev_end && start + event.duration_seconds <= MAX_SECONDS {
                triggers.push(EventTrigger::at(event.id, start));
                prev_end = start + event.duration_seconds;
            }

            bucket += HOUR;
            while bucket < prev_end {
                bucket += HOUR;
            }
        }
    }

    triggers.sort_by(|a, b| a.start_seconds.total_cmp(&b.start_seconds));

    // Only modes that actually claim a palette somewhere are candidates.
    let candidate_ids: Vec<i64> = data
        .modes
        .iter()
        .filter(|mode| {
            mode.mode_palette_infos
                .iter()
                .any(|span| span.palette_id != -1)
        })
        .map(|mode| mode.id)
        .collect();

    let mut plans: Vec<ModePlan> = Vec::new();
    if !candidate_ids.is_empty() {
        let mut t = 0.0;
        while t < MAX_SECONDS {
            let mode_id = *rng.pick(&candidate_ids);
            let duration = rng.next_range(HOUR, 4.0 * HOUR);
            let gap = rng.next_range(5.0 * MINUTE, 30.0 * MINUTE);
            let end_seconds = (t + duration).min(MAX_SECONDS);

            match plans.last_mut() {
                // A repeated pick stretches the previous plan across the gap.
                Some(last) if last.mode_id == mode_id => last.end_seconds = end_seconds,
                _ => plans.push(ModePlan {
                    mode_id,
                    start_seconds: t,
                    end_seconds,
                }),
            }

            t = end_seconds + gap;
        }
    }

    DaySchedule { triggers, plans }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/day.rs"]
mod tests;
