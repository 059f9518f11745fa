use crate::foundation::core::{CYCLE_RATE_DIVISOR, Rgb};
use crate::world::data::CycleSpec;

/// Channel-wise linear blend of two color tables. The result covers the
/// longer table; entries missing on one side pass through from the other.
/// Channels are left as floats; clamping happens at pixel write.
pub fn blend_colors(start_colors: &[Rgb], end_colors: &[Rgb], progress: f64) -> Vec<Rgb> {
    let count = start_colors.len().max(end_colors.len());
    let mut colors = Vec::with_capacity(count);

    for i in 0..count {
        let color = match (start_colors.get(i), end_colors.get(i)) {
            (Some(start), Some(end)) => [
                start[0] + (end[0] - start[0]) * progress,
                start[1] + (end[1] - start[1]) * progress,
                start[2] + (end[2] - start[2]) * progress,
            ],
            (Some(start), None) => *start,
            (None, Some(end)) => *end,
            (None, None) => [0.0, 0.0, 0.0],
        };
        colors.push(color);
    }

    colors
}

/// Rotate each cycle's `[low, high]` sub-range by the whole steps accrued
/// at `real_seconds`. A closed-form index rotation, so the table returns
/// to its original order every `size / (rate / divisor)` seconds
/// regardless of frame rate. Rotation never touches entries outside the
/// range.
pub fn apply_cycles(colors: &mut [Rgb], cycles: &[CycleSpec], real_seconds: f64) {
    for cycle in cycles {
        if cycle.high <= cycle.low || cycle.high >= colors.len() {
            tracing::debug!(low = cycle.low, high = cycle.high, "skipping unusable cycle range");
            continue;
        }

        let size = cycle.size();
        let rate = cycle.rate / CYCLE_RATE_DIVISOR;
        let amount = (rate * real_seconds).rem_euclid(size as f64);
        let steps = amount.floor() as usize % size;
        if steps == 0 {
            continue;
        }

        let range = &mut colors[cycle.low..=cycle.high];
        if cycle.reverse == 2 {
            range.rotate_left(steps);
        } else {
            range.rotate_right(steps);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/palette.rs"]
mod tests;
