use super::*;

fn numbered_colors(count: usize) -> Vec<Rgb> {
    (0..count)
        .map(|i| [i as f64, i as f64, i as f64])
        .collect()
}

#[test]
fn blend_hits_both_endpoints_and_the_midpoint() {
    let start = vec![[0.0, 0.0, 0.0], [100.0, 50.0, 10.0]];
    let end = vec![[255.0, 255.0, 255.0], [0.0, 150.0, 10.0]];

    assert_eq!(blend_colors(&start, &end, 0.0), start);
    assert_eq!(blend_colors(&start, &end, 1.0), end);

    let mid = blend_colors(&start, &end, 0.5);
    assert_eq!(mid[0], [127.5, 127.5, 127.5]);
    assert_eq!(mid[1], [50.0, 100.0, 10.0]);
}

#[test]
fn blend_passes_unmatched_entries_through() {
    let start = vec![[10.0, 10.0, 10.0]];
    let end = vec![[20.0, 20.0, 20.0], [99.0, 99.0, 99.0]];

    let colors = blend_colors(&start, &end, 0.25);
    assert_eq!(colors.len(), 2);
    assert_eq!(colors[0], [12.5, 12.5, 12.5]);
    assert_eq!(colors[1], [99.0, 99.0, 99.0]);

    let colors = blend_colors(&end, &start, 0.25);
    assert_eq!(colors[1], [99.0, 99.0, 99.0]);
}

#[test]
fn cycle_rotates_only_inside_its_range() {
    let mut colors = numbered_colors(8);
    let cycles = [CycleSpec {
        low: 2,
        high: 5,
        rate: CYCLE_RATE_DIVISOR,
        reverse: 0,
    }];

    // One step per second at this rate.
    apply_cycles(&mut colors, &cycles, 1.0);

    let expected: Vec<Rgb> = [0, 1, 5, 2, 3, 4, 6, 7]
        .iter()
        .map(|&i| [f64::from(i), f64::from(i), f64::from(i)])
        .collect();
    assert_eq!(colors, expected);
}

#[test]
fn cycle_is_periodic_in_its_size() {
    let original = numbered_colors(8);
    let cycles = [CycleSpec {
        low: 2,
        high: 5,
        rate: CYCLE_RATE_DIVISOR,
        reverse: 0,
    }];

    // cycleSize steps later the table is back in original order.
    let mut colors = original.clone();
    apply_cycles(&mut colors, &cycles, 4.0);
    assert_eq!(colors, original);

    let mut colors = original.clone();
    apply_cycles(&mut colors, &cycles, 8.0);
    assert_eq!(colors, original);
}

#[test]
fn reverse_cycles_rotate_the_other_way() {
    let mut forward = numbered_colors(6);
    let mut backward = numbered_colors(6);
    let mut cycle = CycleSpec {
        low: 0,
        high: 5,
        rate: CYCLE_RATE_DIVISOR,
        reverse: 0,
    };

    apply_cycles(&mut forward, &[cycle], 1.0);
    cycle.reverse = 2;
    apply_cycles(&mut backward, &[cycle], 1.0);

    assert_eq!(forward[0], [5.0, 5.0, 5.0]);
    assert_eq!(backward[0], [1.0, 1.0, 1.0]);
}

#[test]
fn fractional_progress_floors_to_whole_steps() {
    let original = numbered_colors(8);
    let cycles = [CycleSpec {
        low: 2,
        high: 5,
        rate: CYCLE_RATE_DIVISOR,
        reverse: 0,
    }];

    let mut colors = original.clone();
    apply_cycles(&mut colors, &cycles, 0.9);
    assert_eq!(colors, original);

    let mut colors = original.clone();
    let mut one_step = original.clone();
    apply_cycles(&mut colors, &cycles, 1.5);
    apply_cycles(&mut one_step, &cycles, 1.0);
    assert_eq!(colors, one_step);
}

#[test]
fn unusable_cycle_ranges_are_skipped() {
    let original = numbered_colors(4);

    let mut colors = original.clone();
    apply_cycles(
        &mut colors,
        &[CycleSpec {
            low: 2,
            high: 9,
            rate: CYCLE_RATE_DIVISOR,
            reverse: 0,
        }],
        10.0,
    );
    assert_eq!(colors, original);

    let mut colors = original.clone();
    apply_cycles(
        &mut colors,
        &[CycleSpec {
            low: 3,
            high: 3,
            rate: CYCLE_RATE_DIVISOR,
            reverse: 0,
        }],
        10.0,
    );
    assert_eq!(colors, original);
}
