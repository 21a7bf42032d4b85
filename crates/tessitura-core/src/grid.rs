//! Grid snapping and adaptive density
//!
//! The ruler and the note grid both derive their line positions from here
//! so their densities always agree.

use serde::{Deserialize, Serialize};

/// Tolerance when deciding whether a beat lands on a grid boundary
pub const BEAT_EPSILON: f64 = 1e-3;

/// Beats per bar (4/4 assumed throughout)
pub const BEATS_PER_BAR: f64 = 4.0;

/// Snap a value to the nearest multiple of `grid`
pub fn snap(value: f64, grid: f64) -> f64 {
    if grid <= 0.0 {
        return value;
    }
    (value / grid).round() * grid
}

/// Coarsest grid step that still reads clearly at the given zoom
pub fn grid_step(pixels_per_beat: f32) -> f64 {
    if pixels_per_beat >= 120.0 {
        0.125 // 32nd notes
    } else if pixels_per_beat >= 60.0 {
        0.25 // 16th notes
    } else if pixels_per_beat >= 30.0 {
        0.5 // 8th notes
    } else if pixels_per_beat >= 15.0 {
        1.0 // quarter notes
    } else {
        BEATS_PER_BAR
    }
}

/// Weight class of a grid line, from heaviest to lightest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeatKind {
    Bar,
    Beat,
    Subbeat,
    Fine,
}

/// Classify a beat position by the coarsest boundary it lands on
pub fn classify_beat(beat: f64) -> BeatKind {
    let lands_on = |grid: f64| (beat - snap(beat, grid)).abs() < BEAT_EPSILON;
    if lands_on(BEATS_PER_BAR) {
        BeatKind::Bar
    } else if lands_on(1.0) {
        BeatKind::Beat
    } else if lands_on(0.25) {
        BeatKind::Subbeat
    } else {
        BeatKind::Fine
    }
}

/// Beat positions of every grid line covering the visible range, inclusive
/// of one extra line beyond the end so partial-pixel scrolling never opens
/// a gap at the right edge.
pub fn beat_columns(start_beat: f64, end_beat: f64, pixels_per_beat: f32) -> Vec<f64> {
    let step = grid_step(pixels_per_beat);
    let mut columns = Vec::new();
    let mut pos = (start_beat / step).floor() * step;
    while pos <= end_beat + step {
        columns.push(pos);
        pos += step;
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_rounds_to_nearest() {
        assert_eq!(snap(0.6, 0.25), 0.5);
        assert_eq!(snap(0.63, 0.25), 0.75);
        assert_eq!(snap(-0.1, 0.25), 0.0);
        assert_eq!(snap(3.0, 1.0), 3.0);
    }

    #[test]
    fn test_snap_is_idempotent() {
        for &value in &[0.0, 0.1, 0.37, 1.999, 17.03, -2.6] {
            for &grid in &[0.125, 0.25, 0.5, 1.0, 4.0] {
                let once = snap(value, grid);
                assert_eq!(snap(once, grid), once, "value {value} grid {grid}");
            }
        }
    }

    #[test]
    fn test_snap_ignores_degenerate_grid() {
        assert_eq!(snap(1.23, 0.0), 1.23);
    }

    #[test]
    fn test_grid_step_thresholds() {
        assert_eq!(grid_step(160.0), 0.125);
        assert_eq!(grid_step(120.0), 0.125);
        assert_eq!(grid_step(80.0), 0.25);
        assert_eq!(grid_step(40.0), 0.5);
        assert_eq!(grid_step(20.0), 1.0);
        assert_eq!(grid_step(10.0), 4.0);
    }

    #[test]
    fn test_classify_beat() {
        assert_eq!(classify_beat(0.0), BeatKind::Bar);
        assert_eq!(classify_beat(8.0), BeatKind::Bar);
        assert_eq!(classify_beat(3.0), BeatKind::Beat);
        assert_eq!(classify_beat(1.25), BeatKind::Subbeat);
        assert_eq!(classify_beat(0.125), BeatKind::Fine);
        // Within tolerance of a bar line counts as the bar line
        assert_eq!(classify_beat(4.0005), BeatKind::Bar);
    }

    #[test]
    fn test_beat_columns_cover_range_with_trailing_line() {
        let columns = beat_columns(1.9, 6.0, 20.0); // quarter-note step
        assert_eq!(columns.first().copied(), Some(1.0));
        let last = *columns.last().unwrap();
        assert!(last > 6.0, "one line past the end, got {last}");
        assert!(last <= 7.0);
        for pair in columns.windows(2) {
            assert!((pair[1] - pair[0] - 1.0).abs() < 1e-12);
        }
    }
}
