use egui::{Pos2, Rect, pos2};
use tessitura_core::{Clip, Note, NoteId, Viewport, snap};

use super::types::HitZone;

/// Pixel distance from a note edge that grabs a resize handle instead of
/// the note body
pub(super) const RESIZE_THRESHOLD: f32 = 6.0;

/// Per-frame mapping between (beat, pitch) space and the grid rectangle.
///
/// Every visual element (ruler, grid lines, notes, keyboard, playhead) is
/// drawn through one shared `GridScale`, so they cannot disagree about where
/// a beat or pitch lives on screen during pan/zoom. Rebuilt whenever the
/// viewport or the grid rectangle changes.
#[derive(Clone, Copy, Debug)]
pub struct GridScale {
    viewport: Viewport,
    rect: Rect,
    snap_to_beat: f64,
}

impl GridScale {
    pub fn new(viewport: Viewport, rect: Rect, snap_to_beat: f64) -> Self {
        Self {
            viewport,
            rect,
            snap_to_beat,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn snap_to_beat(&self) -> f64 {
        self.snap_to_beat
    }

    pub fn pixels_per_beat(&self) -> f32 {
        (self.rect.width() as f64 / self.viewport.beats_visible()) as f32
    }

    /// Rows counted inclusively: both low_note and high_note are visible
    fn note_range(&self) -> f64 {
        self.viewport.high_note - self.viewport.low_note + 1.0
    }

    pub fn note_height(&self) -> f32 {
        (self.rect.height() as f64 / self.note_range()) as f32
    }

    pub fn beat_to_x(&self, beat: f64) -> f32 {
        let t = (beat - self.viewport.start_beat) / self.viewport.beats_visible();
        self.rect.left() + (t * self.rect.width() as f64) as f32
    }

    /// Pixel to beat, unsnapped
    pub fn x_to_beat_raw(&self, x: f32) -> f64 {
        let t = (x - self.rect.left()) as f64 / self.rect.width() as f64;
        self.viewport.start_beat + t * self.viewport.beats_visible()
    }

    /// Pixel to beat, snapped to the editing grid
    pub fn x_to_beat(&self, x: f32) -> f64 {
        snap(self.x_to_beat_raw(x), self.snap_to_beat)
    }

    /// Top edge of the row for `pitch`; rows run top-down with the highest
    /// visible pitch's row starting at the rect top
    pub fn pitch_to_y(&self, pitch: f64) -> f32 {
        let rows_down = (self.viewport.high_note - pitch) / self.note_range();
        self.rect.top() + (rows_down * self.rect.height() as f64) as f32
    }

    /// Pixel to integer pitch: the pitch whose row contains `y`,
    /// clamped to the MIDI range. A row's top edge belongs to that row,
    /// hence the ceil on the inverted axis.
    pub fn y_to_pitch(&self, y: f32) -> u8 {
        let rows_down = (y - self.rect.top()) / self.note_height();
        let pitch = (self.viewport.high_note - rows_down as f64).ceil();
        pitch.clamp(0.0, 127.0) as u8
    }

    /// Cursor anchor for a time zoom: the beat under `x` and its current
    /// ratio across the viewport width
    pub fn zoom_anchor_beat(&self, x: f32) -> (f64, f64) {
        let ratio = ((x - self.rect.left()) / self.rect.width()) as f64;
        (self.x_to_beat_raw(x), ratio)
    }

    /// Cursor anchor for a pitch zoom; the ratio measures from the top edge
    /// to match the inverted axis
    pub fn zoom_anchor_pitch(&self, y: f32) -> (f64, f64) {
        let ratio = ((y - self.rect.top()) / self.rect.height()) as f64;
        let anchor = self.viewport.high_note - ratio * self.viewport.notes_visible();
        (anchor, ratio)
    }

    /// Rendered bounding box of a note
    pub fn note_rect(&self, note: &Note) -> Rect {
        let x0 = self.beat_to_x(note.start_beat);
        let x1 = self.beat_to_x(note.end_beat());
        let y = self.pitch_to_y(note.pitch as f64);
        Rect::from_min_max(pos2(x0, y), pos2(x1, y + self.note_height()))
    }

    /// Hit-test the pointer against every note box. Overlapping notes
    /// resolve to the most recently created one (highest id). The edge
    /// zones within [`RESIZE_THRESHOLD`] of a note's ends grab a resize;
    /// a note too narrow for both zones yields whichever edge is closer.
    pub(super) fn hit_test(&self, clip: &Clip, pos: Pos2) -> Option<(NoteId, HitZone)> {
        let hit = clip
            .notes
            .iter()
            .filter(|n| self.note_rect(n).contains(pos))
            .max_by_key(|n| n.id)?;

        let rect = self.note_rect(hit);
        let from_start = pos.x - rect.left();
        let from_end = rect.right() - pos.x;
        let zone = if from_start <= RESIZE_THRESHOLD && from_start <= from_end {
            HitZone::StartEdge
        } else if from_end <= RESIZE_THRESHOLD {
            HitZone::EndEdge
        } else {
            HitZone::Body
        };
        Some((hit.id, zone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::vec2;
    use tessitura_core::ClipId;

    fn scale() -> GridScale {
        // 100 px/beat, 10 px/row: beat n sits at x = 100n, pitch p's row
        // top at y = (84 - p) * 10
        let viewport = Viewport {
            start_beat: 0.0,
            end_beat: 8.0,
            low_note: 36.0,
            high_note: 84.0,
        };
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 490.0));
        GridScale::new(viewport, rect, 0.25)
    }

    #[test]
    fn test_beat_x_round_trip() {
        let scale = scale();
        assert_eq!(scale.beat_to_x(0.0), 0.0);
        assert_eq!(scale.beat_to_x(8.0), 800.0);
        for &beat in &[0.0, 0.5, 3.25, 7.75] {
            let back = scale.x_to_beat_raw(scale.beat_to_x(beat));
            assert!((back - beat).abs() < 1e-6);
        }
    }

    #[test]
    fn test_x_to_beat_snaps() {
        let scale = scale();
        assert_eq!(scale.x_to_beat(130.0), 1.25);
        assert_eq!(scale.x_to_beat(110.0), 1.0);
    }

    #[test]
    fn test_highest_pitch_row_starts_at_top() {
        let scale = scale();
        assert_eq!(scale.pitch_to_y(84.0), 0.0);
        assert_eq!(scale.note_height(), 10.0);
        // The bottom row ends at the rect bottom
        assert_eq!(scale.pitch_to_y(36.0) + scale.note_height(), 490.0);
    }

    #[test]
    fn test_y_to_pitch_row_containment() {
        let scale = scale();
        for pitch in 36..=84u8 {
            let top = scale.pitch_to_y(pitch as f64);
            assert_eq!(scale.y_to_pitch(top), pitch);
            assert_eq!(scale.y_to_pitch(top + 9.9), pitch);
        }
    }

    #[test]
    fn test_y_to_pitch_clamps_to_midi_range() {
        let viewport = Viewport {
            start_beat: 0.0,
            end_beat: 8.0,
            low_note: 0.0,
            high_note: 127.0,
        };
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 128.0));
        let scale = GridScale::new(viewport, rect, 0.25);
        assert_eq!(scale.y_to_pitch(-50.0), 127);
        assert_eq!(scale.y_to_pitch(500.0), 0);
    }

    #[test]
    fn test_hit_test_zones() {
        let scale = scale();
        let mut clip = Clip::new(ClipId(1), 8.0);
        let id = clip.add_note(60, 0.0, 1.0, 0.8);

        let y = scale.pitch_to_y(60.0) + 5.0;
        assert_eq!(scale.hit_test(&clip, pos2(50.0, y)), Some((id, HitZone::Body)));
        assert_eq!(
            scale.hit_test(&clip, pos2(3.0, y)),
            Some((id, HitZone::StartEdge))
        );
        assert_eq!(
            scale.hit_test(&clip, pos2(97.0, y)),
            Some((id, HitZone::EndEdge))
        );
        assert_eq!(scale.hit_test(&clip, pos2(50.0, y + 10.0)), None);
        assert_eq!(scale.hit_test(&clip, pos2(150.0, y)), None);
    }

    #[test]
    fn test_hit_test_overlap_resolves_to_newest() {
        let scale = scale();
        let mut clip = Clip::new(ClipId(1), 8.0);
        let _older = clip.add_note(60, 0.0, 1.0, 0.8);
        let newer = clip.add_note(60, 0.0, 1.0, 0.8);

        let y = scale.pitch_to_y(60.0) + 5.0;
        let (hit, _) = scale.hit_test(&clip, pos2(50.0, y)).unwrap();
        assert_eq!(hit, newer);
    }
}
