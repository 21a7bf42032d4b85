//! Viewport state machine for the piano roll
//!
//! The viewport is the visible window into (beat, pitch) space. All
//! operations are pure reducers: they consume a viewport and return the
//! next one, silently clamping instead of failing. Note-editing gestures
//! never touch the viewport; only pan/zoom operations do.

use serde::{Deserialize, Serialize};

/// Bounds on how far the viewport can zoom on each axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min_beats: f64,
    pub max_beats: f64,
    pub min_notes: f64,
    pub max_notes: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_beats: 1.0,
            max_beats: 64.0,
            min_notes: 12.0,
            max_notes: 88.0,
        }
    }
}

/// Visible beat and pitch ranges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub start_beat: f64,
    pub end_beat: f64,
    pub low_note: f64,
    pub high_note: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        // 8 beats starting at the clip head, C2-C6
        Self {
            start_beat: 0.0,
            end_beat: 8.0,
            low_note: 36.0,
            high_note: 84.0,
        }
    }
}

impl Viewport {
    pub fn beats_visible(&self) -> f64 {
        self.end_beat - self.start_beat
    }

    pub fn notes_visible(&self) -> f64 {
        self.high_note - self.low_note
    }

    /// Shift the time window, preserving its width. The window stays inside
    /// `[0, clip_length]` unless it is wider than the clip, in which case it
    /// pins to the clip head.
    #[must_use]
    pub fn pan_time(mut self, delta_beats: f64, clip_length: f64) -> Self {
        let width = self.beats_visible();
        let max_start = (clip_length - width).max(0.0);
        self.start_beat = (self.start_beat + delta_beats).clamp(0.0, max_start);
        self.end_beat = self.start_beat + width;
        self
    }

    /// Shift the pitch window, preserving its height, within the MIDI range.
    #[must_use]
    pub fn pan_pitch(mut self, delta_notes: f64) -> Self {
        let height = self.notes_visible();
        self.low_note = (self.low_note + delta_notes).clamp(0.0, 127.0 - height);
        self.high_note = self.low_note + height;
        self
    }

    /// Zoom the time axis around `anchor` (viewport center when None).
    /// `factor > 1` zooms out, `factor < 1` zooms in.
    #[must_use]
    pub fn zoom_time(self, factor: f64, anchor: Option<f64>, limits: &ZoomLimits) -> Self {
        let width = self.beats_visible();
        let anchor = anchor.unwrap_or(self.start_beat + width * 0.5);
        let ratio = (anchor - self.start_beat) / width;
        self.pan_zoom_time(anchor, ratio, factor, limits)
    }

    /// Zoom the pitch axis around `anchor` (viewport center when None).
    #[must_use]
    pub fn zoom_pitch(self, factor: f64, anchor: Option<f64>, limits: &ZoomLimits) -> Self {
        let height = self.notes_visible();
        let anchor = anchor.unwrap_or(self.high_note - height * 0.5);
        let ratio = (self.high_note - anchor) / height;
        self.pan_zoom_pitch(anchor, ratio, factor, limits)
    }

    /// Combined cursor-anchored pan/zoom on the time axis: after the resize
    /// the anchor beat sits at exactly `anchor_ratio` of the new width, so
    /// the point under the cursor does not move. The new width is clamped to
    /// the zoom limits; the start is clamped to zero but not against the
    /// clip length (zooming may reveal space past the clip end).
    #[must_use]
    pub fn pan_zoom_time(
        mut self,
        anchor_beat: f64,
        anchor_ratio: f64,
        factor: f64,
        limits: &ZoomLimits,
    ) -> Self {
        let width = (self.beats_visible() * factor).clamp(limits.min_beats, limits.max_beats);
        self.start_beat = (anchor_beat - anchor_ratio * width).max(0.0);
        self.end_beat = self.start_beat + width;
        self
    }

    /// Combined cursor-anchored pan/zoom on the pitch axis. The axis is
    /// inverted (high pitch at the top), so `anchor_ratio` measures from the
    /// top edge: `high = anchor + ratio * height`.
    #[must_use]
    pub fn pan_zoom_pitch(
        mut self,
        anchor_pitch: f64,
        anchor_ratio: f64,
        factor: f64,
        limits: &ZoomLimits,
    ) -> Self {
        let height = (self.notes_visible() * factor).clamp(limits.min_notes, limits.max_notes);
        let mut high = anchor_pitch + anchor_ratio * height;
        let mut low = high - height;
        if low < 0.0 {
            low = 0.0;
            high = height;
        }
        if high > 127.0 {
            high = 127.0;
            low = high - height;
        }
        self.low_note = low;
        self.high_note = high;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_pan_time_clamps_to_clip() {
        let vp = Viewport::default();
        let panned = vp.pan_time(-3.0, 16.0);
        assert_eq!(panned.start_beat, 0.0);
        assert_eq!(panned.end_beat, 8.0);

        let panned = vp.pan_time(100.0, 16.0);
        assert_eq!(panned.start_beat, 8.0);
        assert_eq!(panned.end_beat, 16.0);
    }

    #[test]
    fn test_pan_time_pins_to_zero_when_clip_shorter_than_view() {
        let vp = Viewport::default(); // 8 beats visible
        let panned = vp.pan_time(5.0, 4.0);
        assert_eq!(panned.start_beat, 0.0);
    }

    #[test]
    fn test_pan_pitch_clamps_to_midi_range() {
        let vp = Viewport::default();
        let height = vp.notes_visible();
        let panned = vp.pan_pitch(-100.0);
        assert_eq!(panned.low_note, 0.0);
        assert_eq!(panned.high_note, height);

        let panned = vp.pan_pitch(100.0);
        assert_eq!(panned.high_note, 127.0);
        assert_eq!(panned.low_note, 127.0 - height);
    }

    #[test]
    fn test_time_anchor_invariance() {
        let limits = ZoomLimits::default();
        let vp = Viewport {
            start_beat: 4.0,
            end_beat: 12.0,
            ..Viewport::default()
        };
        for &anchor in &[4.0, 5.5, 8.0, 11.9] {
            for &ratio in &[0.0, 0.25, 0.5, 0.9, 1.0] {
                for &factor in &[0.5, 0.9, 1.1, 2.0] {
                    let next = vp.pan_zoom_time(anchor, ratio, factor, &limits);
                    if next.start_beat == 0.0 {
                        continue; // anchor solution clipped by the domain edge
                    }
                    let new_ratio = (anchor - next.start_beat) / next.beats_visible();
                    assert!(
                        (new_ratio - ratio).abs() < EPS,
                        "anchor {anchor} ratio {ratio} factor {factor}: got {new_ratio}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_pitch_anchor_invariance() {
        let limits = ZoomLimits::default();
        let vp = Viewport::default();
        for &anchor in &[40.0, 60.0, 83.0] {
            for &ratio in &[0.1, 0.5, 0.95] {
                for &factor in &[0.5, 1.25] {
                    let next = vp.pan_zoom_pitch(anchor, ratio, factor, &limits);
                    if next.low_note == 0.0 || next.high_note == 127.0 {
                        continue;
                    }
                    let new_ratio = (next.high_note - anchor) / next.notes_visible();
                    assert!(
                        (new_ratio - ratio).abs() < EPS,
                        "anchor {anchor} ratio {ratio} factor {factor}: got {new_ratio}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_zoom_clamp_is_idempotent() {
        let limits = ZoomLimits::default();
        let mut vp = Viewport::default();
        for _ in 0..20 {
            vp = vp.zoom_time(4.0, None, &limits);
        }
        assert!((vp.beats_visible() - limits.max_beats).abs() < EPS);
        // One more zoom-out must not overshoot or oscillate
        let again = vp.zoom_time(4.0, None, &limits);
        assert!((again.beats_visible() - limits.max_beats).abs() < EPS);

        for _ in 0..20 {
            vp = vp.zoom_time(0.25, None, &limits);
        }
        assert!((vp.beats_visible() - limits.min_beats).abs() < EPS);
    }

    #[test]
    fn test_zoom_pitch_stays_inside_midi_range() {
        let limits = ZoomLimits::default();
        let mut vp = Viewport::default();
        for _ in 0..10 {
            vp = vp.zoom_pitch(2.0, Some(127.0), &limits);
            assert!(vp.low_note >= 0.0);
            assert!(vp.high_note <= 127.0);
            assert!(vp.notes_visible() <= limits.max_notes + EPS);
        }
    }

    #[test]
    fn test_zoom_time_may_extend_past_clip_end() {
        let limits = ZoomLimits::default();
        let vp = Viewport::default().zoom_time(4.0, Some(8.0), &limits);
        assert!(vp.end_beat > 8.0);
        assert!(vp.start_beat >= 0.0);
    }
}
