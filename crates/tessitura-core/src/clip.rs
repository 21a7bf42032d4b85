//! Clip and note data model

use serde::{Deserialize, Serialize};

use crate::error::{Result, TessituraError};

/// Unique identifier for clips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(pub u64);

/// Unique identifier for a note within a clip. Allocated monotonically;
/// a higher id means the note was created later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub u64);

/// A single note event, positioned in beats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// MIDI note number (0-127, 60 = middle C)
    pub pitch: u8,
    /// Start position in beats
    pub start_beat: f64,
    /// Length in beats
    pub duration: f64,
    /// Normalized velocity (0.0-1.0)
    pub velocity: f32,
}

impl Note {
    /// End position in beats (start + duration)
    pub fn end_beat(&self) -> f64 {
        self.start_beat + self.duration
    }

    /// Check host-supplied values against the domain invariants.
    pub fn validate(&self) -> Result<()> {
        if self.pitch > 127 {
            return Err(TessituraError::PitchOutOfRange(self.pitch));
        }
        if self.start_beat < 0.0 {
            return Err(TessituraError::NegativeStart(self.start_beat));
        }
        if self.duration <= 0.0 {
            return Err(TessituraError::NonPositiveDuration(self.duration));
        }
        Ok(())
    }
}

/// A clip of notes plus its loop region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: ClipId,
    /// Clip name/label
    pub name: String,
    /// Length in beats
    pub length: f64,
    /// Notes sorted by start_beat
    pub notes: Vec<Note>,
    /// Loop start in beats; None means the clip start
    pub loop_start: Option<f64>,
    /// Loop end in beats; None means the clip end
    pub loop_end: Option<f64>,
    /// Serialized with the clip so reloading never reuses note ids
    next_note_id: u64,
}

impl Clip {
    pub fn new(id: ClipId, length: f64) -> Self {
        Self {
            id,
            name: String::new(),
            length,
            notes: Vec::new(),
            loop_start: None,
            loop_end: None,
            next_note_id: 0,
        }
    }

    /// Resolved loop region: defaults to the whole clip
    pub fn loop_bounds(&self) -> (f64, f64) {
        (
            self.loop_start.unwrap_or(0.0),
            self.loop_end.unwrap_or(self.length),
        )
    }

    /// Set the loop region, clamping so `start >= 0` and
    /// `end >= start + min_gap`. Returns the bounds actually applied.
    pub fn set_loop(&mut self, start: f64, end: f64, min_gap: f64) -> (f64, f64) {
        let start = start.max(0.0);
        let end = end.max(start + min_gap);
        self.loop_start = Some(start);
        self.loop_end = Some(end);
        (start, end)
    }

    /// Add a note, keeping notes sorted by start_beat. Returns the new id.
    pub fn add_note(&mut self, pitch: u8, start_beat: f64, duration: f64, velocity: f32) -> NoteId {
        let id = NoteId(self.next_note_id);
        self.next_note_id = self.next_note_id.saturating_add(1);
        let note = Note {
            id,
            pitch: pitch.min(127),
            start_beat: start_beat.max(0.0),
            duration,
            velocity: velocity.clamp(0.0, 1.0),
        };
        let idx = self
            .notes
            .iter()
            .position(|n| n.start_beat > note.start_beat)
            .unwrap_or(self.notes.len());
        self.notes.insert(idx, note);
        id
    }

    /// Remove every note whose id appears in `ids`
    pub fn remove_many(&mut self, ids: &[NoteId]) {
        self.notes.retain(|n| !ids.contains(&n.id));
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn note_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| n.id == id)
    }

    /// Restore the sorted-by-start invariant after edits move notes in time
    pub fn sort_notes(&mut self) {
        self.notes
            .sort_by(|a, b| a.start_beat.total_cmp(&b.start_beat));
    }

    /// Validate host-supplied clip data. Interactive edits clamp instead;
    /// this is for data arriving from outside the editor.
    pub fn validate(&self) -> Result<()> {
        if self.length <= 0.0 {
            return Err(TessituraError::NonPositiveLength(self.length));
        }
        for note in &self.notes {
            note.validate()?;
        }
        if let (Some(start), Some(end)) = (self.loop_start, self.loop_end) {
            if start >= end {
                return Err(TessituraError::InvertedLoop { start, end });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip_with_notes() -> Clip {
        let mut clip = Clip::new(ClipId(1), 8.0);
        clip.add_note(60, 2.0, 1.0, 0.8);
        clip.add_note(64, 0.0, 0.5, 0.6);
        clip.add_note(67, 1.0, 2.0, 1.0);
        clip
    }

    #[test]
    fn test_add_note_keeps_sorted_order() {
        let clip = clip_with_notes();
        let starts: Vec<f64> = clip.notes.iter().map(|n| n.start_beat).collect();
        assert_eq!(starts, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_note_ids_are_monotonic() {
        let mut clip = Clip::new(ClipId(1), 8.0);
        let a = clip.add_note(60, 0.0, 1.0, 0.8);
        let b = clip.add_note(60, 0.0, 1.0, 0.8);
        assert!(b > a);
        clip.remove_many(&[a, b]);
        let c = clip.add_note(60, 0.0, 1.0, 0.8);
        assert!(c > b, "ids are never reused after removal");
    }

    #[test]
    fn test_serde_round_trip_is_identical() {
        let clip = clip_with_notes();
        let json = serde_json::to_string(&clip).unwrap();
        let back: Clip = serde_json::from_str(&json).unwrap();
        assert_eq!(back, clip);
        // The id counter must survive too, or a reloaded clip would hand
        // out ids that collide with existing notes.
        let mut reloaded = back;
        let next = reloaded.add_note(60, 4.0, 1.0, 0.8);
        assert!(clip.notes.iter().all(|n| n.id != next));
    }

    #[test]
    fn test_loop_bounds_default_to_clip() {
        let clip = Clip::new(ClipId(1), 16.0);
        assert_eq!(clip.loop_bounds(), (0.0, 16.0));
    }

    #[test]
    fn test_set_loop_clamps_inverted_bounds() {
        let mut clip = Clip::new(ClipId(1), 8.0);
        let (start, end) = clip.set_loop(4.0, 2.0, 1.0);
        assert_eq!(start, 4.0);
        assert_eq!(end, 5.0);
        let (start, end) = clip.set_loop(-2.0, 6.0, 1.0);
        assert_eq!(start, 0.0);
        assert_eq!(end, 6.0);
    }

    #[test]
    fn test_loop_may_extend_past_clip_length() {
        let mut clip = Clip::new(ClipId(1), 8.0);
        let (_, end) = clip.set_loop(4.0, 12.0, 1.0);
        assert_eq!(end, 12.0);
        assert!(clip.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_host_data() {
        let mut clip = clip_with_notes();
        clip.loop_start = Some(6.0);
        clip.loop_end = Some(2.0);
        assert!(matches!(
            clip.validate(),
            Err(TessituraError::InvertedLoop { .. })
        ));

        let mut clip = clip_with_notes();
        clip.notes[0].duration = 0.0;
        assert!(clip.validate().is_err());
    }
}
