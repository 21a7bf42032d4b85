use std::collections::{HashMap, HashSet};

use egui::Pos2;
use tessitura_core::{Clip, NoteId, Viewport};

/// Everything the panel asks the host to apply after a frame. Fields are
/// full replacements; the panel never mutates host state in place.
#[derive(Default)]
pub struct PianoRollOutput {
    /// Replacement clip on any note or loop mutation
    pub clip: Option<Clip>,
    /// Replacement viewport on any pan/zoom
    pub viewport: Option<Viewport>,
    /// Replacement selection on any selection-affecting gesture
    pub selection: Option<Vec<NoteId>>,
    /// Requested transport seek (ruler click), in beats
    pub seek: Option<f64>,
    /// Note previews for the host's audio layer
    pub previews: Vec<PreviewEvent>,
}

/// Piano-key press/release events, forwarded to whatever makes sound.
/// The panel itself has no audio dependency.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PreviewEvent {
    NoteOn { pitch: u8, velocity: f32 },
    NoteOff { pitch: u8 },
}

/// Which part of a note's box the pointer landed on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum HitZone {
    Body,
    StartEdge,
    EndEdge,
}

/// One pointer-down to pointer-up cycle. At most one gesture exists at a
/// time; the snapshot maps hold gesture-start originals so every drag frame
/// recomputes from the same anchor instead of the previous frame's output.
#[derive(Clone, Debug)]
pub(super) enum Gesture {
    Brush {
        origin: Pos2,
        current: Pos2,
        /// Shift was held: commit unions into `base` instead of replacing
        additive: bool,
        base: HashSet<NoteId>,
    },
    Move {
        anchor_beat: f64,
        anchor_pitch: u8,
        /// NoteId -> original (start_beat, pitch)
        origin: HashMap<NoteId, (f64, u8)>,
    },
    ResizeStart {
        anchor_beat: f64,
        /// NoteId -> original (start_beat, duration)
        origin: HashMap<NoteId, (f64, f64)>,
    },
    ResizeEnd {
        anchor_beat: f64,
        origin: HashMap<NoteId, (f64, f64)>,
    },
}
