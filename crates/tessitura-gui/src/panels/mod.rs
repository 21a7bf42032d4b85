//! Editor panels

mod piano_roll;
mod ruler;

pub use piano_roll::{GridScale, PianoRollOutput, PianoRollPanel, PreviewEvent};
pub use ruler::{LoopRuler, RulerOptions};
