//! Shared playback position cell
//!
//! The playhead redraws at frame rate while everything else in the editor
//! only changes on discrete gestures, so its position deliberately bypasses
//! the clip/viewport commit cycle: the transport owner writes this cell and
//! the panel reads it once per frame while painting.

use std::sync::atomic::{AtomicU64, Ordering};

/// Playback position in beats, stored as f64 bits.
///
/// Single-writer contract: exactly one owner (the transport/clock) calls
/// [`set`](Self::set); the render path only reads. Under single-threaded UI
/// execution no further synchronization is needed, but the cell must not be
/// written from a different scheduling context without explicit handoff.
#[derive(Debug, Default)]
pub struct PlayheadCell(AtomicU64);

impl PlayheadCell {
    pub fn new(beat: f64) -> Self {
        Self(AtomicU64::new(beat.to_bits()))
    }

    pub fn set(&self, beat: f64) {
        self.0.store(beat.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }
}
