//! Error types for tessitura

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TessituraError {
    #[error("Pitch out of MIDI range: {0}")]
    PitchOutOfRange(u8),
    #[error("Note start must be non-negative, got {0}")]
    NegativeStart(f64),
    #[error("Note duration must be positive, got {0}")]
    NonPositiveDuration(f64),
    #[error("Clip length must be positive, got {0}")]
    NonPositiveLength(f64),
    #[error("Inverted loop bounds: start {start} >= end {end}")]
    InvertedLoop { start: f64, end: f64 },
}

pub type Result<T> = std::result::Result<T, TessituraError>;
