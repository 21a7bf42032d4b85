//! tessitura-core: Domain types for the tessitura piano roll

mod clip;
mod error;
pub mod grid;
mod viewport;

pub use clip::{Clip, ClipId, Note, NoteId};
pub use error::{Result, TessituraError};
pub use grid::{BeatKind, beat_columns, classify_beat, grid_step, snap};
pub use viewport::{Viewport, ZoomLimits};
