//! tessitura-gui: egui piano roll widget library
//!
//! The widgets here are pure transformers between pointer events and data
//! mutations: the host owns the [`tessitura_core::Clip`] and
//! [`tessitura_core::Viewport`], feeds them in each frame, and applies the
//! replacements returned in [`PianoRollOutput`]. Nothing in this crate holds
//! authoritative data.

pub mod panels;
pub mod transport;

pub use panels::{GridScale, LoopRuler, PianoRollOutput, PianoRollPanel, PreviewEvent, RulerOptions};
pub use transport::PlayheadCell;
