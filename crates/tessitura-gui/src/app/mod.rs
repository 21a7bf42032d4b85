//! Demo host application
//!
//! Plays the role of the external owner the panel is written against: it
//! holds the authoritative clip, viewport and transport, and applies the
//! panel's output wholesale each frame. The panel itself never mutates any
//! of this state.

mod config;

use eframe::CreationContext;
use egui::Context;
use tessitura_core::{Clip, ClipId, Viewport};
use tessitura_gui::{PianoRollPanel, PlayheadCell, PreviewEvent};

use config::{AppConfig, EditorConfig, load_config, save_config};

pub struct TessituraApp {
    clip: Clip,
    viewport: Viewport,
    piano_roll: PianoRollPanel,
    playhead: PlayheadCell,
    playing: bool,
    bpm: f64,
    // Where playback resumes after a stop (space toggle return-to-start)
    playback_start_beat: f64,
}

impl TessituraApp {
    pub fn new(_cc: &CreationContext<'_>) -> Self {
        let config = load_config();
        let mut piano_roll = PianoRollPanel::new();
        piano_roll.snap_to_beat = config.editor.snap_to_beat;
        piano_roll.limits = config.editor.limits;

        let clip = demo_clip();
        if let Err(e) = clip.validate() {
            tracing::warn!("Demo clip failed validation: {}", e);
        }

        Self {
            clip,
            viewport: config.editor.viewport,
            piano_roll,
            playhead: PlayheadCell::new(0.0),
            playing: false,
            bpm: config.editor.bpm,
            playback_start_beat: 0.0,
        }
    }
}

fn demo_clip() -> Clip {
    let mut clip = Clip::new(ClipId(1), 16.0);
    clip.name = "Demo".into();
    // A small C minor figure to push around
    for (i, pitch) in [60u8, 63, 67, 72, 67, 63].iter().enumerate() {
        clip.add_note(*pitch, i as f64 * 0.5, 0.5, 0.8);
    }
    clip.set_loop(0.0, 4.0, 1.0);
    clip
}

impl eframe::App for TessituraApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        // Global spacebar toggles playback (skip if a text field is focused)
        let text_focused = ctx.memory(|mem| mem.focused().is_some())
            && ctx.input(|i| i.events.iter().any(|e| matches!(e, egui::Event::Text(_))));
        if !text_focused && ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            if self.playing {
                self.playing = false;
                self.playhead.set(self.playback_start_beat);
            } else {
                self.playback_start_beat = self.playhead.get();
                self.playing = true;
                tracing::info!(bpm = self.bpm, "playback started");
            }
        }

        // Advance the playhead. This app is the cell's single writer.
        if self.playing {
            let dt = ctx.input(|i| i.stable_dt) as f64;
            let mut beat = self.playhead.get() + dt * self.bpm / 60.0;
            let (loop_start, loop_end) = self.clip.loop_bounds();
            if beat >= loop_end && loop_end > loop_start {
                beat = loop_start + (beat - loop_end) % (loop_end - loop_start);
            }
            self.playhead.set(beat);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            let output = self
                .piano_roll
                .ui(ui, &self.clip, &self.viewport, &self.playhead);

            // Apply the panel's replacements wholesale
            if let Some(clip) = output.clip {
                tracing::debug!(notes = clip.notes.len(), "clip replaced");
                self.clip = clip;
            }
            if let Some(viewport) = output.viewport {
                self.viewport = viewport;
            }
            if let Some(selection) = output.selection {
                tracing::debug!(?selection, "selection changed");
            }
            if let Some(beat) = output.seek {
                self.playhead.set(beat);
                self.playback_start_beat = beat;
            }
            for event in output.previews {
                // Stand-in for the host's audio layer
                match event {
                    PreviewEvent::NoteOn { pitch, velocity } => {
                        tracing::debug!(pitch, velocity, "preview note on");
                    }
                    PreviewEvent::NoteOff { pitch } => {
                        tracing::debug!(pitch, "preview note off");
                    }
                }
            }
        });

        // The one continuous loop: stopping playback stops the repaint
        // requests, which is what cancels the frame-rate redraws.
        if self.playing {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        save_config(&AppConfig {
            editor: EditorConfig {
                snap_to_beat: self.piano_roll.snap_to_beat,
                bpm: self.bpm,
                viewport: self.viewport,
                limits: self.piano_roll.limits,
            },
        });
    }
}
