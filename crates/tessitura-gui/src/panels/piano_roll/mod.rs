//! Piano roll editor panel
//!
//! The panel is a pure transformer: it reads the host's clip and viewport,
//! classifies pointer gestures against them, and returns full replacements
//! in [`PianoRollOutput`]. It owns only transient gesture state and (by
//! default) the selection.

mod drawing;
mod geometry;
mod input;
mod types;

pub use geometry::GridScale;
pub use types::{PianoRollOutput, PreviewEvent};
use types::Gesture;

use std::collections::HashSet;

use egui::{Color32, Pos2, Rect, Sense, Ui, Vec2};
use tessitura_core::{Clip, NoteId, Viewport, ZoomLimits};

use super::ruler::{LoopRuler, RulerAction};
use crate::transport::PlayheadCell;

const PIANO_WIDTH: f32 = 40.0;
const RULER_HEIGHT: f32 = 24.0;

/// Piano roll editor panel
pub struct PianoRollPanel {
    /// Editing grid in beats (0.25 = 16th notes)
    pub snap_to_beat: f64,
    /// Snap pointer positions to the grid
    pub snap_enabled: bool,
    /// Zoom range clamps applied to every zoom operation
    pub limits: ZoomLimits,
    /// Loop ruler strip riding on the same coordinate scale
    pub ruler: LoopRuler,
    /// Selected note ids (panel-owned unless the host calls set_selection)
    selected: HashSet<NoteId>,
    /// Active gesture, one pointer cycle at most
    gesture: Option<Gesture>,
    // Note preview state
    pressed_keys: HashSet<egui::Key>,
    keyboard_octave: i8,
    active_pitches: HashSet<u8>,
    pointer_key: Option<u8>,
}

impl Default for PianoRollPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl PianoRollPanel {
    pub fn new() -> Self {
        Self {
            snap_to_beat: 0.25,
            snap_enabled: true,
            limits: ZoomLimits::default(),
            ruler: LoopRuler::default(),
            selected: HashSet::new(),
            gesture: None,
            pressed_keys: HashSet::new(),
            keyboard_octave: 0,
            active_pitches: HashSet::new(),
            pointer_key: None,
        }
    }

    /// Current selection, sorted for deterministic output
    pub fn selection(&self) -> Vec<NoteId> {
        self.selection_vec()
    }

    /// Replace the selection; for hosts that control it externally
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = NoteId>) {
        self.selected = ids.into_iter().collect();
    }

    fn effective_snap(&self) -> f64 {
        if self.snap_enabled { self.snap_to_beat } else { 0.0 }
    }

    /// Render the editor and gather requested host mutations.
    /// The playhead cell is read once here, outside the commit cycle.
    pub fn ui(
        &mut self,
        ui: &mut Ui,
        clip: &Clip,
        viewport: &Viewport,
        playhead: &PlayheadCell,
    ) -> PianoRollOutput {
        let mut output = PianoRollOutput::default();

        // Toolbar
        ui.horizontal(|ui| {
            ui.label("Piano Roll");
            ui.separator();

            if ui.button("-").clicked() {
                output.viewport = Some(viewport.zoom_time(1.25, None, &self.limits));
            }
            if ui.button("+").clicked() {
                output.viewport = Some(viewport.zoom_time(0.8, None, &self.limits));
            }
            ui.label(format!("{:.1} beats", viewport.beats_visible()));
            ui.separator();
            ui.checkbox(&mut self.snap_enabled, "Snap");
            ui.separator();
            if ui.button("Reset View").clicked() {
                output.viewport = Some(Viewport::default());
            }
        });
        ui.separator();

        // Layout: key column on the left, ruler strip on top, grid below
        let available = ui.available_rect_before_wrap();
        let ruler_rect = Rect::from_min_size(
            Pos2::new(available.left() + PIANO_WIDTH, available.top()),
            Vec2::new(available.width() - PIANO_WIDTH, RULER_HEIGHT),
        );
        let grid_rect = Rect::from_min_size(
            Pos2::new(available.left() + PIANO_WIDTH, available.top() + RULER_HEIGHT),
            Vec2::new(
                available.width() - PIANO_WIDTH,
                available.height() - RULER_HEIGHT,
            ),
        );
        let keys_rect = Rect::from_min_size(
            Pos2::new(available.left(), available.top() + RULER_HEIGHT),
            Vec2::new(PIANO_WIDTH, available.height() - RULER_HEIGHT),
        );

        let scale = GridScale::new(*viewport, grid_rect, self.effective_snap());

        let panel_id = ui.id().with("piano_roll_focus");
        let (response, painter) = ui.allocate_painter(available.size(), Sense::click_and_drag());
        if response.clicked() || response.drag_started() || response.hovered() {
            ui.memory_mut(|mem| mem.request_focus(panel_id));
        }
        let has_focus = ui.memory(|mem| mem.has_focus(panel_id));

        // Background
        painter.rect_filled(grid_rect, 0.0, Color32::from_gray(25));
        painter.rect_filled(keys_rect, 0.0, Color32::from_gray(40));

        self.draw_piano_keys(&painter, keys_rect, &scale);
        self.draw_grid(&painter, grid_rect, &scale);
        self.draw_notes(&painter, &scale, clip);
        self.ruler
            .draw(&painter, ruler_rect, &scale, clip, playhead.get());

        // Input: route the pointer by where the gesture started
        let shift = ui.input(|i| i.modifiers.shift);
        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                if ruler_rect.contains(pos) {
                    match self.ruler.on_pointer_down(&scale, pos, clip) {
                        Some(RulerAction::Seek(beat)) => output.seek = Some(beat),
                        Some(RulerAction::Loop(start, end)) => {
                            output.clip = Some(apply_loop(clip, start, end));
                        }
                        None => {}
                    }
                } else if keys_rect.contains(pos) {
                    self.press_pointer_key(scale.y_to_pitch(pos.y), &mut output);
                } else if grid_rect.contains(pos)
                    && self.on_pointer_down(&scale, pos, shift, clip)
                {
                    output.selection = Some(self.selection_vec());
                }
            }
        }
        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                if self.ruler.is_dragging() {
                    match self.ruler.on_pointer_move(&scale, pos) {
                        Some(RulerAction::Seek(beat)) => output.seek = Some(beat),
                        Some(RulerAction::Loop(start, end)) => {
                            output.clip = Some(apply_loop(clip, start, end));
                        }
                        None => {}
                    }
                } else if self.gesture.is_some() {
                    let (next, selection_changed) = self.on_pointer_move(&scale, pos, clip);
                    if let Some(next) = next {
                        output.clip = Some(next);
                    }
                    if selection_changed {
                        output.selection = Some(self.selection_vec());
                    }
                }
            }
        }
        if response.drag_stopped() {
            self.ruler.on_pointer_up();
            self.on_pointer_up();
            self.release_pointer_key(&mut output);
        }
        if response.double_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if grid_rect.contains(pos) {
                    let (next, selection_changed) = self.on_double_click(&scale, pos, clip);
                    if let Some(next) = next {
                        output.clip = Some(next);
                    }
                    if selection_changed {
                        output.selection = Some(self.selection_vec());
                    }
                }
            }
        }

        if has_focus || response.hovered() {
            let delete_pressed = ui.input(|i| {
                i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)
            });
            if delete_pressed {
                if let Some(next) = self.delete_selected(clip) {
                    output.clip = Some(next);
                    output.selection = Some(Vec::new());
                }
            }
            self.handle_keyboard_piano(ui, &mut output);
        }

        // Overlays reflecting this frame's gesture state
        self.draw_brush(&painter);
        self.draw_playhead(&painter, &scale, playhead.get());

        if let Some(next) = self.handle_scroll_zoom(ui, &response, &scale, viewport, clip) {
            output.viewport = Some(next);
        }

        output
    }
}

/// Clone-and-set-loop; the commit path shared by both ruler drag modes
fn apply_loop(clip: &Clip, start: f64, end: f64) -> Clip {
    let mut next = clip.clone();
    next.set_loop(start, end, 0.0);
    next
}
