use std::collections::{HashMap, HashSet};

use egui::{Pos2, Rect, Ui};
use tessitura_core::{Clip, NoteId, Viewport, snap};

use super::PianoRollPanel;
use super::geometry::GridScale;
use super::types::{Gesture, HitZone, PianoRollOutput, PreviewEvent};

/// Velocity for notes created by double-click and for key previews
pub(super) const DEFAULT_VELOCITY: f32 = 0.8;

/// Wheel delta to zoom factor; factor > 1 widens the visible range
fn wheel_zoom_factor(delta: f32) -> f64 {
    (1.0 + delta as f64 * 0.008).max(0.2).recip()
}

impl PianoRollPanel {
    /// Classify a pointer-down on the grid into a gesture. Returns whether
    /// the selection changed.
    pub(super) fn on_pointer_down(
        &mut self,
        scale: &GridScale,
        pos: Pos2,
        shift: bool,
        clip: &Clip,
    ) -> bool {
        let Some((id, zone)) = scale.hit_test(clip, pos) else {
            // Empty space: start a brush. Plain click drops the selection,
            // shift keeps it as the union base.
            let base = if shift {
                self.selected.clone()
            } else {
                HashSet::new()
            };
            let changed = !shift && !self.selected.is_empty();
            if changed {
                self.selected.clear();
            }
            self.gesture = Some(Gesture::Brush {
                origin: pos,
                current: pos,
                additive: shift,
                base,
            });
            return changed;
        };

        let anchor_beat = scale.x_to_beat_raw(pos.x);
        match zone {
            HitZone::Body => {
                let mut changed = false;
                if shift {
                    // Toggle membership; the drag moves whatever remains
                    if !self.selected.remove(&id) {
                        self.selected.insert(id);
                    }
                    changed = true;
                } else if !self.selected.contains(&id) {
                    self.selected.clear();
                    self.selected.insert(id);
                    changed = true;
                }
                // Clicking an already-selected note leaves the selection
                // alone so a multi-selection survives being dragged.

                let origin: HashMap<NoteId, (f64, u8)> = clip
                    .notes
                    .iter()
                    .filter(|n| self.selected.contains(&n.id))
                    .map(|n| (n.id, (n.start_beat, n.pitch)))
                    .collect();
                self.gesture = if origin.is_empty() {
                    None
                } else {
                    Some(Gesture::Move {
                        anchor_beat,
                        anchor_pitch: scale.y_to_pitch(pos.y),
                        origin,
                    })
                };
                changed
            }
            HitZone::StartEdge | HitZone::EndEdge => {
                // A selected note drags every selected note's edge with it;
                // an unselected one resizes alone without touching the
                // selection.
                let origin: HashMap<NoteId, (f64, f64)> = if self.selected.contains(&id) {
                    clip.notes
                        .iter()
                        .filter(|n| self.selected.contains(&n.id))
                        .map(|n| (n.id, (n.start_beat, n.duration)))
                        .collect()
                } else {
                    clip.note(id)
                        .map(|n| (n.id, (n.start_beat, n.duration)))
                        .into_iter()
                        .collect()
                };
                self.gesture = Some(match zone {
                    HitZone::StartEdge => Gesture::ResizeStart {
                        anchor_beat,
                        origin,
                    },
                    _ => Gesture::ResizeEnd {
                        anchor_beat,
                        origin,
                    },
                });
                false
            }
        }
    }

    /// Advance the active gesture. Returns a replacement clip when notes
    /// changed and whether the selection (brush preview) changed.
    pub(super) fn on_pointer_move(
        &mut self,
        scale: &GridScale,
        pos: Pos2,
        clip: &Clip,
    ) -> (Option<Clip>, bool) {
        let grid = scale.snap_to_beat();
        let min_duration = self.snap_to_beat;
        match &mut self.gesture {
            Some(Gesture::Brush {
                origin,
                current,
                additive,
                base,
            }) => {
                *current = pos;
                let rect = Rect::from_two_pos(*origin, pos);
                let hits: HashSet<NoteId> = clip
                    .notes
                    .iter()
                    .filter(|n| scale.note_rect(n).intersects(rect))
                    .map(|n| n.id)
                    .collect();
                let preview = if *additive { &hits | &*base } else { hits };
                if preview != self.selected {
                    self.selected = preview;
                    (None, true)
                } else {
                    (None, false)
                }
            }
            Some(Gesture::Move {
                anchor_beat,
                anchor_pitch,
                origin,
            }) => {
                // Both endpoints snap before subtracting, so the drag steps
                // in grid increments instead of sliding continuously.
                let delta_beat = snap(scale.x_to_beat_raw(pos.x), grid) - snap(*anchor_beat, grid);
                let delta_pitch = scale.y_to_pitch(pos.y) as i32 - *anchor_pitch as i32;

                let mut next = clip.clone();
                let mut changed = false;
                for (&id, &(orig_start, orig_pitch)) in origin.iter() {
                    let Some(note) = next.note_mut(id) else {
                        continue;
                    };
                    // Identical delta per note, clamped independently, so
                    // notes at the boundary pile up without distorting the
                    // rest of the selection.
                    let new_start = (orig_start + delta_beat).max(0.0);
                    let new_pitch = (orig_pitch as i32 + delta_pitch).clamp(0, 127) as u8;
                    changed |= note.start_beat != new_start || note.pitch != new_pitch;
                    note.start_beat = new_start;
                    note.pitch = new_pitch;
                }
                if changed {
                    next.sort_notes();
                    (Some(next), false)
                } else {
                    (None, false)
                }
            }
            Some(Gesture::ResizeStart {
                anchor_beat,
                origin,
            }) => {
                let delta_beat = snap(scale.x_to_beat_raw(pos.x), grid) - snap(*anchor_beat, grid);
                let mut next = clip.clone();
                let mut changed = false;
                for (&id, &(orig_start, orig_duration)) in origin.iter() {
                    let Some(note) = next.note_mut(id) else {
                        continue;
                    };
                    // The end stays fixed while the start moves
                    let new_start = (orig_start + delta_beat).max(0.0);
                    let new_duration = orig_start + orig_duration - new_start;
                    if new_duration < min_duration {
                        continue;
                    }
                    changed |= note.start_beat != new_start || note.duration != new_duration;
                    note.start_beat = new_start;
                    note.duration = new_duration;
                }
                if changed {
                    next.sort_notes();
                    (Some(next), false)
                } else {
                    (None, false)
                }
            }
            Some(Gesture::ResizeEnd {
                anchor_beat,
                origin,
            }) => {
                let delta_beat = snap(scale.x_to_beat_raw(pos.x), grid) - snap(*anchor_beat, grid);
                let mut next = clip.clone();
                let mut changed = false;
                for (&id, &(_, orig_duration)) in origin.iter() {
                    let Some(note) = next.note_mut(id) else {
                        continue;
                    };
                    let new_duration = (orig_duration + delta_beat).max(min_duration);
                    changed |= note.duration != new_duration;
                    note.duration = new_duration;
                }
                if changed { (Some(next), false) } else { (None, false) }
            }
            None => (None, false),
        }
    }

    /// Pointer-up always resets to no gesture and drops transient state.
    /// A brush commits the preview already applied to the selection.
    pub(super) fn on_pointer_up(&mut self) {
        self.gesture = None;
    }

    /// Double-click on empty grid creates a note at the snapped position
    /// with a one-grid-unit duration; on an existing note it is a no-op.
    /// Returns the replacement clip and whether the selection changed.
    pub(super) fn on_double_click(
        &mut self,
        scale: &GridScale,
        pos: Pos2,
        clip: &Clip,
    ) -> (Option<Clip>, bool) {
        if scale.hit_test(clip, pos).is_some() {
            return (None, false);
        }
        let mut next = clip.clone();
        let id = next.add_note(
            scale.y_to_pitch(pos.y),
            scale.x_to_beat(pos.x),
            self.snap_to_beat,
            DEFAULT_VELOCITY,
        );
        self.selected.clear();
        self.selected.insert(id);
        self.gesture = None;
        (Some(next), true)
    }

    /// Remove every selected note. Returns the replacement clip.
    pub(super) fn delete_selected(&mut self, clip: &Clip) -> Option<Clip> {
        if self.selected.is_empty() {
            return None;
        }
        let ids: Vec<NoteId> = self.selected.drain().collect();
        let mut next = clip.clone();
        next.remove_many(&ids);
        Some(next)
    }

    pub(super) fn selection_vec(&self) -> Vec<NoteId> {
        let mut ids: Vec<NoteId> = self.selected.iter().copied().collect();
        ids.sort();
        ids
    }

    /// Map computer-keyboard keys to pitches for note preview.
    /// Bottom row Z..M covers one octave from C3, top row Q..P from C4;
    /// `keyboard_octave` shifts both.
    pub(super) fn key_to_pitch(&self, key: egui::Key) -> Option<u8> {
        use egui::Key;
        let base: i16 = match key {
            Key::Z => 48,
            Key::S => 49,
            Key::X => 50,
            Key::D => 51,
            Key::C => 52,
            Key::V => 53,
            Key::G => 54,
            Key::B => 55,
            Key::H => 56,
            Key::N => 57,
            Key::J => 58,
            Key::M => 59,
            Key::Q => 60,
            Key::Num2 => 61,
            Key::W => 62,
            Key::Num3 => 63,
            Key::E => 64,
            Key::R => 65,
            Key::Num5 => 66,
            Key::T => 67,
            Key::Num6 => 68,
            Key::Y => 69,
            Key::Num7 => 70,
            Key::U => 71,
            Key::I => 72,
            Key::Num9 => 73,
            Key::O => 74,
            Key::Num0 => 75,
            Key::P => 76,
            _ => return None,
        };
        let pitch = base + self.keyboard_octave as i16 * 12;
        (0..=127).contains(&pitch).then_some(pitch as u8)
    }

    fn piano_keys() -> &'static [egui::Key] {
        use egui::Key;
        &[
            Key::Z,
            Key::S,
            Key::X,
            Key::D,
            Key::C,
            Key::V,
            Key::G,
            Key::B,
            Key::H,
            Key::N,
            Key::J,
            Key::M,
            Key::Q,
            Key::Num2,
            Key::W,
            Key::Num3,
            Key::E,
            Key::R,
            Key::Num5,
            Key::T,
            Key::Num6,
            Key::Y,
            Key::Num7,
            Key::U,
            Key::I,
            Key::Num9,
            Key::O,
            Key::Num0,
            Key::P,
        ]
    }

    /// Track computer-keyboard presses and emit preview events
    pub(super) fn handle_keyboard_piano(&mut self, ui: &Ui, output: &mut PianoRollOutput) {
        if ui.input(|i| i.key_pressed(egui::Key::Minus)) {
            self.keyboard_octave = (self.keyboard_octave - 1).max(-2);
            self.active_pitches.clear();
        }
        if ui.input(|i| i.key_pressed(egui::Key::Equals)) {
            self.keyboard_octave = (self.keyboard_octave + 1).min(2);
            self.active_pitches.clear();
        }

        for &key in Self::piano_keys() {
            let is_down = ui.input(|i| i.key_down(key));
            let was_down = self.pressed_keys.contains(&key);
            if is_down && !was_down {
                self.pressed_keys.insert(key);
                if let Some(pitch) = self.key_to_pitch(key) {
                    self.active_pitches.insert(pitch);
                    output.previews.push(PreviewEvent::NoteOn {
                        pitch,
                        velocity: DEFAULT_VELOCITY,
                    });
                }
            } else if !is_down && was_down {
                self.pressed_keys.remove(&key);
                if let Some(pitch) = self.key_to_pitch(key) {
                    self.active_pitches.remove(&pitch);
                    output.previews.push(PreviewEvent::NoteOff { pitch });
                }
            }
        }
    }

    /// Wheel pans; ctrl/cmd-wheel zooms time and alt-wheel zooms pitch,
    /// both anchored at the cursor so the point under it stays put while
    /// the scale changes around it.
    pub(super) fn handle_scroll_zoom(
        &self,
        ui: &Ui,
        response: &egui::Response,
        scale: &GridScale,
        viewport: &Viewport,
        clip: &Clip,
    ) -> Option<Viewport> {
        if !response.hovered() {
            return None;
        }
        let (scroll, modifiers) =
            ui.input(|i| (i.smooth_scroll_delta + i.raw_scroll_delta, i.modifiers));
        let pos = response.hover_pos()?;

        if modifiers.ctrl || modifiers.command {
            if scroll.y.abs() > 0.1 {
                let (anchor, ratio) = scale.zoom_anchor_beat(pos.x);
                return Some(viewport.pan_zoom_time(
                    anchor,
                    ratio,
                    wheel_zoom_factor(scroll.y),
                    &self.limits,
                ));
            }
            return None;
        }
        if modifiers.alt {
            if scroll.y.abs() > 0.1 {
                let (anchor, ratio) = scale.zoom_anchor_pitch(pos.y);
                return Some(viewport.pan_zoom_pitch(
                    anchor,
                    ratio,
                    wheel_zoom_factor(scroll.y),
                    &self.limits,
                ));
            }
            return None;
        }
        if scroll.x.abs() > 0.0 || scroll.y.abs() > 0.0 {
            let delta_beats = -scroll.x as f64 / scale.pixels_per_beat() as f64;
            let delta_notes = scroll.y as f64 / scale.note_height() as f64;
            return Some(
                viewport
                    .pan_time(delta_beats, clip.length)
                    .pan_pitch(delta_notes),
            );
        }
        None
    }

    /// Pointer press on the drawn key column
    pub(super) fn press_pointer_key(&mut self, pitch: u8, output: &mut PianoRollOutput) {
        self.pointer_key = Some(pitch);
        self.active_pitches.insert(pitch);
        output.previews.push(PreviewEvent::NoteOn {
            pitch,
            velocity: DEFAULT_VELOCITY,
        });
    }

    pub(super) fn release_pointer_key(&mut self, output: &mut PianoRollOutput) {
        if let Some(pitch) = self.pointer_key.take() {
            self.active_pitches.remove(&pitch);
            output.previews.push(PreviewEvent::NoteOff { pitch });
        }
    }
}
