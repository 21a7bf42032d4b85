use egui::{Color32, Pos2, Rect, Stroke, StrokeKind, Vec2};
use tessitura_core::{BeatKind, Clip, beat_columns, classify_beat};

use super::PianoRollPanel;
use super::geometry::GridScale;
use super::types::Gesture;

impl PianoRollPanel {
    pub(super) fn draw_piano_keys(&self, painter: &egui::Painter, rect: Rect, scale: &GridScale) {
        let viewport = scale.viewport();
        let low = viewport.low_note.floor().max(0.0) as i32;
        let high = viewport.high_note.ceil().min(127.0) as i32;
        let note_height = scale.note_height();

        for pitch in low..=high {
            let y = scale.pitch_to_y(pitch as f64);
            if y + note_height < rect.top() || y > rect.bottom() {
                continue;
            }
            let key_rect = Rect::from_min_size(
                Pos2::new(rect.left(), y),
                Vec2::new(rect.width(), note_height),
            );

            let is_black = matches!(pitch % 12, 1 | 3 | 6 | 8 | 10);
            let is_active = self.active_pitches.contains(&(pitch as u8));

            let color = if is_active {
                Color32::from_rgb(255, 140, 0)
            } else if is_black {
                Color32::from_gray(30)
            } else {
                Color32::from_gray(60)
            };

            painter.rect_filled(key_rect, 0.0, color);
            painter.rect_stroke(
                key_rect,
                0.0,
                Stroke::new(0.5, Color32::from_gray(20)),
                StrokeKind::Inside,
            );

            // Label C notes when the rows are tall enough to read
            if pitch % 12 == 0 && note_height >= 8.0 {
                let octave = pitch / 12 - 1;
                let text_color = if is_active { Color32::BLACK } else { Color32::WHITE };
                painter.text(
                    Pos2::new(rect.left() + 2.0, y + 1.0),
                    egui::Align2::LEFT_TOP,
                    format!("C{octave}"),
                    egui::FontId::proportional(9.0),
                    text_color,
                );
            }
        }
    }

    pub(super) fn draw_grid(&self, painter: &egui::Painter, rect: Rect, scale: &GridScale) {
        let viewport = scale.viewport();

        // Vertical lines at the shared adaptive step, weighted by the
        // boundary each one lands on
        for beat in beat_columns(
            viewport.start_beat,
            viewport.end_beat,
            scale.pixels_per_beat(),
        ) {
            let x = scale.beat_to_x(beat);
            if x < rect.left() || x > rect.right() {
                continue;
            }
            let stroke = match classify_beat(beat) {
                BeatKind::Bar => Stroke::new(1.0, Color32::from_gray(90)),
                BeatKind::Beat => Stroke::new(0.5, Color32::from_gray(65)),
                BeatKind::Subbeat => Stroke::new(0.5, Color32::from_gray(50)),
                BeatKind::Fine => Stroke::new(0.5, Color32::from_gray(40)),
            };
            painter.line_segment(
                [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
                stroke,
            );
        }

        // Horizontal row separators, C rows heavier
        let low = viewport.low_note.floor().max(0.0) as i32;
        let high = viewport.high_note.ceil().min(127.0) as i32;
        for pitch in low..=high {
            let y = scale.pitch_to_y(pitch as f64) + scale.note_height();
            if y < rect.top() || y > rect.bottom() {
                continue;
            }
            let stroke = if pitch % 12 == 0 {
                Stroke::new(1.0, Color32::from_gray(60))
            } else {
                Stroke::new(0.5, Color32::from_gray(40))
            };
            painter.line_segment(
                [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
                stroke,
            );
        }
    }

    pub(super) fn draw_notes(&self, painter: &egui::Painter, scale: &GridScale, clip: &Clip) {
        let grid_rect = scale.rect();
        for note in &clip.notes {
            let rect = scale.note_rect(note);
            let rect = Rect::from_min_size(
                rect.min,
                Vec2::new(rect.width().max(4.0), scale.note_height() - 1.0),
            );
            let visible = rect.intersect(grid_rect);
            if visible.width() <= 0.0 || visible.height() <= 0.0 {
                continue;
            }

            let is_selected = self.selected.contains(&note.id);
            let color = if is_selected {
                Color32::from_rgb(100, 200, 255)
            } else {
                Color32::from_rgb(80, 160, 220)
            };

            painter.rect_filled(visible, 2.0, color);
            painter.rect_stroke(
                visible,
                2.0,
                Stroke::new(1.0, Color32::from_rgb(40, 80, 120)),
                StrokeKind::Inside,
            );
        }
    }

    pub(super) fn draw_brush(&self, painter: &egui::Painter) {
        let Some(Gesture::Brush {
            origin, current, ..
        }) = &self.gesture
        else {
            return;
        };
        let rect = Rect::from_two_pos(*origin, *current);
        painter.rect_filled(rect, 0.0, Color32::from_rgba_unmultiplied(100, 150, 255, 30));
        painter.rect_stroke(
            rect,
            0.0,
            Stroke::new(1.0, Color32::from_rgb(100, 150, 255)),
            StrokeKind::Inside,
        );
    }

    /// Draw the playhead marker. Visibility is toggled by the viewport
    /// test, nothing else; the beat value comes straight from the shared
    /// position cell each frame.
    pub(super) fn draw_playhead(&self, painter: &egui::Painter, scale: &GridScale, beat: f64) {
        let viewport = scale.viewport();
        if beat < viewport.start_beat || beat > viewport.end_beat {
            return;
        }
        let grid_rect = scale.rect();
        let x = scale.beat_to_x(beat);
        painter.line_segment(
            [
                Pos2::new(x, grid_rect.top()),
                Pos2::new(x, grid_rect.bottom()),
            ],
            Stroke::new(2.0, Color32::from_rgb(255, 100, 100)),
        );
    }
}
