//! Loop/timeline ruler strip
//!
//! Rides on the piano roll's [`GridScale`] so the loop region, bar labels
//! and the grid lines underneath can never drift apart. Offers three
//! affordances over the beat axis: a loop start handle, a loop end handle,
//! and a body drag that moves both bounds preserving their separation.
//! Anywhere else, pressing scrubs the transport.

use egui::{Align2, Color32, FontId, Pos2, Rect, Stroke};
use tessitura_core::{BeatKind, Clip, beat_columns, classify_beat, snap};

use super::piano_roll::GridScale;

/// Pixel radius around a loop handle that grabs it
const HANDLE_RADIUS: f32 = 8.0;

/// Pixels per beat above which beats get their own labels
const BEAT_LABEL_THRESHOLD: f32 = 60.0;

/// Which loop affordances respond to the pointer. A disabled handle is
/// neither drawn nor hit-testable; body drag needs both ends editable.
#[derive(Clone, Copy, Debug)]
pub struct RulerOptions {
    pub edit_loop_start: bool,
    pub edit_loop_end: bool,
    /// Loop handle grid in beats, independent of the editor's snap
    pub snap: f64,
    /// Minimum separation between loop start and end
    pub min_gap: f64,
}

impl Default for RulerOptions {
    fn default() -> Self {
        Self {
            edit_loop_start: true,
            edit_loop_end: true,
            snap: 1.0,
            min_gap: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoopDragMode {
    Start,
    End,
    Move,
    Scrub,
}

/// Snapshot taken at drag start; every frame recomputes from it
#[derive(Clone, Copy, Debug)]
struct LoopDrag {
    mode: LoopDragMode,
    grab_beat: f64,
    orig_start: f64,
    orig_end: f64,
}

/// What a ruler pointer event asks the host to do
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum RulerAction {
    /// Replace the loop bounds
    Loop(f64, f64),
    /// Move the transport to this beat
    Seek(f64),
}

#[derive(Default)]
pub struct LoopRuler {
    pub options: RulerOptions,
    drag: Option<LoopDrag>,
}

impl LoopRuler {
    pub(crate) fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub(crate) fn on_pointer_down(
        &mut self,
        scale: &GridScale,
        pos: Pos2,
        clip: &Clip,
    ) -> Option<RulerAction> {
        let (start, end) = clip.loop_bounds();
        let start_x = scale.beat_to_x(start);
        let end_x = scale.beat_to_x(end);
        let grab_beat = scale.x_to_beat_raw(pos.x);
        let options = self.options;

        let mode = if options.edit_loop_start && (pos.x - start_x).abs() < HANDLE_RADIUS {
            LoopDragMode::Start
        } else if options.edit_loop_end && (pos.x - end_x).abs() < HANDLE_RADIUS {
            LoopDragMode::End
        } else if options.edit_loop_start
            && options.edit_loop_end
            && pos.x > start_x
            && pos.x < end_x
        {
            LoopDragMode::Move
        } else {
            LoopDragMode::Scrub
        };

        self.drag = Some(LoopDrag {
            mode,
            grab_beat,
            orig_start: start,
            orig_end: end,
        });
        match mode {
            LoopDragMode::Scrub => Some(RulerAction::Seek(grab_beat.max(0.0))),
            _ => None,
        }
    }

    pub(crate) fn on_pointer_move(&mut self, scale: &GridScale, pos: Pos2) -> Option<RulerAction> {
        let drag = self.drag?;
        let options = self.options;
        let beat = scale.x_to_beat_raw(pos.x);
        let snapped = snap(beat, options.snap);

        match drag.mode {
            LoopDragMode::Start => {
                let max_start = (drag.orig_end - options.min_gap).max(0.0);
                let new_start = snapped.clamp(0.0, max_start);
                Some(RulerAction::Loop(new_start, drag.orig_end))
            }
            LoopDragMode::End => {
                // No upper clamp: the loop may extend past the clip end
                let new_end = snapped.max(drag.orig_start + options.min_gap);
                Some(RulerAction::Loop(drag.orig_start, new_end))
            }
            LoopDragMode::Move => {
                let delta = snap(beat, options.snap) - snap(drag.grab_beat, options.snap);
                let width = drag.orig_end - drag.orig_start;
                let new_start = (drag.orig_start + delta).max(0.0);
                Some(RulerAction::Loop(new_start, new_start + width))
            }
            LoopDragMode::Scrub => Some(RulerAction::Seek(beat.max(0.0))),
        }
    }

    pub(crate) fn on_pointer_up(&mut self) {
        self.drag = None;
    }

    pub(crate) fn draw(
        &self,
        painter: &egui::Painter,
        rect: Rect,
        scale: &GridScale,
        clip: &Clip,
        playhead_beat: f64,
    ) {
        painter.rect_filled(rect, 0.0, Color32::from_gray(35));

        let viewport = scale.viewport();
        for beat in beat_columns(
            viewport.start_beat,
            viewport.end_beat,
            scale.pixels_per_beat(),
        ) {
            let x = scale.beat_to_x(beat);
            if x < rect.left() || x > rect.right() {
                continue;
            }
            match classify_beat(beat) {
                BeatKind::Bar => {
                    painter.line_segment(
                        [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
                        Stroke::new(1.0, Color32::from_gray(90)),
                    );
                    let bar = (beat / 4.0).round() as i64 + 1;
                    painter.text(
                        Pos2::new(x + 3.0, rect.top() + 2.0),
                        Align2::LEFT_TOP,
                        format!("{bar}"),
                        FontId::proportional(10.0),
                        Color32::from_gray(180),
                    );
                }
                BeatKind::Beat => {
                    painter.line_segment(
                        [
                            Pos2::new(x, rect.top() + rect.height() * 0.5),
                            Pos2::new(x, rect.bottom()),
                        ],
                        Stroke::new(0.5, Color32::from_gray(65)),
                    );
                    // Beat labels appear once zoomed in far enough to read
                    if scale.pixels_per_beat() >= BEAT_LABEL_THRESHOLD {
                        let bar = (beat / 4.0).floor() as i64 + 1;
                        let beat_in_bar = (beat - (beat / 4.0).floor() * 4.0).round() as i64 + 1;
                        painter.text(
                            Pos2::new(x + 3.0, rect.top() + 10.0),
                            Align2::LEFT_TOP,
                            format!("{bar}.{beat_in_bar}"),
                            FontId::proportional(8.0),
                            Color32::from_gray(120),
                        );
                    }
                }
                BeatKind::Subbeat | BeatKind::Fine => {}
            }
        }

        // Loop region and its handles
        let (start, end) = clip.loop_bounds();
        let start_x = scale.beat_to_x(start);
        let end_x = scale.beat_to_x(end);
        if end_x > rect.left() && start_x < rect.right() {
            let loop_rect = Rect::from_min_max(
                Pos2::new(start_x.max(rect.left()), rect.top()),
                Pos2::new(end_x.min(rect.right()), rect.bottom()),
            );
            painter.rect_filled(
                loop_rect,
                0.0,
                Color32::from_rgba_unmultiplied(100, 150, 255, 30),
            );
            if self.options.edit_loop_start {
                self.draw_handle(painter, rect, start_x);
            }
            if self.options.edit_loop_end {
                self.draw_handle(painter, rect, end_x);
            }
        }

        // Playhead marker
        if playhead_beat >= viewport.start_beat && playhead_beat <= viewport.end_beat {
            let x = scale.beat_to_x(playhead_beat);
            let triangle = vec![
                Pos2::new(x, rect.bottom()),
                Pos2::new(x - 5.0, rect.bottom() - 7.0),
                Pos2::new(x + 5.0, rect.bottom() - 7.0),
            ];
            painter.add(egui::Shape::convex_polygon(
                triangle,
                Color32::from_rgb(255, 100, 100),
                Stroke::NONE,
            ));
        }
    }

    fn draw_handle(&self, painter: &egui::Painter, rect: Rect, x: f32) {
        if x < rect.left() || x > rect.right() {
            return;
        }
        let handle_color = Color32::from_rgb(80, 130, 220);
        let triangle = vec![
            Pos2::new(x, rect.bottom()),
            Pos2::new(x - 6.0, rect.top()),
            Pos2::new(x + 6.0, rect.top()),
        ];
        painter.add(egui::Shape::convex_polygon(
            triangle,
            handle_color,
            Stroke::NONE,
        ));
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(2.0, handle_color),
        );
    }
}
