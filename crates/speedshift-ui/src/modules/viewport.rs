// crates/speedshift-ui/src/modules/viewport.rs
//
// ViewportModule: the video canvas plus the transport bar underneath it.
// The canvas mirrors the source lifecycle: download progress while the
// sample fetches, poster/live frames once ready, NO SIGNAL before anything
// is loaded.

use egui::{Color32, Pos2, Rect, Sense, Stroke, Ui, Vec2};

use speedshift_core::commands::PlayerCommand;
use speedshift_core::helpers::time::format_time;
use speedshift_core::state::{PlayerState, SourceState};

use super::ScreenModule;
use crate::theme::{ACCENT, DARK_BG_2, DARK_BG_3, DARK_BORDER, DARK_TEXT_DIM, RED_DIM};

// ── Transport bar layout constants ───────────────────────────────────────────
const BAR_H:    f32 = 48.0;
const BTN_SIZE: f32 = 30.0; // every painted button is this exact square
const BTN_R:    f32 = 4.0;
const ICON_SZ:  f32 = 9.0;  // half-size of painted icon geometry
const GAP:      f32 = 4.0;
const SEP:      f32 = 14.0;
const VOL_W:    f32 = 72.0;
const TIME_W:   f32 = 66.0;

pub struct ViewportModule {
    /// The live decoded frame (or poster) for the current position, set by
    /// app.rs each frame before ui() is called.
    pub current_frame: Option<egui::TextureHandle>,
    /// Last successfully shown frame. Held across ticks so brief decode gaps
    /// never flash the canvas black.
    held_frame: Option<egui::TextureHandle>,
}

impl ViewportModule {
    pub fn new() -> Self {
        Self { current_frame: None, held_frame: None }
    }

    fn canvas_ratio(state: &PlayerState) -> f32 {
        state.source_clip()
            .and_then(|c| c.video_size)
            .map(|(w, h)| w as f32 / h.max(1) as f32)
            .unwrap_or(16.0 / 9.0)
    }
}

impl ScreenModule for ViewportModule {
    fn name(&self) -> &str { "Viewport" }

    fn ui(&mut self, ui: &mut Ui, state: &PlayerState, cmd: &mut Vec<PlayerCommand>) {
        ui.vertical(|ui| {
            // ── Video canvas ─────────────────────────────────────────────────
            let ratio   = Self::canvas_ratio(state);
            let panel_w = ui.available_width();
            let panel_h = (ui.available_height() - BAR_H - 12.0).max(80.0);

            let (canvas_w, canvas_h) = {
                let h = panel_w / ratio;
                if h <= panel_h { (panel_w, h) } else { (panel_h * ratio, panel_h) }
            };

            let (outer_rect, _) = ui.allocate_exact_size(
                Vec2::new(panel_w, canvas_h), Sense::hover());
            let canvas = Rect::from_center_size(
                outer_rect.center(), Vec2::new(canvas_w, canvas_h));
            let painter = ui.painter();

            if state.is_playing {
                painter.rect_stroke(canvas.expand(2.0), 4.0,
                    Stroke::new(1.5, ACCENT.gamma_multiply(0.55)),
                    egui::StrokeKind::Outside);
            } else {
                painter.rect_stroke(canvas.expand(1.0), 4.0,
                    Stroke::new(1.0, DARK_BORDER),
                    egui::StrokeKind::Outside);
            }
            painter.rect_filled(canvas, 3.0, Color32::BLACK);

            match &state.source {
                SourceState::Ready(clip) => {
                    if self.current_frame.is_some() {
                        self.held_frame = self.current_frame.clone();
                    }
                    if let Some(tex) = &self.held_frame {
                        painter.image(tex.id(), canvas,
                            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                            Color32::WHITE);
                    } else {
                        // Poster not yet decoded — name + spinner.
                        painter.text(
                            canvas.center() - egui::vec2(0.0, 20.0),
                            egui::Align2::CENTER_CENTER,
                            &clip.name,
                            egui::FontId::proportional(13.0),
                            Color32::from_gray(70));
                        draw_spinner(ui, canvas.center() + egui::vec2(0.0, 20.0));
                    }
                }

                SourceState::Fetching { downloaded, total } => {
                    self.held_frame = None;
                    let label = if *total > 0 {
                        let pct = *downloaded as f64 / *total as f64 * 100.0;
                        format!(
                            "Downloading sample video…  {pct:.0}%  ({:.1} / {:.1} MB)",
                            *downloaded as f64 / 1_000_000.0,
                            *total as f64 / 1_000_000.0,
                        )
                    } else {
                        "Downloading sample video…".to_string()
                    };
                    painter.text(
                        canvas.center() - egui::vec2(0.0, 20.0),
                        egui::Align2::CENTER_CENTER,
                        label,
                        egui::FontId::proportional(12.0),
                        DARK_TEXT_DIM);
                    draw_spinner(ui, canvas.center() + egui::vec2(0.0, 20.0));
                }

                SourceState::Failed(msg) => {
                    self.held_frame = None;
                    painter.text(
                        canvas.center(),
                        egui::Align2::CENTER_CENTER,
                        format!("⚠ {msg}"),
                        egui::FontId::proportional(12.0),
                        RED_DIM);
                }

                SourceState::Unloaded => {
                    self.held_frame = None;
                    painter.text(canvas.center(), egui::Align2::CENTER_CENTER,
                        "NO SIGNAL", egui::FontId::monospace(14.0), Color32::from_gray(40));
                    let mut y = canvas.min.y;
                    while y < canvas.max.y {
                        painter.line_segment(
                            [Pos2::new(canvas.min.x, y), Pos2::new(canvas.max.x, y)],
                            Stroke::new(0.5, Color32::from_rgba_unmultiplied(255, 255, 255, 3)));
                        y += 4.0;
                    }
                }
            }

            ui.add_space(6.0);

            // ── Transport bar ────────────────────────────────────────────────
            // Full-width bar, controls positioned with coordinate math from
            // the left edge; the seek slider absorbs whatever width remains.
            let bar_w = ui.available_width();
            let (bar_rect, _) = ui.allocate_exact_size(
                Vec2::new(bar_w, BAR_H), Sense::hover());

            let painter = ui.painter();
            painter.rect_filled(bar_rect, BTN_R, DARK_BG_3);
            painter.rect_stroke(bar_rect, BTN_R,
                Stroke::new(1.0, DARK_BORDER), egui::StrokeKind::Outside);

            let cy = bar_rect.center().y;
            let mut x = bar_rect.min.x + 10.0;

            // One fixed-size painted transport button; returns clicked.
            // Takes &Ui — interact() and painter() only need a shared borrow.
            let tbtn = |ui: &Ui, x: &mut f32, id: &str, active: bool,
                        draw_icon: &dyn Fn(&egui::Painter, Pos2, Color32)| {
                let r = Rect::from_min_size(
                    Pos2::new(*x, cy - BTN_SIZE / 2.0),
                    Vec2::splat(BTN_SIZE));
                let resp = ui.interact(r, ui.id().with(id), Sense::click());
                let (bg, icol) = if resp.is_pointer_button_down_on() {
                    (DARK_BG_2.gamma_multiply(0.6), Color32::WHITE)
                } else if resp.hovered() {
                    (DARK_BG_2, ACCENT.linear_multiply(1.2))
                } else if active {
                    (DARK_BG_3, ACCENT)
                } else {
                    (DARK_BG_3, Color32::from_gray(175))
                };
                let p = ui.painter();
                p.rect_filled(r, BTN_R, bg);
                if resp.hovered() || active {
                    p.rect_stroke(r, BTN_R,
                        Stroke::new(1.0, ACCENT.gamma_multiply(0.35)),
                        egui::StrokeKind::Outside);
                }
                draw_icon(p, r.center(), icol);
                *x += BTN_SIZE;
                resp.clicked()
            };

            // ── Play / Pause ─────────────────────────────────────────────
            let playing = state.is_playing;
            if tbtn(ui, &mut x, "play_pause", playing, &|p, c, col| {
                if playing {
                    for ox in [-ICON_SZ * 0.45, ICON_SZ * 0.45] {
                        p.rect_filled(
                            Rect::from_center_size(
                                Pos2::new(c.x + ox, c.y),
                                Vec2::new(3.0, ICON_SZ * 1.8)),
                            1.0, col);
                    }
                } else {
                    p.add(egui::Shape::convex_polygon(vec![
                        Pos2::new(c.x - ICON_SZ * 0.5, c.y - ICON_SZ),
                        Pos2::new(c.x - ICON_SZ * 0.5, c.y + ICON_SZ),
                        Pos2::new(c.x + ICON_SZ,       c.y),
                    ], col, Stroke::NONE));
                }
            }) {
                if playing { cmd.push(PlayerCommand::Pause); }
                else       { cmd.push(PlayerCommand::Play);  }
            }
            x += GAP;

            // ── Stop ─────────────────────────────────────────────────────
            if tbtn(ui, &mut x, "stop", false, &|p, c, col| {
                p.rect_filled(
                    Rect::from_center_size(c, Vec2::splat(ICON_SZ * 1.5)),
                    1.5, col);
            }) {
                cmd.push(PlayerCommand::Stop);
            }
            x += SEP;

            // ── Timecode ─────────────────────────────────────────────────
            painter.text(
                Pos2::new(x, cy),
                egui::Align2::LEFT_CENTER,
                format_time(state.current_time),
                egui::FontId::monospace(12.0),
                ACCENT);
            x += TIME_W + SEP;

            // ── Mute + volume (right side, reserve before the seek bar) ──
            let right_w = BTN_SIZE + GAP + VOL_W + 10.0;
            let seek_w  = (bar_rect.max.x - right_w - SEP - x).max(40.0);

            // Seek slider across the middle.
            let total = state.duration();
            let seek_rect = Rect::from_min_size(
                Pos2::new(x, cy - BTN_SIZE / 2.0),
                Vec2::new(seek_w, BTN_SIZE));
            let mut pos = state.current_time;
            let slider = egui::Slider::new(&mut pos, 0.0..=total.max(0.001))
                .show_value(false)
                .trailing_fill(true);
            if ui.put(seek_rect, slider).changed() {
                cmd.push(PlayerCommand::Seek(pos));
            }
            x += seek_w + SEP;

            let muted   = state.muted;
            let vol_val = state.volume;
            if tbtn(ui, &mut x, "mute", muted, &|p, c, col| {
                p.add(egui::Shape::convex_polygon(vec![
                    Pos2::new(c.x - ICON_SZ + 1.0, c.y - ICON_SZ * 0.4),
                    Pos2::new(c.x - ICON_SZ + 1.0, c.y + ICON_SZ * 0.4),
                    Pos2::new(c.x + 1.0,           c.y + ICON_SZ * 0.9),
                    Pos2::new(c.x + 1.0,           c.y - ICON_SZ * 0.9),
                ], col, Stroke::NONE));
                if !muted && vol_val > 0.0 {
                    p.circle_stroke(
                        Pos2::new(c.x + 2.0, c.y), ICON_SZ * 0.85,
                        Stroke::new(1.5, col.gamma_multiply(0.65)));
                }
                if muted {
                    let ox = c.x + ICON_SZ * 0.35;
                    p.line_segment(
                        [Pos2::new(ox - 4.0, c.y - 4.0), Pos2::new(ox + 4.0, c.y + 4.0)],
                        Stroke::new(1.5, RED_DIM));
                    p.line_segment(
                        [Pos2::new(ox + 4.0, c.y - 4.0), Pos2::new(ox - 4.0, c.y + 4.0)],
                        Stroke::new(1.5, RED_DIM));
                }
            }) {
                cmd.push(PlayerCommand::ToggleMute);
            }
            x += GAP;

            let vol_rect = Rect::from_min_size(
                Pos2::new(x, cy - BTN_SIZE / 2.0),
                Vec2::new(VOL_W, BTN_SIZE));
            let mut vol = state.volume;
            if ui.put(vol_rect,
                egui::Slider::new(&mut vol, 0.0_f32..=1.0_f32)
                    .show_value(false)
                    .trailing_fill(true)
            ).changed() {
                cmd.push(PlayerCommand::SetVolume(vol));
            }
        });
    }
}

/// Small animated spinner for loading states.
fn draw_spinner(ui: &Ui, center: Pos2) {
    let painter = ui.painter();
    let t = ui.input(|i| i.time) as f32;
    let r = 12.0_f32;
    painter.circle_stroke(center, r, Stroke::new(1.5, Color32::from_gray(35)));
    let a = t * 3.5;
    painter.line_segment(
        [center, center + egui::vec2(a.cos() * r, a.sin() * r)],
        Stroke::new(2.0, ACCENT));
    ui.ctx().request_repaint();
}

/// One-line source caption for the top bar.
pub fn source_caption(state: &PlayerState) -> String {
    match &state.source {
        SourceState::Ready(clip) => clip.name.clone(),
        SourceState::Fetching { .. } => "downloading sample…".into(),
        SourceState::Failed(_) => "load failed".into(),
        SourceState::Unloaded => String::new(),
    }
}
