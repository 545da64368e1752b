// crates/speedshift-ui/src/toast.rs
//
// Transient fire-and-forget notifications, stacked bottom-center over the
// viewport. No persistence, no acknowledgment — each card lives TOAST_SECS
// and fades out on its own.

use std::time::Instant;

use egui::{Align2, Color32, Context, Margin, RichText, Stroke};

use crate::theme::{DARK_BG_2, DARK_BORDER, DARK_TEXT, GREEN_DIM, RED_DIM};

/// How long a card stays on screen.
const TOAST_SECS: f32 = 4.0;

#[derive(Clone, Copy, PartialEq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

pub struct Toast {
    kind:    ToastKind,
    message: String,
    born:    Instant,
}

#[derive(Default)]
pub struct Toasts {
    queue: Vec<Toast>,
}

impl Toasts {
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Error, message);
    }

    fn push(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.queue.push(Toast {
            kind,
            message: message.into(),
            born: Instant::now(),
        });
    }

    /// Drop expired cards and paint the rest. Call once per frame, after all
    /// panels, so the overlay sits on top.
    pub fn show(&mut self, ctx: &Context) {
        self.queue.retain(|t| t.born.elapsed().as_secs_f32() < TOAST_SECS);
        if self.queue.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toast_overlay"))
            .order(egui::Order::Foreground)
            .anchor(Align2::CENTER_BOTTOM, egui::vec2(0.0, -16.0))
            .show(ctx, |ui| {
                for toast in &self.queue {
                    let age  = toast.born.elapsed().as_secs_f32();
                    // Linear fade over the final second.
                    let fade = ((TOAST_SECS - age).clamp(0.0, 1.0) * 255.0) as u8;

                    let (border, text) = match toast.kind {
                        ToastKind::Info    => (DARK_BORDER, DARK_TEXT),
                        ToastKind::Success => (GREEN_DIM, GREEN_DIM),
                        ToastKind::Error   => (RED_DIM, RED_DIM),
                    };

                    egui::Frame::new()
                        .fill(DARK_BG_2.gamma_multiply(fade as f32 / 255.0))
                        .stroke(Stroke::new(1.0, border.gamma_multiply(fade as f32 / 255.0)))
                        .corner_radius(egui::CornerRadius::same(4))
                        .inner_margin(Margin::symmetric(12, 8))
                        .show(ui, |ui| {
                            ui.label(
                                RichText::new(&toast.message)
                                    .size(12.0)
                                    .color(Color32::from_rgba_unmultiplied(
                                        text.r(), text.g(), text.b(), fade,
                                    )),
                            );
                        });
                    ui.add_space(6.0);
                }
            });

        // Keep repainting so cards expire without needing input events.
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
