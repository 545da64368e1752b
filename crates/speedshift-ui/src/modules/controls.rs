// crates/speedshift-ui/src/modules/controls.rs
//
// ControlsModule: the speed selector row and the export button.
//
// Speed buttons always work — selection changes playback immediately even
// while an export runs. The export button snapshots the selected multiplier
// at press time, disables itself while a job is in flight, and relabels to
// "Exporting…" so the guard state is visible without any modal.

use egui::{Color32, RichText, Stroke, Ui};

use speedshift_core::commands::PlayerCommand;
use speedshift_core::export::speed_label;
use speedshift_core::state::{PlayerState, SPEED_CHOICES};

use super::ScreenModule;
use crate::theme::{ACCENT, DARK_BG_2, DARK_BG_3, DARK_BORDER, DARK_TEXT_DIM};

pub struct ControlsModule;

impl ControlsModule {
    pub fn new() -> Self { Self }
}

impl ScreenModule for ControlsModule {
    fn name(&self) -> &str { "Controls" }

    fn ui(&mut self, ui: &mut Ui, state: &PlayerState, cmd: &mut Vec<PlayerCommand>) {
        ui.add_space(8.0);

        // ── Speed selector ───────────────────────────────────────────────────
        ui.label(RichText::new("Playback Speed").size(11.0).color(DARK_TEXT_DIM));
        ui.add_space(2.0);
        ui.horizontal(|ui| {
            let gap = 6.0;
            let btn_w = ((ui.available_width()
                - gap * (SPEED_CHOICES.len() as f32 - 1.0))
                / SPEED_CHOICES.len() as f32)
                .max(40.0);

            for &speed in &SPEED_CHOICES {
                let selected = state.speed == speed;
                let btn = egui::Button::new(
                    RichText::new(format!("{}x", speed_label(speed)))
                        .size(12.0)
                        .color(if selected { ACCENT } else { DARK_TEXT_DIM }),
                )
                .stroke(Stroke::new(1.0, if selected { ACCENT } else { DARK_BORDER }))
                .fill(if selected { DARK_BG_3 } else { DARK_BG_2 })
                .min_size(egui::vec2(btn_w, 28.0));

                if ui.add(btn).clicked() {
                    cmd.push(PlayerCommand::SetSpeed(speed));
                }
            }
        });

        ui.add_space(10.0);

        // ── Export button ────────────────────────────────────────────────────
        let exporting  = state.export.is_exporting();
        let has_source = state.source_clip().is_some();

        let label = if exporting {
            "Exporting…".to_string()
        } else {
            format!("Export Video with {}x Speed", speed_label(state.speed))
        };

        let enabled = !exporting && has_source;
        let export_btn = egui::Button::new(
            RichText::new(label)
                .size(13.0)
                .strong()
                .color(if enabled { Color32::BLACK } else { Color32::DARK_GRAY }),
        )
        .fill(if enabled { ACCENT } else { DARK_BG_3 })
        .stroke(Stroke::NONE)
        .min_size(egui::vec2(ui.available_width(), 34.0));

        let response = ui.add_enabled(enabled, export_btn);
        if response.clicked() {
            // Snapshot the multiplier now; later selector clicks must not
            // change what this request exports at.
            cmd.push(PlayerCommand::ExportVideo { speed: state.speed });
        }
        if !has_source {
            response.on_hover_text("Load a video first");
        }

        ui.add_space(4.0);
        ui.label(
            RichText::new(format!("Exports land in {}", crate::paths::movies_dir().display()))
                .size(10.0)
                .color(DARK_TEXT_DIM),
        );
        ui.add_space(6.0);
    }
}
