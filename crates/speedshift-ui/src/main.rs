#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod context;
mod modules;
mod paths;
mod theme;
mod toast;

fn main() -> eframe::Result {
    ffmpeg_the_third::init().expect("FFmpeg init failed");

    let native_options = eframe::NativeOptions {
        centered: true,
        viewport: egui::ViewportBuilder::default()
            .with_title("⚡ SpeedShift")
            .with_inner_size([540.0, 720.0])
            .with_min_inner_size([420.0, 560.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "SpeedShift",
        native_options,
        Box::new(|cc| Ok(Box::new(app::SpeedShiftApp::new(cc)))),
    )
}
