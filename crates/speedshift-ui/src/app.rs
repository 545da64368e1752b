// crates/speedshift-ui/src/app.rs (speedshift-ui)
//
// Frame order matters and mirrors the module contracts:
//   1. ensure_source  — first frame only; pick cached sample / local file /
//                       kick off the download
//   2. poll_media     — PTS-gated playback frames, then drain the worker
//                       channel (this is where export results resolve)
//   3. panels         — modules read state, emit commands
//   4. process_command— the only place PlayerState mutates
//   5. module ticks   — playback/audio react to the new state
//   6. clock          — current_time += dt * speed while playing
//   7. toasts         — painted last so they overlay everything

use eframe::egui;
use serde::{Deserialize, Serialize};
use rfd::FileDialog;

use speedshift_core::commands::PlayerCommand;
use speedshift_core::export::{ExportOutcome, RequestOutcome};
use speedshift_core::state::{PlayerState, SourceState, SAMPLE_VIDEO_URL};
use speedshift_media::audio::cleanup_audio_temp;
use speedshift_media::MediaWorker;

use crate::context::AppContext;
use crate::modules::{
    audio::AudioModule,
    controls::ControlsModule,
    video::VideoModule,
    viewport::{source_caption, ViewportModule},
    ScreenModule,
};
use crate::paths;
use crate::theme::configure_style;

#[derive(Serialize, Deserialize)]
struct AppStorage {
    player: PlayerState,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct SpeedShiftApp {
    state:    PlayerState,
    context:  AppContext,
    // Panel modules as concrete types — typos are a compile error instead of
    // a silently blank panel.
    viewport: ViewportModule,
    controls: ControlsModule,
    video:    VideoModule,
    audio:    AudioModule,
    /// Commands emitted by modules each frame, processed after the UI pass.
    pending_cmds: Vec<PlayerCommand>,
    /// First-frame source selection has run.
    source_initialized: bool,
}

impl SpeedShiftApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        configure_style(&cc.egui_ctx);
        // Pin to dark mode — prevents egui overwriting the theme on OS
        // light/dark changes.
        cc.egui_ctx.options_mut(|o| {
            o.theme_preference = egui::ThemePreference::Dark;
        });

        let state = cc.storage
            .and_then(|s| eframe::get_value::<AppStorage>(s, eframe::APP_KEY))
            .map(|d| d.player)
            .unwrap_or_default();

        let context = AppContext::new(MediaWorker::new());

        Self {
            state,
            context,
            viewport:           ViewportModule::new(),
            controls:           ControlsModule::new(),
            video:              VideoModule::new(),
            audio:              AudioModule::new(),
            pending_cmds:       Vec::new(),
            source_initialized: false,
        }
    }

    /// First frame only: restore the last local file, reuse the cached
    /// sample, or start downloading it.
    fn ensure_source(&mut self) {
        if self.source_initialized {
            return;
        }
        self.source_initialized = true;

        if let Some(path) = self.state.local_source.clone() {
            if path.is_file() {
                self.context.activate_source(&mut self.state, path, true);
                return;
            }
            eprintln!("[app] saved source gone: {}", path.display());
            self.state.local_source = None;
        }

        let cached = paths::sample_cache_path();
        if cached.is_file() {
            self.context.activate_source(&mut self.state, cached, true);
        } else {
            self.state.source = SourceState::Fetching { downloaded: 0, total: 0 };
            self.context.media_worker.fetch_source(SAMPLE_VIDEO_URL.to_string(), cached);
        }
    }

    fn process_command(&mut self, cmd: PlayerCommand) {
        match cmd {
            // ── Playback ─────────────────────────────────────────────────────
            PlayerCommand::Play => {
                let total = self.state.duration();
                if total > 0.0 && self.state.current_time >= total - 0.1 {
                    self.state.current_time = 0.0;
                }
                self.state.is_playing = true;
            }
            PlayerCommand::Pause => {
                self.state.is_playing = false;
            }
            PlayerCommand::Stop => {
                self.state.is_playing   = false;
                self.state.current_time = 0.0;
            }
            PlayerCommand::Seek(t) => {
                let t = self.state.clamp_seek(t);
                self.state.current_time       = t;
                self.context.pending_pb_frame = None;
                self.context.audio_sink       = None; // rebuilt at the new position
                if self.state.is_playing {
                    if let Some(clip) = self.state.source_clip() {
                        self.context.media_worker.start_playback(clip.path.clone(), t);
                    }
                }
            }
            PlayerCommand::SetSpeed(speed) => {
                // Applied to live playback immediately, whatever the export
                // controller is doing.
                self.state.select_speed(speed);
                if let Some(sink) = &self.context.audio_sink {
                    sink.set_speed(self.state.speed);
                }
            }
            PlayerCommand::SetVolume(v) => {
                self.state.volume = v;
            }
            PlayerCommand::ToggleMute => {
                self.state.muted = !self.state.muted;
            }

            // ── Source ───────────────────────────────────────────────────────
            PlayerCommand::OpenSource(path) => {
                self.state.local_source = Some(path.clone());
                self.context.activate_source(&mut self.state, path, true);
            }

            // ── Export ───────────────────────────────────────────────────────
            PlayerCommand::ExportVideo { speed } => {
                let source = self.state.source_clip()
                    .map(|c| c.path.clone())
                    .unwrap_or_default();

                let outcome = self.state.export.request(
                    &source,
                    speed,
                    &paths::movies_dir(),
                    &self.context.media_worker,
                );
                match outcome {
                    RequestOutcome::Started(job) => {
                        eprintln!("[export] job {} → {}", job.id, job.output.display());
                        self.context.toasts.info(job.started_message());
                    }
                    // Already exporting: the request is dropped, the
                    // in-flight job keeps running untouched.
                    RequestOutcome::Dropped => {}
                    RequestOutcome::Failed(msg) => {
                        eprintln!("[export] request rejected: {msg}");
                        self.context.toasts.error(ExportOutcome::Failed(msg).message());
                    }
                }
            }
        }
    }

    fn poll_media(&mut self, ctx: &egui::Context) {
        // Playback frame consumption (PTS-gated), then everything else.
        VideoModule::poll_playback(&self.state, &mut self.context, ctx);
        self.context.ingest_media_results(&mut self.state, ctx);
    }
}

// ── eframe::App ───────────────────────────────────────────────────────────────

impl eframe::App for SpeedShiftApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &AppStorage {
            player: self.state.clone(),
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.context.media_worker.shutdown();
        self.context.audio_sink = None;
        if let Some(wav) = self.state.source_clip().and_then(|c| c.audio_path.clone()) {
            cleanup_audio_temp(&wav);
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_source();
        self.poll_media(ctx);

        egui::TopBottomPanel::top("top_panel")
            .exact_height(36.0)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new("⚡ SpeedShift")
                            .strong().size(15.0).color(crate::theme::ACCENT),
                    );
                    ui.separator();
                    ui.label(
                        egui::RichText::new(source_caption(&self.state))
                            .size(12.0).weak(),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Open…").clicked() {
                            if let Some(path) = FileDialog::new()
                                .add_filter("Video", &["mp4", "mov", "mkv", "webm", "avi"])
                                .pick_file()
                            {
                                self.pending_cmds.push(PlayerCommand::OpenSource(path));
                            }
                        }
                    });
                });
            });

        egui::TopBottomPanel::bottom("controls_panel")
            .show(ctx, |ui| {
                self.controls.ui(ui, &self.state, &mut self.pending_cmds);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            // Hand the viewport the live frame so it renders directly;
            // the module owns its held-frame fallback.
            self.viewport.current_frame = self.context.frame.clone();
            self.viewport.ui(ui, &self.state, &mut self.pending_cmds);
        });

        // ── Process commands emitted by modules this frame ────────────────────
        let cmds: Vec<PlayerCommand> = self.pending_cmds.drain(..).collect();
        for cmd in cmds {
            self.process_command(cmd);
        }

        // ── Tick non-rendering modules ────────────────────────────────────────
        self.video.tick(&self.state, &mut self.context);
        self.audio.tick(&self.state, &mut self.context);

        // ── Playback clock — this is where the speed multiplier lives ─────────
        if self.state.is_playing {
            let dt = ctx.input(|i| i.stable_dt as f64);
            self.state.current_time += dt * self.state.speed as f64;
            let total = self.state.duration();
            if total > 0.0 && self.state.current_time >= total {
                self.state.current_time = total;
                self.state.is_playing   = false;
            }
            ctx.request_repaint();
        }

        self.context.toasts.show(ctx);
    }
}
