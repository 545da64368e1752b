// crates/speedshift-ui/src/context.rs
//
// AppContext owns all runtime handles that are NOT part of the serializable
// player state. SpeedShiftApp holds one of these plus a PlayerState and the
// module list — nothing else.
//
//   AppContext
//     ├── media_worker     — the FFmpeg worker + all channel handles
//     ├── frame / pending  — viewport texture + PTS-gated playback slot
//     ├── audio_stream     — rodio OutputStream (must outlive the sink)
//     ├── audio_sink       — current source's sink (managed by AudioModule)
//     └── toasts           — transient notification overlay

use eframe::egui;
use rodio::{OutputStream, Sink};

use speedshift_core::export::ExportOutcome;
use speedshift_core::media_types::{MediaResult, PlaybackFrame};
use speedshift_core::state::{PlayerState, SourceClip, SourceState};
use speedshift_media::audio::cleanup_audio_temp;
use speedshift_media::MediaWorker;

use crate::toast::Toasts;

pub struct AppContext {
    pub media_worker: MediaWorker,

    /// Latest viewport texture — live playback frame, or the poster while idle.
    pub frame: Option<egui::TextureHandle>,
    /// Next-to-display playback frame, held until its PTS is due. Prevents
    /// the drain-all pattern from racing ahead of wall-clock time.
    pub pending_pb_frame: Option<PlaybackFrame>,
    /// Was is_playing true on the previous frame? Used to detect play/stop edges.
    pub prev_playing: bool,

    // ── Audio (rodio 0.21) ───────────────────────────────────────────────────
    // OutputStream MUST stay alive for the entire app lifetime — dropping it
    // stops all audio. AudioModule initializes it lazily on first use.
    pub audio_stream: Option<OutputStream>,
    pub audio_sink:   Option<Sink>,
    /// Set once stream creation has failed, so we don't retry every tick.
    pub audio_failed: bool,

    pub toasts: Toasts,
}

impl AppContext {
    pub fn new(media_worker: MediaWorker) -> Self {
        Self {
            media_worker,
            frame:            None,
            pending_pb_frame: None,
            prev_playing:     false,
            audio_stream:     None,
            audio_sink:       None,
            audio_failed:     false,
            toasts:           Toasts::default(),
        }
    }

    /// Swap in a new source: reset playback handles, kick off probe + audio
    /// extraction, clean up the old clip's temp WAV.
    pub fn activate_source(&mut self, state: &mut PlayerState, path: std::path::PathBuf, autoplay: bool) {
        eprintln!("[app] source → {}", path.display());

        if let Some(old) = state.replace_source(SourceClip::new(path.clone())) {
            if let Some(wav) = &old.audio_path {
                cleanup_audio_temp(wav);
            }
        }

        self.media_worker.stop_playback();
        self.frame            = None;
        self.pending_pb_frame = None;
        self.audio_sink       = None;

        self.media_worker.probe_source(path.clone());
        self.media_worker.extract_audio(path);

        state.is_playing = autoplay;
    }

    /// Drain the MediaWorker result channel and load everything into the
    /// appropriate state field or cache. Called once per frame from
    /// `app::poll_media`, after PTS-gated playback frame consumption.
    ///
    /// This is the single translation layer between raw `MediaWorker` output
    /// and UI-visible state — and the one place export results reach the
    /// controller, so its phase only ever mutates on the UI thread.
    pub fn ingest_media_results(&mut self, state: &mut PlayerState, ctx: &egui::Context) {
        while let Ok(result) = self.media_worker.rx.try_recv() {
            match result {
                MediaResult::Duration { seconds } => {
                    if let Some(clip) = state.source_clip_mut() {
                        clip.duration        = seconds;
                        clip.duration_probed = true;
                    }
                    ctx.request_repaint();
                }

                MediaResult::VideoSize { width, height } => {
                    if let Some(clip) = state.source_clip_mut() {
                        clip.video_size = Some((width, height));
                    }
                }

                MediaResult::Poster { width, height, data } => {
                    // Never clobber a live playback frame with the poster.
                    if self.frame.is_none() {
                        self.frame = Some(load_rgba_texture(ctx, "poster", width, height, &data));
                        ctx.request_repaint();
                    }
                }

                MediaResult::AudioReady { path } => {
                    eprintln!("[audio] WAV ready: {}", path.display());
                    if let Some(clip) = state.source_clip_mut() {
                        clip.audio_path = Some(path);
                    }
                    // Rebuild the sink so a session already playing picks
                    // up its audio mid-flight.
                    self.audio_sink = None;
                }

                // ── Remote sample download ────────────────────────────────────
                MediaResult::FetchProgress { downloaded, total } => {
                    if matches!(state.source, SourceState::Fetching { .. }) {
                        state.source = SourceState::Fetching { downloaded, total };
                        ctx.request_repaint();
                    }
                }

                MediaResult::FetchDone { path } => {
                    // The sample behaves like the original app: play as soon
                    // as it is ready.
                    self.activate_source(state, path, true);
                    ctx.request_repaint();
                }

                MediaResult::FetchFailed { msg } => {
                    eprintln!("[fetch] {msg}");
                    state.source = SourceState::Failed(msg.clone());
                    self.toasts.error(format!("Error: {msg}"));
                    ctx.request_repaint();
                }

                // ── Export results ────────────────────────────────────────────
                // resolve() guards on the job id, so a stale result from a
                // previous session never clobbers a freshly started one.

                MediaResult::ExportDone { job_id, path } => {
                    if let Some(outcome) =
                        state.export.resolve(job_id, ExportOutcome::Completed(path))
                    {
                        self.toasts.success(outcome.message());
                    }
                    ctx.request_repaint();
                }

                MediaResult::ExportError { job_id, msg } => {
                    eprintln!("[export] {msg}");
                    if let Some(outcome) =
                        state.export.resolve(job_id, ExportOutcome::Failed(msg))
                    {
                        self.toasts.error(outcome.message());
                    }
                    ctx.request_repaint();
                }

                MediaResult::Error { msg } => {
                    eprintln!("[media] {msg}");
                }
            }
        }
    }
}

/// Upload an RGBA buffer as an egui texture.
pub fn load_rgba_texture(
    ctx:    &egui::Context,
    name:   &str,
    width:  u32,
    height: u32,
    data:   &[u8],
) -> egui::TextureHandle {
    ctx.load_texture(
        name.to_string(),
        egui::ColorImage::from_rgba_unmultiplied([width as usize, height as usize], data),
        egui::TextureOptions::LINEAR,
    )
}
