// crates/speedshift-ui/src/modules/video.rs
//
// VideoModule owns all playback frame logic.
// Non-rendering module — tick() and poll_playback() are called every frame
// from app.rs. No egui panel is shown.

use egui::Ui;

use speedshift_core::commands::PlayerCommand;
use speedshift_core::media_types::PlaybackFrame;
use speedshift_core::state::PlayerState;

use super::ScreenModule;
use crate::context::{load_rgba_texture, AppContext};

pub struct VideoModule;

impl VideoModule {
    pub fn new() -> Self { Self }

    // ── poll_playback ─────────────────────────────────────────────────────────
    /// PTS-gated playback frame consumption. Call from app::poll_media().
    ///
    /// The decode thread pre-fills a bounded channel as fast as FFmpeg can go.
    /// Draining everything and showing the last frame would race ahead at
    /// decode speed, so a one-slot pending buffer holds the next frame until
    /// the playback clock has caught up to its PTS. The clock itself advances
    /// at `dt * speed`, which is the whole speed-multiplier implementation:
    /// overdue frames get dropped by the fast-forward loop below, and at slow
    /// speeds frames simply wait longer in the slot.
    pub fn poll_playback(state: &PlayerState, ctx: &mut AppContext, egui_ctx: &egui::Context) {
        if !state.is_playing {
            return;
        }
        let local_t = state.current_time;

        // Discard a pending frame that can no longer become due — e.g. left
        // over from before a backwards seek.
        if let Some(pending) = &ctx.pending_pb_frame {
            if pending.timestamp < local_t - 3.0 {
                ctx.pending_pb_frame = None;
            }
        }

        // Step 1: fill the pending slot if empty.
        if ctx.pending_pb_frame.is_none() {
            if let Ok(f) = ctx.media_worker.pb_rx.try_recv() {
                ctx.pending_pb_frame = Some(f);
            }
        }

        // Step 2: fast-forward past overdue frames. At 2.0x this is what
        // drops every other frame instead of smearing them out over time.
        while ctx.pending_pb_frame
            .as_ref()
            .map(|f: &PlaybackFrame| f.timestamp < local_t - (1.0 / 30.0))
            .unwrap_or(false)
        {
            match ctx.media_worker.pb_rx.try_recv() {
                Ok(newer) => { ctx.pending_pb_frame = Some(newer); }
                Err(_)    => break,
            }
        }

        // Step 3: promote the pending frame when its PTS is due.
        //
        // Upper bound: never show a frame more than one tick early.
        // Lower bound: 3 s of slack covers the worst-case post-seek burn.
        let frame_due = ctx.pending_pb_frame.as_ref()
            .map(|f: &PlaybackFrame| {
                f.timestamp <= local_t + (1.0 / 60.0) && f.timestamp >= local_t - 3.0
            })
            .unwrap_or(false);

        if frame_due {
            if let Some(f) = ctx.pending_pb_frame.take() {
                ctx.frame = Some(load_rgba_texture(egui_ctx, "pb", f.width, f.height, &f.data));
                egui_ctx.request_repaint();
                // Pre-pull the next frame so it's ready for the next tick.
                if let Ok(next) = ctx.media_worker.pb_rx.try_recv() {
                    ctx.pending_pb_frame = Some(next);
                }
            }
        }
    }

    // ── tick ──────────────────────────────────────────────────────────────────
    /// Playback start/stop edge handling. Call every frame from app::update()
    /// after commands are processed.
    pub fn run_tick(state: &PlayerState, ctx: &mut AppContext) {
        let just_started = state.is_playing && !ctx.prev_playing;
        let just_stopped = !state.is_playing && ctx.prev_playing;
        ctx.prev_playing = state.is_playing;

        if just_started {
            if let Some(clip) = state.source_clip() {
                ctx.pending_pb_frame = None;
                ctx.media_worker.start_playback(clip.path.clone(), state.current_time);
            }
        }

        if just_stopped {
            ctx.media_worker.stop_playback();
            ctx.pending_pb_frame = None;
        }
    }
}

// ── ScreenModule (no panel) ───────────────────────────────────────────────────

impl ScreenModule for VideoModule {
    fn name(&self) -> &str { "Video" }

    fn ui(&mut self, _ui: &mut Ui, _state: &PlayerState, _cmd: &mut Vec<PlayerCommand>) {
        // No panel — driven entirely by tick() and poll_playback().
    }

    fn tick(&mut self, state: &PlayerState, ctx: &mut AppContext) {
        Self::run_tick(state, ctx);
    }
}
