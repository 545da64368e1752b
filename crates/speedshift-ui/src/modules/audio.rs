// crates/speedshift-ui/src/modules/audio.rs
//
// AudioModule owns all audio playback logic.
// Non-rendering module — tick() is called every frame from app.rs after
// commands are processed. No egui panel is shown.
//
// The sink consumes the extracted WAV at `state.speed` via Sink::set_speed,
// which keeps it in lockstep with the speed-scaled playback clock: both
// advance media time at `speed` seconds per wall second.

use std::fs::File;

use egui::Ui;
use rodio::{Decoder, OutputStreamBuilder};

use speedshift_core::commands::PlayerCommand;
use speedshift_core::state::PlayerState;

use super::ScreenModule;
use crate::context::AppContext;

pub struct AudioModule;

impl AudioModule {
    pub fn new() -> Self { Self }

    /// Manage the rodio sink: create on play, drop on stop/seek, sync
    /// volume/mute/speed every tick.
    pub fn run_tick(state: &PlayerState, ctx: &mut AppContext) {
        // Lazy stream init — deferred past app construction so the audio
        // backend comes up after the window's event loop is live.
        if ctx.audio_stream.is_none() && !ctx.audio_failed {
            match OutputStreamBuilder::open_default_stream() {
                Ok(stream) => ctx.audio_stream = Some(stream),
                Err(e) => {
                    eprintln!("[audio] no output stream: {e}");
                    ctx.audio_failed = true;
                }
            }
        }
        let Some(stream) = &ctx.audio_stream else { return };

        if !state.is_playing {
            // Drop the sink on the play→stop transition; it is rebuilt with
            // a fresh seek on the next play.
            ctx.audio_sink = None;
            return;
        }

        let Some(wav) = state.source_clip().and_then(|c| c.audio_path.clone()) else {
            return;
        };

        // Rebuild only when there is no sink at all. A sink that drains early
        // (WAV shorter than the video) just means silence until the clock
        // stops — rebuilding it every tick would thrash File::open.
        if ctx.audio_sink.is_none() {
            if let Ok(file) = File::open(&wav) {
                if let Ok(decoder) = Decoder::new(file) {
                    let sink = rodio::Sink::connect_new(stream.mixer());
                    sink.append(decoder);
                    let _ = sink.try_seek(
                        std::time::Duration::from_secs_f64(state.current_time.max(0.0)));
                    sink.set_speed(state.speed);
                    sink.set_volume(if state.muted { 0.0 } else { state.volume });
                    sink.play();
                    ctx.audio_sink = Some(sink);
                }
            }
        } else if let Some(sink) = &ctx.audio_sink {
            // Sync speed/volume/mute changes without rebuilding the sink —
            // a selector click is audible on the very next tick.
            sink.set_speed(state.speed);
            sink.set_volume(if state.muted { 0.0 } else { state.volume });
        }
    }
}

// ScreenModule is implemented for uniform storage alongside the other
// modules. AudioModule renders no UI — ui() is a no-op.
impl ScreenModule for AudioModule {
    fn name(&self) -> &str { "Audio" }

    fn ui(&mut self, _ui: &mut Ui, _state: &PlayerState, _cmd: &mut Vec<PlayerCommand>) {
        // No UI panel — audio is driven by tick(), not the egui pass.
    }

    fn tick(&mut self, state: &PlayerState, ctx: &mut AppContext) {
        Self::run_tick(state, ctx);
    }
}
