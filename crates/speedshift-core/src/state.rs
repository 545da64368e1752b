// crates/speedshift-core/src/state.rs
// Pure player data — no egui, no ffmpeg, no runtime handles.
// Serializable via serde; runtime-only fields are skipped.

use std::path::PathBuf;
use serde::{Deserialize, Serialize};

use crate::export::ExportController;

/// The multipliers the speed selector offers. The first entry is the default.
pub const SPEED_CHOICES: [f32; 3] = [1.0, 1.5, 2.0];

/// Remote sample played on first launch, before the user opens anything.
pub const SAMPLE_VIDEO_URL: &str =
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/ForBiggerBlazes.mp4";

/// The media file currently loaded into the player.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceClip {
    pub path:            PathBuf,
    pub name:            String,
    /// 0 until the probe returns.
    pub duration:        f64,
    pub duration_probed: bool,
    #[serde(default)]
    pub video_size:      Option<(u32, u32)>,
    /// Extracted WAV for the rodio sink — a temp file, runtime-only.
    #[serde(skip)]
    pub audio_path:      Option<PathBuf>,
}

impl SourceClip {
    pub fn new(path: PathBuf) -> Self {
        let name = path.file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        Self {
            path,
            name,
            duration:        0.0,
            duration_probed: false,
            video_size:      None,
            audio_path:      None,
        }
    }
}

/// Where the current source sits in its load lifecycle.
#[derive(Clone, Debug, Default)]
pub enum SourceState {
    /// Nothing requested yet — the first app frame decides what to load.
    #[default]
    Unloaded,
    /// The remote sample is downloading into the cache directory.
    Fetching { downloaded: u64, total: u64 },
    Ready(SourceClip),
    Failed(String),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlayerState {
    /// Selected playback/export multiplier. Always one of SPEED_CHOICES.
    pub speed:  f32,
    pub volume: f32,
    #[serde(default)]
    pub muted:  bool,
    /// Path of a user-opened local file, restored on relaunch. None = play
    /// the bundled remote sample.
    #[serde(default)]
    pub local_source: Option<PathBuf>,

    #[serde(skip)]
    pub source:       SourceState,
    #[serde(skip)]
    pub is_playing:   bool,
    #[serde(skip)]
    pub current_time: f64,
    /// The export-request lifecycle. Mutated only through its own methods,
    /// and only from the UI thread.
    #[serde(skip)]
    pub export:       ExportController,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            speed:        SPEED_CHOICES[0],
            volume:       1.0,
            muted:        false,
            local_source: None,
            source:       SourceState::Unloaded,
            is_playing:   false,
            current_time: 0.0,
            export:       ExportController::default(),
        }
    }
}

impl PlayerState {
    pub fn source_clip(&self) -> Option<&SourceClip> {
        match &self.source {
            SourceState::Ready(clip) => Some(clip),
            _ => None,
        }
    }

    pub fn source_clip_mut(&mut self) -> Option<&mut SourceClip> {
        match &mut self.source {
            SourceState::Ready(clip) => Some(clip),
            _ => None,
        }
    }

    /// Known duration of the loaded source, 0.0 until probed.
    pub fn duration(&self) -> f64 {
        self.source_clip().map(|c| c.duration).unwrap_or(0.0)
    }

    /// Select a multiplier. Values outside SPEED_CHOICES are ignored so the
    /// selection can never leave the offered set.
    pub fn select_speed(&mut self, speed: f32) {
        if SPEED_CHOICES.contains(&speed) {
            self.speed = speed;
        }
    }

    /// Clamp a seek target into the playable range.
    pub fn clamp_seek(&self, t: f64) -> f64 {
        let total = self.duration();
        if total > 0.0 { t.clamp(0.0, total) } else { t.max(0.0) }
    }

    /// Swap in a new source and reset the playback clock. Returns the old
    /// clip so the caller can clean up its temp audio.
    pub fn replace_source(&mut self, clip: SourceClip) -> Option<SourceClip> {
        let old = match std::mem::replace(&mut self.source, SourceState::Ready(clip)) {
            SourceState::Ready(old) => Some(old),
            _ => None,
        };
        self.current_time = 0.0;
        self.is_playing   = false;
        old
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_speed_is_normal() {
        assert_eq!(PlayerState::default().speed, 1.0);
    }

    #[test]
    fn select_speed_accepts_offered_multipliers() {
        let mut state = PlayerState::default();
        state.select_speed(1.5);
        assert_eq!(state.speed, 1.5);
        state.select_speed(2.0);
        assert_eq!(state.speed, 2.0);
    }

    #[test]
    fn select_speed_ignores_values_outside_the_set() {
        let mut state = PlayerState::default();
        state.select_speed(3.0);
        assert_eq!(state.speed, 1.0);
        state.select_speed(-1.0);
        assert_eq!(state.speed, 1.0);
    }

    #[test]
    fn seek_clamps_to_duration_once_probed() {
        let mut state = PlayerState::default();
        let mut clip = SourceClip::new("clip.mp4".into());
        clip.duration = 10.0;
        clip.duration_probed = true;
        state.replace_source(clip);
        assert_eq!(state.clamp_seek(-2.0), 0.0);
        assert_eq!(state.clamp_seek(25.0), 10.0);
        assert_eq!(state.clamp_seek(4.5), 4.5);
    }

    #[test]
    fn replace_source_resets_clock_and_returns_old_clip() {
        let mut state = PlayerState::default();
        state.replace_source(SourceClip::new("a.mp4".into()));
        state.current_time = 3.0;
        state.is_playing = true;
        let old = state.replace_source(SourceClip::new("b.mp4".into()));
        assert_eq!(old.unwrap().name, "a.mp4");
        assert_eq!(state.current_time, 0.0);
        assert!(!state.is_playing);
        assert_eq!(state.source_clip().unwrap().name, "b.mp4");
    }
}
