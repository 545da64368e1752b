// crates/speedshift-core/src/commands.rs
//
// Every user action in SpeedShift is expressed as a PlayerCommand.
// Modules emit these; app.rs processes them after the UI pass.
// Adding a new feature = add a variant here + one match arm in app.rs.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum PlayerCommand {
    // ── Playback ─────────────────────────────────────────────────────────────
    Play,
    Pause,
    /// Pause and rewind to the start.
    Stop,
    Seek(f64),
    /// Select one of the offered multipliers. Applied to playback immediately,
    /// independent of any export in flight.
    SetSpeed(f32),
    SetVolume(f32),
    ToggleMute,

    // ── Source ───────────────────────────────────────────────────────────────
    /// Swap the current source for a local file picked by the user.
    OpenSource(PathBuf),

    // ── Export ───────────────────────────────────────────────────────────────
    /// Emitted by the export button. `speed` is the multiplier that was
    /// selected at the moment the button was pressed — the live playback
    /// speed may move on afterwards without affecting this request.
    ExportVideo { speed: f32 },
}
