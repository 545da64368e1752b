// crates/speedshift-core/src/media_types.rs
//
// Types that flow across the channel between speedshift-media and
// speedshift-ui. No egui, no ffmpeg — just plain data.

use std::path::PathBuf;
use uuid::Uuid;

/// Results sent from the MediaWorker background threads to the UI.
pub enum MediaResult {
    /// Source duration in seconds, from the probe pass.
    Duration { seconds: f64 },
    /// Native pixel dimensions of the source's video stream.
    VideoSize { width: u32, height: u32 },
    /// First decoded frame, shown in the viewport before playback starts.
    Poster { width: u32, height: u32, data: Vec<u8> },
    /// Extracted WAV ready for the rodio sink.
    AudioReady { path: PathBuf },

    /// Bytes received so far for the remote sample download.
    FetchProgress { downloaded: u64, total: u64 },
    /// The remote sample is on disk and ready to probe.
    FetchDone { path: PathBuf },
    FetchFailed { msg: String },

    /// Terminal export results. Exactly one of these is sent per job;
    /// `job_id` lets the controller ignore results from stale jobs.
    ExportDone { job_id: Uuid, path: PathBuf },
    ExportError { job_id: Uuid, msg: String },

    /// Non-fatal background failure (probe, audio extraction).
    Error { msg: String },
}

/// A decoded frame from the dedicated playback pipeline.
pub struct PlaybackFrame {
    /// Seconds into the source file.
    pub timestamp: f64,
    pub width:     u32,
    pub height:    u32,
    pub data:      Vec<u8>, // RGBA
}
