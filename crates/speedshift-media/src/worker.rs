// crates/speedshift-media/src/worker.rs
//
// MediaWorker: owns the playback decode thread and spawns every other
// background job (fetch, probe, audio extraction, export).
// All public API that speedshift-ui calls lives here.

use std::path::PathBuf;
use std::sync::{Arc, atomic::{AtomicBool, Ordering}};
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};

use speedshift_core::export::{EditedMediaItem, ExportJob, TransformEngine};
use speedshift_core::media_types::{MediaResult, PlaybackFrame};

use crate::audio::extract_audio;
use crate::decode::LiveDecoder;
use crate::fetch::fetch_remote;
use crate::probe::probe_source;
use crate::transform::run_transform;

enum PlaybackCmd {
    Start { path: PathBuf, ts: f64 },
    Stop,
}

pub struct MediaWorker {
    /// Shared result channel: probe, fetch, audio, and export results.
    pub rx: Receiver<MediaResult>,
    tx:     Sender<MediaResult>,

    /// Dedicated playback pipeline.
    pb_tx:     Sender<PlaybackCmd>,
    pub pb_rx: Receiver<PlaybackFrame>,

    shutdown: Arc<AtomicBool>,
}

impl MediaWorker {
    pub fn new() -> Self {
        let (tx, rx) = bounded(256);

        // ── Dedicated playback decode thread ──────────────────────────────────
        // Runs continuously ahead of the UI filling a bounded channel.
        // 32 frames ≈ 1 s of lookahead headroom for post-seek burn; the
        // blocking send IS the rate limiter, no sleeps involved.
        let (pb_tx, pb_cmd_rx)   = bounded::<PlaybackCmd>(4);
        let (pb_frame_tx, pb_rx) = bounded::<PlaybackFrame>(32);

        thread::spawn(move || {
            let mut decoder: Option<LiveDecoder> = None;
            loop {
                // Commands first: non-blocking while decoding, blocking when idle.
                let cmd = if decoder.is_some() {
                    match pb_cmd_rx.try_recv() {
                        Ok(c) => Some(c),
                        Err(TryRecvError::Empty) => None,
                        Err(TryRecvError::Disconnected) => return,
                    }
                } else {
                    match pb_cmd_rx.recv() {
                        Ok(c)  => Some(c),
                        Err(_) => return,
                    }
                };
                if let Some(cmd) = cmd {
                    match cmd {
                        PlaybackCmd::Start { path, ts } => decoder = open_at(&path, ts),
                        PlaybackCmd::Stop => decoder = None,
                    }
                    continue;
                }

                let Some(d) = decoder.as_mut() else { continue };
                match d.next_frame() {
                    Some((data, w, h, ts_secs)) => {
                        let f = PlaybackFrame {
                            timestamp: ts_secs, width: w, height: h, data,
                        };
                        // send() blocks when the channel is full — that IS
                        // the rate limiter.
                        if pb_frame_tx.send(f).is_err() { return; }
                    }
                    None => { decoder = None; } // EOF
                }
            }
        });

        Self {
            rx, tx, pb_tx, pb_rx,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag every background thread to bail out at its next checkpoint.
    /// The playback thread exits when the command channel disconnects.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Download the remote sample to `dest` on a background thread.
    pub fn fetch_source(&self, url: String, dest: PathBuf) {
        let tx = self.tx.clone();
        let sd = self.shutdown.clone();
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) { return; }
            match fetch_remote(&url, &dest, &tx) {
                Ok(())  => { let _ = tx.send(MediaResult::FetchDone { path: dest }); }
                Err(e)  => { let _ = tx.send(MediaResult::FetchFailed { msg: format!("{e:#}") }); }
            }
        });
    }

    /// Probe duration / dimensions / poster for a freshly loaded source.
    pub fn probe_source(&self, path: PathBuf) {
        let tx = self.tx.clone();
        let sd = self.shutdown.clone();
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) { return; }
            probe_source(&path, &tx);
        });
    }

    /// Extract the source's audio into a temp WAV for the rodio sink.
    pub fn extract_audio(&self, path: PathBuf) {
        let tx = self.tx.clone();
        let sd = self.shutdown.clone();
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) { return; }
            extract_audio(&path, &tx);
        });
    }

    /// Start the dedicated playback pipeline at `ts` seconds into `path`.
    pub fn start_playback(&self, path: PathBuf, ts: f64) {
        // Flush stale frames from the previous playback session.
        while self.pb_rx.try_recv().is_ok() {}
        let _ = self.pb_tx.try_send(PlaybackCmd::Start { path, ts });
    }

    /// Stop the dedicated playback pipeline.
    pub fn stop_playback(&self) {
        let _ = self.pb_tx.try_send(PlaybackCmd::Stop);
    }

    /// Run an export job on its own thread. Exactly one ExportDone /
    /// ExportError carrying `job.id` is sent on the result channel.
    pub fn start_export(&self, job: ExportJob, item: EditedMediaItem) {
        let tx = self.tx.clone();
        let sd = self.shutdown.clone();
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) {
                let _ = tx.send(MediaResult::ExportError {
                    job_id: job.id,
                    msg:    "worker shutting down".into(),
                });
                return;
            }
            run_transform(&job, &item, &tx);
        });
    }
}

impl TransformEngine for MediaWorker {
    fn start(&self, job: &ExportJob, item: &EditedMediaItem) {
        self.start_export(job.clone(), item.clone());
    }
}

/// Open a decoder at `ts`, pre-rolled to the exact frame.
///
/// burn_to_pts runs synchronously (decode-only, no scale) before the decoder
/// enters the send loop — the first frame sent is at the correct position
/// rather than the preceding keyframe.
fn open_at(path: &PathBuf, ts: f64) -> Option<LiveDecoder> {
    match LiveDecoder::open(path, ts) {
        Ok(mut d) => {
            let tpts = d.ts_to_pts(ts);
            d.burn_to_pts(tpts);
            Some(d)
        }
        Err(e) => {
            eprintln!("[pb] open: {e}");
            None
        }
    }
}
