// crates/speedshift-media/src/probe.rs
//
// In-process FFmpeg probing: duration, video dimensions, poster frame.
// One pass per loaded source, results sent over the worker channel.

use std::path::Path;
use crossbeam_channel::Sender;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::{input, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags};

use speedshift_core::media_types::MediaResult;

/// Poster frames are scaled to this width, proportional height.
const POSTER_W: u32 = 640;

/// Probe duration, dimensions, and a poster frame for `path`.
/// Soft-fails: anything that goes wrong sends `MediaResult::Error` (or just a
/// log line for the poster) and the player degrades gracefully.
pub fn probe_source(path: &Path, tx: &Sender<MediaResult>) {
    let seconds = probe_duration(path, tx);
    probe_size_and_poster(path, seconds, tx);
}

fn probe_duration(path: &Path, tx: &Sender<MediaResult>) -> f64 {
    match input(path) {
        Ok(ctx) => {
            let dur = ctx.duration() as f64 / ffmpeg::ffi::AV_TIME_BASE as f64;
            if dur > 0.0 {
                eprintln!("[media] duration {dur:.2}s ← {}", path.display());
                let _ = tx.send(MediaResult::Duration { seconds: dur });
                return dur;
            }
            // Container didn't know — fall back to the best stream's duration.
            if let Some(stream) = ctx.streams().best(Type::Video)
                .or_else(|| ctx.streams().best(Type::Audio))
            {
                let tb = stream.time_base();
                let d  = stream.duration() as f64 * tb.numerator() as f64
                    / tb.denominator() as f64;
                if d > 0.0 {
                    let _ = tx.send(MediaResult::Duration { seconds: d });
                    return d;
                }
            }
            let _ = tx.send(MediaResult::Error { msg: "duration unknown".into() });
            0.0
        }
        Err(e) => {
            eprintln!("[media] probe_duration open failed: {e}");
            let _ = tx.send(MediaResult::Error { msg: e.to_string() });
            0.0
        }
    }
}

/// Report the video stream's native size and decode one early frame as the
/// viewport poster.
fn probe_size_and_poster(path: &Path, duration: f64, tx: &Sender<MediaResult>) {
    let Ok(mut ictx) = input(path) else { return };

    let video_idx = match ictx.streams().best(Type::Video) {
        Some(s) => s.index(),
        None    => return, // audio-only file
    };

    let (raw_w, raw_h, seek_ts) = {
        let stream = ictx.stream(video_idx).unwrap();
        let (w, h) = unsafe {
            let p = stream.parameters().as_ptr();
            ((*p).width as u32, (*p).height as u32)
        };
        // Grab the poster a little way in — frame 0 is often black.
        let ts = if duration > 2.0 {
            let t  = (duration * 0.1).max(1.0);
            let tb = stream.time_base();
            (t * tb.denominator() as f64 / tb.numerator() as f64) as i64
        } else {
            0i64
        };
        (w, h, ts)
    };

    if raw_w > 0 && raw_h > 0 {
        eprintln!("[media] video size {raw_w}x{raw_h} ← {}", path.display());
        let _ = tx.send(MediaResult::VideoSize { width: raw_w, height: raw_h });
    }

    let _ = ictx.seek(seek_ts, ..=seek_ts);

    // Second context for the decoder (avoids borrow-after-seek conflict).
    let Ok(ictx2) = input(path) else { return };
    let context = match ictx2.stream(video_idx) {
        Some(s) => match ffmpeg::codec::context::Context::from_parameters(s.parameters()) {
            Ok(c)  => c,
            Err(e) => { eprintln!("[media] codec ctx: {e}"); return; }
        },
        None => return,
    };
    let Ok(mut decoder) = context.decoder().video() else { return };

    let poster_h: u32 = ((POSTER_W as f64 * raw_h as f64 / raw_w.max(1) as f64) as u32)
        .max(2) & !1; // must be even

    let mut scaler = match SwsContext::get(
        decoder.format(), decoder.width(), decoder.height(),
        Pixel::RGBA, POSTER_W, poster_h, Flags::BILINEAR,
    ) {
        Ok(s)  => s,
        Err(e) => { eprintln!("[media] poster scaler: {e}"); return; }
    };

    for (stream, packet) in ictx.packets().flatten() {
        if stream.index() != video_idx { continue; }
        if decoder.send_packet(&packet).is_err() { continue; }
        let mut decoded = ffmpeg::util::frame::video::Video::empty();
        while decoder.receive_frame(&mut decoded).is_ok() {
            let mut rgba = ffmpeg::util::frame::video::Video::empty();
            if scaler.run(&decoded, &mut rgba).is_err() { continue; }
            let stride = rgba.stride(0);
            let raw    = rgba.data(0);
            let row_bytes = POSTER_W as usize * 4;
            let data: Vec<u8> = (0..poster_h as usize)
                .flat_map(|row| &raw[row * stride..row * stride + row_bytes])
                .copied()
                .collect();
            eprintln!("[media] poster {POSTER_W}x{poster_h} ← {}", path.display());
            let _ = tx.send(MediaResult::Poster { width: POSTER_W, height: poster_h, data });
            return;
        }
    }
    eprintln!("[media] poster: no frame decoded for {}", path.display());
}
