// crates/speedshift-media/src/decode.rs
//
// LiveDecoder: stateful sequential decoder for the playback pipeline.
// Opened once per play/seek, then driven forward frame by frame — no
// re-open or seek per frame.

use std::path::{Path, PathBuf};
use anyhow::Result;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::{input, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags};

/// Viewport frames are scaled down to at most this width. Sources narrower
/// than this keep their native size.
const MAX_FRAME_W: u32 = 960;

pub struct LiveDecoder {
    pub path:  PathBuf,
    ictx:      ffmpeg::format::context::Input,
    decoder:   ffmpeg::decoder::video::Video,
    video_idx: usize,
    last_pts:  i64,
    tb_num:    i32,
    tb_den:    i32,
    out_w:     u32,
    out_h:     u32,
    scaler:    SwsContext,
}

impl LiveDecoder {
    /// Open `path` and seek to the keyframe at or before `timestamp`.
    /// Follow with `burn_to_pts` to land on the exact frame.
    pub fn open(path: &Path, timestamp: f64) -> Result<Self> {
        let mut ictx = input(path)?;
        let video_idx = ictx.streams().best(Type::Video)
            .ok_or_else(|| anyhow::anyhow!("no video stream"))?.index();

        let (tb_num, tb_den, seek_ts, raw_w, raw_h) = {
            let stream = ictx.stream(video_idx).unwrap();
            let tb = stream.time_base();
            let seek_ts = (timestamp * tb.denominator() as f64 / tb.numerator() as f64) as i64;
            let (w, h) = unsafe {
                let p = stream.parameters().as_ptr();
                ((*p).width as u32, (*p).height as u32)
            };
            (tb.numerator(), tb.denominator(), seek_ts, w, h)
        };

        let _ = ictx.seek(seek_ts, ..=seek_ts);

        // Second context for decoder params (avoids borrow conflict with ictx).
        let ictx2   = input(path)?;
        let stream2 = ictx2.stream(video_idx).unwrap();
        let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream2.parameters())?;
        let decoder = dec_ctx.decoder().video()?;

        // Proportional downscale, both dimensions even.
        let (out_w, out_h) = if raw_w > MAX_FRAME_W {
            let w = MAX_FRAME_W;
            let h = ((w as f64 * raw_h as f64 / raw_w.max(1) as f64) as u32).max(2) & !1;
            (w, h)
        } else {
            (raw_w.max(2) & !1, raw_h.max(2) & !1)
        };

        let scaler = SwsContext::get(
            decoder.format(), decoder.width(), decoder.height(),
            Pixel::RGBA, out_w, out_h, Flags::BILINEAR,
        )?;

        Ok(Self {
            path: path.to_path_buf(), ictx, decoder, video_idx,
            last_pts: seek_ts, tb_num, tb_den, out_w, out_h, scaler,
        })
    }

    pub fn ts_to_pts(&self, t: f64) -> i64 {
        (t * self.tb_den as f64 / self.tb_num as f64) as i64
    }

    pub fn pts_to_secs(&self, pts: i64) -> f64 {
        pts as f64 * self.tb_num as f64 / self.tb_den as f64
    }

    /// Decode the next frame sequentially (no seek). Returns
    /// `(pixels, w, h, ts_secs)` or None at EOF.
    pub fn next_frame(&mut self) -> Option<(Vec<u8>, u32, u32, f64)> {
        for (stream, packet) in self.ictx.packets().flatten() {
            if stream.index() != self.video_idx { continue; }
            if self.decoder.send_packet(&packet).is_err() { continue; }
            let mut decoded = ffmpeg::util::frame::video::Video::empty();
            while self.decoder.receive_frame(&mut decoded).is_ok() {
                let pts = decoded.pts().unwrap_or(self.last_pts + 1);
                self.last_pts = pts;
                let ts_secs = self.pts_to_secs(pts);
                let mut out = ffmpeg::util::frame::video::Video::empty();
                if self.scaler.run(&decoded, &mut out).is_err() { return None; }
                let data = destripe_rgba(&out, self.out_w, self.out_h);
                return Some((data, self.out_w, self.out_h, ts_secs));
            }
        }
        None
    }

    /// Decode-only fast-forward to `target_pts`. No scaling, no allocation per
    /// frame — this is what makes a seek land on the exact frame quickly.
    /// The next `next_frame` call returns the first frame at or past target.
    pub fn burn_to_pts(&mut self, target_pts: i64) {
        if target_pts <= self.last_pts { return; }
        // Drain decoded frames until we are one frame short of the target;
        // packets are only pulled when the decoder runs dry.
        'packets: for (stream, packet) in self.ictx.packets().flatten() {
            if stream.index() != self.video_idx { continue; }
            if self.decoder.send_packet(&packet).is_err() { continue; }
            let mut decoded = ffmpeg::util::frame::video::Video::empty();
            while self.decoder.receive_frame(&mut decoded).is_ok() {
                let pts = decoded.pts().unwrap_or(self.last_pts + 1);
                if pts >= target_pts {
                    // Close enough — next_frame picks up from here.
                    break 'packets;
                }
                self.last_pts = pts;
            }
        }
    }
}

/// Copy only visible pixels out of a scaled RGBA frame, skipping the
/// stride padding ffmpeg may add at the end of each row.
fn destripe_rgba(frame: &ffmpeg::util::frame::video::Video, w: u32, h: u32) -> Vec<u8> {
    let stride = frame.stride(0);
    let raw    = frame.data(0);
    let row_bytes = w as usize * 4;
    (0..h as usize)
        .flat_map(|row| &raw[row * stride..row * stride + row_bytes])
        .copied()
        .collect()
}
