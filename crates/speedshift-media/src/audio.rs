// crates/speedshift-media/src/audio.rs
//
// Audio extraction (WAV for the rodio sink) and temp file cleanup.
//
// All in-process via ffmpeg-the-third — no child process, no PATH
// dependency, works identically in every launch mode.

use std::io::Write;
use std::path::{Path, PathBuf};
use crossbeam_channel::Sender;
use uuid::Uuid;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::input;
use ffmpeg::format::sample::{Sample, Type as SampleType};
use ffmpeg::media::Type as MediaType;
use ffmpeg::software::resampling;
use ffmpeg::util::channel_layout::ChannelLayout;
use ffmpeg::util::frame::audio::Audio as AudioFrame;

use speedshift_core::media_types::MediaResult;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Output sample rate for extracted WAV files. Matches the rodio sink rate.
const OUT_RATE: u32 = 44_100;

/// Output format: packed (interleaved) signed 16-bit. WAV format tag 1 = PCM.
const OUT_FMT: Sample = Sample::I16(SampleType::Packed);

const OUT_LAYOUT: ChannelLayout = ChannelLayout::STEREO;

// ── Public API ────────────────────────────────────────────────────────────────

/// Decode audio from `path`, resample to 44100 Hz stereo s16le, write a WAV
/// temp file, and send the path back via `tx` as `MediaResult::AudioReady`.
///
/// Soft-fails on any error (logs via eprintln, sends nothing on tx) so the
/// player degrades gracefully to silence rather than crashing. A source with
/// no audio stream at all is not an error.
pub fn extract_audio(path: &Path, tx: &Sender<MediaResult>) {
    let wav_path = std::env::temp_dir()
        .join(format!("speedshift_audio_{}.wav", Uuid::new_v4()));

    match decode_to_wav(path, &wav_path) {
        Ok(Some(bytes)) => {
            eprintln!("[media] audio WAV written ({bytes} bytes) ← {}", path.display());
            let _ = tx.send(MediaResult::AudioReady { path: wav_path });
        }
        Ok(None) => {
            eprintln!("[media] no audio stream in {}", path.display());
        }
        Err(e) => {
            eprintln!("[media] audio extract failed for '{}': {e}", path.display());
        }
    }
}

/// Delete a temp WAV that was extracted for a source.
/// Only touches files matching the `speedshift_audio_*.wav` pattern in the
/// OS temp dir.
pub fn cleanup_audio_temp(path: &Path) {
    let in_temp = path.parent()
        .map(|p| p == std::env::temp_dir())
        .unwrap_or(false);
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    if in_temp && name.starts_with("speedshift_audio_") && name.ends_with(".wav") {
        if let Err(e) = std::fs::remove_file(path) {
            eprintln!("[media] cleanup_audio_temp: {e}");
        }
    }
}

// ── Internal implementation ───────────────────────────────────────────────────

/// Decode all audio from `src`, resample to OUT_RATE/stereo/s16le, and write a
/// WAV file to `dst`. Returns bytes written, or Ok(None) for audio-less input.
fn decode_to_wav(src: &Path, dst: &Path) -> Result<Option<u64>, String> {
    let mut ictx = input(src).map_err(|e| format!("open: {e}"))?;

    let Some(stream) = ictx.streams().best(MediaType::Audio) else {
        return Ok(None);
    };
    let audio_idx = stream.index();

    let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
        .map_err(|e| format!("codec context: {e}"))?;
    let mut decoder = dec_ctx.decoder().audio()
        .map_err(|e| format!("audio decoder: {e}"))?;

    // The resampler is built lazily on the first decoded frame so the real
    // source format/layout/rate is known before constructing the SwrContext.
    let mut resampler: Option<resampling::Context> = None;
    let mut pcm: Vec<i16> = Vec::new();

    for result in ictx.packets() {
        let (stream, packet) = match result {
            Ok(p)  => p,
            Err(_) => continue,
        };
        if stream.index() != audio_idx { continue; }
        if decoder.send_packet(&packet).is_err() { continue; }

        let mut frame = AudioFrame::empty();
        while decoder.receive_frame(&mut frame).is_ok() {
            append_resampled(&frame, &mut resampler, &mut pcm)?;
        }
    }

    // Flush decoder
    let _ = decoder.send_eof();
    let mut frame = AudioFrame::empty();
    while decoder.receive_frame(&mut frame).is_ok() {
        append_resampled(&frame, &mut resampler, &mut pcm)?;
    }

    if pcm.is_empty() {
        return Err("no audio samples decoded".into());
    }

    let bytes = write_wav(dst, &pcm).map_err(|e| format!("write WAV: {e}"))?;
    Ok(Some(bytes))
}

/// Resample `frame` to OUT_FMT/OUT_LAYOUT/OUT_RATE and append the resulting
/// interleaved s16 samples to `out`. Builds `resampler` on first call.
fn append_resampled(
    frame:     &AudioFrame,
    resampler: &mut Option<resampling::Context>,
    out:       &mut Vec<i16>,
) -> Result<(), String> {
    let src_channels = frame.ch_layout().channels();

    if frame.format() == OUT_FMT && frame.rate() == OUT_RATE && src_channels == 2 {
        // Source already matches the output format — copy directly.
        append_packed_i16(frame, out);
        return Ok(());
    }

    if resampler.is_none() {
        // Mono sources must be declared as MONO so swr doesn't misinterpret
        // the channel count.
        let src_layout = if src_channels >= 2 {
            frame.ch_layout()
        } else {
            ChannelLayout::MONO
        };
        let built = resampling::Context::get2(
            frame.format(), src_layout, frame.rate(),
            OUT_FMT,        OUT_LAYOUT, OUT_RATE,
        ).map_err(|e| format!("create resampler: {e}"))?;
        *resampler = Some(built);
    }
    let Some(rs) = resampler.as_mut() else { return Ok(()) };

    let mut resampled = AudioFrame::empty();
    if rs.run(frame, &mut resampled).is_ok() && resampled.samples() > 0 {
        append_packed_i16(&resampled, out);
    }
    Ok(())
}

/// Copy the packed s16 samples from `frame` into `out`.
/// OUT_FMT is Packed (interleaved), so all channel data is in plane 0.
fn append_packed_i16(frame: &AudioFrame, out: &mut Vec<i16>) {
    let data = frame.data(0);
    out.extend(
        data.chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]])),
    );
}

/// Write interleaved stereo s16le PCM to a WAV file at `path`.
/// Returns total bytes written (header + data).
fn write_wav(path: &Path, samples: &[i16]) -> std::io::Result<u64> {
    const CHANNELS:    u16 = 2;
    const BITS:        u16 = 16;
    const FORMAT_PCM:  u16 = 1;
    const BLOCK_ALIGN: u16 = CHANNELS * (BITS / 8); // 4

    let data_size = (samples.len() * 2) as u32;
    let byte_rate = OUT_RATE * BLOCK_ALIGN as u32;

    let mut file = std::fs::File::create(path)?;
    let mut w    = std::io::BufWriter::new(&mut file);

    // RIFF header
    w.write_all(b"RIFF")?;
    w.write_all(&(36u32 + data_size).to_le_bytes())?;
    w.write_all(b"WAVE")?;

    // fmt  chunk
    w.write_all(b"fmt ")?;
    w.write_all(&16u32.to_le_bytes())?; // chunk size
    w.write_all(&FORMAT_PCM.to_le_bytes())?;
    w.write_all(&CHANNELS.to_le_bytes())?;
    w.write_all(&OUT_RATE.to_le_bytes())?;
    w.write_all(&byte_rate.to_le_bytes())?;
    w.write_all(&BLOCK_ALIGN.to_le_bytes())?;
    w.write_all(&BITS.to_le_bytes())?;

    // data chunk
    w.write_all(b"data")?;
    w.write_all(&data_size.to_le_bytes())?;
    for s in samples {
        w.write_all(&s.to_le_bytes())?;
    }
    w.flush()?;

    Ok((44 + data_size) as u64)
}
