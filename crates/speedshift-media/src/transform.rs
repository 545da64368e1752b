// crates/speedshift-media/src/transform.rs
//
// The Media Transform Engine boundary, backed by the ffmpeg CLI.
//
// The engine is treated as a closed box: an EditedMediaItem (source +
// EffectConfig) and an output path are rendered into one ffmpeg invocation,
// the process runs to completion on the calling thread, and exactly one of
// ExportDone / ExportError is sent for the job. Decoding, retiming, audio
// time-stretch, encoding, and muxing all happen inside the engine.
//
// run_transform is blocking — MediaWorker::start_export runs it on a
// dedicated thread.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{anyhow, Context as _, Result};
use crossbeam_channel::Sender;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::media::Type as MediaType;

use speedshift_core::export::{EditedMediaItem, ExportJob};
use speedshift_core::media_types::MediaResult;

/// Environment override for the engine binary; falls back to `ffmpeg` on PATH.
const ENGINE_ENV: &str = "SPEEDSHIFT_FFMPEG";

/// Run `job` to completion and send its terminal result.
pub fn run_transform(job: &ExportJob, item: &EditedMediaItem, tx: &Sender<MediaResult>) {
    match transform(job, item) {
        Ok(path) => {
            eprintln!("[export] done → {}", path.display());
            let _ = tx.send(MediaResult::ExportDone { job_id: job.id, path });
        }
        Err(e) => {
            eprintln!("[export] failed: {e:#}");
            let _ = tx.send(MediaResult::ExportError { job_id: job.id, msg: format!("{e:#}") });
        }
    }
}

fn transform(job: &ExportJob, item: &EditedMediaItem) -> Result<PathBuf> {
    if let Some(dir) = job.output.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create {}", dir.display()))?;
    }

    // Audio filters on an audio-less input make ffmpeg bail out; the source
    // decides which lanes of the config apply.
    let has_audio = source_has_audio(&item.source);
    let args = build_args(item, &job.output, has_audio);

    eprintln!("[export] ffmpeg {}", args.join(" "));

    let output = Command::new(engine_binary())
        .args(&args)
        .output()
        .context("cannot launch ffmpeg — is it installed and on PATH?")?;

    if !output.status.success() {
        return Err(anyhow!("ffmpeg exited with {}: {}",
            output.status,
            stderr_tail(&output.stderr),
        ));
    }
    if !job.output.is_file() {
        return Err(anyhow!("ffmpeg reported success but wrote no output"));
    }
    Ok(job.output.clone())
}

fn engine_binary() -> String {
    std::env::var(ENGINE_ENV).unwrap_or_else(|_| "ffmpeg".into())
}

/// Render an edited item + output path into engine arguments.
/// `-y` makes a repeat export at the same speed overwrite its predecessor.
fn build_args(item: &EditedMediaItem, output: &Path, has_audio: bool) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-i".to_string(),
        item.source.to_string_lossy().into_owned(),
    ];
    if !item.effects.video_filters.is_empty() {
        args.push("-filter:v".to_string());
        args.push(item.effects.video_filters.join(","));
    }
    if has_audio && !item.effects.audio_filters.is_empty() {
        args.push("-filter:a".to_string());
        args.push(item.effects.audio_filters.join(","));
    } else if !has_audio {
        args.push("-an".to_string());
    }
    args.push("-loglevel".to_string());
    args.push("error".to_string());
    args.push(output.to_string_lossy().into_owned());
    args
}

fn source_has_audio(path: &Path) -> bool {
    ffmpeg::format::input(path)
        .map(|ictx| ictx.streams().best(MediaType::Audio).is_some())
        .unwrap_or(false)
}

/// Last few lines of the engine's stderr — enough for the error toast
/// without dumping a full log at the user.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let tail: Vec<&str> = text.lines().rev().take(3).collect();
    let joined = tail.into_iter().rev().collect::<Vec<_>>().join(" | ");
    if joined.is_empty() { "no diagnostic output".into() } else { joined }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speedshift_core::export::SpeedEffect;

    fn item(speed: f32) -> EditedMediaItem {
        EditedMediaItem {
            source:  PathBuf::from("/videos/sample.mp4"),
            effects: SpeedEffect::new(speed).config(),
        }
    }

    #[test]
    fn args_carry_both_filter_lanes_for_audio_sources() {
        let args = build_args(&item(1.5), Path::new("/out/exported_video_1.5x.mp4"), true);
        assert_eq!(
            args,
            vec![
                "-y", "-i", "/videos/sample.mp4",
                "-filter:v", "setpts=PTS/1.5",
                "-filter:a", "atempo=1.5",
                "-loglevel", "error",
                "/out/exported_video_1.5x.mp4",
            ],
        );
    }

    #[test]
    fn audio_less_sources_drop_the_audio_lane() {
        let args = build_args(&item(2.0), Path::new("/out/v.mp4"), false);
        assert!(args.contains(&"-an".to_string()));
        assert!(!args.iter().any(|a| a == "-filter:a"));
    }

    #[test]
    fn stderr_tail_keeps_the_last_lines_only() {
        let tail = stderr_tail(b"one\ntwo\nthree\nfour");
        assert_eq!(tail, "two | three | four");
        assert_eq!(stderr_tail(b""), "no diagnostic output");
    }
}
