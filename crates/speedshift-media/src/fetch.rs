// crates/speedshift-media/src/fetch.rs
//
// One-time download of the remote sample video into the cache directory.
//
// The body is streamed into a named temp file in the destination directory
// and only persisted to the final path once fully written — a torn download
// can never be mistaken for a cached source on the next launch.

use std::io::{Read, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context as _, Result};
use crossbeam_channel::Sender;

use speedshift_core::media_types::MediaResult;

/// Minimum interval between FetchProgress results.
const PROGRESS_EVERY: Duration = Duration::from_millis(250);

/// Download `url` to `dest`, reporting progress on `tx`.
/// Blocking — run on a worker thread. The caller turns the Err into a
/// `FetchFailed` result.
pub fn fetch_remote(url: &str, dest: &Path, tx: &Sender<MediaResult>) -> Result<()> {
    let dir = dest.parent().ok_or_else(|| anyhow!("destination has no parent"))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create {}", dir.display()))?;

    eprintln!("[fetch] GET {url}");
    eprintln!("[fetch] → {}", dest.display());

    let resp = ureq::get(url).call().context("HTTP request failed")?;

    let total = resp.headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);

    let mut staging = tempfile::NamedTempFile::new_in(dir)
        .context("cannot create staging file")?;

    let mut body   = resp.into_body();
    let mut reader = body.as_reader();
    let mut buf    = [0u8; 65536];
    let mut written: u64 = 0;
    let mut last_report  = Instant::now();

    let _ = tx.send(MediaResult::FetchProgress { downloaded: 0, total });

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0)  => break,
            Ok(n)  => n,
            Err(e) => return Err(anyhow!("download read error: {e}")),
        };
        staging.write_all(&buf[..n]).context("write error")?;
        written += n as u64;

        if last_report.elapsed() >= PROGRESS_EVERY {
            last_report = Instant::now();
            let _ = tx.send(MediaResult::FetchProgress { downloaded: written, total });
        }
    }

    staging.flush().context("flush error")?;
    staging.persist(dest)
        .map_err(|e| anyhow!("cannot move download into place: {}", e.error))?;

    eprintln!("[fetch] done — {written} bytes");
    Ok(())
}
