// crates/speedshift-ui/src/paths.rs
// Single source of truth for where SpeedShift stores its files.

use std::path::PathBuf;

use speedshift_core::state::SAMPLE_VIDEO_URL;

/// `%APPDATA%\SpeedShift` on Windows, `~/.local/share/speedshift` elsewhere.
pub fn app_data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    let base = std::env::var("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir());
    #[cfg(target_os = "windows")]
    return base.join("SpeedShift");

    #[cfg(not(target_os = "windows"))]
    {
        let base = std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".local").join("share"))
            .unwrap_or_else(|_| std::env::temp_dir());
        base.join("speedshift")
    }
}

/// Downloaded remote sources live here.
pub fn cache_dir() -> PathBuf {
    app_data_dir().join("cache")
}

/// Export destination — the app-private movies directory.
pub fn movies_dir() -> PathBuf {
    app_data_dir().join("movies")
}

/// Local cache path for the bundled sample video, named after the URL.
pub fn sample_cache_path() -> PathBuf {
    let name = SAMPLE_VIDEO_URL.rsplit('/').next().unwrap_or("sample.mp4");
    cache_dir().join(name)
}
