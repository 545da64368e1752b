// crates/speedshift-core/src/lib.rs
//
// Pure data and logic — no egui, no ffmpeg, no threads. Everything here is
// usable from both speedshift-media and speedshift-ui.

pub mod commands;
pub mod export;
pub mod helpers;
pub mod media_types;
pub mod state;
