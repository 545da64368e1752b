// crates/speedshift-media/src/lib.rs
//
// No egui dependency — communicates with speedshift-ui via channels only.
//
// To add a new media capability:
//   1. Create a new module file here
//   2. Add `mod mymodule;` below
//   3. Call it from worker.rs (a new MediaWorker method)

pub mod audio;
pub mod decode;
pub mod fetch;
pub mod probe;
pub mod transform;
pub mod worker;

// Re-export the main public API so speedshift-ui imports are simple.
pub use worker::MediaWorker;
pub use speedshift_core::media_types::{MediaResult, PlaybackFrame};
