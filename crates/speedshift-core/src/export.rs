// crates/speedshift-core/src/export.rs
//
// The export-request lifecycle.
//
// State machine (single instance, owned by PlayerState, UI-thread only):
//
//   Idle       → request() accepted
//                → effect config + output path built, engine dispatched,
//                  phase = Exporting, caller shows the "Exporting…" toast
//
//   Exporting  → request() while in flight → Dropped (no dispatch, no toast,
//                  the running job is untouched)
//              → resolve(ExportDone)  → Idle, "completed" toast
//              → resolve(ExportError) → Idle, "Error: …" toast
//
// Construction failures (bad multiplier, missing source) never reach the
// engine: request() returns Failed and the phase stays Idle. The caller routes
// the message through the same error toast used for engine failures.
//
// The engine's terminal results travel back over the MediaWorker channel and
// are drained on the UI thread, so every phase mutation happens on one
// serialized context — no locking needed for the one-in-flight invariant.

use std::path::{Path, PathBuf};
use uuid::Uuid;

// ── Effect configuration ──────────────────────────────────────────────────────

/// Constant-rate time mapping: one speed for every timestamp, and no upcoming
/// change for the remainder of the timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedEffect {
    pub factor: f32,
}

impl SpeedEffect {
    pub fn new(factor: f32) -> Self {
        Self { factor }
    }

    /// The rate applied at `_timestamp_secs` — the same value everywhere.
    pub fn rate_at(&self, _timestamp_secs: f64) -> f32 {
        self.factor
    }

    /// When the rate next changes. Never, for a constant mapping.
    pub fn next_change_at(&self, _timestamp_secs: f64) -> Option<f64> {
        None
    }

    /// Render the mapping into the engine's two filter lanes.
    pub fn config(&self) -> EffectConfig {
        EffectConfig {
            video_filters: vec![format!("setpts=PTS/{}", self.factor)],
            audio_filters: atempo_chain(self.factor),
        }
    }
}

/// Declarative description of the transformations applied during export —
/// one filter list per lane, handed to the engine as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectConfig {
    pub video_filters: Vec<String>,
    pub audio_filters: Vec<String>,
}

/// ffmpeg's atempo accepts 0.5–100 per instance; factors outside that range
/// are expressed as a chain so any positive factor stays valid.
fn atempo_chain(factor: f32) -> Vec<String> {
    let mut stages: Vec<f64> = Vec::new();
    let mut rest = factor as f64;
    while rest < 0.5 {
        stages.push(0.5);
        rest /= 0.5;
    }
    while rest > 100.0 {
        stages.push(100.0);
        rest /= 100.0;
    }
    stages.push(rest);
    stages.into_iter().map(|s| format!("atempo={s}")).collect()
}

// ── Engine boundary ───────────────────────────────────────────────────────────

/// A source locator plus the effects to apply to it — everything the engine
/// needs besides the output path.
#[derive(Debug, Clone, PartialEq)]
pub struct EditedMediaItem {
    pub source:  PathBuf,
    pub effects: EffectConfig,
}

/// One accepted export request.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportJob {
    pub id:     Uuid,
    pub speed:  f32,
    pub output: PathBuf,
}

impl ExportJob {
    pub fn started_message(&self) -> String {
        format!("Exporting video with {}x speed…", speed_label(self.speed))
    }
}

/// Boundary to the opaque media transformation engine.
///
/// `start` must not block. The engine eventually delivers exactly one
/// terminal result carrying `job.id` — Done or Error, never both — on its
/// result channel.
pub trait TransformEngine {
    fn start(&self, job: &ExportJob, item: &EditedMediaItem);
}

/// What the engine (or the construction step) ultimately reported.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Completed(PathBuf),
    Failed(String),
}

impl ExportOutcome {
    /// The user-visible notification for this outcome. Construction failures
    /// and engine failures share the Failed form, so both read identically.
    pub fn message(&self) -> String {
        match self {
            ExportOutcome::Completed(path) => {
                format!("Video export completed to {}", path.display())
            }
            ExportOutcome::Failed(err) => format!("Error: {err}"),
        }
    }
}

// ── Naming ────────────────────────────────────────────────────────────────────

/// Minimal float rendering with at least one decimal: 1 → "1.0", 1.5 → "1.5".
pub fn speed_label(speed: f32) -> String {
    let s = format!("{speed}");
    if s.contains('.') { s } else { format!("{s}.0") }
}

/// Output filename for an export at `speed` — a pure function of the speed,
/// so repeat exports at one speed overwrite their predecessor and different
/// speeds never collide.
pub fn output_name(speed: f32) -> String {
    format!("exported_video_{}x.mp4", speed_label(speed))
}

// ── Controller ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
enum ExportPhase {
    #[default]
    Idle,
    Exporting(ExportJob),
}

/// Result of a request. Only Started reaches the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// Accepted: the phase is now Exporting and the engine owns the job.
    Started(ExportJob),
    /// Silently dropped: an export is already in flight.
    Dropped,
    /// Building the request failed before the engine was involved.
    Failed(String),
}

/// Owns the one piece of real state in the app and enforces
/// at-most-one-concurrent-export.
#[derive(Debug, Clone, Default)]
pub struct ExportController {
    phase: ExportPhase,
}

impl ExportController {
    pub fn is_exporting(&self) -> bool {
        matches!(self.phase, ExportPhase::Exporting(_))
    }

    /// Accept, drop, or reject an export request.
    ///
    /// Never blocks: on acceptance the job is handed to `engine`, which runs
    /// it on its own thread. The caller emits the started toast for
    /// `Started` and the error toast for `Failed`; `Dropped` is silent.
    pub fn request(
        &mut self,
        source:     &Path,
        speed:      f32,
        movies_dir: &Path,
        engine:     &dyn TransformEngine,
    ) -> RequestOutcome {
        if self.is_exporting() {
            return RequestOutcome::Dropped;
        }

        let (job, item) = match build_request(source, speed, movies_dir) {
            Ok(built) => built,
            Err(msg)  => return RequestOutcome::Failed(msg),
        };

        self.phase = ExportPhase::Exporting(job.clone());
        engine.start(&job, &item);
        RequestOutcome::Started(job)
    }

    /// Terminal result from the engine. Returns the notification to surface
    /// when `job_id` matches the in-flight job; results from stale or unknown
    /// jobs are ignored and leave the phase untouched.
    pub fn resolve(&mut self, job_id: Uuid, outcome: ExportOutcome) -> Option<ExportOutcome> {
        match &self.phase {
            ExportPhase::Exporting(job) if job.id == job_id => {
                self.phase = ExportPhase::Idle;
                Some(outcome)
            }
            _ => None,
        }
    }
}

fn build_request(
    source:     &Path,
    speed:      f32,
    movies_dir: &Path,
) -> Result<(ExportJob, EditedMediaItem), String> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(format!("invalid speed multiplier: {speed}"));
    }
    if source.as_os_str().is_empty() {
        return Err("no video loaded".into());
    }

    let job = ExportJob {
        id:     Uuid::new_v4(),
        speed,
        output: movies_dir.join(output_name(speed)),
    };
    let item = EditedMediaItem {
        source:  source.to_path_buf(),
        effects: SpeedEffect::new(speed).config(),
    };
    Ok((job, item))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::Path;

    /// Engine fake that records every dispatch.
    #[derive(Default)]
    struct RecordingEngine {
        started: RefCell<Vec<(ExportJob, EditedMediaItem)>>,
    }

    impl TransformEngine for RecordingEngine {
        fn start(&self, job: &ExportJob, item: &EditedMediaItem) {
            self.started.borrow_mut().push((job.clone(), item.clone()));
        }
    }

    fn movies() -> &'static Path {
        Path::new("/tmp/speedshift-movies")
    }

    fn source() -> &'static Path {
        Path::new("/videos/sample.mp4")
    }

    #[test]
    fn accepted_request_dispatches_constant_speed_config() {
        let engine = RecordingEngine::default();
        let mut ctl = ExportController::default();

        let outcome = ctl.request(source(), 1.5, movies(), &engine);

        let job = match outcome {
            RequestOutcome::Started(job) => job,
            other => panic!("expected Started, got {other:?}"),
        };
        assert!(ctl.is_exporting());
        assert!(job.output.ends_with("exported_video_1.5x.mp4"));
        assert_eq!(job.started_message(), "Exporting video with 1.5x speed…");

        let dispatched = engine.started.borrow();
        assert_eq!(dispatched.len(), 1);
        let (djob, item) = &dispatched[0];
        assert_eq!(djob.id, job.id);
        assert_eq!(item.source, source());
        assert_eq!(item.effects, SpeedEffect::new(1.5).config());
    }

    #[test]
    fn second_request_while_exporting_is_dropped_without_dispatch() {
        let engine = RecordingEngine::default();
        let mut ctl = ExportController::default();

        let first = ctl.request(source(), 1.5, movies(), &engine);
        assert!(matches!(first, RequestOutcome::Started(_)));

        let second = ctl.request(source(), 2.0, movies(), &engine);
        assert_eq!(second, RequestOutcome::Dropped);
        assert!(ctl.is_exporting());
        // No second engine dispatch until the first resolves.
        assert_eq!(engine.started.borrow().len(), 1);
    }

    #[test]
    fn completion_resets_to_idle_and_accepts_a_new_request() {
        let engine = RecordingEngine::default();
        let mut ctl = ExportController::default();

        let job = match ctl.request(source(), 2.0, movies(), &engine) {
            RequestOutcome::Started(job) => job,
            other => panic!("expected Started, got {other:?}"),
        };

        let note = ctl
            .resolve(job.id, ExportOutcome::Completed(job.output.clone()))
            .expect("in-flight job must resolve");
        assert_eq!(
            note.message(),
            format!("Video export completed to {}", job.output.display()),
        );
        assert!(!ctl.is_exporting());

        let again = ctl.request(source(), 1.0, movies(), &engine);
        assert!(matches!(again, RequestOutcome::Started(_)));
        assert_eq!(engine.started.borrow().len(), 2);
    }

    #[test]
    fn engine_failure_resets_to_idle_with_error_notification() {
        let engine = RecordingEngine::default();
        let mut ctl = ExportController::default();

        let job = match ctl.request(source(), 1.5, movies(), &engine) {
            RequestOutcome::Started(job) => job,
            other => panic!("expected Started, got {other:?}"),
        };

        let note = ctl
            .resolve(job.id, ExportOutcome::Failed("muxer died".into()))
            .expect("in-flight job must resolve");
        assert_eq!(note.message(), "Error: muxer died");
        assert!(!ctl.is_exporting());
    }

    #[test]
    fn stale_job_results_are_ignored() {
        let engine = RecordingEngine::default();
        let mut ctl = ExportController::default();

        let job = match ctl.request(source(), 1.5, movies(), &engine) {
            RequestOutcome::Started(job) => job,
            other => panic!("expected Started, got {other:?}"),
        };

        let stale = ctl.resolve(Uuid::new_v4(), ExportOutcome::Failed("old".into()));
        assert!(stale.is_none());
        assert!(ctl.is_exporting());

        // The real job still resolves normally afterwards.
        assert!(ctl
            .resolve(job.id, ExportOutcome::Completed(job.output))
            .is_some());
        assert!(!ctl.is_exporting());

        // Once Idle, any further terminal result is ignored too.
        assert!(ctl
            .resolve(job.id, ExportOutcome::Failed("late".into()))
            .is_none());
    }

    #[test]
    fn construction_failure_reports_error_and_stays_idle() {
        let engine = RecordingEngine::default();
        let mut ctl = ExportController::default();

        for bad in [0.0, -1.5, f32::NAN, f32::INFINITY] {
            let outcome = ctl.request(source(), bad, movies(), &engine);
            let msg = match outcome {
                RequestOutcome::Failed(msg) => msg,
                other => panic!("expected Failed, got {other:?}"),
            };
            // Observably identical to an engine failure.
            assert!(ExportOutcome::Failed(msg).message().starts_with("Error: "));
            assert!(!ctl.is_exporting());
        }
        assert!(engine.started.borrow().is_empty());

        // The controller still accepts a well-formed request afterwards.
        let ok = ctl.request(source(), 1.0, movies(), &engine);
        assert!(matches!(ok, RequestOutcome::Started(_)));
    }

    #[test]
    fn empty_source_is_a_construction_failure() {
        let engine = RecordingEngine::default();
        let mut ctl = ExportController::default();
        let outcome = ctl.request(Path::new(""), 1.5, movies(), &engine);
        assert!(matches!(outcome, RequestOutcome::Failed(_)));
        assert!(engine.started.borrow().is_empty());
    }

    #[test]
    fn output_name_is_a_pure_function_of_speed() {
        assert_eq!(output_name(1.0), "exported_video_1.0x.mp4");
        assert_eq!(output_name(1.5), "exported_video_1.5x.mp4");
        assert_eq!(output_name(2.0), "exported_video_2.0x.mp4");
        // Same speed, same name; different speeds, different names.
        assert_eq!(output_name(1.5), output_name(1.5));
        assert_ne!(output_name(1.5), output_name(2.0));
    }

    #[test]
    fn speed_effect_is_constant_over_the_whole_timeline() {
        let effect = SpeedEffect::new(1.5);
        for ts in [0.0, 0.5, 12.0, 3600.0] {
            assert_eq!(effect.rate_at(ts), 1.5);
            assert_eq!(effect.next_change_at(ts), None);
        }
    }

    #[test]
    fn effect_config_renders_both_filter_lanes() {
        let config = SpeedEffect::new(1.5).config();
        assert_eq!(config.video_filters, vec!["setpts=PTS/1.5"]);
        assert_eq!(config.audio_filters, vec!["atempo=1.5"]);
    }

    #[test]
    fn atempo_chains_below_half_speed() {
        assert_eq!(atempo_chain(2.0), vec!["atempo=2"]);
        assert_eq!(atempo_chain(0.5), vec!["atempo=0.5"]);
        assert_eq!(atempo_chain(0.25), vec!["atempo=0.5", "atempo=0.5"]);
    }

    #[test]
    fn speed_labels_match_the_button_captions() {
        assert_eq!(speed_label(1.0), "1.0");
        assert_eq!(speed_label(1.5), "1.5");
        assert_eq!(speed_label(2.0), "2.0");
    }
}
