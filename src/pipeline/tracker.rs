// src/pipeline/tracker.rs
// Stage status tracker — mutated by the runner, observed by the UI layer

use super::stage::{PipelineStage, StageState, StageStatus, STAGE_COUNT};
use serde::Serialize;
use std::sync::Mutex;
use std::time::Instant;
use tokio::sync::watch;

/// Immutable view of all six stages, published on every transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackerSnapshot {
    stages: [StageState; STAGE_COUNT],
}

impl TrackerSnapshot {
    pub fn get(&self, stage: PipelineStage) -> &StageState {
        &self.stages[stage.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (PipelineStage, &StageState)> {
        PipelineStage::ALL
            .iter()
            .map(move |&stage| (stage, self.get(stage)))
    }
}

impl Default for TrackerSnapshot {
    fn default() -> Self {
        Self {
            stages: std::array::from_fn(|_| StageState::default()),
        }
    }
}

struct TrackerInner {
    stages: [StageState; STAGE_COUNT],
    /// Instant each stage went active, for the elapsed computation.
    started: [Option<Instant>; STAGE_COUNT],
}

/// Tracks per-stage status and elapsed time for the current run.
///
/// One mutator path (begin/finish/fail), one reset path, and a snapshot
/// stream for observers. Interior mutability keeps the runner's methods on
/// `&self` so a session handle can be shared.
pub struct StageTracker {
    inner: Mutex<TrackerInner>,
    tx: watch::Sender<TrackerSnapshot>,
}

impl StageTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(TrackerSnapshot::default());
        Self {
            inner: Mutex::new(TrackerInner {
                stages: std::array::from_fn(|_| StageState::default()),
                started: [None; STAGE_COUNT],
            }),
            tx,
        }
    }

    /// Subscribe to snapshot updates. Receivers see the latest snapshot on
    /// every transition.
    pub fn subscribe(&self) -> watch::Receiver<TrackerSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        let inner = self.inner.lock().expect("tracker lock poisoned");
        TrackerSnapshot {
            stages: inner.stages.clone(),
        }
    }

    /// Mark a stage active and start its clock.
    pub fn begin(&self, stage: PipelineStage) {
        let mut inner = self.inner.lock().expect("tracker lock poisoned");
        let slot = &mut inner.stages[stage.index()];
        if slot.status != StageStatus::Idle {
            tracing::warn!("Stage {} began from {:?}", stage.label(), slot.status);
        }
        slot.status = StageStatus::Active;
        slot.elapsed = None;
        inner.started[stage.index()] = Some(Instant::now());
        drop(inner);
        self.publish();
    }

    /// Mark a stage done, recording its elapsed time.
    pub fn finish(&self, stage: PipelineStage) {
        let mut inner = self.inner.lock().expect("tracker lock poisoned");
        let elapsed = inner.started[stage.index()].map(|t| t.elapsed());
        let slot = &mut inner.stages[stage.index()];
        slot.status = StageStatus::Done;
        slot.elapsed = elapsed;
        drop(inner);
        self.publish();
    }

    /// Mark a stage errored. Elapsed time stays undefined.
    pub fn fail(&self, stage: PipelineStage) {
        let mut inner = self.inner.lock().expect("tracker lock poisoned");
        let slot = &mut inner.stages[stage.index()];
        slot.status = StageStatus::Error;
        slot.elapsed = None;
        inner.started[stage.index()] = None;
        drop(inner);
        self.publish();
    }

    /// Return every stage to idle.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().expect("tracker lock poisoned");
        inner.stages = std::array::from_fn(|_| StageState::default());
        inner.started = [None; STAGE_COUNT];
        drop(inner);
        self.publish();
    }

    /// Reset for a follow-up question: the parse stage keeps its completed
    /// state since the same document is reused.
    pub fn reset_for_followup(&self) {
        let mut inner = self.inner.lock().expect("tracker lock poisoned");
        let parse = inner.stages[PipelineStage::Parse.index()].clone();
        inner.stages = std::array::from_fn(|_| StageState::default());
        inner.started = [None; STAGE_COUNT];
        if parse.status == StageStatus::Done {
            inner.stages[PipelineStage::Parse.index()] = parse;
        }
        drop(inner);
        self.publish();
    }

    fn publish(&self) {
        self.tx.send_replace(self.snapshot());
    }
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_then_finish_records_elapsed() {
        let tracker = StageTracker::new();
        tracker.begin(PipelineStage::Stt);
        tracker.finish(PipelineStage::Stt);

        let snap = tracker.snapshot();
        let state = snap.get(PipelineStage::Stt);
        assert_eq!(state.status, StageStatus::Done);
        assert!(state.elapsed.is_some(), "done stage must carry elapsed time");
    }

    #[test]
    fn fail_leaves_elapsed_undefined() {
        let tracker = StageTracker::new();
        tracker.begin(PipelineStage::Llm);
        tracker.fail(PipelineStage::Llm);

        let snap = tracker.snapshot();
        let state = snap.get(PipelineStage::Llm);
        assert_eq!(state.status, StageStatus::Error);
        assert!(state.elapsed.is_none());
    }

    #[test]
    fn every_stage_has_elapsed_after_active_done_cycle() {
        let tracker = StageTracker::new();
        for stage in PipelineStage::ALL {
            tracker.begin(stage);
            tracker.finish(stage);
        }
        let snap = tracker.snapshot();
        for (_, state) in snap.iter() {
            assert_eq!(state.status, StageStatus::Done);
            assert!(state.elapsed.is_some());
        }
    }

    #[test]
    fn reset_returns_all_stages_to_idle() {
        let tracker = StageTracker::new();
        tracker.begin(PipelineStage::Parse);
        tracker.finish(PipelineStage::Parse);
        tracker.begin(PipelineStage::Stt);
        tracker.fail(PipelineStage::Stt);

        tracker.reset();
        let snap = tracker.snapshot();
        for (_, state) in snap.iter() {
            assert_eq!(state.status, StageStatus::Idle);
            assert!(state.elapsed.is_none());
        }
    }

    #[test]
    fn followup_reset_preserves_completed_parse() {
        let tracker = StageTracker::new();
        tracker.begin(PipelineStage::Parse);
        tracker.finish(PipelineStage::Parse);
        tracker.begin(PipelineStage::Stt);
        tracker.finish(PipelineStage::Stt);

        tracker.reset_for_followup();
        let snap = tracker.snapshot();
        assert_eq!(snap.get(PipelineStage::Parse).status, StageStatus::Done);
        assert!(snap.get(PipelineStage::Parse).elapsed.is_some());
        assert_eq!(snap.get(PipelineStage::Stt).status, StageStatus::Idle);
    }

    #[test]
    fn followup_reset_drops_errored_parse() {
        let tracker = StageTracker::new();
        tracker.begin(PipelineStage::Parse);
        tracker.fail(PipelineStage::Parse);

        tracker.reset_for_followup();
        let snap = tracker.snapshot();
        assert_eq!(snap.get(PipelineStage::Parse).status, StageStatus::Idle);
    }

    #[tokio::test]
    async fn observers_see_transitions() {
        let tracker = StageTracker::new();
        let mut rx = tracker.subscribe();

        tracker.begin(PipelineStage::Translate);
        rx.changed().await.expect("tracker dropped");
        let snap = rx.borrow_and_update().clone();
        assert_eq!(snap.get(PipelineStage::Translate).status, StageStatus::Active);
    }
}
