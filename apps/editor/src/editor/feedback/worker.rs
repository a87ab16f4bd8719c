//! Background task that keeps a `FeedbackResult` in sync with the draft.
//!
//! Subscribes to draft revisions, waits for input to pause for the debounce
//! period, then evaluates. A revision published while an evaluation is in
//! flight cancels it, so a slow response can never overwrite feedback for a
//! newer draft. Errors keep the previous result.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::editor::feedback::{FeedbackEvaluator, FeedbackResult};
use crate::editor::DraftRevision;

/// The latest published feedback and the draft revision it was computed for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackState {
    pub revision: u64,
    pub result: FeedbackResult,
}

/// Owns the worker task; dropping it stops the worker.
pub struct FeedbackHandle {
    task: JoinHandle<()>,
    results: watch::Receiver<FeedbackState>,
}

impl FeedbackHandle {
    pub fn subscribe(&self) -> watch::Receiver<FeedbackState> {
        self.results.clone()
    }

    pub fn latest(&self) -> FeedbackState {
        self.results.borrow().clone()
    }
}

impl Drop for FeedbackHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn spawn_feedback_worker(
    evaluator: Arc<dyn FeedbackEvaluator>,
    drafts: watch::Receiver<DraftRevision>,
    debounce: Duration,
) -> FeedbackHandle {
    let (tx, rx) = watch::channel(FeedbackState::default());
    let task = tokio::spawn(run(evaluator, drafts, tx, debounce));
    FeedbackHandle { task, results: rx }
}

async fn run(
    evaluator: Arc<dyn FeedbackEvaluator>,
    mut drafts: watch::Receiver<DraftRevision>,
    results: watch::Sender<FeedbackState>,
    debounce: Duration,
) {
    debug!("Feedback worker started (backend: {})", evaluator.backend_name());

    loop {
        // Debounce: restart the quiet period on every new revision.
        loop {
            tokio::select! {
                _ = tokio::time::sleep(debounce) => break,
                changed = drafts.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }

        let snapshot = drafts.borrow_and_update().clone();

        let outcome = tokio::select! {
            outcome = evaluator.evaluate(&snapshot.draft, &snapshot.job_title) => Some(outcome),
            changed = drafts.changed() => {
                if changed.is_err() {
                    return;
                }
                None
            }
        };

        match outcome {
            None => {
                debug!("Feedback for revision {} superseded", snapshot.revision);
                continue;
            }
            Some(Ok(Some(result))) => {
                results.send_if_modified(|state| {
                    if snapshot.revision < state.revision {
                        return false;
                    }
                    *state = FeedbackState {
                        revision: snapshot.revision,
                        result,
                    };
                    true
                });
            }
            Some(Ok(None)) => {}
            Some(Err(e)) => {
                warn!(
                    "Feedback evaluation failed for revision {}: {e}",
                    snapshot.revision
                );
            }
        }

        if drafts.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::feedback::LocalHeuristicEvaluator;
    use crate::errors::{EditorError, EditorResult};
    use crate::models::draft::ResumeDraft;
    use async_trait::async_trait;

    fn revision(revision: u64, name: &str) -> DraftRevision {
        DraftRevision {
            revision,
            draft: Arc::new(ResumeDraft {
                name: name.to_string(),
                ..Default::default()
            }),
            job_title: Arc::from(""),
        }
    }

    /// Takes 10s for drafts named "slow", scores by name length, fails on "boom".
    struct ScriptedEvaluator;

    #[async_trait]
    impl FeedbackEvaluator for ScriptedEvaluator {
        async fn evaluate(
            &self,
            draft: &ResumeDraft,
            _job_title: &str,
        ) -> EditorResult<Option<FeedbackResult>> {
            match draft.name.as_str() {
                "boom" => Err(EditorError::Api {
                    status: 503,
                    message: "down".to_string(),
                }),
                "slow" => {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Ok(Some(score(99)))
                }
                name => Ok(Some(score(name.len() as u8))),
            }
        }

        fn backend_name(&self) -> &'static str {
            "scripted"
        }
    }

    fn score(ats_score: u8) -> FeedbackResult {
        FeedbackResult {
            ats_score,
            ..Default::default()
        }
    }

    async fn wait_for_revision(rx: &mut watch::Receiver<FeedbackState>, revision: u64) -> FeedbackState {
        loop {
            if rx.borrow_and_update().revision >= revision {
                return rx.borrow().clone();
            }
            rx.changed().await.unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_evaluates_after_quiet_period() {
        let (tx, rx) = watch::channel(revision(0, ""));
        let handle = spawn_feedback_worker(
            Arc::new(LocalHeuristicEvaluator),
            rx,
            Duration::from_millis(300),
        );
        let mut results = handle.subscribe();

        tx.send(revision(1, "Jane")).unwrap();
        let state = wait_for_revision(&mut results, 1).await;
        assert_eq!(state.result.ats_score, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_edits_publishes_latest() {
        let (tx, rx) = watch::channel(revision(0, ""));
        let handle = spawn_feedback_worker(Arc::new(ScriptedEvaluator), rx, Duration::from_millis(300));
        let mut results = handle.subscribe();
        wait_for_revision(&mut results, 0).await;

        for (i, name) in ["J", "Ja", "Jan", "Jane"].iter().enumerate() {
            tx.send(revision(i as u64 + 1, name)).unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        let state = wait_for_revision(&mut results, 4).await;
        assert_eq!(state.revision, 4);
        assert_eq!(state.result.ats_score, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_result_never_overwrites_newer_draft() {
        let (tx, rx) = watch::channel(revision(0, ""));
        let handle = spawn_feedback_worker(Arc::new(ScriptedEvaluator), rx, Duration::from_millis(50));
        let mut results = handle.subscribe();
        wait_for_revision(&mut results, 0).await;

        tx.send(revision(1, "slow")).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await; // slow evaluation in flight
        tx.send(revision(2, "fast")).unwrap();

        let state = wait_for_revision(&mut results, 2).await;
        assert_eq!(state.result.ats_score, 4);

        tokio::time::sleep(Duration::from_secs(30)).await;
        let state = handle.latest();
        assert_eq!(state.revision, 2);
        assert_eq!(state.result.ats_score, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_previous_result() {
        let (tx, rx) = watch::channel(revision(0, ""));
        let handle = spawn_feedback_worker(Arc::new(ScriptedEvaluator), rx, Duration::from_millis(50));
        let mut results = handle.subscribe();

        tx.send(revision(1, "abc")).unwrap();
        wait_for_revision(&mut results, 1).await;

        tx.send(revision(2, "boom")).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        let state = handle.latest();
        assert_eq!(state.revision, 1);
        assert_eq!(state.result.ats_score, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_stops_when_draft_sender_dropped() {
        let (tx, rx) = watch::channel(revision(0, ""));
        let handle = spawn_feedback_worker(Arc::new(ScriptedEvaluator), rx, Duration::from_millis(50));
        drop(tx);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(handle.task.is_finished());
    }
}
