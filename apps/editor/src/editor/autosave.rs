//! Autosave Scheduler: periodic, conditional persistence of the draft.
//!
//! One interval timer per session. The task (and any save it has in flight)
//! is aborted when the `AutosaveHandle` is dropped. A tick that fires while a
//! previous autosave is still pending is skipped, not queued.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::editor::notices::{notify, Notice, NoticeSender};
use crate::editor::{DraftRevision, VersionStore};
use crate::errors::EditorResult;
use crate::models::version::SavedVersion;

/// Job title recorded on autosaves when the session has none.
pub const AUTOSAVE_JOB_TITLE: &str = "General";

type PendingSave = Pin<Box<dyn Future<Output = (u64, EditorResult<SavedVersion>)> + Send>>;

pub struct AutosaveHandle {
    task: JoinHandle<()>,
    enabled: Arc<AtomicBool>,
}

impl AutosaveHandle {
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn spawn_autosave(
    store: Arc<VersionStore>,
    drafts: watch::Receiver<DraftRevision>,
    notices: NoticeSender,
    period: Duration,
    enabled: bool,
) -> AutosaveHandle {
    let enabled = Arc::new(AtomicBool::new(enabled));
    let task = tokio::spawn(run(store, drafts, notices, period, enabled.clone()));
    AutosaveHandle { task, enabled }
}

/// "Auto-save 14:03:27"
pub fn autosave_label() -> String {
    format!("Auto-save {}", Local::now().format("%H:%M:%S"))
}

async fn run(
    store: Arc<VersionStore>,
    drafts: watch::Receiver<DraftRevision>,
    notices: NoticeSender,
    period: Duration,
    enabled: Arc<AtomicBool>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut pending: Option<PendingSave> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if pending.is_some() {
                    debug!("Autosave tick skipped: previous save still in flight");
                    continue;
                }
                if !enabled.load(Ordering::Relaxed) {
                    continue;
                }
                let snapshot = drafts.borrow().clone();
                if snapshot.draft.name.is_empty() {
                    continue;
                }
                pending = Some(Box::pin(save_snapshot(store.clone(), snapshot)));
            }
            (revision, outcome) = wait_for(&mut pending) => {
                pending = None;
                match outcome {
                    Ok(saved) => {
                        info!("Autosaved revision {revision} as {}", saved.version_id);
                        notify(&notices, Notice::info("Auto-saved successfully!"));
                    }
                    Err(e) => {
                        warn!("Auto-save failed for revision {revision}: {e}");
                        notify(&notices, Notice::error(format!("Auto-save failed: {e}")));
                    }
                }
            }
        }
    }
}

async fn save_snapshot(
    store: Arc<VersionStore>,
    snapshot: DraftRevision,
) -> (u64, EditorResult<SavedVersion>) {
    let job_title = match snapshot.job_title.trim() {
        "" => AUTOSAVE_JOB_TITLE,
        title => title,
    };
    let outcome = store
        .save(&snapshot.draft, &autosave_label(), job_title)
        .await;
    (snapshot.revision, outcome)
}

/// Resolves with the pending save's output; never resolves when idle.
async fn wait_for(pending: &mut Option<PendingSave>) -> (u64, EditorResult<SavedVersion>) {
    match pending {
        Some(save) => save.await,
        None => std::future::pending().await,
    }
}
