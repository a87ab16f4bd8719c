//! Feedback Evaluator: pluggable, trait-based scoring of the current draft.
//!
//! Default: `LocalHeuristicEvaluator` (pure, synchronous, deterministic).
//! Alternative: `RemoteAtsEvaluator` (backend `/analyze-ats`).
//!
//! A deployment picks exactly one via `FEEDBACK_MODE`; the two produce scores
//! on different scales and are never mixed in one session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::EditorResult;
use crate::models::draft::ResumeDraft;

pub mod heuristic;
pub mod remote;
pub mod worker;

pub use heuristic::{evaluate_draft, LocalHeuristicEvaluator};
pub use remote::RemoteAtsEvaluator;
pub use worker::{spawn_feedback_worker, FeedbackHandle, FeedbackState};

/// Derived feedback for one draft revision. Never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackResult {
    pub ats_score: u8, // 0 – 100
    pub suggestions: Vec<String>,
    pub warnings: Vec<String>,
    pub tips: Vec<String>,
}

#[async_trait]
pub trait FeedbackEvaluator: Send + Sync {
    /// Scores `draft`. `Ok(None)` means the evaluator has nothing to say for
    /// this draft and the previous result should stay on screen.
    async fn evaluate(
        &self,
        draft: &ResumeDraft,
        job_title: &str,
    ) -> EditorResult<Option<FeedbackResult>>;

    /// "local" or "remote", for logs.
    fn backend_name(&self) -> &'static str;
}
