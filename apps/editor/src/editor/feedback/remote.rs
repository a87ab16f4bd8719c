use async_trait::async_trait;

use crate::api_client::ResuScanClient;
use crate::editor::feedback::{FeedbackEvaluator, FeedbackResult};
use crate::errors::EditorResult;
use crate::models::draft::ResumeDraft;

/// Job title sent when the session has none set.
pub const DEFAULT_ATS_JOB_TITLE: &str = "Software Engineer";

/// Scores drafts with the backend's ATS analyzer.
///
/// Drafts without a name are not submitted; the previous result stands.
pub struct RemoteAtsEvaluator {
    client: ResuScanClient,
}

impl RemoteAtsEvaluator {
    pub fn new(client: ResuScanClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedbackEvaluator for RemoteAtsEvaluator {
    async fn evaluate(
        &self,
        draft: &ResumeDraft,
        job_title: &str,
    ) -> EditorResult<Option<FeedbackResult>> {
        if draft.name.is_empty() {
            return Ok(None);
        }

        let job_title = match job_title.trim() {
            "" => DEFAULT_ATS_JOB_TITLE,
            title => title,
        };
        let resume_text = draft.to_wire_json()?;
        let analysis = self.client.analyze_ats(&resume_text, job_title).await?;

        Ok(Some(FeedbackResult {
            ats_score: analysis.ats_score.round().clamp(0.0, 100.0) as u8,
            suggestions: analysis.improvement_tips,
            warnings: Vec::new(),
            tips: Vec::new(),
        }))
    }

    fn backend_name(&self) -> &'static str {
        "remote"
    }
}
