//! ResuScan API client: the single point of entry for all backend calls.
//!
//! No other module builds requests against the backend directly; the editor
//! reaches it through the `VersionBackend` and `FeedbackEvaluator` seams, the
//! analyzer through the methods below.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, warn};

use crate::errors::{EditorError, EditorResult};
use crate::models::analysis::{
    AtsAnalysis, BulletImprovements, ComprehensiveAnalysis, LinkedinAnalysis, Recommendations,
    SkillGapAnalysis, UploadedResume,
};
use crate::models::draft::ResumeDraft;
use crate::models::version::{
    DeletedVersion, ResumeVersion, SaveRequest, SavedVersion, Template, TemplateList,
    VersionEnvelope, VersionList, VersionSummary,
};

pub mod backend;

pub use backend::VersionBackend;

/// Read requests are retried; writes are sent once so a slow success is
/// never persisted twice.
const MAX_READ_RETRIES: u32 = 3;

/// A file attached to a multipart request.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct FastApiError {
    detail: serde_json::Value,
}

/// HTTP client for the ResuScan backend.
#[derive(Clone)]
pub struct ResuScanClient {
    client: Client,
    base_url: Url,
}

impl ResuScanClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> EditorResult<Self> {
        let raw = base_url.into();
        let base_url = Url::parse(raw.trim_end_matches('/'))
            .with_context(|| format!("Invalid backend URL '{raw}'"))?;
        if base_url.cannot_be_a_base() {
            return Err(EditorError::Validation(format!(
                "Backend URL '{raw}' cannot carry a path"
            )));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Appends `segments` to the base URL, percent-encoding each one, so a
    /// version id can never add path segments or a query.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Cannot fail: `new` rejects cannot-be-a-base URLs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // ── Resume analysis ──────────────────────────────────────────────────

    /// POST /upload-resume
    pub async fn upload_resume(&self, file: Upload) -> EditorResult<UploadedResume> {
        let form = Form::new().part("file", file.into_part()?);
        let request = self.client.post(self.url(&["upload-resume"])).multipart(form);
        read_json(send_once(request).await?).await
    }

    /// POST /analyze-ats (form-encoded)
    pub async fn analyze_ats(&self, resume_text: &str, job_title: &str) -> EditorResult<AtsAnalysis> {
        let request = self
            .client
            .post(self.url(&["analyze-ats"]))
            .form(&[("resume_text", resume_text), ("job_title", job_title)]);
        read_json(send_once(request).await?).await
    }

    /// POST /skill-gap-analysis
    pub async fn skill_gap_analysis(
        &self,
        resume_text: &str,
        target_job: &str,
    ) -> EditorResult<SkillGapAnalysis> {
        let form = Form::new()
            .text("resume_text", resume_text.to_string())
            .text("target_job", target_job.to_string());
        let request = self.client.post(self.url(&["skill-gap-analysis"])).multipart(form);
        read_json(send_once(request).await?).await
    }

    /// POST /improve-bullet-points
    pub async fn improve_bullet_points(
        &self,
        bullet_points: &[String],
        job_title: &str,
    ) -> EditorResult<BulletImprovements> {
        let form = bullet_points
            .iter()
            .fold(Form::new(), |form, bullet| form.text("bullet_points", bullet.clone()))
            .text("job_title", job_title.to_string());
        let request = self.client.post(self.url(&["improve-bullet-points"])).multipart(form);
        read_json(send_once(request).await?).await
    }

    /// POST /recommend-projects-courses
    pub async fn recommend_projects_courses(
        &self,
        missing_skills: &[String],
        job_title: &str,
    ) -> EditorResult<Recommendations> {
        let form = missing_skills
            .iter()
            .fold(Form::new(), |form, skill| form.text("missing_skills", skill.clone()))
            .text("job_title", job_title.to_string());
        let request = self
            .client
            .post(self.url(&["recommend-projects-courses"]))
            .multipart(form);
        read_json(send_once(request).await?).await
    }

    /// POST /comprehensive-analysis
    pub async fn comprehensive_analysis(
        &self,
        file: Upload,
        job_title: &str,
    ) -> EditorResult<ComprehensiveAnalysis> {
        let form = Form::new()
            .part("file", file.into_part()?)
            .text("job_title", job_title.to_string());
        let request = self
            .client
            .post(self.url(&["comprehensive-analysis"]))
            .multipart(form);
        read_json(send_once(request).await?).await
    }

    /// POST /analyze-linkedin
    pub async fn analyze_linkedin(
        &self,
        profile_image: Upload,
        job_title: &str,
    ) -> EditorResult<LinkedinAnalysis> {
        let form = Form::new()
            .part("profile_image", profile_image.into_part()?)
            .text("job_title", job_title.to_string());
        let request = self.client.post(self.url(&["analyze-linkedin"])).multipart(form);
        read_json(send_once(request).await?).await
    }

    // ── Templates and versions ───────────────────────────────────────────

    /// Sends a GET, retrying on transport errors, 429 and 5xx with
    /// exponential backoff (250ms, 500ms).
    async fn get_with_retry<T: DeserializeOwned>(&self, segments: &[&str]) -> EditorResult<T> {
        let url = self.url(segments);
        let path = url.path().to_string();
        let mut last_error: Option<EditorError> = None;

        for attempt in 0..MAX_READ_RETRIES {
            if attempt > 0 {
                let delay = Duration::from_millis(250 * (1 << (attempt - 1)));
                warn!(
                    "GET {} attempt {} failed, retrying after {}ms...",
                    path,
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let result = match send_once(self.client.get(url.clone())).await {
                Ok(response) => read_json(response).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| EditorError::Api {
            status: 0,
            message: format!("GET {path} exhausted {MAX_READ_RETRIES} attempts"),
        }))
    }

    fn draft_form(draft: &ResumeDraft) -> EditorResult<Form> {
        Ok(Form::new().text("resume_data", draft.to_wire_json()?))
    }
}

#[async_trait]
impl VersionBackend for ResuScanClient {
    async fn list_templates(&self) -> EditorResult<Vec<Template>> {
        let list: TemplateList = self.get_with_retry(&["get-resume-templates"]).await?;
        Ok(list.templates)
    }

    async fn list_versions(&self) -> EditorResult<Vec<VersionSummary>> {
        let list: VersionList = self.get_with_retry(&["get-resume-versions"]).await?;
        Ok(list.versions)
    }

    async fn get_version(&self, id: &str) -> EditorResult<ResumeVersion> {
        let envelope: VersionEnvelope = self
            .get_with_retry(&["get-resume-version", id])
            .await?;
        Ok(envelope.version)
    }

    async fn save_version(&self, request: SaveRequest<'_>) -> EditorResult<SavedVersion> {
        let form = Self::draft_form(request.draft)?
            .text("version_name", request.version_name.to_string())
            .text("job_title", request.job_title.to_string());
        let builder = self.client.post(self.url(&["save-resume-version"])).multipart(form);
        let saved: SavedVersion = read_json(send_once(builder).await?).await?;
        debug!("Saved version {} ({})", saved.version_id, request.version_name);
        Ok(saved)
    }

    async fn delete_version(&self, id: &str) -> EditorResult<DeletedVersion> {
        let builder = self
            .client
            .delete(self.url(&["delete-resume-version", id]));
        read_json(send_once(builder).await?).await
    }

    async fn generate_pdf(&self, draft: &ResumeDraft, template_id: &str) -> EditorResult<Bytes> {
        let form = Self::draft_form(&draft.with_display_dates())?
            .text("template_id", template_id.to_string());
        let builder = self.client.post(self.url(&["generate-resume-pdf"])).multipart(form);
        Ok(send_once(builder).await?.bytes().await?)
    }

    async fn save_and_generate_pdf(
        &self,
        request: SaveRequest<'_>,
        template_id: &str,
    ) -> EditorResult<Bytes> {
        let form = Self::draft_form(&request.draft.with_display_dates())?
            .text("version_name", request.version_name.to_string())
            .text("job_title", request.job_title.to_string())
            .text("template_id", template_id.to_string());
        let builder = self.client.post(self.url(&["save-and-generate-pdf"])).multipart(form);
        Ok(send_once(builder).await?.bytes().await?)
    }
}

impl Upload {
    fn into_part(self) -> EditorResult<Part> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(self.mime)?)
    }
}

/// Sends a request and maps non-2xx statuses to `EditorError`.
async fn send_once(request: RequestBuilder) -> EditorResult<Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract_detail(&body);

    if status == StatusCode::NOT_FOUND {
        return Err(EditorError::NotFound(message));
    }
    if status.is_server_error() {
        if let Some(inner) = wrapped_not_found(&message) {
            return Err(EditorError::NotFound(inner.to_string()));
        }
    }
    Err(EditorError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> EditorResult<T> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// The backend's version handlers catch their own 404 and re-raise it as a
/// 500 whose detail reads "Error retrieving resume version: 404: Resume
/// version not found". Returns the inner message for such details.
fn wrapped_not_found(detail: &str) -> Option<&str> {
    const MARKER: &str = "404: ";
    if let Some(inner) = detail.strip_prefix(MARKER) {
        return Some(inner);
    }
    detail
        .find(": 404: ")
        .map(|at| &detail[at + ": ".len() + MARKER.len()..])
}

/// Pulls the FastAPI `detail` out of an error body, falling back to the raw text.
fn extract_detail(body: &str) -> String {
    match serde_json::from_str::<FastApiError>(body) {
        Ok(FastApiError {
            detail: serde_json::Value::String(s),
        }) => s,
        Ok(FastApiError { detail }) => detail.to_string(),
        Err(_) => body.to_string(),
    }
}
