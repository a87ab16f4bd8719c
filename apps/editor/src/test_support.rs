//! In-process stand-in for the ResuScan backend, used by unit tests that
//! exercise the real HTTP client.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api_client::ResuScanClient;

#[derive(Default)]
struct StubInner {
    versions: BTreeMap<String, Value>,
    next_id: u64,
    last_template: Option<String>,
    last_job_title: Option<String>,
    template_failures: u32,
    template_calls: u32,
    version_calls: u32,
    save_calls: u32,
    last_form: Vec<(String, String)>,
}

/// Shared handle onto the stub's state so tests can inspect what was sent.
#[derive(Clone, Default)]
pub struct StubBackend {
    inner: Arc<Mutex<StubInner>>,
}

impl StubBackend {
    pub fn fail_next_template_calls(&self, n: u32) {
        self.inner.lock().unwrap().template_failures = n;
    }

    pub fn template_calls(&self) -> u32 {
        self.inner.lock().unwrap().template_calls
    }

    pub fn version_calls(&self) -> u32 {
        self.inner.lock().unwrap().version_calls
    }

    pub fn save_calls(&self) -> u32 {
        self.inner.lock().unwrap().save_calls
    }

    /// Every value sent under `name` in the last analysis or PDF form, in order.
    pub fn form_values(&self, name: &str) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .last_form
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
            .collect()
    }

    pub fn last_template(&self) -> Option<String> {
        self.inner.lock().unwrap().last_template.clone()
    }

    pub fn last_job_title(&self) -> Option<String> {
        self.inner.lock().unwrap().last_job_title.clone()
    }

    /// Seeds a version under a fixed id, bypassing the save endpoint.
    pub fn insert_version(&self, id: &str, name: &str, job_title: &str, resume_data: Value) {
        let mut inner = self.inner.lock().unwrap();
        inner.versions.insert(
            id.to_string(),
            json!({
                "id": id,
                "name": name,
                "job_title": job_title,
                "resume_data": resume_data,
                "created_at": "2024-05-01T10:00:00",
                "updated_at": "2024-05-01T10:00:00"
            }),
        );
    }

    fn store(&self, fields: &BTreeMap<String, String>) -> Result<String, Response> {
        let resume_data: Value = fields
            .get("resume_data")
            .and_then(|raw| serde_json::from_str(raw).ok())
            .ok_or_else(|| detail(StatusCode::UNPROCESSABLE_ENTITY, "invalid resume_data"))?;
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        inner.save_calls += 1;
        let id = format!("v{}", inner.next_id);
        let job_title = fields.get("job_title").cloned().unwrap_or_default();
        inner.last_job_title = Some(job_title.clone());
        let timestamp = format!("2024-05-01T10:00:{:02}", inner.next_id % 60);
        inner.versions.insert(
            id.clone(),
            json!({
                "id": id,
                "name": fields.get("version_name").cloned().unwrap_or_default(),
                "job_title": job_title,
                "resume_data": resume_data,
                "created_at": timestamp,
                "updated_at": timestamp
            }),
        );
        Ok(id)
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

/// All parts in arrival order; repeated names are kept.
async fn form_fields(mut multipart: Multipart) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.unwrap_or_default();
        let value = match file_name {
            Some(file_name) => format!("file:{file_name}:{}", bytes.len()),
            None => String::from_utf8_lossy(&bytes).into_owned(),
        };
        fields.push((name, value));
    }
    fields
}

async fn text_fields(multipart: Multipart) -> BTreeMap<String, String> {
    form_fields(multipart).await.into_iter().collect()
}

async fn templates(State(stub): State<StubBackend>) -> Response {
    let mut inner = stub.inner.lock().unwrap();
    inner.template_calls += 1;
    if inner.template_failures > 0 {
        inner.template_failures -= 1;
        return detail(StatusCode::SERVICE_UNAVAILABLE, "warming up");
    }
    Json(json!({
        "success": true,
        "templates": [
            {"id": "professional", "name": "Professional", "description": "Clean layout"},
            {"id": "modern", "name": "Modern", "description": "Two-tone layout"}
        ]
    }))
    .into_response()
}

async fn versions(State(stub): State<StubBackend>) -> Json<Value> {
    let inner = stub.inner.lock().unwrap();
    let mut rows: Vec<Value> = inner
        .versions
        .values()
        .map(|v| {
            json!({
                "id": v["id"],
                "name": v["name"],
                "job_title": v["job_title"],
                "created_at": v["created_at"],
                "updated_at": v["updated_at"]
            })
        })
        .collect();
    rows.reverse();
    Json(json!({ "success": true, "versions": rows }))
}

// The real handlers catch their own 404 and re-raise it inside a 500.
async fn version(State(stub): State<StubBackend>, Path(id): Path<String>) -> Response {
    let mut inner = stub.inner.lock().unwrap();
    inner.version_calls += 1;
    match inner.versions.get(&id) {
        Some(v) => Json(json!({ "success": true, "version": v })).into_response(),
        None => detail(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error retrieving resume version: 404: Resume version not found",
        ),
    }
}

async fn save(State(stub): State<StubBackend>, multipart: Multipart) -> Response {
    let fields = text_fields(multipart).await;
    match stub.store(&fields) {
        Ok(id) => Json(json!({
            "success": true,
            "version_id": id,
            "message": format!("Resume version '{}' saved successfully", fields["version_name"])
        }))
        .into_response(),
        Err(response) => response,
    }
}

async fn remove(State(stub): State<StubBackend>, Path(id): Path<String>) -> Response {
    let mut inner = stub.inner.lock().unwrap();
    match inner.versions.remove(&id) {
        Some(_) => Json(json!({ "success": true, "message": "deleted" })).into_response(),
        None => detail(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error deleting resume version: 404: Resume version not found",
        ),
    }
}

async fn pdf(State(stub): State<StubBackend>, multipart: Multipart) -> Response {
    let form = form_fields(multipart).await;
    let fields: BTreeMap<String, String> = form.iter().cloned().collect();
    let mut inner = stub.inner.lock().unwrap();
    inner.last_template = fields.get("template_id").cloned();
    inner.last_form = form;
    drop(inner);
    (
        [("content-type", "application/pdf")],
        b"%PDF-1.4 stub".to_vec(),
    )
        .into_response()
}

async fn save_and_pdf(State(stub): State<StubBackend>, multipart: Multipart) -> Response {
    let fields = text_fields(multipart).await;
    if let Err(response) = stub.store(&fields) {
        return response;
    }
    stub.inner.lock().unwrap().last_template = fields.get("template_id").cloned();
    (
        [("content-type", "application/pdf")],
        b"%PDF-1.4 stub".to_vec(),
    )
        .into_response()
}

#[derive(Deserialize)]
struct AtsForm {
    resume_text: String,
    job_title: String,
}

async fn analyze_ats(State(stub): State<StubBackend>, Form(form): Form<AtsForm>) -> Json<Value> {
    stub.inner.lock().unwrap().last_job_title = Some(form.job_title);
    Json(json!({
        "ats_score": if form.resume_text.is_empty() { 0.0 } else { 62.5 },
        "keyword_score": 50.0,
        "improvement_tips": ["Add more keywords"],
        "score_breakdown": {"keywords": "50.0/100"}
    }))
}

async fn comprehensive(State(stub): State<StubBackend>, multipart: Multipart) -> Json<Value> {
    let fields = text_fields(multipart).await;
    stub.inner.lock().unwrap().last_job_title = fields.get("job_title").cloned();
    Json(json!({
        "resume_text": fields.get("file").cloned().unwrap_or_default(),
        "ats_analysis": {"ats_score": 71.25, "improvement_tips": []},
        "skill_gap_analysis": {"missing_skills": ["docker"], "skill_match_percentage": 80.0},
        "bullet_point_improvements": {"improved_bullet_points": []},
        "recommendations": {"projects": []}
    }))
}

async fn skill_gap(State(stub): State<StubBackend>, multipart: Multipart) -> Json<Value> {
    let fields = form_fields(multipart).await;
    stub.inner.lock().unwrap().last_form = fields;
    Json(json!({
        "resume_skills": ["python", "sql"],
        "required_skills": ["python", "sql", "docker"],
        "missing_skills": ["docker"],
        "existing_skills": ["python", "sql"],
        "skill_match_percentage": 66.67
    }))
}

async fn improve_bullets(State(stub): State<StubBackend>, multipart: Multipart) -> Json<Value> {
    let fields = form_fields(multipart).await;
    let improved: Vec<Value> = fields
        .iter()
        .filter(|(name, _)| name == "bullet_points")
        .map(|(_, bullet)| json!({"original": bullet, "improved": format!("Led: {bullet}")}))
        .collect();
    stub.inner.lock().unwrap().last_form = fields;
    Json(json!({ "improved_bullet_points": improved }))
}

async fn recommend(State(stub): State<StubBackend>, multipart: Multipart) -> Json<Value> {
    let fields = form_fields(multipart).await;
    stub.inner.lock().unwrap().last_form = fields;
    Json(json!({
        "projects": [{"title": "Containerize a service", "skills": ["docker"]}],
        "courses": [{"title": "Docker Fundamentals"}]
    }))
}

async fn upload(multipart: Multipart) -> Json<Value> {
    let fields = text_fields(multipart).await;
    Json(json!({
        "success": true,
        "resume_text": fields.get("file").cloned().unwrap_or_default(),
        "message": "Resume parsed successfully"
    }))
}

async fn linkedin(State(stub): State<StubBackend>, multipart: Multipart) -> Json<Value> {
    let fields = text_fields(multipart).await;
    stub.inner.lock().unwrap().last_job_title = fields.get("job_title").cloned();
    Json(json!({
        "profile_score": 55,
        "image": fields.get("profile_image").cloned().unwrap_or_default()
    }))
}

/// Binds the stub on an ephemeral port and returns a client pointed at it.
pub async fn spawn_stub_backend(stub: StubBackend) -> ResuScanClient {
    let app = Router::new()
        .route("/get-resume-templates", get(templates))
        .route("/get-resume-versions", get(versions))
        .route("/get-resume-version/:id", get(version))
        .route("/save-resume-version", post(save))
        .route("/delete-resume-version/:id", delete(remove))
        .route("/generate-resume-pdf", post(pdf))
        .route("/save-and-generate-pdf", post(save_and_pdf))
        .route("/upload-resume", post(upload))
        .route("/analyze-ats", post(analyze_ats))
        .route("/skill-gap-analysis", post(skill_gap))
        .route("/improve-bullet-points", post(improve_bullets))
        .route("/recommend-projects-courses", post(recommend))
        .route("/comprehensive-analysis", post(comprehensive))
        .route("/analyze-linkedin", post(linkedin))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    ResuScanClient::new(format!("http://{addr}"), Duration::from_secs(5)).unwrap()
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory VersionBackend
// ────────────────────────────────────────────────────────────────────────────

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use bytes::Bytes;

use crate::api_client::VersionBackend;
use crate::errors::{EditorError, EditorResult};
use crate::models::draft::ResumeDraft;
use crate::models::version::{
    DeletedVersion, ResumeVersion, SaveRequest, SavedVersion, Template, VersionSummary,
};

/// A `VersionBackend` with an optional artificial latency and failure switch.
/// Tracks how many saves overlap so autosave tests can assert on it.
#[derive(Default)]
pub struct FakeBackend {
    versions: Mutex<BTreeMap<String, ResumeVersion>>,
    next_id: AtomicU32,
    save_delay: Mutex<Option<Duration>>,
    failing: AtomicBool,
    save_calls: AtomicU32,
    list_calls: AtomicU32,
    pdf_calls: AtomicU32,
    in_flight: AtomicU32,
    max_in_flight: AtomicU32,
    last_job_title: Mutex<Option<String>>,
}

impl FakeBackend {
    pub fn with_save_delay(delay: Duration) -> Self {
        let backend = Self::default();
        *backend.save_delay.lock().unwrap() = Some(delay);
        backend
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn save_calls(&self) -> u32 {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn pdf_calls(&self) -> u32 {
        self.pdf_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> u32 {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn last_job_title(&self) -> Option<String> {
        self.last_job_title.lock().unwrap().clone()
    }

    pub fn saved_names(&self) -> Vec<String> {
        self.versions
            .lock()
            .unwrap()
            .values()
            .map(|v| v.name.clone())
            .collect()
    }

    pub fn insert(&self, id: &str, name: &str, job_title: &str, draft: ResumeDraft) {
        self.versions.lock().unwrap().insert(
            id.to_string(),
            ResumeVersion {
                id: id.to_string(),
                name: name.to_string(),
                job_title: job_title.to_string(),
                resume_data: draft,
                created_at: timestamp(0),
                updated_at: Some(timestamp(0)),
            },
        );
    }

    fn check(&self) -> EditorResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EditorError::Api {
                status: 500,
                message: "backend unavailable".to_string(),
            });
        }
        Ok(())
    }

    async fn store(&self, request: SaveRequest<'_>) -> EditorResult<SavedVersion> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.save_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.check()?;

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("fake-{n}");
        *self.last_job_title.lock().unwrap() = Some(request.job_title.to_string());
        self.versions.lock().unwrap().insert(
            id.clone(),
            ResumeVersion {
                id: id.clone(),
                name: request.version_name.to_string(),
                job_title: request.job_title.to_string(),
                resume_data: request.draft.clone(),
                created_at: timestamp(n),
                updated_at: Some(timestamp(n)),
            },
        );
        Ok(SavedVersion {
            version_id: id,
            message: String::new(),
        })
    }
}

fn timestamp(seconds: u32) -> chrono::NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
        + chrono::Duration::seconds(seconds as i64)
}

#[async_trait]
impl VersionBackend for FakeBackend {
    async fn list_templates(&self) -> EditorResult<Vec<Template>> {
        self.check()?;
        Ok(vec![
            Template {
                id: "professional".to_string(),
                name: "Professional".to_string(),
                description: String::new(),
            },
            Template {
                id: "modern".to_string(),
                name: "Modern".to_string(),
                description: String::new(),
            },
        ])
    }

    async fn list_versions(&self) -> EditorResult<Vec<VersionSummary>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .versions
            .lock()
            .unwrap()
            .values()
            .map(|v| VersionSummary {
                id: v.id.clone(),
                name: v.name.clone(),
                job_title: v.job_title.clone(),
                created_at: v.created_at,
                updated_at: v.updated_at,
            })
            .collect())
    }

    async fn get_version(&self, id: &str) -> EditorResult<ResumeVersion> {
        self.check()?;
        self.versions
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| EditorError::NotFound("Resume version not found".to_string()))
    }

    async fn save_version(&self, request: SaveRequest<'_>) -> EditorResult<SavedVersion> {
        self.store(request).await
    }

    async fn delete_version(&self, id: &str) -> EditorResult<DeletedVersion> {
        self.check()?;
        match self.versions.lock().unwrap().remove(id) {
            Some(_) => Ok(DeletedVersion {
                message: String::new(),
            }),
            None => Err(EditorError::NotFound("Resume version not found".to_string())),
        }
    }

    async fn generate_pdf(&self, _draft: &ResumeDraft, _template_id: &str) -> EditorResult<Bytes> {
        self.pdf_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(Bytes::from_static(b"%PDF-1.4 fake"))
    }

    async fn save_and_generate_pdf(
        &self,
        request: SaveRequest<'_>,
        template_id: &str,
    ) -> EditorResult<Bytes> {
        self.store(request).await?;
        self.generate_pdf(&ResumeDraft::default(), template_id).await
    }
}
