//! Resume Analyzer: upload a resume or LinkedIn screenshot and get the
//! backend's analysis back. Inputs are checked locally first so an
//! incomplete request never reaches the network.

use std::path::Path;

use tracing::info;

use crate::api_client::{ResuScanClient, Upload};
use crate::errors::{EditorError, EditorResult};
use crate::models::analysis::{
    BulletImprovements, ComprehensiveAnalysis, LinkedinAnalysis, Recommendations,
    SkillGapAnalysis, UploadedResume,
};

pub const MISSING_RESUME: &str = "Please upload a resume file";
pub const MISSING_JOB_TITLE: &str = "Please select a job title";
pub const MISSING_PROFILE_IMAGE: &str = "Please upload a LinkedIn profile screenshot";

const RESUME_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("doc", "application/msword"),
];

const IMAGE_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
];

#[derive(Clone)]
pub struct ResumeAnalyzer {
    client: ResuScanClient,
}

impl ResumeAnalyzer {
    pub fn new(client: ResuScanClient) -> Self {
        Self { client }
    }

    /// Full analysis of a resume file against a target job title.
    pub async fn analyze_resume(
        &self,
        file: Option<&Path>,
        job_title: &str,
    ) -> EditorResult<ComprehensiveAnalysis> {
        let file = file.ok_or_else(|| EditorError::Validation(MISSING_RESUME.to_string()))?;
        let job_title = required_job_title(job_title)?;
        let upload = load_upload(file, RESUME_TYPES).await?;

        info!("Analyzing resume '{}' for '{}'", upload.file_name, job_title);
        self.client.comprehensive_analysis(upload, job_title).await
    }

    pub async fn analyze_linkedin(
        &self,
        profile_image: Option<&Path>,
        job_title: &str,
    ) -> EditorResult<LinkedinAnalysis> {
        let image = profile_image
            .ok_or_else(|| EditorError::Validation(MISSING_PROFILE_IMAGE.to_string()))?;
        let job_title = required_job_title(job_title)?;
        let upload = load_upload(image, IMAGE_TYPES).await?;

        info!("Analyzing LinkedIn profile '{}' for '{}'", upload.file_name, job_title);
        self.client.analyze_linkedin(upload, job_title).await
    }

    /// Text extraction only, no scoring.
    pub async fn extract_text(&self, file: &Path) -> EditorResult<UploadedResume> {
        let upload = load_upload(file, RESUME_TYPES).await?;
        self.client.upload_resume(upload).await
    }

    pub async fn skill_gap(
        &self,
        resume_text: &str,
        target_job: &str,
    ) -> EditorResult<SkillGapAnalysis> {
        let target_job = required_job_title(target_job)?;
        self.client.skill_gap_analysis(resume_text, target_job).await
    }

    pub async fn improve_bullets(
        &self,
        bullet_points: &[String],
        job_title: &str,
    ) -> EditorResult<BulletImprovements> {
        let job_title = required_job_title(job_title)?;
        if bullet_points.iter().all(|b| b.trim().is_empty()) {
            return Ok(BulletImprovements {
                improved_bullet_points: Vec::new(),
            });
        }
        self.client.improve_bullet_points(bullet_points, job_title).await
    }

    pub async fn recommend(
        &self,
        missing_skills: &[String],
        job_title: &str,
    ) -> EditorResult<Recommendations> {
        let job_title = required_job_title(job_title)?;
        self.client
            .recommend_projects_courses(missing_skills, job_title)
            .await
    }
}

fn required_job_title(job_title: &str) -> EditorResult<&str> {
    let job_title = job_title.trim();
    if job_title.is_empty() {
        return Err(EditorError::Validation(MISSING_JOB_TITLE.to_string()));
    }
    Ok(job_title)
}

/// Maps a file extension (case-insensitive) onto its MIME type.
fn mime_for(path: &Path, accepted: &[(&str, &'static str)]) -> EditorResult<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    accepted
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .ok_or_else(|| {
            let expected: Vec<&str> = accepted.iter().map(|(known, _)| *known).collect();
            EditorError::Validation(format!(
                "Unsupported file type '{}'; expected one of: {}",
                path.display(),
                expected.join(", ")
            ))
        })
}

async fn load_upload(path: &Path, accepted: &[(&str, &'static str)]) -> EditorResult<Upload> {
    let mime = mime_for(path, accepted)?;
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Upload {
        file_name,
        mime,
        bytes,
    })
}
