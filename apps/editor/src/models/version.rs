use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::draft::ResumeDraft;

/// A PDF template offered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// One row of `GET /get-resume-versions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionSummary {
    pub id: String,
    pub name: String,
    pub job_title: String,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

/// A persisted, named draft. Owned by the backend; last write wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeVersion {
    pub id: String,
    pub name: String,
    pub job_title: String,
    pub resume_data: ResumeDraft,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize)]
pub struct TemplateList {
    pub templates: Vec<Template>,
}

#[derive(Debug, Deserialize)]
pub struct VersionList {
    pub versions: Vec<VersionSummary>,
}

#[derive(Debug, Deserialize)]
pub struct VersionEnvelope {
    pub version: ResumeVersion,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SavedVersion {
    pub version_id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeletedVersion {
    #[serde(default)]
    pub message: String,
}

/// Fields of a save request after local validation.
#[derive(Debug, Clone)]
pub struct SaveRequest<'a> {
    pub draft: &'a ResumeDraft,
    pub version_name: &'a str,
    pub job_title: &'a str,
}
