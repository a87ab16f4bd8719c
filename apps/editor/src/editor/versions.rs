//! Version Store: validated access to persisted versions plus a read-through
//! cache of the version and template lists.
//!
//! Every successful write refreshes the cached version list from the backend.
//! The cache is never patched locally.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::api_client::VersionBackend;
use crate::errors::{EditorError, EditorResult};
use crate::models::draft::ResumeDraft;
use crate::models::version::{ResumeVersion, SaveRequest, SavedVersion, Template, VersionSummary};

pub const MISSING_SAVE_FIELDS: &str = "Please provide both version name and job title";

pub struct VersionStore {
    backend: Arc<dyn VersionBackend>,
    versions: RwLock<Vec<VersionSummary>>,
    templates: RwLock<Vec<Template>>,
}

impl VersionStore {
    pub fn new(backend: Arc<dyn VersionBackend>) -> Self {
        Self {
            backend,
            versions: RwLock::new(Vec::new()),
            templates: RwLock::new(Vec::new()),
        }
    }

    /// Cached version list as of the last refresh.
    pub async fn versions(&self) -> Vec<VersionSummary> {
        self.versions.read().await.clone()
    }

    pub async fn templates(&self) -> Vec<Template> {
        self.templates.read().await.clone()
    }

    pub async fn refresh_versions(&self) -> EditorResult<Vec<VersionSummary>> {
        let versions = self.backend.list_versions().await?;
        *self.versions.write().await = versions.clone();
        Ok(versions)
    }

    pub async fn refresh_templates(&self) -> EditorResult<Vec<Template>> {
        let templates = self.backend.list_templates().await?;
        *self.templates.write().await = templates.clone();
        Ok(templates)
    }

    pub async fn fetch(&self, id: &str) -> EditorResult<ResumeVersion> {
        if id.trim().is_empty() {
            return Err(EditorError::Validation("version id is required".to_string()));
        }
        self.backend.get_version(id).await
    }

    pub async fn save(
        &self,
        draft: &ResumeDraft,
        version_name: &str,
        job_title: &str,
    ) -> EditorResult<SavedVersion> {
        let request = validated(draft, version_name, job_title)?;
        let saved = self.backend.save_version(request).await?;
        info!("Saved resume version '{}' as {}", version_name.trim(), saved.version_id);
        self.refresh_after_write().await;
        Ok(saved)
    }

    pub async fn delete(&self, id: &str) -> EditorResult<()> {
        if id.trim().is_empty() {
            return Err(EditorError::Validation("version id is required".to_string()));
        }
        self.backend.delete_version(id).await?;
        info!("Deleted resume version {id}");
        self.refresh_after_write().await;
        Ok(())
    }

    pub async fn render_pdf(&self, draft: &ResumeDraft, template_id: &str) -> EditorResult<Bytes> {
        self.backend.generate_pdf(draft, template_id).await
    }

    pub async fn save_and_render_pdf(
        &self,
        draft: &ResumeDraft,
        version_name: &str,
        job_title: &str,
        template_id: &str,
    ) -> EditorResult<Bytes> {
        let request = validated(draft, version_name, job_title)?;
        let pdf = self.backend.save_and_generate_pdf(request, template_id).await?;
        self.refresh_after_write().await;
        Ok(pdf)
    }

    /// A failed refresh leaves the stale list in place; the write itself succeeded.
    async fn refresh_after_write(&self) {
        if let Err(e) = self.refresh_versions().await {
            warn!("Version list refresh failed after write: {e}");
        }
    }
}

fn validated<'a>(
    draft: &'a ResumeDraft,
    version_name: &'a str,
    job_title: &'a str,
) -> EditorResult<SaveRequest<'a>> {
    let version_name = version_name.trim();
    let job_title = job_title.trim();
    if version_name.is_empty() || job_title.is_empty() {
        return Err(EditorError::Validation(MISSING_SAVE_FIELDS.to_string()));
    }
    Ok(SaveRequest {
        draft,
        version_name,
        job_title,
    })
}
