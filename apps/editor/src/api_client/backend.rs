use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::EditorResult;
use crate::models::draft::ResumeDraft;
use crate::models::version::{
    DeletedVersion, ResumeVersion, SaveRequest, SavedVersion, Template, VersionSummary,
};

/// The version-store wire contract. Implement this to swap the backend
/// (e.g. an in-memory fake in tests) without touching the editor.
///
/// Carried by `VersionStore` as `Arc<dyn VersionBackend>`.
#[async_trait]
pub trait VersionBackend: Send + Sync {
    async fn list_templates(&self) -> EditorResult<Vec<Template>>;

    async fn list_versions(&self) -> EditorResult<Vec<VersionSummary>>;

    async fn get_version(&self, id: &str) -> EditorResult<ResumeVersion>;

    async fn save_version(&self, request: SaveRequest<'_>) -> EditorResult<SavedVersion>;

    async fn delete_version(&self, id: &str) -> EditorResult<DeletedVersion>;

    /// Renders `draft` with `template_id` and returns the PDF bytes.
    async fn generate_pdf(&self, draft: &ResumeDraft, template_id: &str) -> EditorResult<Bytes>;

    /// Persists a new version and renders it in one call.
    async fn save_and_generate_pdf(
        &self,
        request: SaveRequest<'_>,
        template_id: &str,
    ) -> EditorResult<Bytes>;
}
