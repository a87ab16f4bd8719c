//! Editor Session: the owning view of one draft.
//!
//! Every committed mutation is recorded in history and published as a new
//! `DraftRevision`, which drives the feedback worker and is what autosave
//! persists. Both background tasks live exactly as long as the session.
//!
//! User-triggered remote actions return `Result` and also emit a `Notice`
//! naming the action. A failed remote call never rolls back the local draft.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Local;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::editor::autosave::{spawn_autosave, AutosaveHandle};
use crate::editor::document::DraftDocument;
use crate::editor::feedback::{spawn_feedback_worker, FeedbackHandle, FeedbackState};
use crate::editor::history::HistoryLog;
use crate::editor::notices::{notice_channel, notify, Notice, NoticeReceiver, NoticeSender};
use crate::editor::{DraftRevision, VersionStore};
use crate::errors::{EditorError, EditorResult};
use crate::models::draft::{EntryId, EntryPatch, Field, ResumeDraft, Section};
use crate::models::version::{SavedVersion, Template, VersionSummary};
use crate::state::EditorContext;

/// A rendered PDF plus the file name the user should see.
#[derive(Debug, Clone)]
pub struct PdfExport {
    pub file_name: String,
    pub bytes: Bytes,
}

pub struct EditorSession {
    document: DraftDocument,
    history: HistoryLog,
    revision: u64,
    job_title: String,
    template_id: String,
    drafts: watch::Sender<DraftRevision>,
    store: Arc<VersionStore>,
    notices: NoticeSender,
    feedback: FeedbackHandle,
    autosave: AutosaveHandle,
}

impl EditorSession {
    /// Creates an empty draft, starts the feedback worker and autosave timer,
    /// and loads the template and version lists. Catalog failures are logged
    /// and leave the lists empty.
    pub async fn mount(ctx: &EditorContext) -> (Self, NoticeReceiver) {
        let (session, inbox) = Self::mount_detached(ctx);
        session.refresh_catalog().await;
        (session, inbox)
    }

    fn mount_detached(ctx: &EditorContext) -> (Self, NoticeReceiver) {
        let (notices, inbox) = notice_channel();
        let (drafts, rx) = watch::channel(DraftRevision::initial());

        let feedback = spawn_feedback_worker(
            ctx.evaluator.clone(),
            rx.clone(),
            ctx.config.feedback_debounce,
        );
        let autosave = spawn_autosave(
            ctx.store.clone(),
            rx,
            notices.clone(),
            ctx.config.autosave_interval,
            ctx.config.autosave_enabled,
        );

        let document = DraftDocument::new();
        let mut history = HistoryLog::new();
        history.record(document.draft());

        info!("Editor session mounted");
        (
            Self {
                document,
                history,
                revision: 0,
                job_title: String::new(),
                template_id: ctx.config.default_template.clone(),
                drafts,
                store: ctx.store.clone(),
                notices,
                feedback,
                autosave,
            },
            inbox,
        )
    }

    async fn refresh_catalog(&self) {
        if let Err(e) = self.store.refresh_templates().await {
            warn!("Error loading templates: {e}");
        }
        if let Err(e) = self.store.refresh_versions().await {
            warn!("Error loading versions: {e}");
        }
    }

    // ── Read access ──────────────────────────────────────────────────────

    pub fn draft(&self) -> &ResumeDraft {
        self.document.draft()
    }

    pub fn document(&self) -> &DraftDocument {
        &self.document
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn job_title(&self) -> &str {
        &self.job_title
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn feedback(&self) -> FeedbackState {
        self.feedback.latest()
    }

    pub fn subscribe_feedback(&self) -> watch::Receiver<FeedbackState> {
        self.feedback.subscribe()
    }

    pub fn subscribe_drafts(&self) -> watch::Receiver<DraftRevision> {
        self.drafts.subscribe()
    }

    pub async fn versions(&self) -> Vec<VersionSummary> {
        self.store.versions().await
    }

    pub async fn templates(&self) -> Vec<Template> {
        self.store.templates().await
    }

    // ── Draft mutations ──────────────────────────────────────────────────

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> bool {
        let changed = self.document.set_field(field, value);
        self.commit(changed)
    }

    pub fn add_entry(&mut self, section: Section) -> EntryId {
        let id = self.document.add_entry(section);
        self.commit(true);
        id
    }

    pub fn update_entry(&mut self, section: Section, index: usize, patch: &EntryPatch) -> bool {
        let changed = self.document.update_entry(section, index, patch);
        self.commit(changed)
    }

    pub fn update_entry_by_id(&mut self, id: EntryId, patch: &EntryPatch) -> bool {
        let changed = self.document.update_entry_by_id(id, patch);
        self.commit(changed)
    }

    pub fn remove_entry(&mut self, section: Section, index: usize) -> bool {
        let changed = self.document.remove_entry(section, index);
        self.commit(changed)
    }

    pub fn remove_entry_by_id(&mut self, section: Section, id: EntryId) -> bool {
        let changed = self.document.remove_entry_by_id(section, id);
        self.commit(changed)
    }

    pub fn set_skills<I, S>(&mut self, skills: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let changed = self.document.set_skills(skills);
        self.commit(changed)
    }

    pub fn set_skills_from_text(&mut self, text: &str) -> bool {
        let changed = self.document.set_skills_from_text(text);
        self.commit(changed)
    }

    pub fn add_skill(&mut self, skill: &str) -> bool {
        let changed = self.document.add_skill(skill);
        self.commit(changed)
    }

    pub fn remove_skill(&mut self, skill: &str) -> bool {
        let changed = self.document.remove_skill(skill);
        self.commit(changed)
    }

    /// Applies several edits as one history entry, e.g. a field edited
    /// keystroke by keystroke and committed on blur.
    pub fn batch<R>(&mut self, edit: impl FnOnce(&mut DraftDocument) -> R) -> R {
        let out = edit(&mut self.document);
        // Recording dedupes against the tip, so an edit that netted out is dropped.
        let changed = self.history.current() != Some(self.document.draft());
        self.commit(changed);
        out
    }

    fn commit(&mut self, changed: bool) -> bool {
        if !changed {
            return false;
        }
        self.history.record(self.document.draft());
        self.publish();
        true
    }

    fn publish(&mut self) {
        self.revision += 1;
        self.drafts.send_replace(DraftRevision {
            revision: self.revision,
            draft: Arc::new(self.document.draft().clone()),
            job_title: Arc::from(self.job_title.as_str()),
        });
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.document.replace(snapshot);
                self.publish();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.document.replace(snapshot);
                self.publish();
                true
            }
            None => false,
        }
    }

    // ── Session settings ─────────────────────────────────────────────────

    /// The job title feeds remote scoring and autosave; it is not undoable.
    pub fn set_job_title(&mut self, job_title: impl Into<String>) {
        let job_title = job_title.into();
        if job_title != self.job_title {
            self.job_title = job_title;
            self.publish();
        }
    }

    pub fn select_template(&mut self, template_id: impl Into<String>) {
        self.template_id = template_id.into();
    }

    pub fn set_autosave(&self, enabled: bool) {
        self.autosave.set_enabled(enabled);
    }

    pub fn autosave_enabled(&self) -> bool {
        self.autosave.is_enabled()
    }

    // ── Remote actions ───────────────────────────────────────────────────

    pub async fn save_version(
        &mut self,
        version_name: &str,
        job_title: &str,
    ) -> EditorResult<SavedVersion> {
        let result = self
            .store
            .save(self.document.draft(), version_name, job_title)
            .await;
        match &result {
            Ok(_) => {
                self.notify(Notice::success("Resume version saved successfully!"));
                self.set_job_title(job_title.trim());
            }
            Err(e) => self.report("Error saving resume version", e),
        }
        result
    }

    /// Replaces the draft with a persisted version and resets history to
    /// that single state; the pre-load draft cannot be restored by undo.
    pub async fn load_version(&mut self, id: &str) -> EditorResult<()> {
        let version = match self.store.fetch(id).await {
            Ok(version) => version,
            Err(e) => {
                self.report("Error loading resume version", &e);
                return Err(e);
            }
        };

        self.document.replace(version.resume_data);
        self.history.reset(self.document.draft());
        self.job_title = version.job_title;
        self.publish();
        info!("Loaded resume version {} ('{}')", version.id, version.name);
        self.notify(Notice::success("Resume version loaded successfully!"));
        Ok(())
    }

    pub async fn delete_version(&self, id: &str) -> EditorResult<()> {
        let result = self.store.delete(id).await;
        match &result {
            Ok(()) => self.notify(Notice::success("Resume version deleted successfully!")),
            Err(e) => self.report("Error deleting resume version", e),
        }
        result
    }

    pub async fn export_pdf(&self) -> EditorResult<PdfExport> {
        let result = self
            .store
            .render_pdf(self.document.draft(), &self.template_id)
            .await;
        match result {
            Ok(bytes) => {
                self.notify(Notice::success("PDF generated and downloaded successfully!"));
                Ok(PdfExport {
                    file_name: format!("resume_{}.pdf", today()),
                    bytes,
                })
            }
            Err(e) => {
                self.report("Error generating PDF", &e);
                Err(e)
            }
        }
    }

    pub async fn save_and_export_pdf(
        &mut self,
        version_name: &str,
        job_title: &str,
    ) -> EditorResult<PdfExport> {
        let result = self
            .store
            .save_and_render_pdf(
                self.document.draft(),
                version_name,
                job_title,
                &self.template_id,
            )
            .await;
        match result {
            Ok(bytes) => {
                self.notify(Notice::success("Resume saved and PDF generated successfully!"));
                self.set_job_title(job_title.trim());
                Ok(PdfExport {
                    file_name: pdf_file_name(version_name),
                    bytes,
                })
            }
            Err(e) => {
                self.report("Error saving and generating PDF", &e);
                Err(e)
            }
        }
    }

    pub async fn refresh_versions(&self) -> EditorResult<Vec<VersionSummary>> {
        self.store.refresh_versions().await
    }

    fn notify(&self, notice: Notice) {
        notify(&self.notices, notice);
    }

    /// Validation failures carry their own user-facing text; anything else
    /// is reported under the name of the failed action.
    fn report(&self, action: &str, e: &EditorError) {
        match e {
            EditorError::Validation(message) => self.notify(Notice::error(message.clone())),
            other => {
                error!("{action}: {other}");
                self.notify(Notice::error(action));
            }
        }
    }
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// "Backend v2" -> "Backend_v2_2024-05-01.pdf"
fn pdf_file_name(version_name: &str) -> String {
    let stem = version_name.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{stem}_{}.pdf", today())
}
