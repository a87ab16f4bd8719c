// Real-Time Editor core: draft model, history, feedback, autosave and the
// session that wires them together. The session is the single writer of the
// draft; background tasks observe it through `DraftRevision` snapshots.

pub mod autosave;
pub mod document;
pub mod feedback;
pub mod history;
pub mod notices;
pub mod session;
pub mod versions;

use std::sync::Arc;

use crate::models::draft::ResumeDraft;

pub use document::DraftDocument;
pub use history::HistoryLog;
pub use session::EditorSession;
pub use versions::VersionStore;

/// An immutable view of the draft as of one committed change.
#[derive(Debug, Clone)]
pub struct DraftRevision {
    /// Monotonic per session; bumped on every published change.
    pub revision: u64,
    pub draft: Arc<ResumeDraft>,
    pub job_title: Arc<str>,
}

impl DraftRevision {
    pub fn initial() -> Self {
        Self {
            revision: 0,
            draft: Arc::new(ResumeDraft::default()),
            job_title: Arc::from(""),
        }
    }
}
