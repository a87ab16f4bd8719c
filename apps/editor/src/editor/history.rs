//! Edit History Tracker: a linear undo/redo log over whole-draft snapshots.
//!
//! Recording after an undo truncates the redo tail; there is no branching.

use crate::models::draft::ResumeDraft;

#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    log: Vec<ResumeDraft>,
    /// `None` only while the log is empty; otherwise a valid index.
    cursor: Option<usize>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a snapshot at the cursor, discarding any redo tail. A snapshot
    /// identical to the current one is ignored. Returns whether it was stored.
    pub fn record(&mut self, draft: &ResumeDraft) -> bool {
        if self.current() == Some(draft) {
            return false;
        }
        if let Some(cursor) = self.cursor {
            self.log.truncate(cursor + 1);
        }
        self.log.push(draft.clone());
        self.cursor = Some(self.log.len() - 1);
        true
    }

    pub fn undo(&mut self) -> Option<ResumeDraft> {
        match self.cursor {
            Some(cursor) if cursor > 0 => {
                self.cursor = Some(cursor - 1);
                Some(self.log[cursor - 1].clone())
            }
            _ => None,
        }
    }

    pub fn redo(&mut self) -> Option<ResumeDraft> {
        match self.cursor {
            Some(cursor) if cursor + 1 < self.log.len() => {
                self.cursor = Some(cursor + 1);
                Some(self.log[cursor + 1].clone())
            }
            _ => None,
        }
    }

    /// Clears the log and seeds it with `draft` as the only snapshot.
    pub fn reset(&mut self, draft: &ResumeDraft) {
        self.log.clear();
        self.log.push(draft.clone());
        self.cursor = Some(0);
    }

    pub fn current(&self) -> Option<&ResumeDraft> {
        self.cursor.map(|c| &self.log[c])
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.log.len())
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}
