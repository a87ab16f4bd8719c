//! Draft Document Model: the single source of truth for the resume being edited.
//!
//! Every mutator returns `true` only when the draft actually changed, so the
//! session can skip history records and notifications for no-op edits.
//! Positional operations guard their index: an out-of-range index (a caller
//! racing a removal) is a no-op, never a panic.

use crate::models::draft::{
    EducationEntry, EntryId, EntryPatch, ExperienceEntry, Field, ProjectEntry, ResumeDraft,
    Section,
};

#[derive(Debug, Clone)]
pub struct DraftDocument {
    draft: ResumeDraft,
    next_id: u64,
}

impl Default for DraftDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl DraftDocument {
    pub fn new() -> Self {
        Self {
            draft: ResumeDraft::default(),
            next_id: 1,
        }
    }

    pub fn draft(&self) -> &ResumeDraft {
        &self.draft
    }

    fn allocate_id(&mut self) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> bool {
        let value = value.into();
        let slot = self.draft.field_mut(field);
        if *slot == value {
            return false;
        }
        *slot = value;
        true
    }

    /// Appends an empty entry to `section` and returns its id.
    pub fn add_entry(&mut self, section: Section) -> EntryId {
        let id = self.allocate_id();
        match section {
            Section::Experience => self.draft.experience.push(ExperienceEntry {
                id,
                ..Default::default()
            }),
            Section::Education => self.draft.education.push(EducationEntry {
                id,
                ..Default::default()
            }),
            Section::Projects => self.draft.projects.push(ProjectEntry {
                id,
                ..Default::default()
            }),
        }
        id
    }

    /// Merges `patch` into the entry at `index`. A patch for a different
    /// section or an out-of-range index is a no-op.
    pub fn update_entry(&mut self, section: Section, index: usize, patch: &EntryPatch) -> bool {
        match (section, patch) {
            (Section::Experience, EntryPatch::Experience(p)) => self
                .draft
                .experience
                .get_mut(index)
                .is_some_and(|entry| p.apply(entry)),
            (Section::Education, EntryPatch::Education(p)) => self
                .draft
                .education
                .get_mut(index)
                .is_some_and(|entry| p.apply(entry)),
            (Section::Projects, EntryPatch::Project(p)) => self
                .draft
                .projects
                .get_mut(index)
                .is_some_and(|entry| p.apply(entry)),
            _ => false,
        }
    }

    /// Merges `patch` into the entry with `id`, wherever it currently sits.
    pub fn update_entry_by_id(&mut self, id: EntryId, patch: &EntryPatch) -> bool {
        let section = patch.section();
        match self.index_of(section, id) {
            Some(index) => self.update_entry(section, index, patch),
            None => false,
        }
    }

    /// Removes the entry at `index`, shifting later entries down.
    pub fn remove_entry(&mut self, section: Section, index: usize) -> bool {
        if index >= self.draft.section_len(section) {
            return false;
        }
        match section {
            Section::Experience => {
                self.draft.experience.remove(index);
            }
            Section::Education => {
                self.draft.education.remove(index);
            }
            Section::Projects => {
                self.draft.projects.remove(index);
            }
        }
        true
    }

    pub fn remove_entry_by_id(&mut self, section: Section, id: EntryId) -> bool {
        match self.index_of(section, id) {
            Some(index) => self.remove_entry(section, index),
            None => false,
        }
    }

    /// Current position of the entry with `id`.
    pub fn index_of(&self, section: Section, id: EntryId) -> Option<usize> {
        if id == EntryId::UNASSIGNED {
            return None;
        }
        match section {
            Section::Experience => self.draft.experience.iter().position(|e| e.id == id),
            Section::Education => self.draft.education.iter().position(|e| e.id == id),
            Section::Projects => self.draft.projects.iter().position(|e| e.id == id),
        }
    }

    /// Replaces the skill list with its normalized form.
    pub fn set_skills<I, S>(&mut self, skills: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized = normalize_skills(skills);
        if normalized == self.draft.skills {
            return false;
        }
        self.draft.skills = normalized;
        true
    }

    /// Free-text input: "Rust, SQL , ,Docker".
    pub fn set_skills_from_text(&mut self, text: &str) -> bool {
        self.set_skills(text.split(','))
    }

    /// Tag input: appends one skill.
    pub fn add_skill(&mut self, skill: &str) -> bool {
        let mut skills = self.draft.skills.clone();
        skills.push(skill.to_string());
        self.set_skills(skills)
    }

    /// Tag input: removes one skill (matched after trimming).
    pub fn remove_skill(&mut self, skill: &str) -> bool {
        let skill = skill.trim();
        let remaining: Vec<String> = self
            .draft
            .skills
            .iter()
            .filter(|s| s.as_str() != skill)
            .cloned()
            .collect();
        self.set_skills(remaining)
    }

    /// Wholesale replacement (version load, undo/redo jump). Entries without
    /// an id are adopted and given fresh ones; ids already present (history
    /// snapshots) are kept so callers holding them stay valid.
    pub fn replace(&mut self, mut draft: ResumeDraft) {
        for entry in &mut draft.experience {
            self.adopt(&mut entry.id);
        }
        for entry in &mut draft.education {
            self.adopt(&mut entry.id);
        }
        for entry in &mut draft.projects {
            self.adopt(&mut entry.id);
        }
        draft.skills = normalize_skills(&draft.skills);
        self.draft = draft;
    }

    fn adopt(&mut self, id: &mut EntryId) {
        if *id == EntryId::UNASSIGNED {
            *id = self.allocate_id();
        } else if id.0 >= self.next_id {
            self.next_id = id.0 + 1;
        }
    }
}

/// Trims, drops empties and removes duplicates, keeping first occurrences.
pub fn normalize_skills<I, S>(skills: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for skill in skills {
        let skill = skill.as_ref().trim();
        if skill.is_empty() || out.iter().any(|s| s == skill) {
            continue;
        }
        out.push(skill.to_string());
    }
    out
}
