use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Local identity for a repeated-section entry.
///
/// Ids are assigned by `DraftDocument` when an entry is created or a draft is
/// loaded, and are never sent to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) u64);

impl EntryId {
    /// The id carried by entries that have not been adopted by a document yet.
    pub const UNASSIGNED: EntryId = EntryId(0);
}

/// Scalar resume fields addressable by `set_field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Phone,
    Location,
    LinkedinUrl,
    Summary,
}

/// Repeated sections that hold structured entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Experience,
    Education,
    Projects,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Experience => "experience",
            Section::Education => "education",
            Section::Projects => "projects",
        }
    }
}

/// Keys this client does not model. Kept so re-saving a version written by
/// another client does not drop them.
pub type ExtraFields = Map<String, Value>;

/// The editable resume document. Serializes to the JSON shape the backend
/// stores as `resume_data`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeDraft {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(rename = "linkedin", alias = "linkedinUrl", deserialize_with = "lenient_string")]
    pub linkedin_url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub summary: String,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<String>,
    pub projects: Vec<ProjectEntry>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperienceEntry {
    #[serde(skip)]
    pub id: EntryId,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub company: String,
    #[serde(deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub end_date: String,
    /// Free-text date range ("2020 - 2023"); the PDF renderer prints this one.
    #[serde(deserialize_with = "lenient_string")]
    pub dates: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationEntry {
    #[serde(skip)]
    pub id: EntryId,
    #[serde(deserialize_with = "lenient_string")]
    pub degree: String,
    #[serde(deserialize_with = "lenient_string")]
    pub school: String,
    #[serde(deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(deserialize_with = "lenient_string")]
    pub graduation_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub dates: String,
    #[serde(deserialize_with = "lenient_string")]
    pub gpa: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEntry {
    #[serde(skip)]
    pub id: EntryId,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl ResumeDraft {
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Location => &self.location,
            Field::LinkedinUrl => &self.linkedin_url,
            Field::Summary => &self.summary,
        }
    }

    pub(crate) fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
            Field::Location => &mut self.location,
            Field::LinkedinUrl => &mut self.linkedin_url,
            Field::Summary => &mut self.summary,
        }
    }

    pub fn section_len(&self, section: Section) -> usize {
        match section {
            Section::Experience => self.experience.len(),
            Section::Education => self.education.len(),
            Section::Projects => self.projects.len(),
        }
    }

    /// Serializes the draft to the JSON string sent as `resume_data`.
    pub fn to_wire_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Copy for PDF rendering: entries with no `dates` text get one built
    /// from their structured dates. The renderer only reads `dates`.
    pub fn with_display_dates(&self) -> ResumeDraft {
        let mut draft = self.clone();
        for entry in &mut draft.experience {
            if entry.dates.trim().is_empty() {
                entry.dates = date_range(&entry.start_date, &entry.end_date);
            }
        }
        for entry in &mut draft.education {
            if entry.dates.trim().is_empty() {
                entry.dates = entry.graduation_date.trim().to_string();
            }
        }
        draft
    }
}

/// "2020-01" + "" -> "2020-01"; "2020-01" + "Present" -> "2020-01 - Present".
fn date_range(start: &str, end: &str) -> String {
    match (start.trim(), end.trim()) {
        ("", end) => end.to_string(),
        (start, "") => start.to_string(),
        (start, end) => format!("{start} - {end}"),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Partial updates
// ────────────────────────────────────────────────────────────────────────────

/// A partial update for one entry. `None` leaves the sub-field untouched.
#[derive(Debug, Clone)]
pub enum EntryPatch {
    Experience(ExperiencePatch),
    Education(EducationPatch),
    Project(ProjectPatch),
}

impl EntryPatch {
    pub fn section(&self) -> Section {
        match self {
            EntryPatch::Experience(_) => Section::Experience,
            EntryPatch::Education(_) => Section::Education,
            EntryPatch::Project(_) => Section::Projects,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExperiencePatch {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub dates: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EducationPatch {
    pub degree: Option<String>,
    pub school: Option<String>,
    pub location: Option<String>,
    pub graduation_date: Option<String>,
    pub dates: Option<String>,
    pub gpa: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Overwrites `slot` when `value` is set and differs. Returns whether it changed.
fn merge(slot: &mut String, value: &Option<String>) -> bool {
    match value {
        Some(v) if slot != v => {
            slot.clone_from(v);
            true
        }
        _ => false,
    }
}

impl ExperiencePatch {
    pub fn apply(&self, entry: &mut ExperienceEntry) -> bool {
        // Non-short-circuiting `|` so every field is merged.
        merge(&mut entry.title, &self.title)
            | merge(&mut entry.company, &self.company)
            | merge(&mut entry.location, &self.location)
            | merge(&mut entry.start_date, &self.start_date)
            | merge(&mut entry.end_date, &self.end_date)
            | merge(&mut entry.dates, &self.dates)
            | merge(&mut entry.description, &self.description)
    }
}

impl EducationPatch {
    pub fn apply(&self, entry: &mut EducationEntry) -> bool {
        merge(&mut entry.degree, &self.degree)
            | merge(&mut entry.school, &self.school)
            | merge(&mut entry.location, &self.location)
            | merge(&mut entry.graduation_date, &self.graduation_date)
            | merge(&mut entry.dates, &self.dates)
            | merge(&mut entry.gpa, &self.gpa)
    }
}

impl ProjectPatch {
    pub fn apply(&self, entry: &mut ProjectEntry) -> bool {
        merge(&mut entry.name, &self.name) | merge(&mut entry.description, &self.description)
    }
}

/// Accepts strings, numbers, booleans and `null` for text fields. Versions
/// saved by older clients store e.g. `gpa` as a number or leave fields null.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}
