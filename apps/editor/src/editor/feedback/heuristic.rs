use async_trait::async_trait;

use crate::editor::feedback::{FeedbackEvaluator, FeedbackResult};
use crate::errors::EditorResult;
use crate::models::draft::ResumeDraft;

pub const SUGGEST_SUMMARY: &str = "Add a professional summary";
pub const SUGGEST_SKILLS: &str = "Add more skills (minimum 5 recommended)";
pub const WARN_NO_EXPERIENCE: &str = "Add work experience";

pub const TIP_NEEDS_WORK: &str =
    "Your resume needs significant improvement. Start with contact details, a summary and work experience.";
pub const TIP_GOOD_PROGRESS: &str =
    "Good progress! Fill in the remaining sections to strengthen your resume.";
pub const TIP_EXCELLENT: &str = "Excellent! Your resume covers all the essentials.";

const SUMMARY_MIN_CHARS: usize = 50;
const DESCRIPTION_MIN_CHARS: usize = 50;
const MIN_SKILLS: usize = 5;

/// Scores a draft from field presence and length. Maximum reachable is 85.
///
/// | criterion                      | points |
/// |--------------------------------|--------|
/// | name                           | 10     |
/// | email                          | 10     |
/// | phone                          | 5      |
/// | summary longer than 50 chars   | 15     |
/// | at least one experience entry  | 20     |
/// | at least one education entry   | 10     |
/// | at least 5 skills              | 15     |
pub fn evaluate_draft(draft: &ResumeDraft) -> FeedbackResult {
    let mut score: u32 = 0;
    let mut suggestions = Vec::new();
    let mut warnings = Vec::new();

    if !draft.name.is_empty() {
        score += 10;
    }
    if !draft.email.is_empty() {
        score += 10;
    }
    if !draft.phone.is_empty() {
        score += 5;
    }

    if draft.summary.chars().count() > SUMMARY_MIN_CHARS {
        score += 15;
    } else {
        suggestions.push(SUGGEST_SUMMARY.to_string());
    }

    if draft.experience.is_empty() {
        warnings.push(WARN_NO_EXPERIENCE.to_string());
    } else {
        score += 20;
    }
    for (i, entry) in draft.experience.iter().enumerate() {
        if entry.description.chars().count() < DESCRIPTION_MIN_CHARS {
            warnings.push(format!(
                "Experience #{}: description is shorter than {} characters",
                i + 1,
                DESCRIPTION_MIN_CHARS
            ));
        }
    }

    if !draft.education.is_empty() {
        score += 10;
    }

    if draft.skills.len() >= MIN_SKILLS {
        score += 15;
    } else {
        suggestions.push(SUGGEST_SKILLS.to_string());
    }

    let ats_score = score.min(100) as u8;

    FeedbackResult {
        ats_score,
        suggestions,
        warnings,
        tips: vec![tip_for_score(ats_score).to_string()],
    }
}

pub fn tip_for_score(score: u8) -> &'static str {
    match score {
        s if s >= 75 => TIP_EXCELLENT,
        s if s >= 50 => TIP_GOOD_PROGRESS,
        _ => TIP_NEEDS_WORK,
    }
}

/// Pure-Rust evaluator. Fast, deterministic, no network.
pub struct LocalHeuristicEvaluator;

#[async_trait]
impl FeedbackEvaluator for LocalHeuristicEvaluator {
    async fn evaluate(
        &self,
        draft: &ResumeDraft,
        _job_title: &str,
    ) -> EditorResult<Option<FeedbackResult>> {
        Ok(Some(evaluate_draft(draft)))
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}
