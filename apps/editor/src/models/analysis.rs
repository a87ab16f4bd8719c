use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response of `POST /analyze-ats`. Only the fields the editor consumes are
/// typed; the score breakdown is kept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtsAnalysis {
    pub ats_score: f64,
    #[serde(default)]
    pub keyword_score: f64,
    #[serde(default)]
    pub format_score: f64,
    #[serde(default)]
    pub readability_score: f64,
    #[serde(default)]
    pub structure_score: f64,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub improvement_tips: Vec<String>,
    #[serde(default)]
    pub score_breakdown: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGapAnalysis {
    #[serde(default)]
    pub resume_skills: Vec<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub existing_skills: Vec<String>,
    #[serde(default)]
    pub skill_match_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletImprovement {
    pub original: String,
    pub improved: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletImprovements {
    #[serde(default)]
    pub improved_bullet_points: Vec<BulletImprovement>,
}

/// Response of `POST /comprehensive-analysis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComprehensiveAnalysis {
    #[serde(default)]
    pub resume_text: String,
    pub ats_analysis: AtsAnalysis,
    pub skill_gap_analysis: SkillGapAnalysis,
    #[serde(default)]
    pub bullet_point_improvements: Option<BulletImprovements>,
    #[serde(default)]
    pub recommendations: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedResume {
    pub resume_text: String,
    #[serde(default)]
    pub message: String,
}

/// LinkedIn profile scoring has no fixed schema across backend releases.
pub type LinkedinAnalysis = Value;

/// Project and course recommendations; passed through as-is.
pub type Recommendations = Value;
