//! Request and result records for the three analysis flows.
//!
//! Field names are camelCase on the wire because the same names are used in the
//! schemas the model is asked to fill.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Requests
// ────────────────────────────────────────────────────────────────────────────

/// Input of the job-match flow. HTTP bodies are checked untyped against the
/// input schema; this is the typed form for in-process callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatchRequest {
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub job_description_text: String,
}

/// Input of the ats-score and optimize flows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRequest {
    #[serde(default)]
    pub resume_text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Results
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatchResult {
    /// 0 – 100
    pub match_score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsScoreResult {
    /// Documented as 0 – 100 but not clamped.
    pub ats_score: f64,
    pub keyword_optimization_feedback: String,
    pub formatting_feedback: String,
    pub achievements_feedback: String,
    pub section_completeness_feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    /// 0 – 100
    pub readiness_score: f64,
    pub overall_feedback: String,
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub category: SuggestionCategory,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_example: Option<String>,
}

/// Kept in sync with `schema::registry::SUGGESTION_CATEGORIES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuggestionCategory {
    #[serde(rename = "Weak Summary")]
    WeakSummary,
    #[serde(rename = "Lack of Measurable Achievements")]
    LackOfMeasurableAchievements,
    #[serde(rename = "Missing Keywords")]
    MissingKeywords,
    #[serde(rename = "Poor Formatting")]
    PoorFormatting,
    #[serde(rename = "ATS Optimization")]
    AtsOptimization,
    #[serde(rename = "Action Verbs")]
    ActionVerbs,
    Conciseness,
    #[serde(rename = "Overall Structure")]
    OverallStructure,
    Tailoring,
    #[serde(rename = "Contact Information")]
    ContactInformation,
    Education,
    Experience,
    Skills,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::registry::SUGGESTION_CATEGORIES;

    #[test]
    fn test_every_schema_category_deserializes() {
        for label in SUGGESTION_CATEGORIES {
            let json = format!("\"{label}\"");
            let parsed: Result<SuggestionCategory, _> = serde_json::from_str(&json);
            assert!(parsed.is_ok(), "label {label} has no enum variant");
        }
    }

    #[test]
    fn test_category_serializes_to_label() {
        let json = serde_json::to_string(&SuggestionCategory::LackOfMeasurableAchievements).unwrap();
        assert_eq!(json, "\"Lack of Measurable Achievements\"");
    }

    #[test]
    fn test_job_match_request_missing_fields_default_to_empty() {
        let request: JobMatchRequest = serde_json::from_str(r#"{"resumeText": "Rust dev"}"#).unwrap();
        assert_eq!(request.resume_text, "Rust dev");
        assert!(request.job_description_text.is_empty());
    }

    #[test]
    fn test_suggestion_omits_absent_examples() {
        let suggestion = Suggestion {
            category: SuggestionCategory::ActionVerbs,
            description: "Lead with verbs.".to_string(),
            before_example: None,
            after_example: Some("Led a team of 4".to_string()),
        };
        let value = serde_json::to_value(&suggestion).unwrap();
        assert!(value.get("beforeExample").is_none());
        assert_eq!(value["afterExample"], "Led a team of 4");
        assert_eq!(value["category"], "Action Verbs");
    }
}
