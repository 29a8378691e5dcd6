//! The built-in schemas for every analysis flow, keyed by `SchemaId`.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{FieldKind, FieldSpec, Schema, SchemaError};

/// Closed set of suggestion categories the optimizer may emit.
pub const SUGGESTION_CATEGORIES: &[&str] = &[
    "Weak Summary",
    "Lack of Measurable Achievements",
    "Missing Keywords",
    "Poor Formatting",
    "ATS Optimization",
    "Action Verbs",
    "Conciseness",
    "Overall Structure",
    "Tailoring",
    "Contact Information",
    "Education",
    "Experience",
    "Skills",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaId {
    JobMatchInput,
    JobMatchOutput,
    AtsScoreInput,
    AtsScoreOutput,
    OptimizeInput,
    OptimizeOutput,
}

impl SchemaId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaId::JobMatchInput => "job_match.input",
            SchemaId::JobMatchOutput => "job_match.output",
            SchemaId::AtsScoreInput => "ats_score.input",
            SchemaId::AtsScoreOutput => "ats_score.output",
            SchemaId::OptimizeInput => "optimize.input",
            SchemaId::OptimizeOutput => "optimize.output",
        }
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup table of schemas. Built once at startup and shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<SchemaId, Schema>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SchemaRegistry {
    /// A registry with no schemas. Use `register` to populate it.
    pub fn empty() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    /// The registry holding the input and output schemas of all three flows.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(SchemaId::JobMatchInput, job_match_input());
        registry.register(SchemaId::JobMatchOutput, job_match_output());
        registry.register(SchemaId::AtsScoreInput, resume_only_input());
        registry.register(SchemaId::AtsScoreOutput, ats_score_output());
        registry.register(SchemaId::OptimizeInput, resume_only_input());
        registry.register(SchemaId::OptimizeOutput, optimize_output());
        registry
    }

    pub fn register(&mut self, id: SchemaId, schema: Schema) {
        self.schemas.insert(id, schema);
    }

    pub fn get(&self, id: SchemaId) -> Result<&Schema, SchemaError> {
        self.schemas.get(&id).ok_or(SchemaError::UnknownSchema(id))
    }

    pub fn contains(&self, id: SchemaId) -> bool {
        self.schemas.contains_key(&id)
    }

    pub fn validate(&self, candidate: &Value, id: SchemaId) -> Result<Value, SchemaError> {
        self.get(id)?.validate(candidate)
    }

    /// Renders a schema as reply-format instructions for the model.
    pub fn describe(&self, id: SchemaId) -> Result<String, SchemaError> {
        let schema = self.get(id)?;
        let mut out = String::from(
            "Respond ONLY with a single JSON object containing exactly these fields:\n",
        );
        describe_fields(&schema.fields, 0, &mut out);
        Ok(out)
    }
}

fn describe_fields(fields: &[FieldSpec], depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for field in fields {
        let presence = if field.required { "required" } else { "optional" };
        out.push_str(&format!(
            "{indent}- \"{}\": {} ({presence}). {}\n",
            field.name,
            describe_kind(&field.kind),
            field.description
        ));
        if let Some(nested) = nested_fields(&field.kind) {
            out.push_str(&format!("{indent}  Each object has these fields:\n"));
            describe_fields(nested, depth + 2, out);
        }
    }
}

fn describe_kind(kind: &FieldKind) -> String {
    match kind {
        FieldKind::Text { .. } => "string".to_string(),
        FieldKind::Number {
            min: Some(lo),
            max: Some(hi),
        } => format!("number between {lo} and {hi}"),
        FieldKind::Number { min: Some(lo), .. } => format!("number of at least {lo}"),
        FieldKind::Number { max: Some(hi), .. } => format!("number of at most {hi}"),
        FieldKind::Number { .. } => "number".to_string(),
        FieldKind::Array(item) => format!("array of {}", plural(item)),
        FieldKind::Enum(labels) => {
            let quoted: Vec<String> = labels.iter().map(|l| format!("\"{l}\"")).collect();
            format!("one of {}", quoted.join(", "))
        }
        FieldKind::Object(_) => "object".to_string(),
    }
}

fn plural(kind: &FieldKind) -> String {
    match kind {
        FieldKind::Text { .. } => "strings".to_string(),
        FieldKind::Number { .. } => "numbers".to_string(),
        FieldKind::Object(_) => "objects".to_string(),
        other => format!("({})", describe_kind(other)),
    }
}

fn nested_fields(kind: &FieldKind) -> Option<&[FieldSpec]> {
    match kind {
        FieldKind::Object(fields) => Some(fields),
        FieldKind::Array(item) => nested_fields(item),
        _ => None,
    }
}

fn text() -> FieldKind {
    FieldKind::Text { non_blank: false }
}

fn non_blank_text() -> FieldKind {
    FieldKind::Text { non_blank: true }
}

fn percentage() -> FieldKind {
    FieldKind::Number {
        min: Some(0.0),
        max: Some(100.0),
    }
}

fn string_list() -> FieldKind {
    FieldKind::Array(Box::new(text()))
}

const RESUME_TEXT_DESCRIPTION: &str = "The full text content of the user's resume.";

fn job_match_input() -> Schema {
    Schema::new(vec![
        FieldSpec::required("resumeText", non_blank_text(), RESUME_TEXT_DESCRIPTION),
        FieldSpec::required(
            "jobDescriptionText",
            non_blank_text(),
            "The full text content of the job description.",
        ),
    ])
}

fn resume_only_input() -> Schema {
    Schema::new(vec![FieldSpec::required(
        "resumeText",
        non_blank_text(),
        RESUME_TEXT_DESCRIPTION,
    )])
}

fn job_match_output() -> Schema {
    Schema::new(vec![
        FieldSpec::required(
            "matchScore",
            percentage(),
            "The percentage score indicating how well the resume matches the job description.",
        ),
        FieldSpec::required(
            "matchedSkills",
            string_list(),
            "A list of skills found in both the resume and the job description.",
        ),
        FieldSpec::required(
            "missingSkills",
            string_list(),
            "A list of skills mentioned in the job description but not found in the resume.",
        ),
    ])
}

fn ats_score_output() -> Schema {
    Schema::new(vec![
        // 0-100 is asked for in the description but deliberately not enforced.
        FieldSpec::required(
            "atsScore",
            FieldKind::Number {
                min: None,
                max: None,
            },
            "The overall ATS compatibility score out of 100.",
        ),
        FieldSpec::required(
            "keywordOptimizationFeedback",
            text(),
            "Detailed feedback and suggestions for improving keyword optimization for ATS.",
        ),
        FieldSpec::required(
            "formattingFeedback",
            text(),
            "Detailed feedback and suggestions for improving resume formatting for ATS readability.",
        ),
        FieldSpec::required(
            "achievementsFeedback",
            text(),
            "Detailed feedback and suggestions for presenting and quantifying achievements for ATS.",
        ),
        FieldSpec::required(
            "sectionCompletenessFeedback",
            text(),
            "Detailed feedback and suggestions for ensuring all relevant sections are complete and well-structured for ATS.",
        ),
    ])
}

fn optimize_output() -> Schema {
    let suggestion = vec![
        FieldSpec::required(
            "category",
            FieldKind::Enum(SUGGESTION_CATEGORIES),
            "The category of the suggestion, e.g., Weak Summary, Missing Keywords.",
        ),
        FieldSpec::required(
            "description",
            text(),
            "A specific, actionable suggestion for improvement.",
        ),
        FieldSpec::optional(
            "beforeExample",
            text(),
            "An optional example of how the resume currently reads.",
        ),
        FieldSpec::optional(
            "afterExample",
            text(),
            "An optional example of how the improvement should look.",
        ),
    ];

    Schema::new(vec![
        FieldSpec::required(
            "readinessScore",
            percentage(),
            "An overall percentage score (0-100) representing how \"job-ready\" the resume is based on professional standards.",
        ),
        FieldSpec::required(
            "overallFeedback",
            text(),
            "A general feedback on the resume quality and its potential for improvement.",
        ),
        FieldSpec::required(
            "suggestions",
            FieldKind::Array(Box::new(FieldKind::Object(suggestion))),
            "A list of specific, actionable suggestions to improve the resume.",
        ),
    ])
}
