//! The three analysis flows: job-match, ats-score, optimize.
//!
//! Each is the same `StructuredFlow` pipeline with its own schema pair and template.

use std::sync::Arc;
use std::time::Duration;

use crate::analysis::flow::{FlowDefinition, StructuredFlow};
use crate::analysis::invoker::ModelInvoker;
use crate::analysis::models::{
    AtsScoreResult, JobMatchRequest, JobMatchResult, OptimizationResult, ResumeRequest,
};
use crate::analysis::prompts::{ATS_SCORE_TEMPLATE, JOB_MATCH_TEMPLATE, OPTIMIZE_TEMPLATE};
use crate::llm_client::TextGenerator;
use crate::schema::{SchemaId, SchemaRegistry};

pub const JOB_MATCH: FlowDefinition = FlowDefinition {
    name: "job-match",
    input_schema: SchemaId::JobMatchInput,
    output_schema: SchemaId::JobMatchOutput,
    template: JOB_MATCH_TEMPLATE,
};

pub const ATS_SCORE: FlowDefinition = FlowDefinition {
    name: "ats-score",
    input_schema: SchemaId::AtsScoreInput,
    output_schema: SchemaId::AtsScoreOutput,
    template: ATS_SCORE_TEMPLATE,
};

pub const OPTIMIZE: FlowDefinition = FlowDefinition {
    name: "optimize",
    input_schema: SchemaId::OptimizeInput,
    output_schema: SchemaId::OptimizeOutput,
    template: OPTIMIZE_TEMPLATE,
};

pub type JobMatchFlow = StructuredFlow<JobMatchRequest, JobMatchResult>;
pub type AtsScoreFlow = StructuredFlow<ResumeRequest, AtsScoreResult>;
pub type OptimizeFlow = StructuredFlow<ResumeRequest, OptimizationResult>;

/// All analysis flows, wired to one model and one schema registry.
pub struct AnalysisFlows {
    pub job_match: JobMatchFlow,
    pub ats_score: AtsScoreFlow,
    pub optimize: OptimizeFlow,
}

impl AnalysisFlows {
    pub fn new(model: Arc<dyn TextGenerator>, registry: Arc<SchemaRegistry>, timeout: Duration) -> Self {
        let invoker = Arc::new(ModelInvoker::new(model, registry.clone()));
        Self {
            job_match: StructuredFlow::new(JOB_MATCH, registry.clone(), invoker.clone(), timeout),
            ats_score: StructuredFlow::new(ATS_SCORE, registry.clone(), invoker.clone(), timeout),
            optimize: StructuredFlow::new(OPTIMIZE, registry, invoker, timeout),
        }
    }
}
