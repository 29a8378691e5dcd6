//! Model invocation: prompt in, schema-checked JSON out.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{strip_json_fences, LlmError, TextGenerator};
use crate::schema::{SchemaError, SchemaId, SchemaRegistry};

#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("prompt must not be empty")]
    EmptyPrompt,

    #[error("unknown output schema `{0}`")]
    UnknownSchema(SchemaId),

    #[error("model call failed: {0}")]
    Model(#[from] LlmError),

    #[error("model reply is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("model did not reply within {0:?}")]
    TimedOut(Duration),

    #[error("model reply failed validation: {0}")]
    ValidationFailed(#[source] SchemaError),

    #[error("validated reply does not fit the result type: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Coarse classification of an invocation failure, used in logs and error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Nothing usable came back: transport failure, empty or unparseable reply, timeout.
    NoOutput,
    /// A reply parsed but did not satisfy the output schema.
    ValidationFailed,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NoOutput => "no-output",
            FailureKind::ValidationFailed => "validation-failed",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl InvocationError {
    pub fn kind(&self) -> FailureKind {
        match self {
            InvocationError::ValidationFailed(_) | InvocationError::Decode(_) => {
                FailureKind::ValidationFailed
            }
            InvocationError::EmptyPrompt
            | InvocationError::UnknownSchema(_)
            | InvocationError::Model(_)
            | InvocationError::Malformed(_)
            | InvocationError::TimedOut(_) => FailureKind::NoOutput,
        }
    }
}

/// Sends a rendered prompt to the model and accepts only replies that satisfy
/// the named output schema. One attempt per call, nothing cached.
pub struct ModelInvoker {
    model: Arc<dyn TextGenerator>,
    registry: Arc<SchemaRegistry>,
}

impl ModelInvoker {
    pub fn new(model: Arc<dyn TextGenerator>, registry: Arc<SchemaRegistry>) -> Self {
        Self { model, registry }
    }

    pub async fn invoke(&self, prompt: &str, output_schema: SchemaId) -> Result<Value, InvocationError> {
        if prompt.trim().is_empty() {
            return Err(InvocationError::EmptyPrompt);
        }
        if !self.registry.contains(output_schema) {
            return Err(InvocationError::UnknownSchema(output_schema));
        }

        let reply = self.model.generate(prompt, JSON_ONLY_SYSTEM).await?;

        let parsed: Value =
            serde_json::from_str(strip_json_fences(&reply)).map_err(InvocationError::Malformed)?;

        self.registry
            .validate(&parsed, output_schema)
            .map_err(InvocationError::ValidationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::testing::ScriptedModel;
    use serde_json::json;

    fn invoker(model: Arc<ScriptedModel>) -> ModelInvoker {
        ModelInvoker::new(model, Arc::new(SchemaRegistry::builtin()))
    }

    #[tokio::test]
    async fn test_invoke_returns_validated_reply() {
        let model = ScriptedModel::replying([
            r#"```json
{"matchScore": 82, "matchedSkills": ["React"], "missingSkills": ["GraphQL"]}
```"#,
        ]);
        let value = invoker(model.clone())
            .invoke("compare these", SchemaId::JobMatchOutput)
            .await
            .unwrap();
        assert_eq!(
            value,
            json!({"matchScore": 82, "matchedSkills": ["React"], "missingSkills": ["GraphQL"]})
        );
        assert_eq!(model.calls(), 1);
        assert_eq!(model.last_system().as_deref(), Some(JSON_ONLY_SYSTEM));
    }

    #[tokio::test]
    async fn test_empty_prompt_never_calls_model() {
        let model = ScriptedModel::replying(["{}"]);
        let err = invoker(model.clone())
            .invoke("  \n", SchemaId::JobMatchOutput)
            .await
            .unwrap_err();
        assert!(matches!(err, InvocationError::EmptyPrompt));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_schema_never_calls_model() {
        let model = ScriptedModel::replying(["{}"]);
        let invoker = ModelInvoker::new(model.clone(), Arc::new(SchemaRegistry::empty()));
        let err = invoker.invoke("prompt", SchemaId::AtsScoreOutput).await.unwrap_err();
        assert!(matches!(err, InvocationError::UnknownSchema(SchemaId::AtsScoreOutput)));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_reply_is_no_output() {
        let model = ScriptedModel::replying(["Sure! Here is your analysis: {matchScore: 82"]);
        let err = invoker(model)
            .invoke("prompt", SchemaId::JobMatchOutput)
            .await
            .unwrap_err();
        assert!(matches!(err, InvocationError::Malformed(_)));
        assert_eq!(err.kind(), FailureKind::NoOutput);
    }

    #[tokio::test]
    async fn test_transport_failure_is_no_output() {
        let model = ScriptedModel::failing(LlmError::EmptyContent);
        let err = invoker(model)
            .invoke("prompt", SchemaId::JobMatchOutput)
            .await
            .unwrap_err();
        assert!(matches!(err, InvocationError::Model(LlmError::EmptyContent)));
        assert_eq!(err.kind().as_str(), "no-output");
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_validation_failed() {
        let model =
            ScriptedModel::replying([r#"{"matchScore": 150, "matchedSkills": [], "missingSkills": []}"#]);
        let err = invoker(model)
            .invoke("prompt", SchemaId::JobMatchOutput)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            InvocationError::ValidationFailed(SchemaError::OutOfRange { .. })
        ));
        assert_eq!(err.kind().as_str(), "validation-failed");
    }

    #[tokio::test]
    async fn test_missing_field_is_validation_failed() {
        let model = ScriptedModel::replying([r#"{"matchScore": 50, "matchedSkills": []}"#]);
        let err = invoker(model)
            .invoke("prompt", SchemaId::JobMatchOutput)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::ValidationFailed);
    }
}
