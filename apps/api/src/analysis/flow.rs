//! The generic structured-generation pipeline behind every analysis flow.
//!
//! Flow: validate input → render template → invoke model (bounded by timeout) →
//!       validated reply → typed result.
//!
//! A flow holds no mutable state, so one instance serves concurrent requests.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::analysis::invoker::{InvocationError, ModelInvoker};
use crate::analysis::template::PromptTemplate;
use crate::schema::{SchemaError, SchemaId, SchemaRegistry};

/// Placeholder that receives the output schema description.
pub const OUTPUT_SCHEMA_PLACEHOLDER: &str = "outputSchema";

#[derive(Debug, Error)]
pub enum FlowError {
    /// Caller-correctable. The model was not contacted.
    #[error("invalid input: {0}")]
    InvalidInput(#[source] SchemaError),

    /// The model call failed or its reply was rejected. Terminal for this request.
    #[error("generation failed: {0}")]
    GenerationFailed(#[source] InvocationError),
}

/// Everything that distinguishes one flow from another.
#[derive(Debug, Clone, Copy)]
pub struct FlowDefinition {
    pub name: &'static str,
    pub input_schema: SchemaId,
    pub output_schema: SchemaId,
    pub template: PromptTemplate,
}

pub struct StructuredFlow<I, O> {
    definition: FlowDefinition,
    registry: Arc<SchemaRegistry>,
    invoker: Arc<ModelInvoker>,
    timeout: Duration,
    _types: PhantomData<fn(&I) -> O>,
}

impl<I, O> StructuredFlow<I, O>
where
    I: Serialize,
    O: DeserializeOwned,
{
    pub fn new(
        definition: FlowDefinition,
        registry: Arc<SchemaRegistry>,
        invoker: Arc<ModelInvoker>,
        timeout: Duration,
    ) -> Self {
        Self {
            definition,
            registry,
            invoker,
            timeout,
            _types: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.definition.name
    }

    /// Runs the flow once. The model's validated reply is returned as-is: no
    /// rounding, sorting, or other post-processing.
    pub async fn run(&self, request: &I) -> Result<O, FlowError> {
        let candidate = serde_json::to_value(request).map_err(|e| {
            warn!("Could not serialize {} request: {e}", self.definition.name);
            FlowError::InvalidInput(SchemaError::Unrepresentable(e.to_string()))
        })?;
        self.run_json(&candidate).await
    }

    /// Runs the flow on an untyped request body. Every shape problem, including
    /// `null` or wrongly typed fields, surfaces as `FlowError::InvalidInput`.
    pub async fn run_json(&self, candidate: &Value) -> Result<O, FlowError> {
        let FlowDefinition {
            name,
            input_schema,
            output_schema,
            template,
        } = self.definition;

        let input = self.registry.validate(candidate, input_schema).map_err(|e| {
            warn!("Rejected {name} request: {e}");
            FlowError::InvalidInput(e)
        })?;

        let schema_text = self
            .registry
            .describe(output_schema)
            .map_err(|_| FlowError::GenerationFailed(InvocationError::UnknownSchema(output_schema)))?;

        let values = placeholder_values(&input, &schema_text);
        for placeholder in template.placeholders() {
            if !values.contains_key(placeholder) {
                warn!("{name} template placeholder {{{placeholder}}} has no value");
            }
        }
        let prompt = template.render(&values);

        info!("Running {name} flow");
        let started = Instant::now();

        let output = match tokio::time::timeout(self.timeout, self.invoker.invoke(&prompt, output_schema)).await {
            Ok(result) => result,
            Err(_) => Err(InvocationError::TimedOut(self.timeout)),
        }
        .and_then(|value| serde_json::from_value::<O>(value).map_err(InvocationError::Decode))
        .map_err(|e| {
            error!("{name} flow failed ({}): {e}", e.kind());
            FlowError::GenerationFailed(e)
        })?;

        info!("{name} flow completed in {}ms", started.elapsed().as_millis());
        Ok(output)
    }
}

/// Top-level string fields of the validated input, plus the output schema text.
fn placeholder_values<'a>(input: &'a Value, schema_text: &'a str) -> HashMap<&'a str, &'a str> {
    let mut values: HashMap<&str, &str> = input
        .as_object()
        .map(|fields| {
            fields
                .iter()
                .filter_map(|(key, value)| value.as_str().map(|text| (key.as_str(), text)))
                .collect()
        })
        .unwrap_or_default();
    values.insert(OUTPUT_SCHEMA_PLACEHOLDER, schema_text);
    values
}
