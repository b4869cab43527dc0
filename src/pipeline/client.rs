//! The extraction client: schema-contract enforcement around exactly one
//! engine call.
//!
//! The client is deliberately thin — it owns no retry logic (that is
//! [`crate::pipeline::retry`]'s job) and performs exactly one underlying
//! engine call per invocation. Its whole value is the contract: the payload
//! must be a JSON object before the call, and the response must deserialize
//! into the declared output type after it. A missing or nonconforming
//! response is an [`ExtractError::EngineNoOutput`], which is a different
//! failure from the engine being unreachable.

use crate::engine::{InferenceEngine, PromptTemplate};
use crate::error::ExtractError;
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Stateless boundary between the flows and the engine.
#[derive(Clone)]
pub struct ExtractionClient {
    engine: Arc<dyn InferenceEngine>,
}

impl ExtractionClient {
    pub fn new(engine: Arc<dyn InferenceEngine>) -> Self {
        Self { engine }
    }

    /// Invoke the engine once, enforcing the output contract `O`.
    ///
    /// The output schema is derived from `O` and forwarded to the engine so
    /// backends with constrained decoding can honour it; conformance is then
    /// verified here regardless of what the backend promises.
    pub async fn invoke<O>(
        &self,
        template: PromptTemplate,
        payload: &Value,
    ) -> Result<O, ExtractError>
    where
        O: DeserializeOwned + JsonSchema,
    {
        // Shape check before the call: the wire contract is a JSON object.
        if !payload.is_object() {
            return Err(ExtractError::Internal(format!(
                "engine payload for '{}' must be a JSON object",
                template.id()
            )));
        }

        let schema = serde_json::to_value(schema_for!(O))
            .map_err(|e| ExtractError::Internal(format!("schema serialization: {e}")))?;

        debug!("Invoking engine template '{}'", template.id());
        let response = self.engine.generate(template, payload, &schema).await?;

        let value = response.ok_or_else(|| ExtractError::EngineNoOutput {
            detail: format!("template '{}' produced no value", template.id()),
        })?;

        serde_json::from_value(value).map_err(|e| ExtractError::EngineNoOutput {
            detail: format!("response failed output-schema validation: {e}"),
        })
    }
}
