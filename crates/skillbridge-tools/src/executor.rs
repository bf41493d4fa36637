//! Tool executor: the interception layer around every tool call.
//!
//! [`ToolExecutor`] wraps any registered tool so that each invocation
//! produces exactly one audit record without altering the tool's observable
//! behavior:
//!
//! 1. **Registry lookup** -- unknown names fail before any operation runs.
//! 2. **Input validation** -- structural checks against the tool's schema.
//! 3. **Timing** -- the clock starts immediately before the tool body and
//!    stops immediately after it returns or fails; metadata capture and the
//!    audit write are not included in the measured duration.
//! 4. **Timeout enforcement** -- an operation cancelled by the deadline is
//!    recorded as a failure with a distinguished error kind.
//! 5. **Audit write** -- one [`NewInvocation`] per outcome, emitted through
//!    the injected [`AuditSink`] after the outcome is known. The sink is
//!    infallible by contract, so audit health can never change what the
//!    caller sees.
//!
//! The logged parameters are the tool's input arguments only; the ambient
//! [`CallContext`] travels separately and is never part of `parameters`.
//! An empty argument object is logged as absent, not as `{}`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

use skillbridge_audit::{AuditSink, NewInvocation};
use skillbridge_types::CallContext;

use crate::registry::ToolRegistry;

/// Configuration for the [`ToolExecutor`] pipeline.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum wall-clock time (in milliseconds) for a single tool call.
    /// Defaults to 30 000 ms.
    pub default_timeout_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 30_000,
        }
    }
}

/// Structured error returned by [`ToolExecutor::execute`].
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// The requested tool is not registered.
    #[error("tool not found: {name}")]
    ToolNotFound { name: String },

    /// The input failed structural validation against the tool's schema.
    #[error("input validation failed: {reason}")]
    ValidationFailed { reason: String },

    /// The tool execution exceeded the configured timeout.
    #[error("tool {tool_name} timed out after {timeout_ms}ms")]
    Timeout { tool_name: String, timeout_ms: u64 },

    /// The tool returned an error during execution. The original error is
    /// preserved as the source and is never masked or replaced.
    #[error("tool {tool_name} execution failed: {source}")]
    ToolError {
        tool_name: String,
        source: anyhow::Error,
    },
}

/// Wraps tool calls in the audit pipeline: validation, timing, timeout,
/// and a best-effort audit write.
pub struct ToolExecutor {
    registry: ToolRegistry,
    config: ExecutorConfig,
    audit: Arc<dyn AuditSink>,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry, config: ExecutorConfig, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            registry,
            config,
            audit,
        }
    }

    /// Execute a tool through the full pipeline.
    ///
    /// The tool's real result or error propagates to the caller unchanged;
    /// the audit record is a side effect the caller never observes.
    pub async fn execute(
        &self,
        tool_name: &str,
        input: Value,
        ctx: &CallContext,
    ) -> Result<String, ExecutionError> {
        // No operation was invoked for an unknown name, so nothing is
        // recorded either.
        let tool = self
            .registry
            .get_tool(tool_name)
            .ok_or_else(|| ExecutionError::ToolNotFound {
                name: tool_name.to_string(),
            })?;

        let parameters = loggable_parameters(&input);

        if let Err(reason) = validate_input_against_schema(&input, &tool.input_schema()) {
            let err = ExecutionError::ValidationFailed { reason };
            self.audit
                .record(
                    NewInvocation::failure(tool_name, parameters, err.to_string(), 0.0)
                        .with_context(ctx),
                )
                .await;
            return Err(err);
        }

        let timeout = Duration::from_millis(self.config.default_timeout_ms);
        let start = Instant::now();

        let result = tokio::time::timeout(timeout, tool.execute(input)).await;
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(Ok(output)) => {
                self.audit
                    .record(
                        NewInvocation::success(tool_name, parameters, duration_ms)
                            .with_context(ctx),
                    )
                    .await;
                Ok(output)
            }
            Ok(Err(tool_err)) => {
                self.audit
                    .record(
                        NewInvocation::failure(
                            tool_name,
                            parameters,
                            tool_err.to_string(),
                            duration_ms,
                        )
                        .with_context(ctx),
                    )
                    .await;
                Err(ExecutionError::ToolError {
                    tool_name: tool_name.to_string(),
                    source: tool_err,
                })
            }
            Err(_elapsed) => {
                // Cancellation by deadline counts as a failure outcome and
                // is recorded like any other failure.
                let err = ExecutionError::Timeout {
                    tool_name: tool_name.to_string(),
                    timeout_ms: self.config.default_timeout_ms,
                };
                self.audit
                    .record(
                        NewInvocation::failure(tool_name, parameters, err.to_string(), duration_ms)
                            .with_context(ctx),
                    )
                    .await;
                Err(err)
            }
        }
    }
}

/// The arguments worth logging: the input itself, unless there is nothing
/// in it. An empty object (or null) logs as absent rather than `{}`.
fn loggable_parameters(input: &Value) -> Option<Value> {
    match input {
        Value::Null => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(other.clone()),
    }
}

/// Basic structural validation of `input` against a JSON Schema object.
///
/// Intentionally lightweight (no `jsonschema` crate): checks the top-level
/// type, required fields, and the top-level type of each present property.
fn validate_input_against_schema(input: &Value, schema: &Value) -> Result<(), String> {
    let schema_obj = match schema.as_object() {
        Some(o) => o,
        None => return Ok(()), // Non-object schemas: skip validation
    };

    if let Some(Value::String(expected_type)) = schema_obj.get("type") {
        let ok = match expected_type.as_str() {
            "object" => input.is_object(),
            "array" => input.is_array(),
            "string" => input.is_string(),
            "number" | "integer" => input.is_number(),
            "boolean" => input.is_boolean(),
            _ => true,
        };
        if !ok {
            return Err(format!("input must be of type {expected_type}"));
        }
    }

    if let (Some(input_obj), Some(Value::Array(required))) =
        (input.as_object(), schema_obj.get("required"))
    {
        for req in required {
            if let Some(field_name) = req.as_str() {
                if !input_obj.contains_key(field_name) {
                    return Err(format!("missing required field: {field_name}"));
                }
            }
        }
    }

    if let (Some(input_obj), Some(Value::Object(properties))) =
        (input.as_object(), schema_obj.get("properties"))
    {
        for (field_name, field_schema) in properties {
            if let Some(field_value) = input_obj.get(field_name) {
                if let Some(Value::String(field_type)) = field_schema.get("type") {
                    let ok = match field_type.as_str() {
                        "string" => field_value.is_string(),
                        "number" | "integer" => field_value.is_number(),
                        "boolean" => field_value.is_boolean(),
                        "object" => field_value.is_object(),
                        "array" => field_value.is_array(),
                        _ => true,
                    };
                    if !ok {
                        return Err(format!("field {field_name} must be of type {field_type}"));
                    }
                }
            }
        }
    }

    Ok(())
}
