//! Shared helpers for integration tests.
//!
//! Each integration test file compiles common/ as its own module, so not
//! every helper is used in every file.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tempfile::NamedTempFile;

use skillbridge_audit::{AuditLogger, NewInvocation, QueryApi};
use skillbridge_tools::{ExecutorConfig, ToolDefinition, ToolExecutor, ToolRegistry};
use skillbridge_types::CallContext;

/// Create a temporary file for use as a test database.
pub fn temp_db() -> NamedTempFile {
    NamedTempFile::new().expect("should create temp file for audit database")
}

/// An audit logger over a fresh temp database.
pub fn test_logger(tmp: &NamedTempFile) -> AuditLogger {
    AuditLogger::new(tmp.path())
}

/// A call context with every field populated.
pub fn full_context() -> CallContext {
    CallContext {
        request_id: Some("req-1".to_string()),
        session_id: Some("sess-1".to_string()),
        client_name: Some("claude".to_string()),
        client_version: Some("1.0".to_string()),
    }
}

/// A tool that returns a fixed body, or fails with a fixed message.
pub struct ScriptedTool {
    pub tool_name: String,
    pub outcome: Result<String, String>,
}

impl ScriptedTool {
    pub fn succeeding(name: &str, body: &str) -> Self {
        Self {
            tool_name: name.to_string(),
            outcome: Ok(body.to_string()),
        }
    }

    pub fn failing(name: &str, message: &str) -> Self {
        Self {
            tool_name: name.to_string(),
            outcome: Err(message.to_string()),
        }
    }
}

#[async_trait]
impl ToolDefinition for ScriptedTool {
    fn name(&self) -> &str {
        &self.tool_name
    }

    fn description(&self) -> &str {
        "scripted test tool"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _input: Value) -> anyhow::Result<String> {
        match &self.outcome {
            Ok(body) => Ok(body.clone()),
            Err(message) => Err(anyhow::anyhow!("{message}")),
        }
    }
}

/// Build an executor over the given tools, auditing into `logger`.
pub fn executor_with_tools(logger: &AuditLogger, tools: Vec<ScriptedTool>) -> ToolExecutor {
    let registry = ToolRegistry::new();
    for tool in tools {
        registry
            .register(Box::new(tool))
            .expect("should register scripted tool");
    }
    ToolExecutor::new(registry, ExecutorConfig::default(), Arc::new(logger.clone()))
}

/// Seed the log directly with a success/failure mix.
pub async fn seed_records(logger: &AuditLogger) {
    logger
        .record(NewInvocation::success("A", None, 12.0))
        .await;
    logger
        .record(NewInvocation::failure("B", None, "boom", 40.0))
        .await;
    logger.record(NewInvocation::success("A", None, 8.0)).await;
}

/// A query API over the same logger.
pub fn query_api(logger: &AuditLogger) -> QueryApi {
    QueryApi::new(logger.clone())
}
