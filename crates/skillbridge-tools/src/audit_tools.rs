//! Audit read tools: the query/aggregation surface exposed over the tool
//! protocol, mirroring the HTTP endpoints.
//!
//! These are ordinary tools, so calls to them are themselves audited.

use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Value};

use skillbridge_audit::{QueryApi, QueryParams};

use crate::definition::ToolDefinition;
use crate::registry::ToolRegistry;

/// Register `audit_recent`, `audit_query`, and `audit_summary`.
pub fn register_audit_tools(registry: &ToolRegistry, query: QueryApi) -> Result<()> {
    registry.register(Box::new(AuditRecentTool {
        query: query.clone(),
    }))?;
    registry.register(Box::new(AuditQueryTool {
        query: query.clone(),
    }))?;
    registry.register(Box::new(AuditSummaryTool { query }))?;
    Ok(())
}

struct AuditRecentTool {
    query: QueryApi,
}

#[async_trait::async_trait]
impl ToolDefinition for AuditRecentTool {
    fn name(&self) -> &str {
        "audit_recent"
    }

    fn description(&self) -> &str {
        "Get the most recent tool invocations from the audit log, newest first."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "limit": {"type": "number", "description": "Max records to return (1-500, default 50)"}
            }
        })
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let limit = opt_usize(&input, "limit");
        let records = self.query.recent(limit).await?;
        Ok(serde_json::to_string(&records)?)
    }
}

struct AuditQueryTool {
    query: QueryApi,
}

#[async_trait::async_trait]
impl ToolDefinition for AuditQueryTool {
    fn name(&self) -> &str {
        "audit_query"
    }

    fn description(&self) -> &str {
        "Search the audit log with optional filters (tool name, session, client, time range, \
         errors only). Filters combine with AND."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "tool_name": {"type": "string", "description": "Exact tool name"},
                "session_id": {"type": "string", "description": "Exact session ID"},
                "client_name": {"type": "string", "description": "Exact client name"},
                "since": {"type": "string", "description": "Inclusive lower bound: RFC 3339 or YYYY-MM-DD"},
                "until": {"type": "string", "description": "Inclusive upper bound: RFC 3339 or YYYY-MM-DD"},
                "errors_only": {"type": "boolean", "description": "Only failed invocations"},
                "limit": {"type": "number", "description": "Max records to return (1-500, default 100)"}
            }
        })
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let params = QueryParams {
            tool_name: opt_str(&input, "tool_name"),
            session_id: opt_str(&input, "session_id"),
            client_name: opt_str(&input, "client_name"),
            since: opt_str(&input, "since"),
            until: opt_str(&input, "until"),
            errors_only: input.get("errors_only").and_then(Value::as_bool),
            limit: opt_usize(&input, "limit"),
        };
        let records = self.query.query(params).await?;
        Ok(serde_json::to_string(&records)?)
    }
}

struct AuditSummaryTool {
    query: QueryApi,
}

#[async_trait::async_trait]
impl ToolDefinition for AuditSummaryTool {
    fn name(&self) -> &str {
        "audit_summary"
    }

    fn description(&self) -> &str {
        "Summary statistics over the audit log: overall counts, error rate, durations, and a \
         per-tool breakdown."
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _input: Value) -> Result<String> {
        let summary = self.query.summary().await?;
        Ok(serde_json::to_string(&summary)?)
    }
}

fn opt_str(input: &Value, key: &str) -> Option<String> {
    input.get(key).and_then(Value::as_str).map(str::to_string)
}

fn opt_usize(input: &Value, key: &str) -> Option<usize> {
    input.get(key).and_then(Value::as_f64).map(|n| n as usize)
}
