//! Composable filter for audit log queries.
//!
//! Builds a parameterized SQL WHERE clause dynamically from optional filter
//! criteria. All filters are AND-combined. Each `Some` field adds a
//! condition; `None` fields are ignored. Zero filters means an unconditional
//! scan.

use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;

/// A composable filter for querying the audit log.
///
/// Use `Default::default()` for an empty filter (matches everything), then
/// set individual fields to narrow results.
#[derive(Debug, Default, Clone)]
pub struct AuditFilter {
    /// Only records for this tool.
    pub tool_name: Option<String>,
    /// Only records belonging to this session.
    pub session_id: Option<String>,
    /// Only records from this client.
    pub client_name: Option<String>,
    /// Only records at or after this timestamp (inclusive).
    pub since: Option<DateTime<Utc>>,
    /// Only records at or before this timestamp (inclusive).
    pub until: Option<DateTime<Utc>>,
    /// Only failed invocations.
    pub errors_only: bool,
}

/// A built SQL fragment with its positional parameters.
pub(crate) struct SqlFragment {
    /// The WHERE clause (without the "WHERE" keyword), or empty if no filters.
    pub where_clause: String,
    /// The positional parameter values, in order.
    pub params: Vec<SqlValue>,
}

impl AuditFilter {
    /// Build a SQL WHERE clause and parameter list from this filter.
    ///
    /// Parameters use positional `?N` placeholders starting from 1; callers
    /// appending further parameters (e.g. LIMIT) continue from
    /// `params.len() + 1`.
    pub(crate) fn to_sql(&self) -> SqlFragment {
        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<SqlValue> = Vec::new();

        if let Some(ref tool_name) = self.tool_name {
            conditions.push(format!("tool_name = ?{}", params.len() + 1));
            params.push(SqlValue::Text(tool_name.clone()));
        }

        if let Some(ref session_id) = self.session_id {
            conditions.push(format!("session_id = ?{}", params.len() + 1));
            params.push(SqlValue::Text(session_id.clone()));
        }

        if let Some(ref client_name) = self.client_name {
            conditions.push(format!("client_name = ?{}", params.len() + 1));
            params.push(SqlValue::Text(client_name.clone()));
        }

        if let Some(ref since) = self.since {
            conditions.push(format!("timestamp >= ?{}", params.len() + 1));
            params.push(SqlValue::Text(since.to_rfc3339()));
        }

        if let Some(ref until) = self.until {
            conditions.push(format!("timestamp <= ?{}", params.len() + 1));
            params.push(SqlValue::Text(until.to_rfc3339()));
        }

        if self.errors_only {
            conditions.push("success = 0".to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            conditions.join(" AND ")
        };

        SqlFragment {
            where_clause,
            params,
        }
    }
}
