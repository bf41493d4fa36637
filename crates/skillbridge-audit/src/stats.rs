//! Aggregate statistics over the audit log.
//!
//! Computes the overall summary (counts, error rate, duration aggregates,
//! time range) and a per-tool breakdown ordered by call volume.

use rusqlite::Row;
use serde::{Deserialize, Serialize};

use skillbridge_types::BridgeError;

use crate::store::AuditStore;

/// Overall statistics across every record in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub total_calls: i64,
    pub unique_tools: i64,
    pub unique_clients: i64,
    pub unique_sessions: i64,
    /// Percentage of failed calls, rounded to one decimal. 0.0 when the log
    /// is empty (never NaN or an error).
    pub error_rate_pct: f64,
    /// Rounded to one decimal; absent when the log is empty.
    pub avg_duration_ms: Option<f64>,
    /// Rounded to one decimal; absent when the log is empty.
    pub max_duration_ms: Option<f64>,
    pub first_call: Option<String>,
    pub last_call: Option<String>,
}

/// Per-tool aggregates; groups are non-empty by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolStats {
    pub tool_name: String,
    pub calls: i64,
    pub error_rate_pct: f64,
    pub avg_duration_ms: f64,
    pub max_duration_ms: f64,
}

/// The full summary: overall aggregates plus the per-tool breakdown,
/// ordered by call count descending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub overall: OverallStats,
    pub per_tool: Vec<ToolStats>,
}

impl AuditStore {
    /// Compute summary statistics for the whole log.
    pub fn summary(&self) -> Result<AuditSummary, BridgeError> {
        let overall = self
            .connection()
            .query_row(
                "SELECT
                     COUNT(*)                                   AS total_calls,
                     COUNT(DISTINCT tool_name)                  AS unique_tools,
                     COUNT(DISTINCT client_name)                AS unique_clients,
                     COUNT(DISTINCT session_id)                 AS unique_sessions,
                     COALESCE(ROUND(100.0 * SUM(CASE WHEN success = 0 THEN 1 ELSE 0 END)
                                    / MAX(COUNT(*), 1), 1), 0.0) AS error_rate_pct,
                     ROUND(AVG(duration_ms), 1)                 AS avg_duration_ms,
                     ROUND(MAX(duration_ms), 1)                 AS max_duration_ms,
                     MIN(timestamp)                             AS first_call,
                     MAX(timestamp)                             AS last_call
                 FROM tool_calls",
                [],
                row_to_overall,
            )
            .map_err(|e| BridgeError::StorageRead(format!("summary query failed: {e}")))?;

        let mut stmt = self
            .connection()
            .prepare(
                "SELECT
                     tool_name,
                     COUNT(*)                                   AS calls,
                     ROUND(100.0 * SUM(CASE WHEN success = 0 THEN 1 ELSE 0 END)
                           / MAX(COUNT(*), 1), 1)               AS error_rate_pct,
                     ROUND(AVG(duration_ms), 1)                 AS avg_duration_ms,
                     ROUND(MAX(duration_ms), 1)                 AS max_duration_ms
                 FROM tool_calls
                 GROUP BY tool_name
                 ORDER BY calls DESC",
            )
            .map_err(|e| BridgeError::StorageRead(format!("per-tool prepare failed: {e}")))?;

        let per_tool = stmt
            .query_map([], row_to_tool_stats)
            .map_err(|e| BridgeError::StorageRead(format!("per-tool query failed: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| BridgeError::StorageRead(format!("per-tool read failed: {e}")))?;

        Ok(AuditSummary { overall, per_tool })
    }
}

fn row_to_overall(row: &Row<'_>) -> rusqlite::Result<OverallStats> {
    Ok(OverallStats {
        total_calls: row.get(0)?,
        unique_tools: row.get(1)?,
        unique_clients: row.get(2)?,
        unique_sessions: row.get(3)?,
        error_rate_pct: row.get(4)?,
        avg_duration_ms: row.get(5)?,
        max_duration_ms: row.get(6)?,
        first_call: row.get(7)?,
        last_call: row.get(8)?,
    })
}

fn row_to_tool_stats(row: &Row<'_>) -> rusqlite::Result<ToolStats> {
    Ok(ToolStats {
        tool_name: row.get(0)?,
        calls: row.get(1)?,
        error_rate_pct: row.get(2)?,
        avg_duration_ms: row.get(3)?,
        max_duration_ms: row.get(4)?,
    })
}
