/// Query interface for audit records.
use chrono::DateTime;
use rusqlite::types::Value as SqlValue;

use skillbridge_types::BridgeError;

use crate::filter::AuditFilter;
use crate::record::InvocationRecord;
use crate::store::AuditStore;

/// Column list for record queries (must match `row_to_record` field order).
const RECORD_COLUMNS: &str = "id, timestamp, request_id, session_id, client_name, \
                              client_version, tool_name, parameters, success, error_msg, duration_ms";

impl AuditStore {
    /// Return the `limit` most recent records, ordered by `id` descending.
    pub fn recent(&self, limit: usize) -> Result<Vec<InvocationRecord>, BridgeError> {
        let mut stmt = self
            .connection()
            .prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM tool_calls ORDER BY id DESC LIMIT ?1"
            ))
            .map_err(|e| BridgeError::StorageRead(format!("recent prepare failed: {e}")))?;

        let rows = stmt
            .query_map(rusqlite::params![limit as i64], row_to_record)
            .map_err(|e| BridgeError::StorageRead(format!("recent query failed: {e}")))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| BridgeError::StorageRead(format!("recent read failed: {e}")))
    }

    /// Return records matching the filter, ordered by `id` descending,
    /// capped at `limit`. An empty filter is an unconditional scan.
    pub fn query(
        &self,
        filter: &AuditFilter,
        limit: usize,
    ) -> Result<Vec<InvocationRecord>, BridgeError> {
        let fragment = filter.to_sql();
        let where_clause = if fragment.where_clause.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", fragment.where_clause)
        };
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM tool_calls{where_clause} ORDER BY id DESC LIMIT ?{}",
            fragment.params.len() + 1
        );

        let mut params = fragment.params;
        params.push(SqlValue::Integer(limit as i64));

        let mut stmt = self
            .connection()
            .prepare(&sql)
            .map_err(|e| BridgeError::StorageRead(format!("query prepare failed: {e}")))?;

        let rows = stmt
            .query_map(rusqlite::params_from_iter(params), row_to_record)
            .map_err(|e| BridgeError::StorageRead(format!("query failed: {e}")))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| BridgeError::StorageRead(format!("query read failed: {e}")))
    }

    /// Total number of records in the log.
    pub fn count(&self) -> Result<usize, BridgeError> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM tool_calls", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|c| c as usize)
            .map_err(|e| BridgeError::StorageRead(format!("count failed: {e}")))
    }
}

/// Map a SQLite row to an InvocationRecord.
fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<InvocationRecord> {
    let timestamp: String = row.get(1)?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?
        .into();

    Ok(InvocationRecord {
        id: row.get(0)?,
        timestamp,
        request_id: row.get(2)?,
        session_id: row.get(3)?,
        client_name: row.get(4)?,
        client_version: row.get(5)?,
        tool_name: row.get(6)?,
        parameters: row.get(7)?,
        success: row.get::<_, i64>(8)? != 0,
        error_msg: row.get(9)?,
        duration_ms: row.get(10)?,
    })
}
