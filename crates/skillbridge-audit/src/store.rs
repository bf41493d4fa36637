/// AuditStore: SQLite-backed append-only audit log of tool invocations.
use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::info;

use skillbridge_types::BridgeError;

use crate::record::NewInvocation;

/// The on-disk layout is a durable contract: external tools (e.g. the
/// monitoring dashboard) read `tool_calls` directly, so column names and
/// types must be preserved.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tool_calls (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp       TEXT    NOT NULL,
    request_id      TEXT,
    session_id      TEXT,
    client_name     TEXT,
    client_version  TEXT,
    tool_name       TEXT    NOT NULL,
    parameters      TEXT,
    success         INTEGER NOT NULL,
    error_msg       TEXT,
    duration_ms     REAL    NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_timestamp  ON tool_calls (timestamp);
CREATE INDEX IF NOT EXISTS idx_session_id ON tool_calls (session_id);
CREATE INDEX IF NOT EXISTS idx_tool_name  ON tool_calls (tool_name);
CREATE INDEX IF NOT EXISTS idx_client     ON tool_calls (client_name);
";

/// An append-only audit store backed by SQLite.
///
/// The store is synchronous and single-connection; concurrent access is
/// serialized by [`crate::AuditLogger`], which owns the only instance.
pub struct AuditStore {
    conn: Connection,
}

impl AuditStore {
    /// Open (or create) the audit database at the given path.
    ///
    /// Enables WAL mode with `synchronous=NORMAL` (durability without a full
    /// fsync per commit) and applies the schema. Safe to call on an existing,
    /// already-migrated file: all schema statements are `IF NOT EXISTS`.
    pub fn open(path: &Path) -> Result<Self, BridgeError> {
        let conn = Connection::open(path)
            .map_err(|e| BridgeError::StorageInit(format!("failed to open database: {e}")))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| BridgeError::StorageInit(format!("failed to set WAL mode: {e}")))?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(|e| BridgeError::StorageInit(format!("failed to set synchronous: {e}")))?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| BridgeError::StorageInit(format!("failed to create schema: {e}")))?;

        info!(path = %path.display(), "audit store opened");

        Ok(Self { conn })
    }

    /// Insert one record. The `timestamp` is assigned here, at insert time.
    ///
    /// Errors are reported to the caller; the swallow-on-write contract
    /// belongs to [`crate::AuditLogger::record`], not the store.
    pub fn insert(&self, rec: &NewInvocation) -> Result<(), BridgeError> {
        let parameters = match &rec.parameters {
            Some(value) => Some(serde_json::to_string(value).map_err(|e| {
                BridgeError::StorageWrite(format!("failed to serialize parameters: {e}"))
            })?),
            None => None,
        };

        self.conn
            .execute(
                "INSERT INTO tool_calls
                    (timestamp, request_id, session_id, client_name, client_version,
                     tool_name, parameters, success, error_msg, duration_ms)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    Utc::now().to_rfc3339(),
                    rec.request_id,
                    rec.session_id,
                    rec.client_name,
                    rec.client_version,
                    rec.tool_name,
                    parameters,
                    rec.success as i64,
                    rec.error_msg,
                    rec.duration_ms,
                ],
            )
            .map_err(|e| BridgeError::StorageWrite(format!("failed to insert record: {e}")))?;

        Ok(())
    }

    /// Read access to the underlying connection (for query extensions).
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}
