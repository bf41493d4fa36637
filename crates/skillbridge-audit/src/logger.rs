//! Process-wide async handle over the audit store.
//!
//! [`AuditLogger`] owns the single store connection behind an async mutex:
//! the mutex serializes all writes (the SQLite connection is not shared
//! between tasks), and reads ride the same lock. The database opens lazily
//! on first use if [`AuditLogger::initialize`] was not called at startup.
//!
//! The write path never surfaces an error: [`AuditLogger::record`] catches
//! every failure, logs it, and returns normally. This is a deliberate
//! contract, not an omission -- audit health must never affect the outcome
//! of an audited operation. Read failures, by contrast, always propagate to
//! the (diagnostic) caller.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::error;

use skillbridge_types::BridgeError;

use crate::filter::AuditFilter;
use crate::record::{InvocationRecord, NewInvocation};
use crate::stats::AuditSummary;
use crate::store::AuditStore;

/// Destination for audit records -- the seam between the interceptor and
/// the storage backend. Implementations must be infallible: failures are
/// handled (and swallowed) internally.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Record one invocation attempt, best-effort.
    async fn record(&self, rec: NewInvocation);
}

/// Cloneable async handle over the audit store. All clones share one
/// connection; no other component may open the same database file.
#[derive(Clone)]
pub struct AuditLogger {
    inner: Arc<Mutex<Option<AuditStore>>>,
    path: PathBuf,
}

impl AuditLogger {
    /// Create a handle for the given database path. No I/O happens here;
    /// the store opens on [`initialize`](Self::initialize) or first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
            path: path.into(),
        }
    }

    /// Explicitly open the store. Idempotent: a second call on an already
    /// open logger is a no-op. Initialization failure is fatal to the audit
    /// subsystem and should abort startup.
    pub async fn initialize(&self) -> Result<(), BridgeError> {
        let mut guard = self.inner.lock().await;
        ensure_open(&mut guard, &self.path)?;
        Ok(())
    }

    /// Release the connection. Subsequent operations lazily re-open.
    pub async fn close(&self) {
        let mut guard = self.inner.lock().await;
        *guard = None;
    }

    /// Write one audit record. Never fails from the caller's perspective:
    /// open or insert errors are logged and swallowed.
    pub async fn record(&self, rec: NewInvocation) {
        let mut guard = self.inner.lock().await;
        let result =
            ensure_open(&mut guard, &self.path).and_then(|store| store.insert(&rec));
        if let Err(e) = result {
            error!(tool_name = %rec.tool_name, error = %e, "failed to write audit record");
        }
    }

    /// The `limit` most recent records, newest first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<InvocationRecord>, BridgeError> {
        let mut guard = self.inner.lock().await;
        ensure_open(&mut guard, &self.path)?.recent(limit)
    }

    /// Filtered search, newest first, capped at `limit`.
    pub async fn query(
        &self,
        filter: &AuditFilter,
        limit: usize,
    ) -> Result<Vec<InvocationRecord>, BridgeError> {
        let mut guard = self.inner.lock().await;
        ensure_open(&mut guard, &self.path)?.query(filter, limit)
    }

    /// Summary statistics: overall plus per-tool breakdown.
    pub async fn summary(&self) -> Result<AuditSummary, BridgeError> {
        let mut guard = self.inner.lock().await;
        ensure_open(&mut guard, &self.path)?.summary()
    }

    /// Total record count.
    pub async fn count(&self) -> Result<usize, BridgeError> {
        let mut guard = self.inner.lock().await;
        ensure_open(&mut guard, &self.path)?.count()
    }
}

#[async_trait]
impl AuditSink for AuditLogger {
    async fn record(&self, rec: NewInvocation) {
        AuditLogger::record(self, rec).await;
    }
}

/// Open the store into the slot if it is not open yet, and hand out a
/// reference either way.
fn ensure_open<'a>(
    slot: &'a mut Option<AuditStore>,
    path: &Path,
) -> Result<&'a mut AuditStore, BridgeError> {
    if slot.is_none() {
        *slot = Some(AuditStore::open(path)?);
    }
    slot.as_mut()
        .ok_or_else(|| BridgeError::StorageInit("audit store unavailable".to_string()))
}
