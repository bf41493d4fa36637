//! InvocationRecord: one immutable audit entry per tool invocation attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use skillbridge_types::CallContext;

/// A persisted audit record, as read back from the store.
///
/// Records are immutable once written. `id` is assigned by the store on
/// insert and is the primary ordering key; `timestamp` is assigned at insert
/// time, not at operation start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub request_id: Option<String>,
    pub session_id: Option<String>,
    pub client_name: Option<String>,
    pub client_version: Option<String>,
    pub tool_name: String,
    /// The invocation's input arguments serialized as JSON text, excluding
    /// the ambient call context. Absent when there were no loggable args.
    pub parameters: Option<String>,
    pub success: bool,
    pub error_msg: Option<String>,
    pub duration_ms: f64,
}

/// A record-to-be: everything except the store-assigned `id` and `timestamp`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvocation {
    pub tool_name: String,
    pub parameters: Option<Value>,
    pub success: bool,
    pub error_msg: Option<String>,
    pub duration_ms: f64,
    pub request_id: Option<String>,
    pub session_id: Option<String>,
    pub client_name: Option<String>,
    pub client_version: Option<String>,
}

impl NewInvocation {
    /// A successful invocation.
    pub fn success(
        tool_name: impl Into<String>,
        parameters: Option<Value>,
        duration_ms: f64,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            parameters,
            success: true,
            error_msg: None,
            duration_ms,
            request_id: None,
            session_id: None,
            client_name: None,
            client_version: None,
        }
    }

    /// A failed invocation with the stringified cause.
    pub fn failure(
        tool_name: impl Into<String>,
        parameters: Option<Value>,
        error_msg: impl Into<String>,
        duration_ms: f64,
    ) -> Self {
        Self {
            error_msg: Some(error_msg.into()),
            success: false,
            ..Self::success(tool_name, parameters, duration_ms)
        }
    }

    /// Copy caller metadata out of the ambient call context.
    pub fn with_context(mut self, ctx: &CallContext) -> Self {
        self.request_id = ctx.request_id.clone();
        self.session_id = ctx.session_id.clone();
        self.client_name = ctx.client_name.clone();
        self.client_version = ctx.client_version.clone();
        self
    }
}
