//! Ambient call context for tool invocations.
//!
//! [`CallContext`] is a flat, already-validated metadata struct: every field
//! is optional and populated by extraction helpers that look each field up
//! independently and record absence instead of failing. A missing or
//! malformed field never prevents the others from being extracted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Caller metadata accompanying a tool invocation, not supplied as an
/// explicit business argument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// Identifier of the originating protocol message, if available.
    pub request_id: Option<String>,
    /// Identifier of the calling session, if available.
    pub session_id: Option<String>,
    /// Name of the calling agent/client, if available.
    pub client_name: Option<String>,
    /// Version of the calling agent/client, if available.
    pub client_version: Option<String>,
}

impl CallContext {
    /// A context for a fresh server session with no client identity yet.
    pub fn for_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            ..Default::default()
        }
    }

    /// Attach a per-request identifier.
    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    /// Attach the client identity negotiated at `initialize` time.
    pub fn with_client(
        mut self,
        client_name: Option<String>,
        client_version: Option<String>,
    ) -> Self {
        self.client_name = client_name;
        self.client_version = client_version;
        self
    }
}

/// Extract `clientInfo.name` and `clientInfo.version` from MCP `initialize`
/// params. Each field is looked up independently; anything missing or of the
/// wrong shape yields `None` for that field only.
pub fn extract_client_info(params: Option<&Value>) -> (Option<String>, Option<String>) {
    let info = params.and_then(|p| p.get("clientInfo"));
    let name = info
        .and_then(|i| i.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let version = info
        .and_then(|i| i.get("version"))
        .and_then(Value::as_str)
        .map(str::to_string);
    (name, version)
}

/// Render a JSON-RPC request id as a correlation string.
///
/// String and numeric ids are supported; anything else (including null)
/// yields `None`.
pub fn request_id_string(id: &Value) -> Option<String> {
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
