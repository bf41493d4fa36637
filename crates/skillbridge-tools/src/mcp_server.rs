//! MCP (Model Context Protocol) stdio server.
//!
//! Exposes registered tools, prompt templates, and resources to agents via
//! JSON-RPC 2.0 over stdin/stdout. Each line on stdin is a request; each
//! response is written as a single line on stdout.
//!
//! Routed methods:
//! - `initialize` -- returns server capabilities and captures the client
//!   identity into the session call context
//! - `notifications/*` -- acknowledged silently (no response)
//! - `tools/list` / `tools/call` -- tool surface; every call goes through
//!   [`ToolExecutor`], which audits it
//! - `prompts/list` / `prompts/get` -- prompt templates
//! - `resources/list` / `resources/read` -- static reference documents

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use uuid::Uuid;

use skillbridge_types::context::{extract_client_info, request_id_string};
use skillbridge_types::CallContext;

use crate::executor::{ExecutionError, ToolExecutor};
use crate::prompts::{list_prompts, render_prompt};
use crate::registry::ToolRegistry;
use crate::resources::ResourceSet;

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 types
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Must be `"2.0"`.
    pub jsonrpc: String,
    /// The method name.
    pub method: String,
    /// Optional parameters.
    #[serde(default)]
    pub params: Option<Value>,
    /// Request ID. Absent for notifications.
    #[serde(default)]
    pub id: Option<Value>,
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// The result on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// The error on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    /// Mirrors the request ID.
    pub id: Value,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// Standard JSON-RPC error codes.
const PARSE_ERROR: i64 = -32700;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32603;

// Application-specific error codes.
const TOOL_NOT_FOUND: i64 = -32000;
const TOOL_EXECUTION_ERROR: i64 = -32002;

fn ok_response(id: Value, result: Value) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        result: Some(result),
        error: None,
        id,
    }
}

fn err_response(id: Value, code: i64, message: impl Into<String>) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(JsonRpcError {
            code,
            message: message.into(),
            data: None,
        }),
        id,
    }
}

// ---------------------------------------------------------------------------
// McpServer
// ---------------------------------------------------------------------------

/// MCP stdio server.
///
/// Holds the session-scoped half of the ambient call context: a session id
/// minted at startup plus the client identity captured from `initialize`.
/// Each `tools/call` gets a per-request context carrying the JSON-RPC id.
pub struct McpServer {
    registry: ToolRegistry,
    executor: ToolExecutor,
    resources: ResourceSet,
    session_id: String,
    client_name: Option<String>,
    client_version: Option<String>,
}

impl McpServer {
    pub fn new(registry: ToolRegistry, executor: ToolExecutor, resources: ResourceSet) -> Self {
        Self {
            registry,
            executor,
            resources,
            session_id: Uuid::new_v4().to_string(),
            client_name: None,
            client_version: None,
        }
    }

    /// Run the server loop, reading from `stdin` and writing to `stdout`.
    ///
    /// Exits cleanly when stdin reaches EOF.
    pub async fn run(
        mut self,
        stdin: impl AsyncBufRead + Unpin,
        mut stdout: impl AsyncWrite + Unpin,
    ) -> anyhow::Result<()> {
        let mut lines = stdin.lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(&line) {
                Ok(req) => req,
                Err(_) => {
                    // JSON parse error -- respond with null id per spec
                    let response = err_response(Value::Null, PARSE_ERROR, "Parse error");
                    write_response(&mut stdout, &response).await?;
                    continue;
                }
            };

            // Notifications have no id -- acknowledged silently.
            let id = match request.id {
                Some(id) => id,
                None => continue,
            };

            let response = match request.method.as_str() {
                "initialize" => self.handle_initialize(id, request.params.as_ref()),
                "tools/list" => self.handle_tools_list(id),
                "tools/call" => self.handle_tools_call(id, request.params).await,
                "prompts/list" => self.handle_prompts_list(id),
                "prompts/get" => self.handle_prompts_get(id, request.params.as_ref()),
                "resources/list" => self.handle_resources_list(id),
                "resources/read" => self.handle_resources_read(id, request.params.as_ref()),
                other => err_response(
                    id,
                    METHOD_NOT_FOUND,
                    format!("Method not found: {other}"),
                ),
            };

            write_response(&mut stdout, &response).await?;
        }

        // EOF on stdin -- clean exit
        Ok(())
    }

    /// Handle `initialize`: report capabilities and capture the client
    /// identity. Each clientInfo field is extracted independently; a
    /// malformed or missing field stays absent without failing the call.
    fn handle_initialize(&mut self, id: Value, params: Option<&Value>) -> JsonRpcResponse {
        let (client_name, client_version) = extract_client_info(params);
        self.client_name = client_name;
        self.client_version = client_version;

        ok_response(
            id,
            serde_json::json!({
                "capabilities": {
                    "tools": {},
                    "prompts": {},
                    "resources": {}
                },
                "serverInfo": {
                    "name": "skillbridge",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        let tools: Vec<Value> = self
            .registry
            .list_tools()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema,
                })
            })
            .collect();

        ok_response(id, serde_json::json!({ "tools": tools }))
    }

    /// Handle `tools/call`. Params must contain `{ "name": String,
    /// "arguments": Value }`. Every call is routed through the executor --
    /// there is no bypass path around the audit trail.
    async fn handle_tools_call(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params = match params {
            Some(p) => p,
            None => {
                return err_response(id, INVALID_PARAMS, "Missing params for tools/call");
            }
        };

        let tool_name = match params.get("name").and_then(Value::as_str) {
            Some(name) => name.to_string(),
            None => {
                return err_response(id, INVALID_PARAMS, "Missing 'name' in tools/call params");
            }
        };

        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or(serde_json::json!({}));

        let ctx = CallContext::for_session(self.session_id.clone())
            .with_request_id(request_id_string(&id))
            .with_client(self.client_name.clone(), self.client_version.clone());

        match self.executor.execute(&tool_name, arguments, &ctx).await {
            Ok(text) => ok_response(
                id,
                serde_json::json!({
                    "content": [{
                        "type": "text",
                        "text": text,
                    }]
                }),
            ),
            Err(exec_err) => {
                let code = match &exec_err {
                    ExecutionError::ToolNotFound { .. } => TOOL_NOT_FOUND,
                    ExecutionError::ValidationFailed { .. } => INVALID_PARAMS,
                    _ => TOOL_EXECUTION_ERROR,
                };
                err_response(id, code, exec_err.to_string())
            }
        }
    }

    fn handle_prompts_list(&self, id: Value) -> JsonRpcResponse {
        ok_response(id, serde_json::json!({ "prompts": list_prompts() }))
    }

    fn handle_prompts_get(&self, id: Value, params: Option<&Value>) -> JsonRpcResponse {
        let name = match params.and_then(|p| p.get("name")).and_then(Value::as_str) {
            Some(name) => name,
            None => {
                return err_response(id, INVALID_PARAMS, "Missing 'name' in prompts/get params");
            }
        };
        let arguments = params
            .and_then(|p| p.get("arguments"))
            .cloned()
            .unwrap_or(serde_json::json!({}));

        match render_prompt(name, &arguments) {
            Ok(text) => ok_response(
                id,
                serde_json::json!({
                    "description": name,
                    "messages": [{
                        "role": "user",
                        "content": {"type": "text", "text": text}
                    }]
                }),
            ),
            Err(e) => err_response(id, INVALID_PARAMS, e.to_string()),
        }
    }

    fn handle_resources_list(&self, id: Value) -> JsonRpcResponse {
        ok_response(id, serde_json::json!({ "resources": self.resources.list() }))
    }

    fn handle_resources_read(&self, id: Value, params: Option<&Value>) -> JsonRpcResponse {
        let uri = match params.and_then(|p| p.get("uri")).and_then(Value::as_str) {
            Some(uri) => uri,
            None => {
                return err_response(id, INVALID_PARAMS, "Missing 'uri' in resources/read params");
            }
        };

        match self.resources.read(uri) {
            Ok((text, mime_type)) => ok_response(
                id,
                serde_json::json!({
                    "contents": [{
                        "uri": uri,
                        "mimeType": mime_type,
                        "text": text,
                    }]
                }),
            ),
            Err(e) => err_response(id, INTERNAL_ERROR, e.to_string()),
        }
    }
}

/// Write a JSON-RPC response as a single line to the writer.
async fn write_response(
    writer: &mut (impl AsyncWrite + Unpin),
    response: &JsonRpcResponse,
) -> anyhow::Result<()> {
    let mut line = serde_json::to_string(response)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ToolDefinition;
    use crate::executor::ExecutorConfig;
    use async_trait::async_trait;
    use skillbridge_audit::{AuditSink, NewInvocation};
    use std::sync::{Arc, Mutex};

    struct EchoTool;

    #[async_trait]
    impl ToolDefinition for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the input back"
        }

        fn input_schema(&self) -> Value {
            serde_json::json!({
                "type": "object",
                "properties": {"text": {"type": "string"}}
            })
        }

        async fn execute(&self, input: Value) -> anyhow::Result<String> {
            Ok(input
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string())
        }
    }

    struct FailingTool;

    #[async_trait]
    impl ToolDefinition for FailingTool {
        fn name(&self) -> &str {
            "always_fails"
        }

        fn description(&self) -> &str {
            "Fails on every call"
        }

        fn input_schema(&self) -> Value {
            serde_json::json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _input: Value) -> anyhow::Result<String> {
            anyhow::bail!("downstream exploded")
        }
    }

    struct RecordingSink {
        records: Mutex<Vec<NewInvocation>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                records: Mutex::new(Vec::new()),
            })
        }

        fn records(&self) -> Vec<NewInvocation> {
            self.records.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AuditSink for RecordingSink {
        async fn record(&self, rec: NewInvocation) {
            self.records.lock().unwrap().push(rec);
        }
    }

    fn make_server(sink: Arc<RecordingSink>) -> McpServer {
        let registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool)).unwrap();
        registry.register(Box::new(FailingTool)).unwrap();
        let executor = ToolExecutor::new(registry.clone(), ExecutorConfig::default(), sink);
        McpServer::new(registry, executor, ResourceSet::new("resources"))
    }

    /// Run the server with the given input lines and return the collected
    /// output lines.
    async fn run_server(server: McpServer, input_lines: &[&str]) -> Vec<String> {
        let mut input = String::new();
        for line in input_lines {
            input.push_str(line);
            input.push('\n');
        }

        let stdin = tokio::io::BufReader::new(std::io::Cursor::new(input.into_bytes()));
        let mut stdout_buf: Vec<u8> = Vec::new();

        server.run(stdin, &mut stdout_buf).await.unwrap();

        String::from_utf8(stdout_buf)
            .unwrap()
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn parse_response(line: &str) -> JsonRpcResponse {
        serde_json::from_str(line).expect("failed to parse response JSON")
    }

    #[tokio::test]
    async fn initialize_reports_capabilities() {
        let server = make_server(RecordingSink::new());
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "initialize",
            "params": {"clientInfo": {"name": "claude", "version": "1.0"}},
            "id": 1
        });

        let lines = run_server(server, &[&request.to_string()]).await;
        assert_eq!(lines.len(), 1);

        let resp = parse_response(&lines[0]);
        assert!(resp.error.is_none());
        let result = resp.result.unwrap();
        assert!(result["capabilities"]["tools"].is_object());
        assert!(result["capabilities"]["prompts"].is_object());
        assert!(result["capabilities"]["resources"].is_object());
        assert_eq!(result["serverInfo"]["name"], "skillbridge");
    }

    #[tokio::test]
    async fn tools_list_enumerates_registered_tools() {
        let server = make_server(RecordingSink::new());
        let request = serde_json::json!({"jsonrpc": "2.0", "method": "tools/list", "id": 2});

        let lines = run_server(server, &[&request.to_string()]).await;
        let resp = parse_response(&lines[0]);
        let tools = resp.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 2);
        // Sorted by name in the registry.
        assert_eq!(tools[0]["name"], "always_fails");
        assert_eq!(tools[1]["name"], "echo");
        assert!(tools[1]["inputSchema"].is_object());
    }

    #[tokio::test]
    async fn tools_call_round_trips_and_audits_with_context() {
        let sink = RecordingSink::new();
        let server = make_server(sink.clone());

        let initialize = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "initialize",
            "params": {"clientInfo": {"name": "claude", "version": "2.1"}},
            "id": 1
        });
        let call = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": {"name": "echo", "arguments": {"text": "hello"}},
            "id": 7
        });

        let lines = run_server(server, &[&initialize.to_string(), &call.to_string()]).await;
        assert_eq!(lines.len(), 2);

        let resp = parse_response(&lines[1]);
        assert!(resp.error.is_none());
        let result = resp.result.unwrap();
        let content = &result["content"][0];
        assert_eq!(content["type"], "text");
        assert_eq!(content["text"], "hello");

        // The audit record carries the ambient context captured from the
        // session: request id, session id, and the negotiated client.
        let records = sink.records();
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.tool_name, "echo");
        assert!(rec.success);
        assert_eq!(rec.request_id.as_deref(), Some("7"));
        assert!(rec.session_id.is_some());
        assert_eq!(rec.client_name.as_deref(), Some("claude"));
        assert_eq!(rec.client_version.as_deref(), Some("2.1"));
        assert_eq!(rec.parameters.as_ref().unwrap()["text"], "hello");
    }

    #[tokio::test]
    async fn failing_tool_surfaces_error_and_audits_failure() {
        let sink = RecordingSink::new();
        let server = make_server(sink.clone());

        let call = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": {"name": "always_fails", "arguments": {}},
            "id": 3
        });

        let lines = run_server(server, &[&call.to_string()]).await;
        let resp = parse_response(&lines[0]);
        let err = resp.error.unwrap();
        assert_eq!(err.code, TOOL_EXECUTION_ERROR);
        assert!(err.message.contains("downstream exploded"));

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert!(!records[0].success);
        assert_eq!(records[0].error_msg.as_deref(), Some("downstream exploded"));
    }

    #[tokio::test]
    async fn unknown_tool_returns_tool_not_found() {
        let server = make_server(RecordingSink::new());
        let call = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": {"name": "nonexistent", "arguments": {}},
            "id": 4
        });

        let lines = run_server(server, &[&call.to_string()]).await;
        let resp = parse_response(&lines[0]);
        assert_eq!(resp.error.unwrap().code, TOOL_NOT_FOUND);
    }

    #[tokio::test]
    async fn prompts_round_trip() {
        let server = make_server(RecordingSink::new());
        let list = serde_json::json!({"jsonrpc": "2.0", "method": "prompts/list", "id": 1});
        let get = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "prompts/get",
            "params": {"name": "find_experts", "arguments": {"skill_name": "Rust"}},
            "id": 2
        });

        let lines = run_server(server, &[&list.to_string(), &get.to_string()]).await;

        let listed = parse_response(&lines[0]);
        assert_eq!(
            listed.result.unwrap()["prompts"].as_array().unwrap().len(),
            3
        );

        let got = parse_response(&lines[1]);
        let text = got.result.unwrap()["messages"][0]["content"]["text"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(text.contains("Rust"));
    }

    #[tokio::test]
    async fn notifications_produce_no_response() {
        let server = make_server(RecordingSink::new());
        let notification =
            serde_json::json!({"jsonrpc": "2.0", "method": "notifications/initialized"});

        let lines = run_server(server, &[&notification.to_string()]).await;
        assert!(lines.is_empty(), "notification should produce no response");
    }

    #[tokio::test]
    async fn parse_error_has_null_id() {
        let server = make_server(RecordingSink::new());
        let lines = run_server(server, &["this is not valid json"]).await;

        let resp = parse_response(&lines[0]);
        let err = resp.error.unwrap();
        assert_eq!(err.code, PARSE_ERROR);
        assert_eq!(resp.id, Value::Null);
    }

    #[tokio::test]
    async fn unknown_method_is_rejected() {
        let server = make_server(RecordingSink::new());
        let request =
            serde_json::json!({"jsonrpc": "2.0", "method": "does/not/exist", "id": 9});

        let lines = run_server(server, &[&request.to_string()]).await;
        let resp = parse_response(&lines[0]);
        assert_eq!(resp.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn exits_cleanly_on_eof() {
        let server = make_server(RecordingSink::new());
        let stdin = tokio::io::BufReader::new(std::io::Cursor::new(Vec::<u8>::new()));
        let mut stdout_buf: Vec<u8> = Vec::new();

        let result = server.run(stdin, &mut stdout_buf).await;
        assert!(result.is_ok());
        assert!(stdout_buf.is_empty());
    }
}
