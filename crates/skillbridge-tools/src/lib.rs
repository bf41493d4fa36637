//! Tool surface for the skillbridge MCP server.
//!
//! [`ToolDefinition`] is the common invoke signature every tool conforms to.
//! [`ToolExecutor`] wraps every call with timing, caller-metadata capture,
//! timeout enforcement, and a best-effort audit write. The rest is glue:
//! the Talent API client and tool catalog, the audit read tools, prompt
//! templates, static resources, and the MCP stdio server.

pub mod audit_tools;
pub mod catalog;
pub mod definition;
pub mod executor;
pub mod mcp_server;
pub mod prompts;
pub mod registry;
pub mod resources;
pub mod talent_api;

pub use definition::{ToolDefinition, ToolInfo};
pub use executor::{ExecutionError, ExecutorConfig, ToolExecutor};
pub use mcp_server::McpServer;
pub use registry::ToolRegistry;
pub use talent_api::TalentApi;
