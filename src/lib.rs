//! Skillbridge republishes the Talent Management Skills HTTP API as MCP
//! tools for LLM agents and records every tool invocation in an embedded,
//! queryable SQLite audit trail.
//!
//! This facade crate re-exports the workspace members:
//!
//! - [`types`] -- shared errors, configuration, and the ambient call context.
//! - [`audit`] -- the audit store, logger, and read-side query API.
//! - [`tools`] -- tool definitions, the executor pipeline, and the MCP server.
//! - [`server`] -- the HTTP read surface and composition root.

pub use skillbridge_audit as audit;
pub use skillbridge_server as server;
pub use skillbridge_tools as tools;
pub use skillbridge_types as types;
