//! Core tool abstraction: the [`ToolDefinition`] trait and [`ToolInfo`].
//!
//! Every tool exposed to an agent implements [`ToolDefinition`]. The trait
//! is `Send + Sync` so tools can be stored in a shared registry and called
//! from any async task. Tools in this server are thin API adapters: each
//! returns the downstream response body as text.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A tool that an agent can invoke.
#[async_trait::async_trait]
pub trait ToolDefinition: Send + Sync {
    /// Unique, human-readable name (alphanumeric + underscores, max 64 chars).
    fn name(&self) -> &str;

    /// Short description of what the tool does.
    fn description(&self) -> &str;

    /// JSON Schema describing the valid input for [`Self::execute`].
    fn input_schema(&self) -> serde_json::Value;

    /// Run the tool with the given input and return the response body text.
    async fn execute(&self, input: serde_json::Value) -> Result<String>;
}

/// Summary information about a registered tool (returned by registry listing).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Maximum allowed length for a tool name.
const MAX_TOOL_NAME_LEN: usize = 64;

/// Validate that a tool name contains only alphanumeric characters and
/// underscores, is non-empty, and does not exceed [`MAX_TOOL_NAME_LEN`].
pub fn validate_tool_name(name: &str) -> Result<()> {
    if name.is_empty() {
        anyhow::bail!("tool name must not be empty");
    }
    if name.len() > MAX_TOOL_NAME_LEN {
        anyhow::bail!("tool name exceeds maximum length of {MAX_TOOL_NAME_LEN} characters: {name}");
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        anyhow::bail!("tool name must contain only alphanumeric characters and underscores: {name}");
    }
    Ok(())
}

/// Validate that an input schema is a JSON object with a `"type"` field.
pub fn validate_input_schema(schema: &serde_json::Value) -> Result<()> {
    let obj = schema
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("input schema must be a JSON object"))?;
    if !obj.contains_key("type") {
        anyhow::bail!("input schema must contain a \"type\" field");
    }
    Ok(())
}
