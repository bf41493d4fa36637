//! Thread-safe tool registry.
//!
//! [`ToolRegistry`] stores tool implementations behind `Arc<RwLock<...>>`
//! so tools can be registered at startup and looked up from any async task.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::{bail, Result};

use crate::definition::{validate_input_schema, validate_tool_name, ToolDefinition, ToolInfo};

/// A thread-safe registry of tool definitions.
///
/// Tools are stored as `Arc<dyn ToolDefinition>` so callers can share
/// references without holding the lock during execution.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Arc<RwLock<HashMap<String, Arc<dyn ToolDefinition>>>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a tool. Rejects duplicate names, invalid names, and invalid
    /// input schemas.
    pub fn register(&self, tool: Box<dyn ToolDefinition>) -> Result<()> {
        let name = tool.name().to_string();
        validate_tool_name(&name)?;
        validate_input_schema(&tool.input_schema())?;

        let mut map = self
            .tools
            .write()
            .map_err(|e| anyhow::anyhow!("registry lock poisoned: {e}"))?;

        if map.contains_key(&name) {
            bail!("tool already registered: {name}");
        }

        map.insert(name, Arc::from(tool));
        Ok(())
    }

    /// Look up a tool by name.
    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn ToolDefinition>> {
        let map = self.tools.read().ok()?;
        map.get(name).cloned()
    }

    /// List all registered tools (sorted by name for deterministic output).
    pub fn list_tools(&self) -> Vec<ToolInfo> {
        let map = match self.tools.read() {
            Ok(map) => map,
            Err(_) => return Vec::new(),
        };
        let mut infos: Vec<ToolInfo> = map
            .values()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.input_schema(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Number of registered tools.
    pub fn tool_count(&self) -> usize {
        self.tools.read().map(|map| map.len()).unwrap_or(0)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
