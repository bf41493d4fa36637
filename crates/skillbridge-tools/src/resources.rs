//! Static MCP resources: reference documents served to the agent.
//!
//! Resources are files under the configured resources directory, addressed
//! by `tm://` URIs. They are read at request time so edits show up without
//! a restart.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::{json, Value};

/// One servable resource.
struct Resource {
    uri: &'static str,
    name: &'static str,
    description: &'static str,
    file_name: &'static str,
    mime_type: &'static str,
}

const RESOURCES: &[Resource] = &[
    Resource {
        uri: "tm://schema",
        name: "TM database schema",
        description: "The TM database schema: tables, columns, types, indexes, and relationships.",
        file_name: "tm_schema.sql",
        mime_type: "text/plain",
    },
    Resource {
        uri: "tm://business-questions",
        name: "Business question catalog",
        description: "Catalog of the business questions the TM Skills API can answer, with endpoint mappings.",
        file_name: "business_questions.md",
        mime_type: "text/markdown",
    },
];

/// The set of resources rooted at a directory.
pub struct ResourceSet {
    dir: PathBuf,
}

impl ResourceSet {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resource descriptors in `resources/list` wire shape.
    pub fn list(&self) -> Vec<Value> {
        RESOURCES
            .iter()
            .map(|r| {
                json!({
                    "uri": r.uri,
                    "name": r.name,
                    "description": r.description,
                    "mimeType": r.mime_type,
                })
            })
            .collect()
    }

    /// Read one resource by URI. Unknown URIs and unreadable files are errors.
    pub fn read(&self, uri: &str) -> Result<(String, &'static str)> {
        let resource = RESOURCES
            .iter()
            .find(|r| r.uri == uri)
            .ok_or_else(|| anyhow::anyhow!("unknown resource: {uri}"))?;

        let path = self.dir.join(resource.file_name);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
        Ok((content, resource.mime_type))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
