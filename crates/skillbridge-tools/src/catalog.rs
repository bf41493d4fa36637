//! The Talent API tool catalog.
//!
//! Each tool is pure adapter glue: it maps its input arguments onto one GET
//! request path plus query parameters and returns the response body. All 13
//! tools share the [`ApiTool`] shape; only the schema and the request
//! builder differ.
//!
//! Employee IDs look like `EMP000001`, org unit IDs like `ORG030`, and skill
//! IDs are numeric. Agents that accept floats for integer IDs (a common
//! client quirk) are tolerated: numeric arguments are truncated to integers.

use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Value};

use crate::definition::ToolDefinition;
use crate::registry::ToolRegistry;
use crate::talent_api::TalentApi;

/// A request assembled from tool input: path plus query parameters.
type ApiRequest = (String, Vec<(&'static str, String)>);

/// Builder mapping validated tool input onto an [`ApiRequest`].
type BuildFn = fn(&Value) -> Result<ApiRequest>;

/// One catalog entry: a named GET against the Talent API.
struct ApiTool {
    name: &'static str,
    description: &'static str,
    schema: Value,
    build: BuildFn,
    api: Arc<TalentApi>,
}

#[async_trait::async_trait]
impl ToolDefinition for ApiTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn input_schema(&self) -> Value {
        self.schema.clone()
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let (path, params) = (self.build)(&input)?;
        self.api.get(&path, &params).await
    }
}

/// Register the full Talent API tool catalog against the given registry.
pub fn register_talent_tools(registry: &ToolRegistry, api: Arc<TalentApi>) -> Result<()> {
    for (name, description, schema, build) in specs() {
        registry.register(Box::new(ApiTool {
            name,
            description,
            schema,
            build,
            api: Arc::clone(&api),
        }))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Input helpers
// ---------------------------------------------------------------------------

fn required_str(input: &Value, key: &str) -> Result<String> {
    input
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("missing required argument: {key}"))
}

fn optional_str(input: &Value, key: &str) -> Option<String> {
    input.get(key).and_then(Value::as_str).map(str::to_string)
}

/// A required numeric id; floats are truncated (clients often send `7.0`).
fn required_int(input: &Value, key: &str) -> Result<i64> {
    input
        .get(key)
        .and_then(Value::as_f64)
        .map(|n| n as i64)
        .ok_or_else(|| anyhow::anyhow!("missing required argument: {key}"))
}

/// An optional numeric argument with a default, truncated to an integer.
fn int_or(input: &Value, key: &str, default: i64) -> i64 {
    input
        .get(key)
        .and_then(Value::as_f64)
        .map(|n| n as i64)
        .unwrap_or(default)
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_lines)]
fn specs() -> Vec<(&'static str, &'static str, Value, BuildFn)> {
    vec![
        // --- Employee-centric tools -------------------------------------
        (
            "get_employee_skills",
            "Get the full skill profile for an employee: all skills with proficiency (0-5), \
             confidence (0-100), source, and last updated date.",
            json!({
                "type": "object",
                "properties": {
                    "employee_id": {"type": "string", "description": "Employee ID, e.g. EMP000001"}
                },
                "required": ["employee_id"]
            }),
            |input| {
                let employee_id = required_str(input, "employee_id")?;
                Ok((format!("/tm/employees/{employee_id}/skills"), vec![]))
            },
        ),
        (
            "get_skill_evidence",
            "Get the evidence behind an employee's skill rating: certifications, projects, \
             assessments, peer endorsements.",
            json!({
                "type": "object",
                "properties": {
                    "employee_id": {"type": "string", "description": "Employee ID, e.g. EMP000001"},
                    "skill_id": {"type": "number", "description": "Numeric skill ID (use browse_skills to find IDs)"}
                },
                "required": ["employee_id", "skill_id"]
            }),
            |input| {
                let employee_id = required_str(input, "employee_id")?;
                let skill_id = required_int(input, "skill_id")?;
                Ok((
                    format!("/tm/employees/{employee_id}/skills/{skill_id}/evidence"),
                    vec![],
                ))
            },
        ),
        (
            "get_top_skills",
            "Get an employee's strongest skills ranked by proficiency and confidence -- a \
             \"skill passport\" view.",
            json!({
                "type": "object",
                "properties": {
                    "employee_id": {"type": "string", "description": "Employee ID, e.g. EMP000001"},
                    "limit": {"type": "number", "description": "Number of top skills to return (1-50, default 10)"}
                },
                "required": ["employee_id"]
            }),
            |input| {
                let employee_id = required_str(input, "employee_id")?;
                let limit = int_or(input, "limit", 10);
                Ok((
                    format!("/tm/employees/{employee_id}/top-skills"),
                    vec![("limit", limit.to_string())],
                ))
            },
        ),
        (
            "get_evidence_inventory",
            "Get ALL evidence items across ALL skills for an employee: the complete evidence \
             inventory (certifications, projects, endorsements).",
            json!({
                "type": "object",
                "properties": {
                    "employee_id": {"type": "string", "description": "Employee ID, e.g. EMP000001"}
                },
                "required": ["employee_id"]
            }),
            |input| {
                let employee_id = required_str(input, "employee_id")?;
                Ok((format!("/tm/employees/{employee_id}/evidence"), vec![]))
            },
        ),
        // --- Skill-centric tools ----------------------------------------
        (
            "browse_skills",
            "Browse the skill catalog: list all skills or filter by category/search term. Use \
             this to find skill IDs before calling other tools.",
            json!({
                "type": "object",
                "properties": {
                    "category": {"type": "string", "description": "Filter by category (technical, functional, leadership, domain, tool, other)"},
                    "search": {"type": "string", "description": "Search skill name or description (case-insensitive, max 200 chars)"}
                }
            }),
            |input| {
                let mut params = Vec::new();
                if let Some(category) = optional_str(input, "category") {
                    params.push(("category", category));
                }
                if let Some(search) = optional_str(input, "search") {
                    params.push(("search", search));
                }
                Ok(("/tm/skills".to_string(), params))
            },
        ),
        (
            "get_top_experts",
            "Find the top experts for a specific skill, ranked by proficiency, confidence, and \
             recency.",
            json!({
                "type": "object",
                "properties": {
                    "skill_id": {"type": "number", "description": "Numeric skill ID"},
                    "min_proficiency": {"type": "number", "description": "Minimum proficiency level 0-5 (default 4)"},
                    "limit": {"type": "number", "description": "Max results to return 1-100 (default 20)"}
                },
                "required": ["skill_id"]
            }),
            |input| {
                let skill_id = required_int(input, "skill_id")?;
                Ok((
                    format!("/tm/skills/{skill_id}/experts"),
                    vec![
                        ("min_proficiency", int_or(input, "min_proficiency", 4).to_string()),
                        ("limit", int_or(input, "limit", 20).to_string()),
                    ],
                ))
            },
        ),
        (
            "get_skill_coverage",
            "Get the proficiency distribution for a skill: how many employees at each level \
             (0-5) and total count above a threshold.",
            json!({
                "type": "object",
                "properties": {
                    "skill_id": {"type": "number", "description": "Numeric skill ID"},
                    "min_proficiency": {"type": "number", "description": "Threshold for the coverage count 0-5 (default 3)"}
                },
                "required": ["skill_id"]
            }),
            |input| {
                let skill_id = required_int(input, "skill_id")?;
                Ok((
                    format!("/tm/skills/{skill_id}/coverage"),
                    vec![("min_proficiency", int_or(input, "min_proficiency", 3).to_string())],
                ))
            },
        ),
        (
            "get_evidence_backed_candidates",
            "Find employees with a skill AND strong evidence to back it up: certifications, \
             project work, assessments with high signal strength.",
            json!({
                "type": "object",
                "properties": {
                    "skill_id": {"type": "number", "description": "Numeric skill ID"},
                    "min_proficiency": {"type": "number", "description": "Minimum proficiency level 0-5 (default 3)"},
                    "min_evidence_strength": {"type": "number", "description": "Minimum evidence signal strength 1-5 (default 4)"},
                    "limit": {"type": "number", "description": "Max candidates to return 1-100 (default 20)"}
                },
                "required": ["skill_id"]
            }),
            |input| {
                let skill_id = required_int(input, "skill_id")?;
                Ok((
                    format!("/tm/skills/{skill_id}/candidates"),
                    vec![
                        ("min_proficiency", int_or(input, "min_proficiency", 3).to_string()),
                        (
                            "min_evidence_strength",
                            int_or(input, "min_evidence_strength", 4).to_string(),
                        ),
                        ("limit", int_or(input, "limit", 20).to_string()),
                    ],
                ))
            },
        ),
        (
            "get_stale_skills",
            "Find employees whose skill record hasn't been validated or updated recently -- \
             useful for governance and freshness checks.",
            json!({
                "type": "object",
                "properties": {
                    "skill_id": {"type": "number", "description": "Numeric skill ID"},
                    "older_than_days": {"type": "number", "description": "Skills not updated in this many days (default 365)"}
                },
                "required": ["skill_id"]
            }),
            |input| {
                let skill_id = required_int(input, "skill_id")?;
                Ok((
                    format!("/tm/skills/{skill_id}/stale"),
                    vec![("older_than_days", int_or(input, "older_than_days", 365).to_string())],
                ))
            },
        ),
        (
            "get_cooccurring_skills",
            "Discover which skills commonly co-occur with a given skill: \"people who know X \
             also tend to know Y\". Useful for recommendations and adjacency analysis.",
            json!({
                "type": "object",
                "properties": {
                    "skill_id": {"type": "number", "description": "Numeric skill ID"},
                    "min_proficiency": {"type": "number", "description": "Minimum proficiency to consider 0-5 (default 3)"},
                    "top": {"type": "number", "description": "Number of co-occurring skills to return 1-50 (default 20)"}
                },
                "required": ["skill_id"]
            }),
            |input| {
                let skill_id = required_int(input, "skill_id")?;
                Ok((
                    format!("/tm/skills/{skill_id}/cooccurring"),
                    vec![
                        ("min_proficiency", int_or(input, "min_proficiency", 3).to_string()),
                        ("top", int_or(input, "top", 20).to_string()),
                    ],
                ))
            },
        ),
        // --- Talent search ----------------------------------------------
        (
            "search_talent",
            "Find employees who have ALL specified skills at a minimum proficiency (an AND \
             search). Returns matching employees with per-skill detail.",
            json!({
                "type": "object",
                "properties": {
                    "skills": {"type": "string", "description": "Comma-separated skill names (e.g. \"Python,SQL,Docker\"), max 10 skills"},
                    "min_proficiency": {"type": "number", "description": "Minimum proficiency for each skill 0-5 (default 3)"}
                },
                "required": ["skills"]
            }),
            |input| {
                let skills = required_str(input, "skills")?;
                Ok((
                    "/tm/talent/search".to_string(),
                    vec![
                        ("skills", skills),
                        ("min_proficiency", int_or(input, "min_proficiency", 3).to_string()),
                    ],
                ))
            },
        ),
        // --- Org-centric tools ------------------------------------------
        (
            "get_org_skill_summary",
            "Get the top skills in an org unit (including all child orgs in the hierarchy): \
             aggregate counts and top experts per skill.",
            json!({
                "type": "object",
                "properties": {
                    "org_unit_id": {"type": "string", "description": "Org unit ID, e.g. ORG030"},
                    "limit": {"type": "number", "description": "Number of top skills to return 1-100 (default 20)"}
                },
                "required": ["org_unit_id"]
            }),
            |input| {
                let org_unit_id = required_str(input, "org_unit_id")?;
                Ok((
                    format!("/tm/orgs/{org_unit_id}/skills/summary"),
                    vec![("limit", int_or(input, "limit", 20).to_string())],
                ))
            },
        ),
        (
            "get_org_skill_experts",
            "Find employees within an org unit who have a specific skill, scoped to the org \
             hierarchy (includes child orgs).",
            json!({
                "type": "object",
                "properties": {
                    "org_unit_id": {"type": "string", "description": "Org unit ID, e.g. ORG030"},
                    "skill_id": {"type": "number", "description": "Numeric skill ID"},
                    "min_proficiency": {"type": "number", "description": "Minimum proficiency level 0-5 (default 3)"},
                    "limit": {"type": "number", "description": "Max results 1-100 (default 20)"}
                },
                "required": ["org_unit_id", "skill_id"]
            }),
            |input| {
                let org_unit_id = required_str(input, "org_unit_id")?;
                let skill_id = required_int(input, "skill_id")?;
                Ok((
                    format!("/tm/orgs/{org_unit_id}/skills/{skill_id}/experts"),
                    vec![
                        ("min_proficiency", int_or(input, "min_proficiency", 3).to_string()),
                        ("limit", int_or(input, "limit", 20).to_string()),
                    ],
                ))
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillbridge_types::BridgeConfig;

    fn test_registry() -> ToolRegistry {
        let registry = ToolRegistry::new();
        let api = Arc::new(TalentApi::new(&BridgeConfig::default()).unwrap());
        register_talent_tools(&registry, api).unwrap();
        registry
    }

    #[test]
    fn registers_all_thirteen_tools() {
        let registry = test_registry();
        assert_eq!(registry.tool_count(), 13);

        for name in [
            "get_employee_skills",
            "get_skill_evidence",
            "get_top_skills",
            "get_evidence_inventory",
            "browse_skills",
            "get_top_experts",
            "get_skill_coverage",
            "get_evidence_backed_candidates",
            "get_stale_skills",
            "get_cooccurring_skills",
            "search_talent",
            "get_org_skill_summary",
            "get_org_skill_experts",
        ] {
            assert!(registry.get_tool(name).is_some(), "missing tool: {name}");
        }
    }

    #[test]
    fn every_schema_is_a_valid_object_schema() {
        for tool in test_registry().list_tools() {
            assert_eq!(tool.input_schema["type"], "object", "tool: {}", tool.name);
            assert!(!tool.description.is_empty());
        }
    }

    #[test]
    fn builders_map_inputs_to_paths() {
        for (name, _desc, _schema, build) in specs() {
            match name {
                "get_employee_skills" => {
                    let (path, params) =
                        build(&json!({"employee_id": "EMP000001"})).unwrap();
                    assert_eq!(path, "/tm/employees/EMP000001/skills");
                    assert!(params.is_empty());
                }
                "get_skill_evidence" => {
                    // Float skill ids are truncated.
                    let (path, _) =
                        build(&json!({"employee_id": "EMP000002", "skill_id": 7.0})).unwrap();
                    assert_eq!(path, "/tm/employees/EMP000002/skills/7/evidence");
                }
                "browse_skills" => {
                    let (path, params) = build(&json!({"search": "rust"})).unwrap();
                    assert_eq!(path, "/tm/skills");
                    assert_eq!(params, vec![("search", "rust".to_string())]);

                    let (_, empty) = build(&json!({})).unwrap();
                    assert!(empty.is_empty());
                }
                "get_top_experts" => {
                    let (path, params) = build(&json!({"skill_id": 3})).unwrap();
                    assert_eq!(path, "/tm/skills/3/experts");
                    assert_eq!(
                        params,
                        vec![
                            ("min_proficiency", "4".to_string()),
                            ("limit", "20".to_string())
                        ]
                    );
                }
                "search_talent" => {
                    let (path, params) =
                        build(&json!({"skills": "Python,SQL", "min_proficiency": 4})).unwrap();
                    assert_eq!(path, "/tm/talent/search");
                    assert_eq!(params[0], ("skills", "Python,SQL".to_string()));
                    assert_eq!(params[1], ("min_proficiency", "4".to_string()));
                }
                "get_org_skill_experts" => {
                    let (path, _) =
                        build(&json!({"org_unit_id": "ORG030", "skill_id": 12})).unwrap();
                    assert_eq!(path, "/tm/orgs/ORG030/skills/12/experts");
                }
                _ => {
                    // Remaining builders follow the same shapes; missing
                    // required arguments must error.
                    assert!(build(&json!({})).is_err(), "tool: {name}");
                }
            }
        }
    }
}
