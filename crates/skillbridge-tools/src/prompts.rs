//! Reusable prompt templates.
//!
//! Each prompt guides the agent through a multi-tool workflow against the
//! talent catalog. Templates are static; arguments are substituted at
//! `prompts/get` time.

use anyhow::Result;
use serde_json::{json, Value};

/// A named prompt template with one required argument.
struct Prompt {
    name: &'static str,
    description: &'static str,
    argument: &'static str,
    argument_description: &'static str,
}

const PROMPTS: &[Prompt] = &[
    Prompt {
        name: "find_experts",
        description: "Find the top experts for a given skill and the evidence behind them.",
        argument: "skill_name",
        argument_description: "The name of the skill to search for (e.g. \"Python\")",
    },
    Prompt {
        name: "analyze_employee",
        description: "Build a comprehensive talent profile for an employee.",
        argument: "employee_id",
        argument_description: "Employee ID (e.g. EMP000001)",
    },
    Prompt {
        name: "org_talent_review",
        description: "Assess an organization's talent landscape.",
        argument: "org_unit_id",
        argument_description: "Org unit ID (e.g. ORG030)",
    },
];

/// Prompt descriptors in `prompts/list` wire shape.
pub fn list_prompts() -> Vec<Value> {
    PROMPTS
        .iter()
        .map(|p| {
            json!({
                "name": p.name,
                "description": p.description,
                "arguments": [{
                    "name": p.argument,
                    "description": p.argument_description,
                    "required": true,
                }],
            })
        })
        .collect()
}

/// Render a prompt with the given arguments. Unknown names and missing
/// required arguments are errors.
pub fn render_prompt(name: &str, arguments: &Value) -> Result<String> {
    let prompt = PROMPTS
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| anyhow::anyhow!("unknown prompt: {name}"))?;

    let value = arguments
        .get(prompt.argument)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            anyhow::anyhow!("prompt {name} requires argument: {}", prompt.argument)
        })?;

    Ok(match name {
        "find_experts" => format!(
            "I need to find the top experts in \"{value}\" in our organization.\n\n\
             Please:\n\
             1. Use browse_skills to find the skill ID for \"{value}\"\n\
             2. Use get_top_experts with that skill ID to find the best people\n\
             3. For the top 3 experts, use get_skill_evidence to show what backs up their rating\n\
             4. Summarize the findings: who are the go-to people and why"
        ),
        "analyze_employee" => format!(
            "Please build a comprehensive talent profile for employee {value}.\n\n\
             Steps:\n\
             1. Use get_employee_skills to see their full skill profile\n\
             2. Use get_top_skills to identify their strongest areas\n\
             3. Use get_evidence_inventory to see all supporting evidence\n\
             4. For their top 3 skills, use get_cooccurring_skills to suggest related skills they might develop\n\
             5. Summarize: strengths, areas backed by strong evidence, and development suggestions"
        ),
        "org_talent_review" => format!(
            "Please perform a talent review for org unit {value}.\n\n\
             Steps:\n\
             1. Use get_org_skill_summary to see the top skills in this org\n\
             2. For the top 3 skills, use get_skill_coverage to understand the depth\n\
             3. For the top 3 skills, check get_stale_skills to find outdated records\n\
             4. Summarize: what this org is strong in, where the gaps might be, \
             and any governance concerns (stale skills needing revalidation)"
        ),
        _ => unreachable!("prompt names are matched against PROMPTS"),
    })
}
