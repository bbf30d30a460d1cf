//! BMAD Markdown agent parser.
//!
//! The BMAD format is a plain Markdown document: the first level-1
//! heading is the agent name, level-2 headings are named sections, and
//! bullet lines of the form `- *trigger - description` (or
//! `- *trigger: description`) declare workflow entries.
//!
//! ```markdown
//! # Analyst
//!
//! ## Role
//!
//! Requirements analyst
//!
//! ## Identity
//!
//! Digs for the real problem behind a request
//!
//! ## Principles
//!
//! - Evidence over opinion
//!
//! ## Workflows
//!
//! - *plan - Run the project planning workflow
//! ```

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A workflow/menu entry extracted from a bullet line. The trigger keeps
/// its leading `*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEntry {
    pub trigger: String,
    pub description: String,
}

/// The canonical result of parsing a BMAD markdown agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedAgent {
    pub name: String,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub role: String,
    pub identity: String,
    pub communication_style: Option<String>,
    pub principles: Vec<String>,
    pub workflows: Vec<WorkflowEntry>,
    pub critical_actions: Option<Vec<String>>,
    pub load_always: Option<Vec<String>>,
    pub prompts: Option<Vec<String>>,
}

fn workflow_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-\s+\*([^\s:-]+)[\s:-]+(.+)$").expect("static regex"))
}

/// Parse BMAD markdown agent content.
///
/// The agent name (first `#` heading), a `## Role` section, and a
/// `## Identity` section are load-bearing; their absence is a `Parse`
/// error. Unknown sections are dropped silently.
pub fn parse_markdown(content: &str) -> Result<ParsedAgent, CoreError> {
    let mut name: Option<String> = None;
    let mut role: Option<String> = None;
    let mut identity: Option<String> = None;
    let mut title: Option<String> = None;
    let mut icon: Option<String> = None;
    let mut communication_style: Option<String> = None;
    let mut principles: Vec<String> = Vec::new();
    let mut workflows: Vec<WorkflowEntry> = Vec::new();
    let mut critical_actions: Vec<String> = Vec::new();

    let mut current_section = String::new();
    let mut section_content: Vec<&str> = Vec::new();
    let mut in_list_section = false;

    for line in content.lines() {
        if line.is_empty() {
            continue;
        }

        // Agent name: first level-1 heading
        if line.starts_with("# ") && name.is_none() {
            name = Some(line.trim_start_matches('#').trim().to_string());
            continue;
        }

        // New section header
        if line.starts_with("## ") {
            flush_section(
                &current_section,
                &section_content,
                &mut role,
                &mut identity,
                &mut title,
                &mut icon,
                &mut communication_style,
            );
            current_section = line.trim_start_matches('#').trim().to_string();
            section_content.clear();
            in_list_section = false;
            continue;
        }

        // Workflow bullets take precedence over plain list items
        if line.trim_start().starts_with("- *") {
            if let Some(caps) = workflow_line_re().captures(line.trim_start()) {
                workflows.push(WorkflowEntry {
                    trigger: format!("*{}", &caps[1]),
                    description: caps[2].trim().to_string(),
                });
            }
            continue;
        }

        let section_lower = current_section.to_lowercase();

        if section_lower.contains("principle") && line.trim_start().starts_with("- ") {
            let principle = line.trim_start().trim_start_matches("- ").trim();
            if !principle.is_empty() {
                principles.push(principle.to_string());
            }
            in_list_section = true;
            continue;
        }

        if section_lower.contains("critical") && line.trim_start().starts_with("- ") {
            let action = line.trim_start().trim_start_matches("- ").trim();
            if !action.is_empty() {
                critical_actions.push(action.to_string());
            }
            in_list_section = true;
            continue;
        }

        if !in_list_section && !line.trim().is_empty() {
            section_content.push(line);
        }
    }

    flush_section(
        &current_section,
        &section_content,
        &mut role,
        &mut identity,
        &mut title,
        &mut icon,
        &mut communication_style,
    );

    let name = name.ok_or_else(|| {
        CoreError::Parse("Agent name not found (missing # Title)".to_string())
    })?;
    let role = role.ok_or_else(|| {
        CoreError::Parse("Agent role not found (missing ## Role section)".to_string())
    })?;
    let identity = identity.ok_or_else(|| {
        CoreError::Parse("Agent identity not found (missing ## Identity section)".to_string())
    })?;

    Ok(ParsedAgent {
        name,
        title,
        icon,
        role,
        identity,
        communication_style,
        principles,
        workflows,
        critical_actions: if critical_actions.is_empty() {
            None
        } else {
            Some(critical_actions)
        },
        load_always: None,
        prompts: None,
    })
}

/// Assign an accumulated section body to the field its heading names.
/// Unknown sections are dropped.
#[allow(clippy::too_many_arguments)]
fn flush_section(
    section: &str,
    content: &[&str],
    role: &mut Option<String>,
    identity: &mut Option<String>,
    title: &mut Option<String>,
    icon: &mut Option<String>,
    style: &mut Option<String>,
) {
    if section.is_empty() || content.is_empty() {
        return;
    }
    let text = content.join("\n").trim().to_string();
    match normalize_section_name(section).as_str() {
        "role" => *role = Some(text),
        "identity" => *identity = Some(text),
        "communication_style" | "communicationstyle" => *style = Some(text),
        "title" => *title = Some(text),
        "icon" => *icon = Some(text.trim().to_string()),
        _ => {}
    }
}

/// Lowercase a heading, spaces to underscores, strip punctuation.
fn normalize_section_name(section: &str) -> String {
    section
        .to_lowercase()
        .replace(char::is_whitespace, "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"# Analyst

## Role

Requirements analyst

## Identity

Digs for the real problem behind a request

## Communication Style

Direct, asks one question at a time

## Principles

- Evidence over opinion
- One question at a time

## Critical Actions

- check-config
- load-manifest

## Workflows

- *plan - Run the project planning workflow
- *review: Review the current draft
"#;

    #[test]
    fn test_parse_full_agent() {
        let parsed = parse_markdown(SAMPLE).unwrap();
        assert_eq!(parsed.name, "Analyst");
        assert_eq!(parsed.role, "Requirements analyst");
        assert_eq!(parsed.identity, "Digs for the real problem behind a request");
        assert_eq!(
            parsed.communication_style.as_deref(),
            Some("Direct, asks one question at a time")
        );
        assert_eq!(parsed.principles.len(), 2);
        assert_eq!(
            parsed.critical_actions.as_deref(),
            Some(&["check-config".to_string(), "load-manifest".to_string()][..])
        );
    }

    #[test]
    fn test_parse_workflow_entries_both_separators() {
        let parsed = parse_markdown(SAMPLE).unwrap();
        assert_eq!(
            parsed.workflows,
            vec![
                WorkflowEntry {
                    trigger: "*plan".to_string(),
                    description: "Run the project planning workflow".to_string(),
                },
                WorkflowEntry {
                    trigger: "*review".to_string(),
                    description: "Review the current draft".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_unknown_sections_dropped() {
        let doc = "# A\n\n## Role\n\nR\n\n## Identity\n\nI\n\n## Backstory\n\nIgnored prose\n";
        let parsed = parse_markdown(doc).unwrap();
        assert_eq!(parsed.role, "R");
        assert_eq!(parsed.identity, "I");
    }

    #[test]
    fn test_missing_name_is_parse_error() {
        let err = parse_markdown("## Role\n\nR\n\n## Identity\n\nI\n").unwrap_err();
        assert!(matches!(err, CoreError::Parse(_)));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_missing_role_is_parse_error() {
        let err = parse_markdown("# A\n\n## Identity\n\nI\n").unwrap_err();
        assert!(err.to_string().contains("Role"));
    }

    #[test]
    fn test_missing_identity_is_parse_error() {
        let err = parse_markdown("# A\n\n## Role\n\nR\n").unwrap_err();
        assert!(err.to_string().contains("Identity"));
    }
}
