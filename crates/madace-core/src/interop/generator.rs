//! Generators for the two agent representations.
//!
//! `generate_yaml` builds the canonical MADACE agent record from a parsed
//! BMAD agent and dumps it as YAML; `generate_markdown` is the structural
//! inverse, rendering a canonical record back into BMAD markdown.

use crate::agent::schema::{
    AgentDefinition, AgentFile, AgentMetadata, MenuAction, MenuItem, Persona, PromptDef,
};
use crate::error::CoreError;
use crate::interop::markdown::ParsedAgent;

/// Build the canonical agent record from a parsed BMAD agent.
pub fn to_agent_definition(parsed: &ParsedAgent, target_module: &str) -> AgentDefinition {
    let menu = parsed
        .workflows
        .iter()
        .map(|w| MenuItem {
            trigger: w.trigger.clone(),
            action: MenuAction::Workflow(w.trigger.trim_start_matches('*').to_string()),
            description: w.description.clone(),
        })
        .collect();

    let prompts = parsed.prompts.as_ref().map(|prompts| {
        prompts
            .iter()
            .enumerate()
            .map(|(i, content)| PromptDef {
                name: format!("prompt-{}", i + 1),
                trigger: Some(format!("*prompt-{}", i + 1)),
                content: content.clone(),
            })
            .collect()
    });

    AgentDefinition {
        metadata: AgentMetadata {
            id: format!(
                "madace/{}/agents/{}.md",
                target_module,
                parsed.name.to_lowercase()
            ),
            name: parsed.name.clone(),
            title: parsed
                .title
                .clone()
                .unwrap_or_else(|| format!("{} - {}", parsed.name, parsed.role)),
            icon: Some(parsed.icon.clone().unwrap_or_else(|| "🤖".to_string())),
            module: Some(target_module.to_string()),
            version: Some("1.0.0".to_string()),
        },
        persona: Persona {
            role: parsed.role.clone(),
            identity: parsed.identity.clone(),
            communication_style: Some(parsed.communication_style.clone().unwrap_or_default()),
            principles: parsed.principles.clone(),
        },
        menu,
        critical_actions: parsed.critical_actions.clone(),
        load_always: Some(
            parsed
                .load_always
                .clone()
                .unwrap_or_else(|| vec!["madace/core/config.yaml".to_string()]),
        ),
        prompts,
    }
}

/// Generate MADACE YAML agent content from a parsed BMAD agent.
pub fn generate_yaml(parsed: &ParsedAgent, target_module: &str) -> Result<String, CoreError> {
    let file = AgentFile {
        agent: to_agent_definition(parsed, target_module),
    };
    serde_yaml::to_string(&file)
        .map_err(|e| CoreError::Parse(format!("Failed to serialize agent YAML: {}", e)))
}

/// Generate BMAD markdown from a canonical agent record.
pub fn generate_markdown(agent: &AgentDefinition) -> String {
    let mut markdown = format!("# {}\n\n", agent.metadata.name);

    markdown.push_str(&format!("## Role\n\n{}\n\n", agent.persona.role));
    markdown.push_str(&format!("## Identity\n\n{}\n\n", agent.persona.identity));

    if let Some(style) = agent
        .persona
        .communication_style
        .as_ref()
        .filter(|s| !s.trim().is_empty())
    {
        markdown.push_str(&format!("## Communication Style\n\n{}\n\n", style));
    }

    if !agent.persona.principles.is_empty() {
        markdown.push_str("## Principles\n\n");
        for principle in &agent.persona.principles {
            markdown.push_str(&format!("- {}\n", principle));
        }
        markdown.push('\n');
    }

    if let Some(actions) = agent.critical_actions.as_ref().filter(|a| !a.is_empty()) {
        markdown.push_str("## Critical Actions\n\n");
        for action in actions {
            markdown.push_str(&format!("- {}\n", action));
        }
        markdown.push('\n');
    }

    if !agent.menu.is_empty() {
        markdown.push_str("## Workflows\n\n");
        for item in &agent.menu {
            let trigger = item.trigger.trim_start_matches('*');
            markdown.push_str(&format!("- *{} - {}\n", trigger, item.description));
        }
        markdown.push('\n');
    }

    markdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interop::markdown::parse_markdown;

    const SAMPLE: &str = r#"# Analyst

## Role

Requirements analyst

## Identity

Digs for the real problem behind a request

## Principles

- Evidence over opinion
- One question at a time

## Critical Actions

- check-config

## Workflows

- *plan - Run the project planning workflow
"#;

    #[test]
    fn test_generate_yaml_canonical_shape() {
        let parsed = parse_markdown(SAMPLE).unwrap();
        let yaml = generate_yaml(&parsed, "mam").unwrap();
        let file: AgentFile = serde_yaml::from_str(&yaml).unwrap();

        let agent = file.agent;
        assert_eq!(agent.metadata.id, "madace/mam/agents/analyst.md");
        assert_eq!(agent.metadata.module.as_deref(), Some("mam"));
        assert_eq!(agent.metadata.icon.as_deref(), Some("🤖"));
        assert_eq!(agent.menu.len(), 1);
        assert_eq!(agent.menu[0].trigger, "*plan");
        assert_eq!(
            agent.menu[0].action,
            MenuAction::Workflow("plan".to_string())
        );
        assert_eq!(
            agent.load_always.as_deref(),
            Some(&["madace/core/config.yaml".to_string()][..])
        );
    }

    #[test]
    fn test_round_trip_preserves_load_bearing_fields() {
        let parsed = parse_markdown(SAMPLE).unwrap();
        let yaml = generate_yaml(&parsed, "mam").unwrap();
        let file: AgentFile = serde_yaml::from_str(&yaml).unwrap();
        let markdown = generate_markdown(&file.agent);
        let reparsed = parse_markdown(&markdown).unwrap();

        assert_eq!(reparsed.role, parsed.role);
        assert_eq!(reparsed.identity, parsed.identity);
        assert_eq!(reparsed.principles, parsed.principles);
        assert_eq!(reparsed.critical_actions, parsed.critical_actions);
        assert_eq!(reparsed.workflows, parsed.workflows);
    }

    #[test]
    fn test_generate_markdown_skips_empty_style() {
        let parsed = parse_markdown(SAMPLE).unwrap();
        let agent = to_agent_definition(&parsed, "mam");
        let markdown = generate_markdown(&agent);
        assert!(!markdown.contains("## Communication Style"));
    }

    #[test]
    fn test_title_defaults_to_name_and_role() {
        let parsed = parse_markdown(SAMPLE).unwrap();
        let agent = to_agent_definition(&parsed, "mam");
        assert_eq!(agent.metadata.title, "Analyst - Requirements analyst");
    }
}
