//! YAML schema types for agent definitions.
//!
//! An agent YAML declares a persona plus a command menu:
//!
//! ```yaml
//! agent:
//!   metadata:
//!     id: madace/mam/agents/analyst.md
//!     name: Analyst
//!     title: Business Analyst
//!     icon: "📊"
//!     module: mam
//!     version: "1.0.0"
//!   persona:
//!     role: Requirements analyst
//!     identity: Digs for the real problem behind a request
//!     communication_style: Direct, asks one question at a time
//!     principles:
//!       - Evidence over opinion
//!   menu:
//!     - trigger: "*plan"
//!       action: "workflow:plan-project"
//!       description: Run the project planning workflow
//!   critical_actions:
//!     - check-config
//!     - create-output-folder
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Root wrapper: agent files nest everything under an `agent:` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentFile {
    pub agent: AgentDefinition,
}

/// A fully parsed agent definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub metadata: AgentMetadata,

    pub persona: Persona,

    #[serde(default)]
    pub menu: Vec<MenuItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_actions: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_always: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<Vec<PromptDef>>,
}

/// Agent identity block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMetadata {
    pub id: String,

    pub name: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Persona block — how the agent presents and reasons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub role: String,

    pub identity: String,

    #[serde(default)]
    pub communication_style: Option<String>,

    #[serde(default)]
    pub principles: Vec<String>,
}

/// A single menu entry: trigger string plus the action it dispatches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub trigger: String,

    pub action: MenuAction,

    pub description: String,
}

/// A named reusable prompt carried by the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDef {
    pub name: String,

    #[serde(default)]
    pub trigger: Option<String>,

    pub content: String,
}

/// Menu action, decoded from its string form once at load time.
///
/// The on-disk encoding is a prefixed string (`workflow:plan`,
/// `elicit:What is the goal?`, `guide:Run *plan first`); anything without
/// a known prefix is a custom action handled by the runtime dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MenuAction {
    Workflow(String),
    Elicit(String),
    Guide(String),
    Custom(String),
}

impl From<String> for MenuAction {
    fn from(raw: String) -> Self {
        if let Some(rest) = raw.strip_prefix("workflow:") {
            MenuAction::Workflow(rest.trim().to_string())
        } else if let Some(rest) = raw.strip_prefix("elicit:") {
            MenuAction::Elicit(rest.trim().to_string())
        } else if let Some(rest) = raw.strip_prefix("guide:") {
            MenuAction::Guide(rest.trim().to_string())
        } else {
            MenuAction::Custom(raw)
        }
    }
}

impl From<MenuAction> for String {
    fn from(action: MenuAction) -> Self {
        match action {
            MenuAction::Workflow(name) => format!("workflow:{}", name),
            MenuAction::Elicit(prompt) => format!("elicit:{}", prompt),
            MenuAction::Guide(text) => format!("guide:{}", text),
            MenuAction::Custom(raw) => raw,
        }
    }
}

impl MenuAction {
    /// True when the decoded action carries no payload at all.
    pub fn is_empty(&self) -> bool {
        match self {
            MenuAction::Workflow(s)
            | MenuAction::Elicit(s)
            | MenuAction::Guide(s)
            | MenuAction::Custom(s) => s.trim().is_empty(),
        }
    }
}

impl AgentDefinition {
    /// Validate mandatory fields beyond structural deserialization.
    ///
    /// `metadata.id/name/title` and `persona.role/identity` must be
    /// non-empty; every menu item needs a trigger, an action, and a
    /// description.
    pub fn validate(&self, source: &Path) -> Result<(), CoreError> {
        for (field, value) in [
            ("agent.metadata.id", &self.metadata.id),
            ("agent.metadata.name", &self.metadata.name),
            ("agent.metadata.title", &self.metadata.title),
            ("agent.persona.role", &self.persona.role),
            ("agent.persona.identity", &self.persona.identity),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::Validation(format!(
                    "Missing required field '{}' in {}",
                    field,
                    source.display()
                )));
            }
        }

        for (index, item) in self.menu.iter().enumerate() {
            if item.trigger.trim().is_empty() {
                return Err(CoreError::Validation(format!(
                    "Missing 'trigger' in menu item {} in {}",
                    index,
                    source.display()
                )));
            }
            if item.action.is_empty() {
                return Err(CoreError::Validation(format!(
                    "Missing 'action' in menu item {} in {}",
                    index,
                    source.display()
                )));
            }
            if item.description.trim().is_empty() {
                return Err(CoreError::Validation(format!(
                    "Missing 'description' in menu item {} in {}",
                    index,
                    source.display()
                )));
            }
        }

        Ok(())
    }

    /// Find a menu entry by its exact trigger string.
    pub fn menu_item(&self, trigger: &str) -> Option<&MenuItem> {
        self.menu.iter().find(|item| item.trigger == trigger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
agent:
  metadata:
    id: madace/core/agents/master.md
    name: Master
    title: MADACE Master
  persona:
    role: Orchestrator
    identity: Routes work to the right agent
"#;

    #[test]
    fn test_parse_minimal_agent() {
        let file: AgentFile = serde_yaml::from_str(MINIMAL).unwrap();
        assert_eq!(file.agent.metadata.name, "Master");
        assert!(file.agent.menu.is_empty());
        file.agent.validate(Path::new("master.agent.yaml")).unwrap();
    }

    #[test]
    fn test_menu_action_decoding() {
        assert_eq!(
            MenuAction::from("workflow:plan-project".to_string()),
            MenuAction::Workflow("plan-project".to_string())
        );
        assert_eq!(
            MenuAction::from("elicit: What is the goal?".to_string()),
            MenuAction::Elicit("What is the goal?".to_string())
        );
        assert_eq!(
            MenuAction::from("guide:Run *plan first".to_string()),
            MenuAction::Guide("Run *plan first".to_string())
        );
        assert_eq!(
            MenuAction::from("check-config".to_string()),
            MenuAction::Custom("check-config".to_string())
        );
    }

    #[test]
    fn test_menu_action_roundtrips_to_string() {
        let action = MenuAction::Workflow("plan".to_string());
        let encoded: String = action.clone().into();
        assert_eq!(encoded, "workflow:plan");
        assert_eq!(MenuAction::from(encoded), action);
    }

    #[test]
    fn test_validate_rejects_empty_menu_description() {
        let yaml = r#"
agent:
  metadata: { id: x, name: X, title: X }
  persona: { role: R, identity: I }
  menu:
    - trigger: "*go"
      action: "workflow:go"
      description: ""
"#;
        let file: AgentFile = serde_yaml::from_str(yaml).unwrap();
        let err = file.agent.validate(Path::new("x.agent.yaml")).unwrap_err();
        assert!(err.to_string().contains("description"));
        assert!(err.to_string().contains("menu item 0"));
    }

    #[test]
    fn test_validate_rejects_blank_role() {
        let yaml = r#"
agent:
  metadata: { id: x, name: X, title: X }
  persona: { role: "  ", identity: I }
"#;
        let file: AgentFile = serde_yaml::from_str(yaml).unwrap();
        let err = file.agent.validate(Path::new("x.agent.yaml")).unwrap_err();
        assert!(err.to_string().contains("agent.persona.role"));
    }
}
