//! Workflow YAML schema.
//!
//! A workflow file carries a single `workflow:` root key:
//!
//! ```yaml
//! workflow:
//!   name: plan-project
//!   description: Guided project planning
//!   steps:
//!     - name: gather-goals
//!       action: elicit
//!       prompt: What are the project goals?
//!     - name: write-plan
//!       action: template
//!       template: plan.template.md
//!       output: "{output_folder}/plan.md"
//! ```
//!
//! Steps may spell their kind as `action:` or the older `type:`; both
//! deserialize and `normalize` folds them into `action`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Root document wrapper (`workflow:` key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowFile {
    pub workflow: WorkflowDefinition,
}

/// A workflow definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    pub description: String,
    pub steps: Vec<WorkflowStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,
}

/// One step of a workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub name: String,
    /// The step kind. Older files spell this `type:`; `normalize` folds
    /// that spelling into this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<StepAction>,
    #[serde(default, rename = "type", skip_serializing)]
    pub legacy_type: Option<StepAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<String>>,
    /// Sub-workflow name, for `sub-workflow` steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<String>,
}

impl WorkflowStep {
    /// The normalized step kind. Panics only if called before
    /// `WorkflowDefinition::normalize`, which rejects kind-less steps.
    pub fn kind(&self) -> &StepAction {
        self.action
            .as_ref()
            .or(self.legacy_type.as_ref())
            .expect("step kind resolved during load")
    }
}

/// The closed set of step kinds. Unknown strings land in `Custom` so a
/// workflow can carry site-specific steps without schema changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepAction {
    Elicit,
    Reflect,
    Guide,
    Template,
    Validate,
    SubWorkflow,
    Custom(String),
}

impl From<String> for StepAction {
    fn from(value: String) -> Self {
        match value.trim() {
            "elicit" => StepAction::Elicit,
            "reflect" => StepAction::Reflect,
            "guide" => StepAction::Guide,
            "template" => StepAction::Template,
            "validate" => StepAction::Validate,
            "sub-workflow" => StepAction::SubWorkflow,
            other => StepAction::Custom(other.to_string()),
        }
    }
}

impl From<StepAction> for String {
    fn from(action: StepAction) -> Self {
        match action {
            StepAction::Elicit => "elicit".to_string(),
            StepAction::Reflect => "reflect".to_string(),
            StepAction::Guide => "guide".to_string(),
            StepAction::Template => "template".to_string(),
            StepAction::Validate => "validate".to_string(),
            StepAction::SubWorkflow => "sub-workflow".to_string(),
            StepAction::Custom(other) => other,
        }
    }
}

impl WorkflowDefinition {
    /// Normalize and validate a freshly parsed definition.
    ///
    /// Folds legacy `type:` spellings into `action` and rejects empty
    /// names, empty step lists, and steps with no kind at all.
    pub fn normalize(&mut self, source: &Path) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Missing required field 'workflow.name' in {}",
                source.display()
            )));
        }
        if self.description.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Missing required field 'workflow.description' in {}",
                source.display()
            )));
        }
        if self.steps.is_empty() {
            return Err(CoreError::Validation(format!(
                "Invalid 'workflow.steps' in {}: expected non-empty list",
                source.display()
            )));
        }

        for (index, step) in self.steps.iter_mut().enumerate() {
            if step.name.trim().is_empty() {
                return Err(CoreError::Validation(format!(
                    "Missing 'name' in step {} in {}",
                    index,
                    source.display()
                )));
            }
            if step.action.is_none() {
                match step.legacy_type.take() {
                    Some(kind) => step.action = Some(kind),
                    None => {
                        return Err(CoreError::Validation(format!(
                            "Missing 'action' or 'type' in step {} in {}",
                            index,
                            source.display()
                        )))
                    }
                }
            }
            step.legacy_type = None;
        }

        Ok(())
    }
}

/// Load, parse, and normalize a workflow YAML file.
pub fn load_workflow(path: &Path) -> Result<WorkflowDefinition, CoreError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    if !matches!(extension.as_deref(), Some("yaml") | Some("yml")) {
        return Err(CoreError::Validation(format!(
            "Invalid workflow file extension for {}: expected .yaml or .yml",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;

    // Parse in two stages so malformed YAML and schema mismatches
    // surface as different errors.
    let value: serde_yaml::Value = serde_yaml::from_str(&content)
        .map_err(|e| CoreError::Parse(format!("YAML parsing error in {}: {}", path.display(), e)))?;
    let file: WorkflowFile = serde_yaml::from_value(value).map_err(|e| {
        CoreError::Validation(format!("Invalid workflow structure in {}: {}", path.display(), e))
    })?;

    let mut workflow = file.workflow;
    workflow.normalize(path)?;
    tracing::debug!(
        "[WorkflowEngine] Loaded '{}' ({} steps) from {}",
        workflow.name,
        workflow.steps.len(),
        path.display()
    );
    Ok(workflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKFLOW: &str = r#"
workflow:
  name: plan-project
  description: Guided project planning
  steps:
    - name: gather-goals
      action: elicit
      prompt: What are the project goals?
    - name: assess
      type: reflect
    - name: write-plan
      action: template
      template: plan.template.md
      output: docs/plan.md
"#;

    #[test]
    fn test_load_workflow_normalizes_type_spelling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.workflow.yaml");
        std::fs::write(&path, WORKFLOW).unwrap();

        let workflow = load_workflow(&path).unwrap();
        assert_eq!(workflow.name, "plan-project");
        assert_eq!(workflow.steps.len(), 3);
        assert_eq!(*workflow.steps[0].kind(), StepAction::Elicit);
        assert_eq!(*workflow.steps[1].kind(), StepAction::Reflect);
        assert!(workflow.steps[1].legacy_type.is_none());
        assert_eq!(*workflow.steps[2].kind(), StepAction::Template);
    }

    #[test]
    fn test_unknown_action_becomes_custom() {
        let action = StepAction::from("deploy-preview".to_string());
        assert_eq!(action, StepAction::Custom("deploy-preview".to_string()));
        assert_eq!(String::from(action), "deploy-preview");
    }

    #[test]
    fn test_load_workflow_rejects_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.workflow.json");
        std::fs::write(&path, "{}").unwrap();

        let err = load_workflow(&path).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().contains("extension"));
    }

    #[test]
    fn test_load_workflow_missing_file() {
        let err = load_workflow(Path::new("/nope/plan.workflow.yaml")).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "workflow: [unclosed").unwrap();

        let err = load_workflow(&path).unwrap_err();
        assert!(matches!(err, CoreError::Parse(_)));
    }

    #[test]
    fn test_empty_steps_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.yaml");
        std::fs::write(
            &path,
            "workflow:\n  name: x\n  description: y\n  steps: []\n",
        )
        .unwrap();

        let err = load_workflow(&path).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().contains("steps"));
    }

    #[test]
    fn test_step_without_kind_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nokind.yaml");
        std::fs::write(
            &path,
            "workflow:\n  name: x\n  description: y\n  steps:\n    - name: only-name\n",
        )
        .unwrap();

        let err = load_workflow(&path).unwrap_err();
        assert!(err.to_string().contains("step 0"));
    }
}
