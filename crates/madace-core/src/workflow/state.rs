//! Durable workflow execution state.
//!
//! State is persisted as JSON in a dot-file next to the workflow
//! definition (`plan.workflow.yaml` -> `.plan.workflow.state.json`) so
//! an interrupted run can be resumed or inspected later. Field names
//! stay camelCase on disk for compatibility with existing state files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::workflow::schema::WorkflowDefinition;

/// Overall run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Initialized,
    Running,
    Completed,
    Failed,
}

/// Per-step status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// Recorded state of one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepState {
    pub step_index: usize,
    pub step_name: String,
    pub status: StepStatus,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub error: Option<String>,
}

/// The full persisted run record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowExecutionState {
    pub workflow_name: String,
    pub workflow_path: PathBuf,
    pub status: WorkflowStatus,
    pub current_step: usize,
    pub total_steps: usize,
    pub steps: Vec<StepState>,
    pub started_at: String,
    pub completed_at: Option<String>,
    #[serde(default)]
    pub context: HashMap<String, String>,
    /// Set when this run was launched as a sub-workflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_workflow: Option<String>,
}

impl WorkflowExecutionState {
    /// Fresh state for a run that has not executed any step yet.
    pub fn new(
        definition: &WorkflowDefinition,
        workflow_path: &Path,
        context: HashMap<String, String>,
    ) -> Self {
        Self {
            workflow_name: definition.name.clone(),
            workflow_path: workflow_path.to_path_buf(),
            status: WorkflowStatus::Initialized,
            current_step: 0,
            total_steps: definition.steps.len(),
            steps: definition
                .steps
                .iter()
                .enumerate()
                .map(|(index, step)| StepState {
                    step_index: index,
                    step_name: step.name.clone(),
                    status: StepStatus::Pending,
                    started_at: None,
                    completed_at: None,
                    error: None,
                })
                .collect(),
            started_at: Utc::now().to_rfc3339(),
            completed_at: None,
            context,
            parent_workflow: None,
        }
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::Parse(format!("Failed to serialize workflow state: {}", e)))
    }

    pub fn from_json(content: &str) -> Result<Self, CoreError> {
        serde_json::from_str(content)
            .map_err(|e| CoreError::Parse(format!("Failed to parse workflow state: {}", e)))
    }
}

/// The sidecar state file for a workflow definition:
/// `<dir>/.<stem>.state.json`, where the stem drops only the final
/// extension (`plan.workflow.yaml` keeps the `plan.workflow` part).
pub fn state_file_path(workflow_path: &Path) -> PathBuf {
    let stem = workflow_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("workflow");
    let dir = workflow_path.parent().unwrap_or_else(|| Path::new("."));
    dir.join(format!(".{}.state.json", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::schema::{StepAction, WorkflowStep};

    fn sample_definition() -> WorkflowDefinition {
        WorkflowDefinition {
            name: "plan-project".to_string(),
            description: "Planning".to_string(),
            steps: vec![
                WorkflowStep {
                    name: "gather".to_string(),
                    action: Some(StepAction::Elicit),
                    legacy_type: None,
                    prompt: None,
                    guidance: None,
                    template: None,
                    output: None,
                    rules: None,
                    workflow: None,
                },
                WorkflowStep {
                    name: "write".to_string(),
                    action: Some(StepAction::Template),
                    legacy_type: None,
                    prompt: None,
                    guidance: None,
                    template: Some("plan.md".to_string()),
                    output: None,
                    rules: None,
                    workflow: None,
                },
            ],
            dependencies: None,
        }
    }

    #[test]
    fn test_state_file_path_keeps_inner_dots() {
        let path = Path::new("/ws/workflows/plan.workflow.yaml");
        assert_eq!(
            state_file_path(path),
            PathBuf::from("/ws/workflows/.plan.workflow.state.json")
        );
    }

    #[test]
    fn test_new_state_mirrors_definition() {
        let definition = sample_definition();
        let state = WorkflowExecutionState::new(
            &definition,
            Path::new("/ws/plan.yaml"),
            HashMap::new(),
        );
        assert_eq!(state.status, WorkflowStatus::Initialized);
        assert_eq!(state.total_steps, 2);
        assert_eq!(state.current_step, 0);
        assert_eq!(state.steps[1].step_name, "write");
        assert!(state.steps.iter().all(|s| s.status == StepStatus::Pending));
    }

    #[test]
    fn test_json_round_trip_camel_case() {
        let definition = sample_definition();
        let state = WorkflowExecutionState::new(
            &definition,
            Path::new("/ws/plan.yaml"),
            HashMap::from([("user_name".to_string(), "Sam".to_string())]),
        );
        let json = state.to_json().unwrap();
        assert!(json.contains("\"workflowName\""));
        assert!(json.contains("\"totalSteps\""));
        assert!(json.contains("\"in_progress\"") || json.contains("\"pending\""));

        let restored = WorkflowExecutionState::from_json(&json).unwrap();
        assert_eq!(restored.workflow_name, "plan-project");
        assert_eq!(restored.context.get("user_name").unwrap(), "Sam");
    }
}
