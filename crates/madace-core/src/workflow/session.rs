//! Caller-owned workflow run.
//!
//! A `WorkflowSession` ties a loaded definition to its persisted state
//! and a `StateStore`. Every state transition is written through the
//! store before control returns to the caller, so a crash between steps
//! loses at most the step that was in flight.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::storage::StateStore;
use crate::workflow::schema::{load_workflow, StepAction, WorkflowDefinition, WorkflowStep};
use crate::workflow::state::{
    state_file_path, StepStatus, WorkflowExecutionState, WorkflowStatus,
};

/// What the caller must do to carry out an executed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepInstruction {
    Elicitation {
        prompt: String,
    },
    Reflection {
        prompt: String,
    },
    Guidance {
        guidance: Option<String>,
    },
    TemplateRendering {
        template: String,
        output: Option<String>,
    },
    Validation {
        rules: Vec<String>,
    },
    SubWorkflow {
        workflow: String,
    },
    Custom {
        action: String,
    },
}

/// Result of executing one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step_name: String,
    pub action: StepAction,
    pub timestamp: String,
    #[serde(flatten)]
    pub instruction: StepInstruction,
    pub context: HashMap<String, String>,
}

/// Progress counts derived from the persisted state.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowProgress {
    pub workflow_name: String,
    pub status: WorkflowStatus,
    pub current_step: usize,
    pub total_steps: usize,
    pub completed: usize,
    pub failed: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub percent_complete: f64,
}

/// An in-flight workflow run backed by a state store.
pub struct WorkflowSession<'a> {
    definition: WorkflowDefinition,
    state: WorkflowExecutionState,
    state_path: PathBuf,
    store: &'a dyn StateStore,
}

impl<'a> WorkflowSession<'a> {
    /// Load a workflow and start a fresh run, persisting the initial
    /// state before returning.
    pub fn initialize(
        workflow_path: &Path,
        context: HashMap<String, String>,
        store: &'a dyn StateStore,
    ) -> Result<Self, CoreError> {
        let definition = load_workflow(workflow_path)?;
        let state = WorkflowExecutionState::new(&definition, workflow_path, context);
        let session = Self {
            definition,
            state,
            state_path: state_file_path(workflow_path),
            store,
        };
        session.save()?;
        tracing::info!(
            "[WorkflowSession] Initialized '{}' ({} steps)",
            session.state.workflow_name,
            session.state.total_steps
        );
        Ok(session)
    }

    /// Resume a previous run from its sidecar state file. Returns
    /// `Ok(None)` when no state has been persisted for this workflow.
    pub fn resume(workflow_path: &Path, store: &'a dyn StateStore) -> Result<Option<Self>, CoreError> {
        let state_path = state_file_path(workflow_path);
        let Some(content) = store.read(&state_path)? else {
            return Ok(None);
        };
        let state = WorkflowExecutionState::from_json(&content)?;
        let definition = load_workflow(workflow_path)?;
        Ok(Some(Self {
            definition,
            state,
            state_path,
            store,
        }))
    }

    /// Mark this run as a sub-workflow of `parent` and persist.
    pub fn set_parent(&mut self, parent: &str) -> Result<(), CoreError> {
        self.state.parent_workflow = Some(parent.to_string());
        self.save()
    }

    /// Execute the step at `index`.
    ///
    /// State is persisted twice: once with the step in progress, once
    /// with its final status. A step whose definition cannot be turned
    /// into an instruction is marked failed, the whole run is marked
    /// failed, and the error is returned.
    pub fn execute_step(
        &mut self,
        index: usize,
        step_context: HashMap<String, String>,
    ) -> Result<StepResult, CoreError> {
        if index >= self.definition.steps.len() {
            return Err(CoreError::Validation(format!(
                "Invalid step index: {} (workflow has {} steps)",
                index,
                self.definition.steps.len()
            )));
        }

        self.state.steps[index].status = StepStatus::InProgress;
        self.state.steps[index].started_at = Some(Utc::now().to_rfc3339());
        self.state.current_step = index;
        self.state.status = WorkflowStatus::Running;
        self.save()?;

        let step = self.definition.steps[index].clone();
        match build_instruction(&step) {
            Ok(instruction) => {
                self.state.steps[index].status = StepStatus::Completed;
                self.state.steps[index].completed_at = Some(Utc::now().to_rfc3339());
                self.save()?;

                Ok(StepResult {
                    step_name: step.name.clone(),
                    action: step.kind().clone(),
                    timestamp: Utc::now().to_rfc3339(),
                    instruction,
                    context: step_context,
                })
            }
            Err(e) => {
                self.state.steps[index].status = StepStatus::Failed;
                self.state.steps[index].error = Some(e.to_string());
                self.state.steps[index].completed_at = Some(Utc::now().to_rfc3339());
                self.state.status = WorkflowStatus::Failed;
                self.save()?;
                tracing::warn!(
                    "[WorkflowSession] Step '{}' failed: {}",
                    step.name,
                    e
                );
                Err(e)
            }
        }
    }

    /// Mark the run completed and persist the final state.
    pub fn complete(&mut self) -> Result<&WorkflowExecutionState, CoreError> {
        self.state.status = WorkflowStatus::Completed;
        self.state.completed_at = Some(Utc::now().to_rfc3339());
        self.save()?;
        tracing::info!(
            "[WorkflowSession] Completed '{}'",
            self.state.workflow_name
        );
        Ok(&self.state)
    }

    /// Remove the persisted state for this run.
    pub fn clear(self) -> Result<(), CoreError> {
        self.store.remove(&self.state_path)
    }

    pub fn progress(&self) -> WorkflowProgress {
        let count = |status: StepStatus| {
            self.state.steps.iter().filter(|s| s.status == status).count()
        };
        let completed = count(StepStatus::Completed);
        WorkflowProgress {
            workflow_name: self.state.workflow_name.clone(),
            status: self.state.status,
            current_step: self.state.current_step,
            total_steps: self.state.total_steps,
            completed,
            failed: count(StepStatus::Failed),
            pending: count(StepStatus::Pending),
            in_progress: count(StepStatus::InProgress),
            percent_complete: if self.state.total_steps == 0 {
                0.0
            } else {
                completed as f64 / self.state.total_steps as f64 * 100.0
            },
        }
    }

    pub fn state(&self) -> &WorkflowExecutionState {
        &self.state
    }

    pub fn definition(&self) -> &WorkflowDefinition {
        &self.definition
    }

    fn save(&self) -> Result<(), CoreError> {
        self.store.write(&self.state_path, &self.state.to_json()?)
    }
}

/// Read persisted state for a workflow without constructing a session.
pub fn load_state(
    workflow_path: &Path,
    store: &dyn StateStore,
) -> Result<Option<WorkflowExecutionState>, CoreError> {
    let state_path = state_file_path(workflow_path);
    match store.read(&state_path)? {
        Some(content) => Ok(Some(WorkflowExecutionState::from_json(&content)?)),
        None => Ok(None),
    }
}

/// Remove persisted state for a workflow. Missing state is not an error.
pub fn clear_state(workflow_path: &Path, store: &dyn StateStore) -> Result<(), CoreError> {
    store.remove(&state_file_path(workflow_path))
}

fn build_instruction(step: &WorkflowStep) -> Result<StepInstruction, CoreError> {
    match step.kind() {
        StepAction::Elicit => Ok(StepInstruction::Elicitation {
            prompt: step
                .prompt
                .clone()
                .unwrap_or_else(|| "Please provide input".to_string()),
        }),
        StepAction::Reflect => Ok(StepInstruction::Reflection {
            prompt: step
                .prompt
                .clone()
                .unwrap_or_else(|| "Please reflect on the following".to_string()),
        }),
        StepAction::Guide => Ok(StepInstruction::Guidance {
            guidance: step.guidance.clone().or_else(|| step.prompt.clone()),
        }),
        StepAction::Template => Ok(StepInstruction::TemplateRendering {
            template: step.template.clone().ok_or_else(|| {
                CoreError::Validation(format!(
                    "Step '{}' has action 'template' but no 'template' field",
                    step.name
                ))
            })?,
            output: step.output.clone(),
        }),
        StepAction::Validate => Ok(StepInstruction::Validation {
            rules: step.rules.clone().unwrap_or_default(),
        }),
        StepAction::SubWorkflow => Ok(StepInstruction::SubWorkflow {
            workflow: step.workflow.clone().ok_or_else(|| {
                CoreError::Validation(format!(
                    "Step '{}' has action 'sub-workflow' but no 'workflow' field",
                    step.name
                ))
            })?,
        }),
        StepAction::Custom(action) => Ok(StepInstruction::Custom {
            action: action.clone(),
        }),
    }
}
