//! Agent runtime.
//!
//! Loads an agent with its full execution context, runs its critical
//! actions, and dispatches menu commands. The runtime owns no caches
//! and no store: the loader cache and the state store are passed in by
//! the caller, so two runtimes can share or isolate them as needed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::agent::loader::{load_agent, LoaderCache};
use crate::agent::schema::{AgentDefinition, MenuAction};
use crate::config::{validate_installation, LoadedConfig};
use crate::error::CoreError;
use crate::interop::discovery::{candidate_dirs, find_workflow_fs, ALL_MODULES};
use crate::storage::StateStore;
use crate::workflow::session::WorkflowSession;
use crate::workflow::state::WorkflowExecutionState;

/// Flat variable map handed to templates and workflows when an agent
/// acts. Built from the agent definition plus the loaded config.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    vars: HashMap<String, String>,
}

impl ExecutionContext {
    pub fn build(agent: &AgentDefinition, config: &LoadedConfig) -> Self {
        let mut vars = HashMap::new();

        vars.insert("agent_id".to_string(), agent.metadata.id.clone());
        vars.insert("agent_name".to_string(), agent.metadata.name.clone());
        vars.insert("agent_title".to_string(), agent.metadata.title.clone());
        vars.insert(
            "agent_icon".to_string(),
            agent
                .metadata
                .icon
                .clone()
                .unwrap_or_else(|| "🤖".to_string()),
        );

        vars.insert("role".to_string(), agent.persona.role.clone());
        vars.insert("identity".to_string(), agent.persona.identity.clone());
        vars.insert(
            "communication_style".to_string(),
            agent.persona.communication_style.clone().unwrap_or_default(),
        );
        vars.insert(
            "principles".to_string(),
            agent.persona.principles.join("\n"),
        );

        vars.insert("user_name".to_string(), config.config.user_name.clone());
        vars.insert(
            "project_name".to_string(),
            config.config.project_name.clone(),
        );
        vars.insert(
            "communication_language".to_string(),
            config.config.communication_language.clone(),
        );

        vars.insert(
            "madace_root".to_string(),
            config.paths.madace_root.display().to_string(),
        );
        vars.insert(
            "project_root".to_string(),
            config.paths.project_root.display().to_string(),
        );
        vars.insert(
            "output_folder".to_string(),
            config.paths.output_folder.display().to_string(),
        );

        vars.insert("loaded_at".to_string(), Utc::now().to_rfc3339());
        vars.insert(
            "session_id".to_string(),
            format!("session-{}", Uuid::new_v4()),
        );

        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn vars(&self) -> &HashMap<String, String> {
        &self.vars
    }
}

/// What a dispatched menu command asks the caller to do.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// A workflow was found and its run initialized.
    Workflow {
        name: String,
        path: PathBuf,
        state: WorkflowExecutionState,
    },
    Elicit {
        prompt: String,
    },
    Guide {
        guidance: String,
    },
    Custom {
        action: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    CriticalAction,
    MenuCommand,
    SubWorkflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStatus {
    Completed,
    Failed,
}

/// One entry in the runtime's execution history.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub kind: HistoryKind,
    pub action: String,
    pub timestamp: String,
    pub status: HistoryStatus,
    pub error: Option<String>,
}

/// Orchestrates one agent at a time against a loaded configuration.
pub struct AgentRuntime<'a> {
    config: LoadedConfig,
    store: &'a dyn StateStore,
    current: Option<Arc<AgentDefinition>>,
    context: Option<ExecutionContext>,
    history: Vec<HistoryEntry>,
}

impl<'a> AgentRuntime<'a> {
    pub fn new(config: LoadedConfig, store: &'a dyn StateStore) -> Self {
        Self {
            config,
            store,
            current: None,
            context: None,
            history: Vec::new(),
        }
    }

    /// Load an agent, build its execution context, and run its critical
    /// actions.
    ///
    /// A failing critical action is recorded in the history and logged
    /// but does not fail the load; agents must stay usable on a partially
    /// broken installation.
    pub fn load_agent(
        &mut self,
        path: &Path,
        cache: &mut LoaderCache,
    ) -> Result<Arc<AgentDefinition>, CoreError> {
        let agent = load_agent(path, cache)?;
        self.context = Some(ExecutionContext::build(&agent, &self.config));

        if let Some(actions) = agent.critical_actions.clone() {
            for action in &actions {
                match self.run_action(action) {
                    Ok(()) => self.record(HistoryKind::CriticalAction, action, None),
                    Err(e) => {
                        tracing::warn!(
                            "[AgentRuntime] Critical action '{}' failed: {}",
                            action,
                            e
                        );
                        self.record(HistoryKind::CriticalAction, action, Some(e.to_string()));
                    }
                }
            }
        }

        tracing::info!(
            "[AgentRuntime] Loaded agent '{}' ({})",
            agent.metadata.name,
            agent.metadata.id
        );
        self.current = Some(agent.clone());
        Ok(agent)
    }

    /// Drop the current agent and its context. History is kept.
    pub fn unload_agent(&mut self) {
        self.current = None;
        self.context = None;
    }

    /// Dispatch a menu command by its exact trigger.
    pub fn execute_command(&mut self, trigger: &str) -> Result<CommandOutcome, CoreError> {
        let agent = self
            .current
            .clone()
            .ok_or_else(|| CoreError::Validation("No agent loaded".to_string()))?;

        let item = agent
            .menu_item(trigger)
            .ok_or_else(|| CoreError::CommandNotFound(trigger.to_string()))?;

        let outcome = match &item.action {
            MenuAction::Workflow(name) => self.start_workflow(name)?,
            MenuAction::Elicit(prompt) => CommandOutcome::Elicit {
                prompt: prompt.clone(),
            },
            MenuAction::Guide(guidance) => CommandOutcome::Guide {
                guidance: guidance.clone(),
            },
            MenuAction::Custom(action) => {
                self.run_action(action)?;
                CommandOutcome::Custom {
                    action: action.clone(),
                }
            }
        };

        self.record(HistoryKind::MenuCommand, trigger, None);
        Ok(outcome)
    }

    /// Launch a workflow as a child of `parent`, merging `parent_context`
    /// over the agent context (parent values win on conflicts).
    pub fn execute_sub_workflow(
        &mut self,
        workflow_path: &Path,
        parent_context: &HashMap<String, String>,
        parent: &str,
    ) -> Result<WorkflowExecutionState, CoreError> {
        let mut merged = self
            .context
            .as_ref()
            .map(|c| c.vars().clone())
            .unwrap_or_default();
        merged.extend(parent_context.clone());

        let mut session = WorkflowSession::initialize(workflow_path, merged, self.store)?;
        session.set_parent(parent)?;
        let state = session.state().clone();

        self.record(
            HistoryKind::SubWorkflow,
            &workflow_path.display().to_string(),
            None,
        );
        Ok(state)
    }

    pub fn current_agent(&self) -> Option<&Arc<AgentDefinition>> {
        self.current.as_ref()
    }

    pub fn context(&self) -> Option<&ExecutionContext> {
        self.context.as_ref()
    }

    pub fn config(&self) -> &LoadedConfig {
        &self.config
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn start_workflow(&mut self, name: &str) -> Result<CommandOutcome, CoreError> {
        let path = find_workflow_fs(&self.config.paths.project_root, name)
            .ok_or_else(|| CoreError::WorkflowNotFound(name.to_string()))?;

        let context = self
            .context
            .as_ref()
            .map(|c| c.vars().clone())
            .unwrap_or_default();
        let session = WorkflowSession::initialize(&path, context, self.store)?;
        let state = session.state().clone();

        Ok(CommandOutcome::Workflow {
            name: state.workflow_name.clone(),
            path,
            state,
        })
    }

    /// Run one named action. Used both for critical actions at load
    /// time and for custom menu actions.
    fn run_action(&self, action: &str) -> Result<(), CoreError> {
        match action {
            "check-config" => {
                tracing::info!(
                    "[AgentRuntime] Configuration OK for '{}'",
                    self.config.config.project_name
                );
                Ok(())
            }
            "validate-installation" => {
                let report = validate_installation(&self.config.paths.madace_root);
                for warning in &report.warnings {
                    tracing::warn!("[AgentRuntime] {}", warning);
                }
                if report.valid {
                    Ok(())
                } else {
                    Err(CoreError::Validation(format!(
                        "Installation validation failed: {}",
                        report.issues.join("; ")
                    )))
                }
            }
            "load-manifest" => {
                let (agents, workflows) = self.count_definitions();
                tracing::info!(
                    "[AgentRuntime] Manifests loaded: {} agents, {} workflows",
                    agents,
                    workflows
                );
                Ok(())
            }
            "create-output-folder" => {
                let folder = &self.config.paths.output_folder;
                std::fs::create_dir_all(folder).map_err(|e| CoreError::io(folder, e))?;
                tracing::info!("[AgentRuntime] Output folder ready: {}", folder.display());
                Ok(())
            }
            other => {
                tracing::info!("[AgentRuntime] Custom action: {}", other);
                Ok(())
            }
        }
    }

    fn count_definitions(&self) -> (usize, usize) {
        let root = &self.config.paths.project_root;
        let count = |kind: &str, suffix: &str| {
            ALL_MODULES
                .iter()
                .flat_map(|module| candidate_dirs(root, module, kind))
                .filter(|dir| dir.is_dir())
                .flat_map(|dir| std::fs::read_dir(dir).into_iter().flatten().flatten())
                .filter(|entry| {
                    entry
                        .file_name()
                        .to_str()
                        .map(|n| n.ends_with(suffix))
                        .unwrap_or(false)
                })
                .count()
        };
        (count("agents", ".agent.yaml"), count("workflows", ".yaml"))
    }

    fn record(&mut self, kind: HistoryKind, action: &str, error: Option<String>) {
        self.history.push(HistoryEntry {
            kind,
            action: action.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            status: if error.is_none() {
                HistoryStatus::Completed
            } else {
                HistoryStatus::Failed
            },
            error,
        });
    }
}
