//! Workflow engine — YAML-defined step lists with durable execution state.
//!
//! # Architecture
//!
//! ```text
//! plan.workflow.yaml ──► WorkflowDefinition ──► WorkflowSession
//!                                                    │
//!                                     .plan.workflow.state.json (StateStore)
//!                                                    │
//!                                      StepResult (typed instruction)
//! ```
//!
//! The engine never performs LLM calls or file templating itself: each
//! executed step hands a typed instruction back to the caller describing
//! what must happen next.

pub mod schema;
pub mod session;
pub mod state;

pub use schema::{load_workflow, StepAction, WorkflowDefinition, WorkflowFile, WorkflowStep};
pub use session::{
    clear_state, load_state, StepInstruction, StepResult, WorkflowProgress, WorkflowSession,
};
pub use state::{state_file_path, StepState, StepStatus, WorkflowExecutionState, WorkflowStatus};
