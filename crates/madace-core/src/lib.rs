//! MADACE Core — declarative agent/workflow orchestration domain.
//!
//! This crate contains the orchestration core behind the MADACE tooling:
//! loading and validating agent/workflow definition files, rendering
//! templates, driving step-by-step workflow execution with durable state,
//! enforcing the story backlog lifecycle, and converting between the
//! MADACE YAML and BMAD Markdown agent formats.
//!
//! It has **no CLI or HTTP dependency**, making it suitable for use in:
//!
//! - CLI tools (via `madace-cli`)
//! - Web backends / desktop shells
//! - Test harnesses driving the engines directly

pub mod agent;
pub mod config;
pub mod error;
pub mod interop;
pub mod runtime;
pub mod storage;
pub mod story;
pub mod template;
pub mod workflow;

// Convenience re-exports
pub use error::CoreError;
pub use runtime::AgentRuntime;
