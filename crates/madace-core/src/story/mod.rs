//! Story lifecycle state machine.
//!
//! Stories move BACKLOG -> TODO -> IN PROGRESS -> DONE, with at most one
//! story in TODO and one in IN PROGRESS at any time. The single source
//! of truth is a markdown status document (`mam-workflow-status.md`);
//! every transition rewrites that document through the state store.

pub mod document;
pub mod machine;

pub use document::{
    extract_stories_from_epics, format_story_line, generate_status_document,
    parse_status_document, parse_story_line, BacklogState, StoryRecord, StoryStatus,
};
pub use machine::{StateValidation, StoryMachine};
