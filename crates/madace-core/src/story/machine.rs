//! Transitions over the status document.
//!
//! Every transition rewrites the whole document through the state
//! store, so the file on disk is always a complete, consistent
//! rendering of the current state.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::CoreError;
use crate::storage::StateStore;
use crate::story::document::{
    extract_stories_from_epics, generate_status_document, parse_status_document, BacklogState,
    StoryRecord, StoryStatus,
};

/// Outcome of checking the one-story rules.
#[derive(Debug, Clone)]
pub struct StateValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Caller-owned handle on a status document.
pub struct StoryMachine<'a> {
    path: PathBuf,
    state: BacklogState,
    store: &'a dyn StateStore,
}

impl<'a> StoryMachine<'a> {
    /// Load the status document. Missing documents are `NotFound`.
    pub fn load(path: &Path, store: &'a dyn StateStore) -> Result<Self, CoreError> {
        let content = store.read(path)?.ok_or_else(|| {
            CoreError::NotFound(format!("Status file not found: {}", path.display()))
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            state: parse_status_document(&content),
            store,
        })
    }

    /// Create a fresh status document from an Epics.md file.
    ///
    /// The first extracted story lands in TODO with status Draft; the
    /// rest form the backlog in epic order. Phase starts at 4, the
    /// implementation phase.
    pub fn initialize_from_epics(
        status_path: &Path,
        epics_path: &Path,
        store: &'a dyn StateStore,
    ) -> Result<Self, CoreError> {
        let epics_content = store.read(epics_path)?.ok_or_else(|| {
            CoreError::NotFound(format!("Epics file not found: {}", epics_path.display()))
        })?;

        let mut stories: VecDeque<StoryRecord> =
            extract_stories_from_epics(&epics_content).into();
        let todo = stories.pop_front().map(|mut story| {
            story.status = Some(StoryStatus::Draft);
            story
        });

        let machine = Self {
            path: status_path.to_path_buf(),
            state: BacklogState {
                backlog: stories.into(),
                todo: todo.into_iter().collect(),
                in_progress: Vec::new(),
                done: Vec::new(),
                current_phase: Some(4),
            },
            store,
        };
        machine.save()?;
        tracing::info!(
            "[StoryMachine] Initialized {} with {} stories",
            status_path.display(),
            machine.state.backlog.len() + machine.state.todo.len()
        );
        Ok(machine)
    }

    /// Check the one-story rules without mutating anything.
    pub fn validate(&self) -> StateValidation {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.state.todo.len() > 1 {
            errors.push("TODO section contains multiple stories - only ONE allowed".to_string());
        }
        if self.state.in_progress.len() > 1 {
            errors.push(
                "IN PROGRESS section contains multiple stories - only ONE allowed".to_string(),
            );
        }
        if self.state.todo.is_empty() && !self.state.backlog.is_empty() {
            warnings.push(
                "TODO is empty but BACKLOG has stories - consider moving next story to TODO"
                    .to_string(),
            );
        }
        if self.state.in_progress.is_empty() && !self.state.todo.is_empty() {
            warnings.push(
                "IN PROGRESS is empty but TODO has a story - consider reviewing and approving TODO story"
                    .to_string(),
            );
        }

        StateValidation {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Move the highest-priority backlog story into TODO as Draft.
    pub fn backlog_to_todo(&mut self) -> Result<StoryRecord, CoreError> {
        if !self.state.todo.is_empty() {
            return Err(CoreError::InvalidTransition(
                "Cannot move to TODO: TODO already contains a story".to_string(),
            ));
        }
        if self.state.backlog.is_empty() {
            return Err(CoreError::InvalidTransition(
                "Cannot move to TODO: BACKLOG is empty".to_string(),
            ));
        }

        let mut story = self.state.backlog.remove(0);
        story.status = Some(StoryStatus::Draft);
        self.state.todo.push(story.clone());
        self.save()?;
        Ok(story)
    }

    /// Move the TODO story into IN PROGRESS as Ready.
    ///
    /// TODO is backfilled in the same transition: when the backlog is
    /// non-empty, its next story moves into TODO as Draft, so the
    /// drafting slot never sits idle while work remains.
    pub fn todo_to_in_progress(&mut self) -> Result<StoryRecord, CoreError> {
        if !self.state.in_progress.is_empty() {
            return Err(CoreError::InvalidTransition(
                "Cannot move to IN PROGRESS: IN PROGRESS already contains a story".to_string(),
            ));
        }
        if self.state.todo.is_empty() {
            return Err(CoreError::InvalidTransition(
                "Cannot move to IN PROGRESS: TODO is empty".to_string(),
            ));
        }

        let mut story = self.state.todo.remove(0);
        story.status = Some(StoryStatus::Ready);
        self.state.in_progress.push(story.clone());

        if !self.state.backlog.is_empty() {
            let mut next = self.state.backlog.remove(0);
            next.status = Some(StoryStatus::Draft);
            self.state.todo.push(next);
        }

        self.save()?;
        Ok(story)
    }

    /// Move the IN PROGRESS story to DONE, stamping today's date.
    pub fn in_progress_to_done(&mut self) -> Result<StoryRecord, CoreError> {
        if self.state.in_progress.is_empty() {
            return Err(CoreError::InvalidTransition(
                "Cannot move to DONE: IN PROGRESS is empty".to_string(),
            ));
        }

        let mut story = self.state.in_progress.remove(0);
        story.status = Some(StoryStatus::Done);
        story.date = Some(Utc::now().format("%Y-%m-%d").to_string());
        self.state.done.push(story.clone());
        self.save()?;
        Ok(story)
    }

    pub fn state(&self) -> &BacklogState {
        &self.state
    }

    pub fn todo_story(&self) -> Option<&StoryRecord> {
        self.state.todo_story()
    }

    pub fn in_progress_story(&self) -> Option<&StoryRecord> {
        self.state.in_progress_story()
    }

    pub fn backlog(&self) -> &[StoryRecord] {
        &self.state.backlog
    }

    pub fn done(&self) -> &[StoryRecord] {
        &self.state.done
    }

    pub fn current_phase(&self) -> u32 {
        self.state.current_phase()
    }

    fn save(&self) -> Result<(), CoreError> {
        self.store
            .write(&self.path, &generate_status_document(&self.state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::MemStateStore;

    const EPICS: &str = r#"### Epic 1: Foundation

1. **Story F1**: Scaffolding (2 points)
2. **Story F2**: Config loading (3 points)
3. **Story F3**: Logging (1 point)
"#;

    fn seeded_machine<'a>(store: &'a MemStateStore) -> StoryMachine<'a> {
        let epics_path = Path::new("/ws/docs/Epics.md");
        store.write(epics_path, EPICS).unwrap();
        StoryMachine::initialize_from_epics(
            Path::new("/ws/docs/mam-workflow-status.md"),
            epics_path,
            store,
        )
        .unwrap()
    }

    #[test]
    fn test_initialize_from_epics_splits_todo_and_backlog() {
        let store = MemStateStore::new();
        let machine = seeded_machine(&store);

        let todo = machine.todo_story().unwrap();
        assert_eq!(todo.id, "F1");
        assert_eq!(todo.status, Some(StoryStatus::Draft));
        assert_eq!(machine.backlog().len(), 2);
        assert_eq!(machine.current_phase(), 4);
        assert!(store.contains(Path::new("/ws/docs/mam-workflow-status.md")));
    }

    #[test]
    fn test_full_lifecycle_with_todo_backfill() {
        let store = MemStateStore::new();
        let mut machine = seeded_machine(&store);

        let started = machine.todo_to_in_progress().unwrap();
        assert_eq!(started.id, "F1");
        assert_eq!(started.status, Some(StoryStatus::Ready));
        // TODO was backfilled from the backlog, so an explicit move is
        // rejected right away
        assert_eq!(machine.todo_story().unwrap().id, "F2");
        assert!(machine.backlog_to_todo().is_err());
        assert_eq!(machine.todo_story().unwrap().status, Some(StoryStatus::Draft));
        assert_eq!(machine.backlog().len(), 1);

        let done = machine.in_progress_to_done().unwrap();
        assert_eq!(done.id, "F1");
        assert_eq!(done.status, Some(StoryStatus::Done));
        assert!(done.date.is_some());
        assert!(machine.in_progress_story().is_none());
    }

    #[test]
    fn test_transitions_persist_through_store() {
        let store = MemStateStore::new();
        let mut machine = seeded_machine(&store);
        machine.todo_to_in_progress().unwrap();

        let reloaded =
            StoryMachine::load(Path::new("/ws/docs/mam-workflow-status.md"), &store).unwrap();
        assert_eq!(reloaded.in_progress_story().unwrap().id, "F1");
        assert_eq!(reloaded.todo_story().unwrap().id, "F2");
    }

    #[test]
    fn test_backlog_to_todo_fills_empty_slot() {
        let store = MemStateStore::new();
        let path = Path::new("/ws/docs/status.md");
        let doc = "\
# MAM Workflow Status

## BACKLOG

- [S1] First (story-s1.md)
- [S2] Second (story-s2.md)

## TODO

## IN PROGRESS

## DONE
";
        store.write(path, doc).unwrap();

        let mut machine = StoryMachine::load(path, &store).unwrap();
        let moved = machine.backlog_to_todo().unwrap();
        assert_eq!(moved.id, "S1");
        assert_eq!(moved.status, Some(StoryStatus::Draft));
        assert_eq!(machine.backlog().len(), 1);
        assert_eq!(machine.backlog()[0].id, "S2");

        let started = machine.todo_to_in_progress().unwrap();
        assert_eq!(started.id, "S1");
        assert_eq!(machine.todo_story().unwrap().id, "S2");
        assert!(machine.backlog().is_empty());
    }

    #[test]
    fn test_backlog_to_todo_rejects_occupied_slot() {
        let store = MemStateStore::new();
        let mut machine = seeded_machine(&store);

        let err = machine.backlog_to_todo().unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition(_)));
        assert!(err.to_string().contains("already contains"));
    }

    #[test]
    fn test_in_progress_to_done_requires_active_story() {
        let store = MemStateStore::new();
        let mut machine = seeded_machine(&store);

        let err = machine.in_progress_to_done().unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition(_)));
    }

    #[test]
    fn test_validate_flags_multi_occupancy() {
        let store = MemStateStore::new();
        let path = Path::new("/ws/docs/status.md");
        let doc = "\
# MAM Workflow Status

## TODO

- [A1] One (story-a1.md)
- [A2] Two (story-a2.md)

## IN PROGRESS

## DONE
";
        store.write(path, doc).unwrap();

        let machine = StoryMachine::load(path, &store).unwrap();
        let validation = machine.validate();
        assert!(!validation.valid);
        assert_eq!(validation.errors.len(), 1);
        assert!(validation.errors[0].contains("TODO"));
    }

    #[test]
    fn test_validate_warns_on_idle_slots() {
        let store = MemStateStore::new();
        let mut machine = seeded_machine(&store);
        // Fresh state: TODO filled, IN PROGRESS empty
        let validation = machine.validate();
        assert!(validation.valid);
        assert!(validation
            .warnings
            .iter()
            .any(|w| w.contains("IN PROGRESS is empty")));

        // Drain TODO and IN PROGRESS entirely
        machine.todo_to_in_progress().unwrap();
        machine.in_progress_to_done().unwrap();
        machine.todo_to_in_progress().unwrap();
        machine.in_progress_to_done().unwrap();
        machine.todo_to_in_progress().unwrap();
        machine.in_progress_to_done().unwrap();
        let validation = machine.validate();
        assert!(validation.valid);
        assert!(validation.warnings.is_empty());
    }

    #[test]
    fn test_load_missing_status_file() {
        let store = MemStateStore::new();
        match StoryMachine::load(Path::new("/nope/status.md"), &store) {
            Err(err) => assert!(matches!(err, CoreError::NotFound(_))),
            Ok(_) => panic!("expected load of a missing status file to fail"),
        }
    }
}
