//! The workflow status document format.
//!
//! ```markdown
//! # MAM Workflow Status
//!
//! **Current Phase:** Phase 4
//!
//! ---
//!
//! ## BACKLOG
//!
//! Stories to be drafted (ordered by priority):
//!
//! - [F32] Template engine (story-f32.md) [Points: 3]
//!
//! ## TODO
//! ...
//! ```
//!
//! Story lines carry the id in brackets, the title, the story filename
//! in parentheses, and optional `[Status: ...]`, `[Points: N]`, and
//! `[Date: YYYY-MM-DD]` tags.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Status a story carries inside its story file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryStatus {
    Draft,
    Ready,
    InReview,
    Done,
}

impl StoryStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Draft" => Some(StoryStatus::Draft),
            "Ready" => Some(StoryStatus::Ready),
            "In Review" => Some(StoryStatus::InReview),
            "Done" => Some(StoryStatus::Done),
            _ => None,
        }
    }
}

impl fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StoryStatus::Draft => "Draft",
            StoryStatus::Ready => "Ready",
            StoryStatus::InReview => "In Review",
            StoryStatus::Done => "Done",
        };
        f.write_str(label)
    }
}

/// One story entry in the status document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRecord {
    pub id: String,
    pub title: String,
    pub filename: String,
    pub status: Option<StoryStatus>,
    pub points: Option<u32>,
    /// Completion date, `YYYY-MM-DD`.
    pub date: Option<String>,
}

/// Parsed status document.
///
/// `todo` and `in_progress` are lists so a hand-edited document that
/// violates the one-story rule survives parsing; validation reports the
/// violation instead of silently dropping entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BacklogState {
    pub backlog: Vec<StoryRecord>,
    pub todo: Vec<StoryRecord>,
    pub in_progress: Vec<StoryRecord>,
    pub done: Vec<StoryRecord>,
    pub current_phase: Option<u32>,
}

impl BacklogState {
    pub fn todo_story(&self) -> Option<&StoryRecord> {
        self.todo.first()
    }

    pub fn in_progress_story(&self) -> Option<&StoryRecord> {
        self.in_progress.first()
    }

    pub fn current_phase(&self) -> u32 {
        self.current_phase.unwrap_or(4)
    }
}

fn id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([A-Z0-9-]+)\]").expect("static regex"))
}

fn filename_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^)]+\.md)\)").expect("static regex"))
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\]\s+([^(]+?)\s+\(").expect("static regex"))
}

fn status_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Status:\s*([^\]]+)\]").expect("static regex"))
}

fn points_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Points:\s*(\d+)").expect("static regex"))
}

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Date:\s*(\d{4}-\d{2}-\d{2})").expect("static regex"))
}

fn phase_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Phase (\d+)").expect("static regex"))
}

/// Parse one `- [ID] Title (file.md) [...]` line. Lines without an id
/// are not stories.
pub fn parse_story_line(line: &str) -> Option<StoryRecord> {
    let id = id_re().captures(line)?.get(1)?.as_str().to_string();

    let filename = filename_re()
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let title = title_re()
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    let status = status_re()
        .captures(line)
        .and_then(|c| c.get(1))
        .and_then(|m| StoryStatus::parse(m.as_str()));
    let points = points_re()
        .captures(line)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok());
    let date = date_re()
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    Some(StoryRecord {
        id,
        title,
        filename,
        status,
        points,
        date,
    })
}

/// Format a story back into its status-document line.
pub fn format_story_line(story: &StoryRecord) -> String {
    let mut line = format!("- [{}] {} ({})", story.id, story.title, story.filename);
    if let Some(status) = &story.status {
        line.push_str(&format!(" [Status: {}]", status));
    }
    if let Some(points) = story.points {
        line.push_str(&format!(" [Points: {}]", points));
    }
    if let Some(date) = &story.date {
        line.push_str(&format!(" [Date: {}]", date));
    }
    line
}

/// Parse a full status document into structured state.
pub fn parse_status_document(content: &str) -> BacklogState {
    #[derive(Clone, Copy, PartialEq)]
    enum Section {
        None,
        Backlog,
        Todo,
        InProgress,
        Done,
    }

    let mut state = BacklogState::default();
    let mut section = Section::None;

    for line in content.lines() {
        if line.contains("**Current Phase:**") {
            if let Some(caps) = phase_re().captures(line) {
                state.current_phase = caps[1].parse().ok();
            }
        }

        if line.starts_with("## BACKLOG") {
            section = Section::Backlog;
            continue;
        } else if line.starts_with("## TODO") {
            section = Section::Todo;
            continue;
        } else if line.starts_with("## IN PROGRESS") {
            section = Section::InProgress;
            continue;
        } else if line.starts_with("## DONE") {
            section = Section::Done;
            continue;
        }

        if section != Section::None && line.trim_start().starts_with('-') {
            if let Some(story) = parse_story_line(line) {
                match section {
                    Section::Backlog => state.backlog.push(story),
                    Section::Todo => state.todo.push(story),
                    Section::InProgress => state.in_progress.push(story),
                    Section::Done => state.done.push(story),
                    Section::None => {}
                }
            }
        }
    }

    state
}

/// Render structured state back into the status document.
pub fn generate_status_document(state: &BacklogState) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("# MAM Workflow Status".to_string());
    lines.push(String::new());
    lines.push(format!("**Current Phase:** Phase {}", state.current_phase()));
    lines.push(String::new());
    lines.push("---".to_string());
    lines.push(String::new());

    lines.push("## BACKLOG".to_string());
    lines.push(String::new());
    lines.push("Stories to be drafted (ordered by priority):".to_string());
    lines.push(String::new());
    if state.backlog.is_empty() {
        lines.push("_No stories in backlog_".to_string());
    } else {
        lines.extend(state.backlog.iter().map(format_story_line));
    }
    lines.push(String::new());

    lines.push("## TODO".to_string());
    lines.push(String::new());
    lines.push("Story ready for drafting (only ONE at a time):".to_string());
    lines.push(String::new());
    if state.todo.is_empty() {
        lines.push("_No story in TODO_".to_string());
    } else {
        lines.extend(state.todo.iter().map(format_story_line));
    }
    lines.push(String::new());

    lines.push("## IN PROGRESS".to_string());
    lines.push(String::new());
    lines.push("Story being implemented (only ONE at a time):".to_string());
    lines.push(String::new());
    if state.in_progress.is_empty() {
        lines.push("_No story in progress_".to_string());
    } else {
        lines.extend(state.in_progress.iter().map(format_story_line));
    }
    lines.push(String::new());

    lines.push("## DONE".to_string());
    lines.push(String::new());
    lines.push("Completed stories:".to_string());
    lines.push(String::new());
    if state.done.is_empty() {
        lines.push("_No completed stories_".to_string());
    } else {
        lines.extend(state.done.iter().map(format_story_line));
    }
    lines.push(String::new());

    lines.join("\n")
}

fn epic_story_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\*\*Story ([A-Z0-9]+)\*\*:\s*(.+?)\s*\((\d+)\s+points?\)")
            .expect("static regex")
    })
}

fn epic_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s+\*\*Story").expect("static regex"))
}

/// Extract story records from an Epics.md document.
///
/// Epic headers look like `### Epic 1: Foundation`; story lines are
/// numbered bullets of the form `1. **Story F31**: Title (3 points)`.
/// Stories outside any epic header are ignored.
pub fn extract_stories_from_epics(content: &str) -> Vec<StoryRecord> {
    let mut stories = Vec::new();
    let mut in_epic = false;

    for line in content.lines() {
        if line.starts_with("### Epic ") {
            in_epic = true;
            continue;
        }

        if in_epic && epic_line_re().is_match(line) {
            if let Some(caps) = epic_story_re().captures(line) {
                let id = caps[1].to_string();
                stories.push(StoryRecord {
                    filename: format!("story-{}.md", id.to_lowercase()),
                    id,
                    title: caps[2].trim().to_string(),
                    status: None,
                    points: caps[3].parse().ok(),
                    date: None,
                });
            }
        }
    }

    stories
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_story_line_full() {
        let story = parse_story_line(
            "- [F32] Template engine (story-f32.md) [Status: Ready] [Points: 3] [Date: 2026-08-20]",
        )
        .unwrap();
        assert_eq!(story.id, "F32");
        assert_eq!(story.title, "Template engine");
        assert_eq!(story.filename, "story-f32.md");
        assert_eq!(story.status, Some(StoryStatus::Ready));
        assert_eq!(story.points, Some(3));
        assert_eq!(story.date.as_deref(), Some("2026-08-20"));
    }

    #[test]
    fn test_parse_story_line_minimal() {
        let story = parse_story_line("- [F1] First story (story-f1.md)").unwrap();
        assert_eq!(story.id, "F1");
        assert!(story.status.is_none());
        assert!(story.points.is_none());
    }

    #[test]
    fn test_line_without_id_is_not_a_story() {
        assert!(parse_story_line("_No stories in backlog_").is_none());
        assert!(parse_story_line("- just a note").is_none());
    }

    #[test]
    fn test_format_round_trip() {
        let story = StoryRecord {
            id: "F32".to_string(),
            title: "Template engine".to_string(),
            filename: "story-f32.md".to_string(),
            status: Some(StoryStatus::InReview),
            points: Some(5),
            date: Some("2026-08-23".to_string()),
        };
        let line = format_story_line(&story);
        assert_eq!(
            line,
            "- [F32] Template engine (story-f32.md) [Status: In Review] [Points: 5] [Date: 2026-08-23]"
        );
        assert_eq!(parse_story_line(&line).unwrap(), story);
    }

    #[test]
    fn test_document_round_trip() {
        let state = BacklogState {
            backlog: vec![StoryRecord {
                id: "F3".to_string(),
                title: "Third".to_string(),
                filename: "story-f3.md".to_string(),
                status: None,
                points: Some(2),
                date: None,
            }],
            todo: vec![StoryRecord {
                id: "F2".to_string(),
                title: "Second".to_string(),
                filename: "story-f2.md".to_string(),
                status: Some(StoryStatus::Draft),
                points: Some(3),
                date: None,
            }],
            in_progress: vec![],
            done: vec![StoryRecord {
                id: "F1".to_string(),
                title: "First".to_string(),
                filename: "story-f1.md".to_string(),
                status: Some(StoryStatus::Done),
                points: Some(1),
                date: Some("2026-08-01".to_string()),
            }],
            current_phase: Some(4),
        };

        let doc = generate_status_document(&state);
        assert!(doc.contains("**Current Phase:** Phase 4"));
        assert!(doc.contains("_No story in progress_"));

        let reparsed = parse_status_document(&doc);
        assert_eq!(reparsed.backlog, state.backlog);
        assert_eq!(reparsed.todo, state.todo);
        assert!(reparsed.in_progress.is_empty());
        assert_eq!(reparsed.done, state.done);
        assert_eq!(reparsed.current_phase, Some(4));
    }

    #[test]
    fn test_empty_sections_render_placeholders() {
        let doc = generate_status_document(&BacklogState::default());
        assert!(doc.contains("_No stories in backlog_"));
        assert!(doc.contains("_No story in TODO_"));
        assert!(doc.contains("_No story in progress_"));
        assert!(doc.contains("_No completed stories_"));
        assert!(doc.contains("**Current Phase:** Phase 4"));
    }

    #[test]
    fn test_extract_stories_from_epics() {
        let epics = r#"## Epics

### Epic 1: Foundation

1. **Story F1**: Project scaffolding (2 points)
2. **Story F2**: Config loading (3 points)

### Epic 2: Engine

1. **Story E1**: Workflow executor (5 points)
"#;
        let stories = extract_stories_from_epics(epics);
        assert_eq!(stories.len(), 3);
        assert_eq!(stories[0].id, "F1");
        assert_eq!(stories[0].filename, "story-f1.md");
        assert_eq!(stories[0].points, Some(2));
        assert_eq!(stories[2].title, "Workflow executor");
    }

    #[test]
    fn test_epics_stories_outside_epics_ignored() {
        let content = "1. **Story X1**: Orphan (1 point)\n";
        assert!(extract_stories_from_epics(content).is_empty());
    }
}
