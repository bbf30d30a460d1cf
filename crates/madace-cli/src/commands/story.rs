//! `madace story` — Backlog lifecycle transitions.

use std::path::Path;

use console::style;
use madace_core::storage::FsStateStore;
use madace_core::story::{format_story_line, StoryMachine, StoryRecord};

/// Show the status document sections and rule-check results.
pub fn status(file: &str) -> Result<(), String> {
    let store = FsStateStore;
    let machine = StoryMachine::load(Path::new(file), &store).map_err(|e| e.to_string())?;
    let state = machine.state();

    println!("{}", style("Current Phase:").bold());
    println!("  Phase {}", machine.current_phase());

    print_section("BACKLOG", &state.backlog);
    print_section("TODO", &state.todo);
    print_section("IN PROGRESS", &state.in_progress);
    print_section("DONE", &state.done);

    let validation = machine.validate();
    for error in &validation.errors {
        println!("{} {}", style("✗").red(), error);
    }
    for warning in &validation.warnings {
        println!("{} {}", style("⚠").yellow(), warning);
    }
    if !validation.valid {
        return Err("status file violates the one-story rules".to_string());
    }
    Ok(())
}

/// Initialize the status document from an Epics.md file.
pub fn init(epics: &str, file: &str) -> Result<(), String> {
    let store = FsStateStore;
    let machine = StoryMachine::initialize_from_epics(Path::new(file), Path::new(epics), &store)
        .map_err(|e| e.to_string())?;

    let total = machine.backlog().len() + machine.state().todo.len();
    println!(
        "{} Initialized {} with {} stories",
        style("✓").green(),
        file,
        total
    );
    if let Some(todo) = machine.todo_story() {
        println!("  TODO: {}", format_story_line(todo));
    }
    Ok(())
}

/// Move the next backlog story into TODO.
pub fn next(file: &str) -> Result<(), String> {
    let store = FsStateStore;
    let mut machine = StoryMachine::load(Path::new(file), &store).map_err(|e| e.to_string())?;
    let story = machine.backlog_to_todo().map_err(|e| e.to_string())?;
    println!("{} TODO: {}", style("✓").green(), format_story_line(&story));
    Ok(())
}

/// Move the TODO story into IN PROGRESS, backfilling TODO.
pub fn start(file: &str) -> Result<(), String> {
    let store = FsStateStore;
    let mut machine = StoryMachine::load(Path::new(file), &store).map_err(|e| e.to_string())?;
    let story = machine.todo_to_in_progress().map_err(|e| e.to_string())?;
    println!(
        "{} IN PROGRESS: {}",
        style("✓").green(),
        format_story_line(&story)
    );
    if let Some(todo) = machine.todo_story() {
        println!("  Backfilled TODO: {}", format_story_line(todo));
    }
    Ok(())
}

/// Move the IN PROGRESS story to DONE.
pub fn done(file: &str) -> Result<(), String> {
    let store = FsStateStore;
    let mut machine = StoryMachine::load(Path::new(file), &store).map_err(|e| e.to_string())?;
    let story = machine.in_progress_to_done().map_err(|e| e.to_string())?;
    println!("{} DONE: {}", style("✓").green(), format_story_line(&story));
    Ok(())
}

fn print_section(name: &str, stories: &[StoryRecord]) {
    println!();
    println!("{}", style(name).cyan().bold());
    if stories.is_empty() {
        println!("  (empty)");
    }
    for story in stories {
        println!("  {}", format_story_line(story));
    }
}
