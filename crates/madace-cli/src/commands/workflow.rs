//! `madace workflow` — Run, validate, and inspect workflow runs.

use std::path::Path;

use console::style;
use madace_core::storage::FsStateStore;
use madace_core::template::standard_variables;
use madace_core::workflow::{
    clear_state, load_state, load_workflow, StepInstruction, WorkflowSession,
};

use super::{load_cli_config, resolve_workflow, vars_map};

/// Run a workflow start to finish, printing each step instruction.
pub fn run(config_path: &str, name: &str, vars: Vec<(String, String)>) -> Result<(), String> {
    let path = resolve_workflow(config_path, name)?;
    let config = load_cli_config(config_path)?;
    let store = FsStateStore;

    let mut context = standard_variables(&config.config);
    context.insert(
        "madace_root".to_string(),
        config.paths.madace_root.display().to_string(),
    );
    context.insert(
        "project_root".to_string(),
        config.paths.project_root.display().to_string(),
    );
    context.extend(vars_map(vars));

    let mut session =
        WorkflowSession::initialize(&path, context, &store).map_err(|e| e.to_string())?;
    let total = session.state().total_steps;
    println!(
        "📄 Loaded workflow: {} ({})",
        session.definition().name,
        path.display()
    );
    println!("   {} step(s)", total);
    println!();

    for index in 0..total {
        let step_name = session.definition().steps[index].name.clone();
        let result = session
            .execute_step(index, Default::default())
            .map_err(|e| format!("Step '{}' failed: {}", step_name, e))?;
        print_instruction(index, total, &result.step_name, &result.instruction);
    }

    session.complete().map_err(|e| e.to_string())?;
    println!();
    println!("{} Workflow completed", style("✓").green());
    Ok(())
}

/// Validate a workflow YAML file without executing it.
pub fn validate(file: &str) -> Result<(), String> {
    let workflow = load_workflow(Path::new(file)).map_err(|e| e.to_string())?;
    println!(
        "{} {} — {} ({} steps)",
        style("✓").green(),
        workflow.name,
        workflow.description,
        workflow.steps.len()
    );
    for step in &workflow.steps {
        println!("  - {} [{}]", step.name, String::from(step.kind().clone()));
    }
    Ok(())
}

/// Show the persisted execution state of a workflow.
pub fn status(config_path: &str, name: &str, json: bool) -> Result<(), String> {
    let path = resolve_workflow(config_path, name)?;
    let store = FsStateStore;
    match load_state(&path, &store).map_err(|e| e.to_string())? {
        Some(state) if json => {
            let pretty = serde_json::to_string_pretty(&state).map_err(|e| e.to_string())?;
            println!("{}", pretty);
        }
        Some(state) => {
            let completed = state
                .steps
                .iter()
                .filter(|s| matches!(s.status, madace_core::workflow::StepStatus::Completed))
                .count();
            println!(
                "{} — {:?} ({}/{} steps completed)",
                state.workflow_name, state.status, completed, state.total_steps
            );
            for step in &state.steps {
                println!("  [{:?}] {}", step.status, step.step_name);
                if let Some(error) = &step.error {
                    println!("        {}", style(error).red());
                }
            }
        }
        None => println!("No saved state for {}", path.display()),
    }
    Ok(())
}

/// Remove the persisted execution state of a workflow.
pub fn clear(config_path: &str, name: &str) -> Result<(), String> {
    let path = resolve_workflow(config_path, name)?;
    let store = FsStateStore;
    clear_state(&path, &store).map_err(|e| e.to_string())?;
    println!("{} Cleared state for {}", style("✓").green(), path.display());
    Ok(())
}

fn print_instruction(index: usize, total: usize, step_name: &str, instruction: &StepInstruction) {
    let header = format!("[{}/{}] {}", index + 1, total, step_name);
    match instruction {
        StepInstruction::Elicitation { prompt } => {
            println!("{} {} {}", style(header).bold(), style("❓").cyan(), prompt)
        }
        StepInstruction::Reflection { prompt } => {
            println!("{} {} {}", style(header).bold(), style("💭").cyan(), prompt)
        }
        StepInstruction::Guidance { guidance } => println!(
            "{} {} {}",
            style(header).bold(),
            style("💡").blue(),
            guidance.as_deref().unwrap_or("(no guidance)")
        ),
        StepInstruction::TemplateRendering { template, output } => println!(
            "{} 📝 render {} -> {}",
            style(header).bold(),
            template,
            output.as_deref().unwrap_or("(stdout)")
        ),
        StepInstruction::Validation { rules } => println!(
            "{} ✅ validate ({} rules)",
            style(header).bold(),
            rules.len()
        ),
        StepInstruction::SubWorkflow { workflow } => println!(
            "{} ↳ sub-workflow {}",
            style(header).bold(),
            workflow
        ),
        StepInstruction::Custom { action } => {
            println!("{} ⚙ {}", style(header).bold(), action)
        }
    }
}
