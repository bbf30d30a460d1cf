//! `madace agent` — Agent loading, listing, and format conversion.

use std::path::{Path, PathBuf};

use console::style;
use madace_core::agent::{
    load_agents_by_module, load_agents_from_directory, DirectoryLoad, LoadOptions, LoaderCache,
};
use madace_core::interop::converter::{
    batch_markdown_to_yaml, batch_yaml_to_markdown, markdown_file_to_yaml, yaml_file_to_markdown,
    ConversionOptions, ConversionResult,
};
use madace_core::runtime::{AgentRuntime, HistoryStatus};
use madace_core::storage::FsStateStore;

use super::load_cli_config;

/// Load an agent, run its critical actions, and display its persona and
/// menu.
pub fn load(config_path: &str, agent_path: &str) -> Result<(), String> {
    let config = load_cli_config(config_path)?;
    let store = FsStateStore;
    let mut cache = LoaderCache::new();
    let mut runtime = AgentRuntime::new(config, &store);

    let agent = runtime
        .load_agent(Path::new(agent_path), &mut cache)
        .map_err(|e| e.to_string())?;

    let icon = agent.metadata.icon.as_deref().unwrap_or("🤖");
    println!();
    println!(
        "{} {}",
        icon,
        style(&agent.metadata.title).cyan().bold()
    );
    println!("   {} {}", style("Role:").bold(), agent.persona.role);
    println!("   {} {}", style("Identity:").bold(), agent.persona.identity);
    if let Some(style_text) = agent
        .persona
        .communication_style
        .as_ref()
        .filter(|s| !s.trim().is_empty())
    {
        println!("   {} {}", style("Communication Style:").bold(), style_text);
    }

    for entry in runtime.history() {
        match entry.status {
            HistoryStatus::Completed => {
                println!("{} {}", style("✓").green(), entry.action)
            }
            HistoryStatus::Failed => println!(
                "{} {} ({})",
                style("✗").red(),
                entry.action,
                entry.error.as_deref().unwrap_or("failed")
            ),
        }
    }

    if !agent.menu.is_empty() {
        println!();
        println!("{}", style("📋 Available Commands:").cyan().bold());
        for item in &agent.menu {
            println!(
                "  {:<20} {}",
                style(&item.trigger).green(),
                item.description
            );
        }
    }
    println!();
    Ok(())
}

/// List agents from a directory or a module.
pub fn list(
    config_path: &str,
    dir: Option<&str>,
    module: Option<&str>,
    recursive: bool,
) -> Result<(), String> {
    let mut cache = LoaderCache::new();
    let options = LoadOptions {
        recursive,
        ..Default::default()
    };

    let loaded: DirectoryLoad = match (dir, module) {
        (Some(dir), _) => load_agents_from_directory(Path::new(dir), &options, &mut cache)
            .map_err(|e| e.to_string())?,
        (None, Some(module)) => {
            let config = load_cli_config(config_path)?;
            load_agents_by_module(module, &config.paths.project_root, &mut cache)
                .map_err(|e| e.to_string())?
        }
        (None, None) => return Err("Provide --dir or --module".to_string()),
    };

    if loaded.agents.is_empty() {
        println!("No agents found");
    }
    for agent in &loaded.agents {
        println!(
            "{} {:<20} {}",
            agent.metadata.icon.as_deref().unwrap_or("🤖"),
            style(&agent.metadata.name).green(),
            agent.metadata.title
        );
    }

    if !loaded.failures.is_empty() {
        println!();
        println!("{}", style("Skipped files:").yellow());
        for (path, error) in &loaded.failures {
            println!("  {} — {}", path.display(), error);
        }
    }
    Ok(())
}

/// Convert between BMAD markdown and MADACE YAML agent formats.
pub fn convert(
    input: &str,
    output: Option<&str>,
    to: &str,
    module: &str,
    batch: bool,
    skip_validation: bool,
) -> Result<(), String> {
    let options = ConversionOptions {
        output_path: output.filter(|_| !batch).map(PathBuf::from),
        target_module: Some(module.to_string()),
        skip_validation,
    };

    if batch {
        let output_dir = PathBuf::from(output.ok_or("--output directory required with --batch")?);
        let results = match to {
            "yaml" => batch_markdown_to_yaml(Path::new(input), &output_dir, &options),
            "markdown" | "md" => batch_yaml_to_markdown(Path::new(input), &output_dir, &options),
            other => return Err(format!("Unknown conversion target: {}", other)),
        }
        .map_err(|e| e.to_string())?;

        let succeeded = results.iter().filter(|r| r.success).count();
        println!("Converted {}/{} files", succeeded, results.len());
        for result in results.iter().filter(|r| !r.success) {
            println!("{} {}", style("✗").red(), result.errors.join("; "));
        }
        if succeeded < results.len() {
            return Err("some conversions failed".to_string());
        }
        return Ok(());
    }

    let result = match to {
        "yaml" => markdown_file_to_yaml(Path::new(input), &options),
        "markdown" | "md" => yaml_file_to_markdown(Path::new(input), &options),
        other => return Err(format!("Unknown conversion target: {}", other)),
    };
    report_single(result)
}

fn report_single(result: ConversionResult) -> Result<(), String> {
    for warning in &result.warnings {
        println!("{} {}", style("⚠").yellow(), warning);
    }
    if !result.success {
        return Err(result.errors.join("; "));
    }
    match &result.output_path {
        Some(path) => println!("{} Wrote {}", style("✓").green(), path.display()),
        None => print!("{}", result.output),
    }
    Ok(())
}
