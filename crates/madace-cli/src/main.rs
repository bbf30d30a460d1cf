//! MADACE CLI — command-line interface for the agent/workflow core.
//!
//! Reuses the same core domain logic (madace-core) that backs the web
//! and desktop shells: agent loading, workflow execution with durable
//! state, the story state machine, templates, and BMAD conversion.

mod commands;

use clap::{Parser, Subcommand};

/// MADACE CLI — Agent workflow orchestration
#[derive(Parser)]
#[command(name = "madace", version, about = "MADACE CLI — Agent workflow orchestration")]
pub struct Cli {
    /// Path to the MADACE config file
    #[arg(
        long,
        env = "MADACE_CONFIG",
        default_value = "madace/core/config.yaml"
    )]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and inspect agents
    Agent {
        #[command(subcommand)]
        action: AgentAction,
    },

    /// Run YAML-defined workflows with durable state
    Workflow {
        #[command(subcommand)]
        action: WorkflowAction,
    },

    /// Drive the story backlog state machine
    Story {
        #[command(subcommand)]
        action: StoryAction,
    },

    /// Render variable templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },
}

#[derive(Subcommand)]
enum AgentAction {
    /// Load an agent, run its critical actions, and show its menu
    Load {
        /// Path to the agent YAML file
        path: String,
    },
    /// List agents in a directory or module
    List {
        /// Directory containing agent YAML files
        #[arg(long, conflicts_with = "module")]
        dir: Option<String>,
        /// Module name (e.g. "mam", or the legacy "bmm" spelling)
        #[arg(long)]
        module: Option<String>,
        /// Recurse into subdirectories
        #[arg(long, short = 'r')]
        recursive: bool,
    },
    /// Convert between BMAD markdown and MADACE YAML agents
    Convert {
        /// Input file (.md or .agent.yaml) or directory with --batch
        input: String,
        /// Output file or directory
        #[arg(long, short = 'o')]
        output: Option<String>,
        /// Conversion direction: "yaml" (md -> yaml) or "markdown" (yaml -> md)
        #[arg(long, default_value = "yaml")]
        to: String,
        /// Target module for generated agent ids
        #[arg(long, default_value = "mam")]
        module: String,
        /// Convert every matching file in the input directory
        #[arg(long)]
        batch: bool,
        /// Skip re-validating generated output
        #[arg(long)]
        skip_validation: bool,
    },
}

#[derive(Subcommand)]
enum WorkflowAction {
    /// Run a workflow start to finish, printing each step instruction
    Run {
        /// Workflow name (resolved under the framework root) or file path
        name: String,
        /// Extra context variables, key=value
        #[arg(long = "var", value_parser = commands::parse_key_val)]
        vars: Vec<(String, String)>,
    },
    /// Validate a workflow YAML file without executing it
    Validate {
        /// Path to the workflow YAML file
        file: String,
    },
    /// Show the persisted execution state of a workflow
    Status {
        /// Workflow name or file path
        name: String,
        /// Print the raw state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove the persisted execution state of a workflow
    Clear {
        /// Workflow name or file path
        name: String,
    },
}

#[derive(Subcommand)]
enum StoryAction {
    /// Show the status document and rule-check results
    Status {
        /// Path to the status file
        #[arg(long, default_value = "docs/mam-workflow-status.md")]
        file: String,
    },
    /// Initialize the status document from an Epics.md file
    Init {
        /// Path to the epics file
        #[arg(long, default_value = "docs/Epics.md")]
        epics: String,
        /// Path to the status file to create
        #[arg(long, default_value = "docs/mam-workflow-status.md")]
        file: String,
    },
    /// Move the next backlog story into TODO
    Next {
        #[arg(long, default_value = "docs/mam-workflow-status.md")]
        file: String,
    },
    /// Move the TODO story into IN PROGRESS (backfills TODO)
    Start {
        #[arg(long, default_value = "docs/mam-workflow-status.md")]
        file: String,
    },
    /// Move the IN PROGRESS story to DONE
    Done {
        #[arg(long, default_value = "docs/mam-workflow-status.md")]
        file: String,
    },
}

#[derive(Subcommand)]
enum TemplateAction {
    /// Render a template file with config and user-supplied variables
    Render {
        /// Path to the template file
        template: String,
        /// Output file; prints to stdout when omitted
        #[arg(long, short = 'o')]
        output: Option<String>,
        /// Template variables, key=value
        #[arg(long = "var", value_parser = commands::parse_key_val)]
        vars: Vec<(String, String)>,
        /// Fail on unresolved variables instead of removing them
        #[arg(long)]
        strict: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "madace_core=warn".into()),
        )
        .init();

    let config_path = cli.config.clone();
    let result = match cli.command {
        Commands::Agent { action } => match action {
            AgentAction::Load { path } => commands::agent::load(&config_path, &path),
            AgentAction::List {
                dir,
                module,
                recursive,
            } => commands::agent::list(&config_path, dir.as_deref(), module.as_deref(), recursive),
            AgentAction::Convert {
                input,
                output,
                to,
                module,
                batch,
                skip_validation,
            } => commands::agent::convert(
                &input,
                output.as_deref(),
                &to,
                &module,
                batch,
                skip_validation,
            ),
        },

        Commands::Workflow { action } => match action {
            WorkflowAction::Run { name, vars } => {
                commands::workflow::run(&config_path, &name, vars)
            }
            WorkflowAction::Validate { file } => commands::workflow::validate(&file),
            WorkflowAction::Status { name, json } => {
                commands::workflow::status(&config_path, &name, json)
            }
            WorkflowAction::Clear { name } => commands::workflow::clear(&config_path, &name),
        },

        Commands::Story { action } => match action {
            StoryAction::Status { file } => commands::story::status(&file),
            StoryAction::Init { epics, file } => commands::story::init(&epics, &file),
            StoryAction::Next { file } => commands::story::next(&file),
            StoryAction::Start { file } => commands::story::start(&file),
            StoryAction::Done { file } => commands::story::done(&file),
        },

        Commands::Template { action } => match action {
            TemplateAction::Render {
                template,
                output,
                vars,
                strict,
            } => commands::template::render(
                &config_path,
                &template,
                output.as_deref(),
                vars,
                strict,
            ),
        },
    };

    if let Err(e) = result {
        eprintln!("{} {}", console::style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}
