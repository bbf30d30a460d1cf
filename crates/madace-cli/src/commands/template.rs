//! `madace template` — Render variable templates from the CLI.

use std::path::Path;

use console::style;
use madace_core::config::MadaceConfig;
use madace_core::template::{
    render_file, render_to_file, standard_variables, RenderOptions,
};

use super::{load_cli_config, vars_map};

/// Render a template with the standard config variables plus any
/// user-supplied `--var` pairs (user values win).
pub fn render(
    config_path: &str,
    template: &str,
    output: Option<&str>,
    vars: Vec<(String, String)>,
    strict: bool,
) -> Result<(), String> {
    // A missing config is fine here; fall back to defaults so templates
    // can be rendered outside an installed project.
    let config = match load_cli_config(config_path) {
        Ok(loaded) => loaded.config,
        Err(_) => MadaceConfig::default(),
    };

    let mut variables = standard_variables(&config);
    variables.extend(vars_map(vars));

    let options = if strict {
        RenderOptions::strict()
    } else {
        RenderOptions::default()
    };

    match output {
        Some(output) => {
            render_to_file(
                Path::new(template),
                Path::new(output),
                &variables,
                &options,
            )
            .map_err(|e| e.to_string())?;
            println!("{} Rendered {} -> {}", style("✓").green(), template, output);
        }
        None => {
            let rendered = render_file(Path::new(template), &variables, &options)
                .map_err(|e| e.to_string())?;
            print!("{}", rendered);
        }
    }
    Ok(())
}
