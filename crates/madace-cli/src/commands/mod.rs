//! CLI command implementations.
//!
//! Each submodule corresponds to a top-level CLI command and reuses
//! the madace-core domain logic.

pub mod agent;
pub mod story;
pub mod template;
pub mod workflow;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use madace_core::config::{load_config, LoadedConfig};
use madace_core::interop::discovery::find_workflow_fs;

/// Load the MADACE configuration, mapping failures to CLI errors.
pub fn load_cli_config(config_path: &str) -> Result<LoadedConfig, String> {
    load_config(Path::new(config_path))
        .map_err(|e| format!("Failed to load config '{}': {}", config_path, e))
}

/// Resolve a workflow argument: an existing file path wins, otherwise
/// the name is searched under the framework root.
pub fn resolve_workflow(config_path: &str, name: &str) -> Result<PathBuf, String> {
    let direct = Path::new(name);
    if direct.is_file() {
        return Ok(direct.to_path_buf());
    }

    let config = load_cli_config(config_path)?;
    find_workflow_fs(&config.paths.project_root, name)
        .ok_or_else(|| format!("Workflow not found: {}", name))
}

/// Parse a `key=value` CLI variable.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid key=value pair: '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Collect parsed `key=value` pairs into a variable map.
pub fn vars_map(vars: Vec<(String, String)>) -> HashMap<String, String> {
    vars.into_iter().collect()
}
