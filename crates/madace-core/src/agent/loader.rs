//! Agent file loading with an explicit, caller-owned cache.
//!
//! Loaded agents are cached by the absolute form of the path they were
//! requested with; a second load for the same file is served from the
//! cache without touching the filesystem, even when the two requests
//! spell the path differently. The cache is a plain value the caller owns
//! and passes by reference, no process-global state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::agent::schema::{AgentDefinition, AgentFile};
use crate::error::CoreError;
use crate::interop::discovery;

/// Caller-owned cache of loaded agent definitions, keyed by absolute
/// file path.
#[derive(Debug, Default)]
pub struct LoaderCache {
    entries: HashMap<PathBuf, Arc<AgentDefinition>>,
}

impl LoaderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key: the lexically absolute form of the request path.
    /// Purely lexical, so a cached entry stays reachable after the file
    /// is deleted.
    fn key(path: &Path) -> PathBuf {
        std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
    }

    /// Look up a cached agent without loading.
    pub fn get(&self, path: &Path) -> Option<Arc<AgentDefinition>> {
        self.entries.get(&Self::key(path)).cloned()
    }

    pub fn insert(&mut self, path: PathBuf, agent: Arc<AgentDefinition>) {
        self.entries.insert(Self::key(&path), agent);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Options for directory loads.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub recursive: bool,
    /// Glob-style file name pattern, e.g. `*.agent.yaml`.
    pub pattern: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            pattern: "*.agent.yaml".to_string(),
        }
    }
}

/// Outcome of a batch directory load: the agents that parsed plus a record
/// of the files that did not.
#[derive(Debug, Default)]
pub struct DirectoryLoad {
    pub agents: Vec<Arc<AgentDefinition>>,
    pub failures: Vec<(PathBuf, CoreError)>,
}

/// Load and validate a single agent YAML file.
///
/// Fails with `NotFound` if the file is absent, `Parse` on malformed
/// YAML, and `Validation` when the structure is wrong or required fields
/// are missing. A cache hit returns without filesystem access.
pub fn load_agent(path: &Path, cache: &mut LoaderCache) -> Result<Arc<AgentDefinition>, CoreError> {
    if let Some(cached) = cache.get(path) {
        tracing::debug!("[AgentLoader] Cache hit for {}", path.display());
        return Ok(cached);
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if ext != "yaml" && ext != "yml" {
        return Err(CoreError::Validation(format!(
            "Invalid agent file extension '.{}' for {}: expected .yaml or .yml",
            ext,
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;

    // Two stages: YAML syntax errors are parse errors, shape mismatches
    // against the schema are validation errors.
    let value: serde_yaml::Value = serde_yaml::from_str(&content).map_err(|e| {
        CoreError::Parse(format!("YAML parsing error in {}: {}", path.display(), e))
    })?;
    let file: AgentFile = serde_yaml::from_value(value).map_err(|e| {
        CoreError::Validation(format!("Agent validation failed in {}: {}", path.display(), e))
    })?;

    file.agent.validate(path)?;

    let agent = Arc::new(file.agent);
    cache.insert(path.to_path_buf(), Arc::clone(&agent));
    tracing::info!("[AgentLoader] Loaded agent '{}' from {}", agent.metadata.name, path.display());

    Ok(agent)
}

/// Load every matching agent file in a directory.
///
/// Individual failures are logged and recorded, never fatal: a directory
/// of N files with one corrupt entry yields N−1 agents plus one recorded
/// failure.
pub fn load_agents_from_directory(
    dir: &Path,
    options: &LoadOptions,
    cache: &mut LoaderCache,
) -> Result<DirectoryLoad, CoreError> {
    if !dir.is_dir() {
        return Err(CoreError::NotFound(format!("Directory not found: {}", dir.display())));
    }

    let pattern = glob::Pattern::new(&options.pattern)
        .map_err(|e| CoreError::Validation(format!("Invalid file pattern '{}': {}", options.pattern, e)))?;

    let mut files = Vec::new();
    collect_files(dir, &pattern, options.recursive, &mut files)?;
    files.sort();

    let mut load = DirectoryLoad::default();
    for file in files {
        match load_agent(&file, cache) {
            Ok(agent) => load.agents.push(agent),
            Err(err) => {
                tracing::warn!("[AgentLoader] Failed to load agent {}: {}", file.display(), err);
                load.failures.push((file, err));
            }
        }
    }

    Ok(load)
}

fn collect_files(
    dir: &Path,
    pattern: &glob::Pattern,
    recursive: bool,
    out: &mut Vec<PathBuf>,
) -> Result<(), CoreError> {
    let entries = std::fs::read_dir(dir).map_err(|e| CoreError::io(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| CoreError::io(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                collect_files(&path, pattern, recursive, out)?;
            }
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if pattern.matches(name) {
                out.push(path);
            }
        }
    }

    Ok(())
}

/// Load every agent belonging to a module, probing both naming
/// conventions (`madace/mam`, `bmad/bmm`, ...) for the agents directory.
pub fn load_agents_by_module(
    module: &str,
    root: &Path,
    cache: &mut LoaderCache,
) -> Result<DirectoryLoad, CoreError> {
    let dir = discovery::resolve_agent_directory(root, module, &|p| p.is_dir()).ok_or_else(|| {
        CoreError::NotFound(format!(
            "No agent directory found for module '{}' under {} (checked all framework and module aliases)",
            module,
            root.display()
        ))
    })?;

    load_agents_from_directory(&dir, &LoadOptions::default(), cache)
}
