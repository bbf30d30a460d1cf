//! Configuration loading and validation.
//!
//! The canonical config file lives at `<framework root>/core/config.yaml`.
//! Paths are computed from its location: the framework root is the config
//! file's grandparent directory and the project root is its parent.
//!
//! ```yaml
//! project_name: "My Project"
//! user_name: "Alice"
//! output_folder: "docs"
//! communication_language: "English"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// MADACE configuration record, merged with defaults on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MadaceConfig {
    pub project_name: String,

    pub user_name: String,

    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    #[serde(default = "default_language")]
    pub communication_language: String,

    #[serde(default = "default_version")]
    pub madace_version: String,
}

fn default_output_folder() -> String {
    "docs".to_string()
}

fn default_language() -> String {
    "English".to_string()
}

fn default_version() -> String {
    "1.0.0-alpha.1".to_string()
}

impl Default for MadaceConfig {
    fn default() -> Self {
        Self {
            project_name: "MADACE Project".to_string(),
            user_name: "User".to_string(),
            output_folder: default_output_folder(),
            communication_language: default_language(),
            madace_version: default_version(),
        }
    }
}

/// Filesystem paths computed from the config file location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigPaths {
    pub madace_root: PathBuf,
    pub project_root: PathBuf,
    pub config_file: PathBuf,
    pub output_folder: PathBuf,
}

/// A loaded configuration plus its computed paths.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: MadaceConfig,
    pub paths: ConfigPaths,
}

/// Load and validate a configuration file.
///
/// Fails with `NotFound` if absent, `Parse` on malformed YAML, and
/// `Validation` when `project_name` or `user_name` is missing or empty.
pub fn load_config(config_path: &Path) -> Result<LoadedConfig, CoreError> {
    let content =
        std::fs::read_to_string(config_path).map_err(|e| CoreError::io(config_path, e))?;

    // Two stages: YAML syntax errors are parse errors, a missing or
    // mistyped required field is a validation error.
    let value: serde_yaml::Value = serde_yaml::from_str(&content).map_err(|e| {
        CoreError::Parse(format!("YAML parsing error in {}: {}", config_path.display(), e))
    })?;
    let config: MadaceConfig = serde_yaml::from_value(value).map_err(|e| {
        CoreError::Validation(format!(
            "Invalid configuration in {}: {}",
            config_path.display(),
            e
        ))
    })?;

    validate_config(&config, config_path)?;

    // core/config.yaml -> framework root -> project root
    let madace_root = config_path
        .parent()
        .and_then(|p| p.parent())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    let project_root = madace_root
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    let output_folder = project_root.join(&config.output_folder);

    let paths = ConfigPaths {
        madace_root,
        project_root,
        config_file: config_path.to_path_buf(),
        output_folder,
    };

    tracing::info!(
        "[Config] Loaded configuration for '{}' from {}",
        config.project_name,
        config_path.display()
    );

    Ok(LoadedConfig { config, paths })
}

fn validate_config(config: &MadaceConfig, path: &Path) -> Result<(), CoreError> {
    for (field, value) in [
        ("project_name", &config.project_name),
        ("user_name", &config.user_name),
    ] {
        if value.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Missing required field '{}' in {}",
                field,
                path.display()
            )));
        }
    }
    Ok(())
}

/// Result of an installation integrity check.
#[derive(Debug, Default)]
pub struct InstallationReport {
    pub valid: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}

/// Check the framework directory skeleton under `root`.
///
/// `core/config.yaml` must exist; missing agent/workflow directories are
/// warnings, not failures, since a fresh install may not have them yet.
pub fn validate_installation(root: &Path) -> InstallationReport {
    let mut report = InstallationReport {
        valid: true,
        ..Default::default()
    };

    if !root.is_dir() {
        report.valid = false;
        report
            .issues
            .push(format!("Framework root does not exist: {}", root.display()));
        return report;
    }

    let config_file = root.join("core").join("config.yaml");
    if !config_file.is_file() {
        report.valid = false;
        report
            .issues
            .push(format!("Missing configuration file: {}", config_file.display()));
    }

    for sub in ["core/agents", "core/workflows"] {
        let dir = root.join(sub);
        if !dir.is_dir() {
            report
                .warnings
                .push(format!("Missing directory: {}", dir.display()));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_merges_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let core = dir.path().join("madace").join("core");
        std::fs::create_dir_all(&core).unwrap();
        let path = core.join("config.yaml");
        std::fs::write(&path, "project_name: Demo\nuser_name: Alice\n").unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.config.project_name, "Demo");
        assert_eq!(loaded.config.output_folder, "docs");
        assert_eq!(loaded.config.communication_language, "English");
        assert_eq!(loaded.paths.madace_root, dir.path().join("madace"));
        assert_eq!(loaded.paths.project_root, dir.path());
        assert_eq!(loaded.paths.output_folder, dir.path().join("docs"));
    }

    #[test]
    fn test_load_config_missing_required_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "project_name: Demo\nuser_name: \"\"\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().contains("user_name"));
    }

    #[test]
    fn test_load_config_absent_required_key_is_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "project_name: Demo\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().contains("user_name"));
    }

    #[test]
    fn test_load_config_malformed_yaml_is_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "project_name: [unclosed\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, CoreError::Parse(_)));
    }

    #[test]
    fn test_load_config_not_found() {
        let err = load_config(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn test_validate_installation_reports_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let report = validate_installation(dir.path());
        assert!(!report.valid);
        assert!(report.issues[0].contains("config.yaml"));
    }
}
