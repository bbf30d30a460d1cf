//! File-level conversion between BMAD markdown and MADACE YAML agents.
//!
//! Conversions never panic on bad input: the result records warnings and
//! errors so batch runs can report per-file outcomes.

use std::path::{Path, PathBuf};

use crate::agent::schema::AgentFile;
use crate::error::CoreError;
use crate::interop::generator::{generate_markdown, generate_yaml};
use crate::interop::markdown::parse_markdown;

/// Conversion options.
#[derive(Debug, Clone, Default)]
pub struct ConversionOptions {
    /// Where to write the converted content; `None` keeps it in memory.
    pub output_path: Option<PathBuf>,
    /// Target module for markdown → YAML conversion (default `mam`).
    pub target_module: Option<String>,
    /// Re-validate the generated output (default on).
    pub skip_validation: bool,
}

/// Outcome of one conversion.
#[derive(Debug, Default)]
pub struct ConversionResult {
    pub success: bool,
    pub output: String,
    pub output_path: Option<PathBuf>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ConversionResult {
    fn failure(error: String) -> Self {
        Self {
            errors: vec![error],
            ..Default::default()
        }
    }
}

/// Convert a BMAD markdown agent file to MADACE YAML.
pub fn markdown_file_to_yaml(markdown_path: &Path, options: &ConversionOptions) -> ConversionResult {
    let content = match std::fs::read_to_string(markdown_path) {
        Ok(content) => content,
        Err(e) => return ConversionResult::failure(CoreError::io(markdown_path, e).to_string()),
    };

    let parsed = match parse_markdown(&content) {
        Ok(parsed) => parsed,
        Err(e) => {
            return ConversionResult::failure(format!(
                "Conversion failed for {}: {}",
                markdown_path.display(),
                e
            ))
        }
    };

    let module = options.target_module.as_deref().unwrap_or("mam");
    let yaml = match generate_yaml(&parsed, module) {
        Ok(yaml) => yaml,
        Err(e) => return ConversionResult::failure(e.to_string()),
    };

    let mut result = ConversionResult {
        success: true,
        output: yaml,
        ..Default::default()
    };

    if !options.skip_validation {
        if let Err(e) = revalidate_yaml(&result.output, markdown_path) {
            result.success = false;
            result.errors.push(e.to_string());
            return result;
        }
    }

    if let Some(output_path) = &options.output_path {
        if let Err(e) = write_output(output_path, &result.output) {
            result.success = false;
            result.errors.push(e.to_string());
            return result;
        }
        result.output_path = Some(output_path.clone());
    }

    result
}

/// Convert a MADACE YAML agent file to BMAD markdown.
pub fn yaml_file_to_markdown(yaml_path: &Path, options: &ConversionOptions) -> ConversionResult {
    let content = match std::fs::read_to_string(yaml_path) {
        Ok(content) => content,
        Err(e) => return ConversionResult::failure(CoreError::io(yaml_path, e).to_string()),
    };

    let file: AgentFile = match serde_yaml::from_str(&content) {
        Ok(file) => file,
        Err(e) => {
            return ConversionResult::failure(format!(
                "Invalid MADACE agent in {}: {}",
                yaml_path.display(),
                e
            ))
        }
    };

    if !options.skip_validation {
        if let Err(e) = file.agent.validate(yaml_path) {
            return ConversionResult::failure(e.to_string());
        }
    }

    let markdown = generate_markdown(&file.agent);
    let mut result = ConversionResult {
        success: true,
        output: markdown,
        ..Default::default()
    };

    if let Some(output_path) = &options.output_path {
        if let Err(e) = write_output(output_path, &result.output) {
            result.success = false;
            result.errors.push(e.to_string());
            return result;
        }
        result.output_path = Some(output_path.clone());
    }

    result
}

/// Convert every `.md` agent in a directory to `.agent.yaml` files.
pub fn batch_markdown_to_yaml(
    input_dir: &Path,
    output_dir: &Path,
    options: &ConversionOptions,
) -> Result<Vec<ConversionResult>, CoreError> {
    batch_convert(input_dir, ".md", |file_name| {
        output_dir.join(file_name.replace(".md", ".agent.yaml"))
    }, |input, output| {
        markdown_file_to_yaml(
            input,
            &ConversionOptions {
                output_path: Some(output),
                ..options.clone()
            },
        )
    })
}

/// Convert every `.agent.yaml` agent in a directory to `.md` files.
pub fn batch_yaml_to_markdown(
    input_dir: &Path,
    output_dir: &Path,
    options: &ConversionOptions,
) -> Result<Vec<ConversionResult>, CoreError> {
    batch_convert(input_dir, ".agent.yaml", |file_name| {
        output_dir.join(file_name.replace(".agent.yaml", ".md"))
    }, |input, output| {
        yaml_file_to_markdown(
            input,
            &ConversionOptions {
                output_path: Some(output),
                ..options.clone()
            },
        )
    })
}

fn batch_convert(
    input_dir: &Path,
    suffix: &str,
    output_for: impl Fn(&str) -> PathBuf,
    convert: impl Fn(&Path, PathBuf) -> ConversionResult,
) -> Result<Vec<ConversionResult>, CoreError> {
    let entries = std::fs::read_dir(input_dir).map_err(|e| CoreError::io(input_dir, e))?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(suffix))
                .unwrap_or(false)
        })
        .collect();
    files.sort();

    let mut results = Vec::new();
    for input in files {
        let file_name = input
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        results.push(convert(&input, output_for(&file_name)));
    }

    Ok(results)
}

fn revalidate_yaml(yaml: &str, source: &Path) -> Result<(), CoreError> {
    let file: AgentFile = serde_yaml::from_str(yaml).map_err(|e| {
        CoreError::Validation(format!(
            "Generated YAML for {} failed to re-parse: {}",
            source.display(),
            e
        ))
    })?;
    file.agent.validate(source)
}

fn write_output(output_path: &Path, content: &str) -> Result<(), CoreError> {
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
    }
    std::fs::write(output_path, content).map_err(|e| CoreError::io(output_path, e))
}
