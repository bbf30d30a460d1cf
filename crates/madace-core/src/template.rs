//! Template rendering with variable substitution.
//!
//! Four placeholder syntaxes are supported, each independently toggleable:
//!
//! - `{{variable_name}}` — primary pattern for Markdown templates
//! - `${variable_name}` — code/shell contexts
//! - `%VARIABLE_NAME%` — Windows environment variable style
//! - `$variable_name` — shell variable style (word boundary required)
//!
//! The default active set is the first two. Missing-variable policy is a
//! mode switch: lenient rendering substitutes an empty string, strict
//! rendering fails with `CoreError::MissingVariables` listing every
//! unresolved name.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::MadaceConfig;
use crate::error::CoreError;

/// A placeholder syntax recognized by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// `{{name}}`
    Mustache,
    /// `${name}`
    DollarBrace,
    /// `%NAME%`
    Percent,
    /// `$name` with a trailing word boundary
    Dollar,
}

impl Pattern {
    /// All supported patterns, in match priority order.
    pub const ALL: [Pattern; 4] = [
        Pattern::Mustache,
        Pattern::DollarBrace,
        Pattern::Percent,
        Pattern::Dollar,
    ];

    fn regex(&self) -> &'static Regex {
        static MUSTACHE: OnceLock<Regex> = OnceLock::new();
        static DOLLAR_BRACE: OnceLock<Regex> = OnceLock::new();
        static PERCENT: OnceLock<Regex> = OnceLock::new();
        static DOLLAR: OnceLock<Regex> = OnceLock::new();

        match self {
            Pattern::Mustache => {
                MUSTACHE.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("static regex"))
            }
            Pattern::DollarBrace => {
                DOLLAR_BRACE.get_or_init(|| Regex::new(r"\$\{(\w+)\}").expect("static regex"))
            }
            Pattern::Percent => {
                PERCENT.get_or_init(|| Regex::new(r"%(\w+)%").expect("static regex"))
            }
            Pattern::Dollar => {
                DOLLAR.get_or_init(|| Regex::new(r"\$(\w+)\b").expect("static regex"))
            }
        }
    }
}

/// Rendering options: which patterns are active and the missing-variable
/// policy.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub patterns: Vec<Pattern>,
    pub strict: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            patterns: vec![Pattern::Mustache, Pattern::DollarBrace],
            strict: false,
        }
    }
}

impl RenderOptions {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Default::default()
        }
    }
}

/// Outcome of a pre-flight template validation.
#[derive(Debug, Clone)]
pub struct TemplateValidation {
    pub valid: bool,
    pub found: Vec<String>,
    pub missing: Vec<String>,
    pub extra: Vec<String>,
}

/// Render template content with variable substitution.
///
/// Every active pattern is applied once. In strict mode the error lists
/// every unresolved name across all patterns, not just the first.
pub fn render(
    content: &str,
    variables: &HashMap<String, String>,
    options: &RenderOptions,
) -> Result<String, CoreError> {
    let mut rendered = content.to_string();
    let mut missing: BTreeSet<String> = BTreeSet::new();

    for pattern in &options.patterns {
        rendered = pattern
            .regex()
            .replace_all(&rendered, |caps: &regex::Captures| {
                let name = &caps[1];
                match variables.get(name) {
                    Some(value) => value.clone(),
                    None => {
                        missing.insert(name.to_string());
                        if options.strict {
                            // Keep the placeholder so the error points at real text
                            caps[0].to_string()
                        } else {
                            String::new()
                        }
                    }
                }
            })
            .to_string();
    }

    if options.strict && !missing.is_empty() {
        return Err(CoreError::MissingVariables(missing.into_iter().collect()));
    }

    Ok(rendered)
}

/// Render with nested resolution: variables whose values contain further
/// placeholders are re-rendered, up to `max_depth` passes (default 5).
///
/// Stops early at a fixed point (no change between passes). Hitting the
/// depth cap without stabilizing is a warning, not a failure — this is the
/// guard against circular references expanding forever. In strict mode a
/// final extraction pass reports anything still unresolved.
pub fn render_nested(
    content: &str,
    variables: &HashMap<String, String>,
    options: &RenderOptions,
    max_depth: usize,
) -> Result<String, CoreError> {
    let lenient = RenderOptions {
        patterns: options.patterns.clone(),
        strict: false,
    };

    let mut rendered = content.to_string();
    let mut depth = 0;

    while depth < max_depth {
        let previous = rendered.clone();
        rendered = render(&rendered, variables, &lenient)?;
        if rendered == previous {
            break;
        }
        depth += 1;
    }

    if depth == max_depth {
        tracing::warn!("[Template] Max nesting depth reached - possible circular reference");
    }

    if options.strict {
        let remaining = extract_variables(&rendered, &options.patterns);
        if !remaining.is_empty() {
            return Err(CoreError::MissingVariables(remaining));
        }
    }

    Ok(rendered)
}

/// Render a template file.
pub fn render_file(
    template_path: &Path,
    variables: &HashMap<String, String>,
    options: &RenderOptions,
) -> Result<String, CoreError> {
    let content =
        std::fs::read_to_string(template_path).map_err(|e| CoreError::io(template_path, e))?;
    render(&content, variables, options)
}

/// Render a template file and write the result, creating parent
/// directories as needed.
pub fn render_to_file(
    template_path: &Path,
    output_path: &Path,
    variables: &HashMap<String, String>,
    options: &RenderOptions,
) -> Result<(), CoreError> {
    let rendered = render_file(template_path, variables, options)?;

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
    }
    std::fs::write(output_path, rendered).map_err(|e| CoreError::io(output_path, e))?;

    tracing::info!("[Template] Rendered {} -> {}", template_path.display(), output_path.display());
    Ok(())
}

/// Extract every unique variable name matched by the given patterns,
/// sorted alphabetically.
pub fn extract_variables(content: &str, patterns: &[Pattern]) -> Vec<String> {
    let mut found: BTreeSet<String> = BTreeSet::new();
    for pattern in patterns {
        for caps in pattern.regex().captures_iter(content) {
            found.insert(caps[1].to_string());
        }
    }
    found.into_iter().collect()
}

/// Pre-flight check of required vs. present vs. extraneous variable names.
pub fn validate_template(content: &str, required: &[&str]) -> TemplateValidation {
    let found = extract_variables(content, &Pattern::ALL);

    let missing: Vec<String> = required
        .iter()
        .filter(|r| !found.iter().any(|f| f == *r))
        .map(|r| r.to_string())
        .collect();
    let extra: Vec<String> = found
        .iter()
        .filter(|f| !required.contains(&f.as_str()))
        .cloned()
        .collect();

    TemplateValidation {
        valid: missing.is_empty(),
        found,
        missing,
        extra,
    }
}

/// Merge variable sources; later sources override earlier ones.
pub fn build_context(sources: &[&HashMap<String, String>]) -> HashMap<String, String> {
    let mut merged = HashMap::new();
    for source in sources {
        for (k, v) in source.iter() {
            merged.insert(k.clone(), v.clone());
        }
    }
    merged
}

/// Standard variables derived from configuration plus the current date.
/// Path variables are left empty for the caller to fill in.
pub fn standard_variables(config: &MadaceConfig) -> HashMap<String, String> {
    let now = chrono::Local::now();
    let mut vars = HashMap::new();

    vars.insert("project_name".to_string(), config.project_name.clone());
    vars.insert("user_name".to_string(), config.user_name.clone());
    vars.insert("output_folder".to_string(), config.output_folder.clone());
    vars.insert(
        "communication_language".to_string(),
        config.communication_language.clone(),
    );

    vars.insert("current_date".to_string(), now.format("%Y-%m-%d").to_string());
    vars.insert("current_datetime".to_string(), now.to_rfc3339());
    vars.insert("current_year".to_string(), now.format("%Y").to_string());

    vars.insert("madace_root".to_string(), String::new());
    vars.insert("project_root".to_string(), String::new());

    vars
}
