//! Core error type for the MADACE orchestration domain.
//!
//! `CoreError` is used throughout the core (loaders, engines, state
//! machine). Every file-format failure carries the offending path in its
//! message so callers can act on it.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing required variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Workflow not found: {0}")]
    WorkflowNotFound(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl CoreError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            CoreError::NotFound(format!("{}", path.display()))
        } else {
            CoreError::Io(format!("{}: {}", path.display(), err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_variables_message_lists_names() {
        let err = CoreError::MissingVariables(vec!["alpha".into(), "beta".into()]);
        assert_eq!(err.to_string(), "Missing required variables: alpha, beta");
    }

    #[test]
    fn test_io_not_found_maps_to_not_found() {
        let err = CoreError::io(
            std::path::Path::new("/nope/agent.yaml"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(matches!(err, CoreError::NotFound(_)));
        assert!(err.to_string().contains("/nope/agent.yaml"));
    }
}
