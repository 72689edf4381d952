use std::path::Path;

use thiserror::Error;

use crate::common::error::PspaceError::GenericError;

#[derive(Debug, Error)]
pub enum PspaceError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("{0}")]
    ConfigError(String),
    #[error("{0} in --param option")]
    ParamFilterError(String),
    #[error("Expression error: {0}")]
    ExpressionError(String),
    #[error("Template error: {0}")]
    TemplateError(String),
    #[error("Batch system error: {0}")]
    BatchSystemError(String),
    #[error("Command `{command}` failed: {message}")]
    CommandFailed { command: String, message: String },
    #[error("Error: {0}")]
    GenericError(String),
}

impl PspaceError {
    /// Error located at a 1-based `line` of a configuration `file`.
    pub fn config_at(file: &Path, line: usize, message: impl AsRef<str>) -> Self {
        Self::ConfigError(format!(
            "{}:{}: {}",
            file.display(),
            line,
            message.as_ref()
        ))
    }

    /// Error concerning a whole configuration `file`.
    pub fn config(file: &Path, message: impl AsRef<str>) -> Self {
        Self::ConfigError(format!("{}: {}", file.display(), message.as_ref()))
    }
}

impl From<anyhow::Error> for PspaceError {
    fn from(error: anyhow::Error) -> Self {
        Self::GenericError(error.to_string())
    }
}

impl From<String> for PspaceError {
    fn from(e: String) -> Self {
        GenericError(e)
    }
}
