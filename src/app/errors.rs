use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A single schema problem found in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("No files found matching pattern: {pattern}")]
    NoFilesFound { pattern: String },

    #[error("Invalid glob pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Failed to load config {path:?}: {message}")]
    ConfigLoad { path: PathBuf, message: String },

    #[error("Invalid configuration in {path:?}:{}", list_issues(.issues))]
    ConfigInvalid {
        path: PathBuf,
        issues: Vec<ValidationIssue>,
    },

    #[error("{path:?} already exists; pass --force to overwrite it")]
    ConfigExists { path: PathBuf },

    #[error("Init cancelled")]
    UserCancelled,
}

fn list_issues(issues: &[ValidationIssue]) -> String {
    if issues.is_empty() {
        return " unknown problem".to_string();
    }
    issues.iter().map(|issue| format!("\n  - {}", issue)).collect()
}
