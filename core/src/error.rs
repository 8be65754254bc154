//! Error types for the kvm-configurator-core crate

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Command execution failed: {cmd} - {message}")]
    Command { cmd: String, message: String },

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("{cmd} failed: {}", .output.trim())]
    ExternalTool { cmd: String, output: String },

    #[error("Domain '{0}' not found")]
    DomainNotFound(String),

    #[error("No disk found for domain '{0}'")]
    NoDiskFound(String),

    #[error("Resize of {} failed: {}", .path.display(), .output.trim())]
    Resize { path: PathBuf, output: String },

    #[error("Conversion of {} failed: {}", .path.display(), .output.trim())]
    Convert { path: PathBuf, output: String },

    #[error("Repair of {} failed: {}", .path.display(), .output.trim())]
    Repair { path: PathBuf, output: String },

    #[error("{operation} partially failed: {}", join_failures(.failures))]
    PartialFailure {
        operation: String,
        failures: Vec<StepFailure>,
    },

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn xml(msg: impl Into<String>) -> Self {
        Error::Xml(msg.into())
    }

    /// Failures collected by an aggregate error, empty for every other variant
    pub fn failures(&self) -> &[StepFailure] {
        match self {
            Error::PartialFailure { failures, .. } => failures,
            _ => &[],
        }
    }
}

/// One failed step or file inside a [`Error::PartialFailure`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub target: String,
    pub reason: String,
}

impl StepFailure {
    pub fn new(target: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.target, self.reason)
    }
}

fn join_failures(failures: &[StepFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
