//! Error types.
//!
//! Only schema problems, invalid grouping rules, bad configuration and
//! export I/O are errors. Unresolved labels, non-numeric cells and an
//! exhausted operator pool degrade the result instead (see
//! [`crate::allocation`]).

use thiserror::Error;

use crate::validation::ValidationError;

/// Top-level error of a line-balancing run.
#[derive(Error, Debug)]
pub enum AllocationError {
    #[error("input schema is invalid: {}", join_messages(.0))]
    Schema(Vec<ValidationError>),

    #[error(transparent)]
    Grouping(#[from] GroupingError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to write report: {0}")]
    Export(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<Vec<ValidationError>> for AllocationError {
    fn from(errors: Vec<ValidationError>) -> Self {
        AllocationError::Schema(errors)
    }
}

/// A combination rule that cannot be applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupingError {
    #[error("combination name is empty")]
    EmptyName,

    #[error("operation '{0}' is not available for combining")]
    UnknownOperation(String),

    #[error("combination '{name}' needs at least two operations, got {count}")]
    TooFewOperations { name: String, count: usize },

    #[error("combination '{name}' mixes machine types {machine_types:?}; supply a combined category")]
    MixedMachineTypes {
        name: String,
        machine_types: Vec<String>,
    },

    #[error("a combination named '{0}' already exists")]
    DuplicateName(String),

    #[error("no manual combination named '{0}'")]
    UnknownCombination(String),

    #[error("'{0}' was combined automatically and cannot be deleted; change the auto-grouping keywords instead")]
    AutomaticCombination(String),
}

/// Invalid or unreadable configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration value (key: {key}): {message}")]
    InvalidValue { key: String, message: String },
}

/// Result alias for line-balancing operations.
pub type AllocationResult<T> = Result<T, AllocationError>;

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
