//! Input schema validation.
//!
//! Checks that the parsed skill matrix and operation bulletin carry the
//! columns the allocator needs before anything else runs. Detects:
//! - Missing operator-name column in the skill matrix
//! - Missing operation, machine-type, target or machine-SAM column in the
//!   task list
//!
//! Cell contents are not validated; malformed numbers coerce to 0 later.

use thiserror::Error;

use crate::models::{columns, Table};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A required skill-matrix column is absent.
    MissingSkillColumn,
    /// A required task-list column is absent.
    MissingTaskColumn,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Columns every task list must have.
pub const REQUIRED_TASK_COLUMNS: [&str; 4] = [
    columns::OPERATION_DESCRIPTION,
    columns::MACHINE_TYPE,
    columns::TARGET,
    columns::MACHINE_SAM,
];

/// Validates the skill matrix header.
pub fn validate_skill_table(table: &Table) -> ValidationResult {
    if table.has_column(columns::OPERATOR_NAME) {
        Ok(())
    } else {
        Err(vec![ValidationError::new(
            ValidationErrorKind::MissingSkillColumn,
            format!("Skill matrix is missing column '{}'", columns::OPERATOR_NAME),
        )])
    }
}

/// Validates the task-list header.
pub fn validate_task_table(table: &Table) -> ValidationResult {
    let errors: Vec<ValidationError> = REQUIRED_TASK_COLUMNS
        .iter()
        .filter(|c| !table.has_column(c))
        .map(|c| {
            ValidationError::new(
                ValidationErrorKind::MissingTaskColumn,
                format!("Task list is missing column '{c}'"),
            )
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates both inputs, collecting every problem.
pub fn validate_input(skills: &Table, tasks: &Table) -> ValidationResult {
    let mut errors = Vec::new();
    if let Err(e) = validate_skill_table(skills) {
        errors.extend(e);
    }
    if let Err(e) = validate_task_table(tasks) {
        errors.extend(e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
