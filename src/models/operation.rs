//! Operation model.
//!
//! An operation is one line of the operation bulletin: a unit of sewing or
//! finishing work with a machine category, a target quantity and SAM
//! (standard allowed minutes) split into machine and manual effort.
//!
//! Low-effort operations may be merged into a synthetic combined operation.
//! The combined row keeps its constituents verbatim so it can be undone
//! exactly.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::table::{columns, Table};
use crate::normalize::normalize;

/// An operation to be staffed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Normalized operation label (not guaranteed unique after grouping).
    pub label: String,
    /// Normalized machine category.
    pub machine_type: String,
    /// Baseline quantity at 100% proficiency.
    pub target: f64,
    /// Machine effort (SAM).
    pub machine_sam: f64,
    /// Manual effort (SAM).
    pub manual_sam: f64,
    /// Position in the original task list.
    pub source_index: usize,
    /// Simple row or synthetic combination.
    pub kind: OperationKind,
}

/// Whether an operation comes straight from input or is synthetic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum OperationKind {
    /// A row from the task list.
    #[default]
    Simple,
    /// A synthetic row aggregating several source operations.
    Combined(Combination),
}

/// Constituents of a combined operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combination {
    /// How the combination was formed.
    pub origin: CombinationOrigin,
    /// The source operations, in input order.
    pub constituents: Vec<Operation>,
}

/// Source of a combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombinationOrigin {
    /// Formed by keyword/threshold rules.
    Automatic {
        /// Keyword that grouped the constituents.
        keyword: String,
    },
    /// Formed by an explicit user rule.
    Manual,
}

impl Operation {
    /// Creates a simple operation with zero target and effort.
    pub fn new(label: impl AsRef<str>, machine_type: impl AsRef<str>) -> Self {
        Self {
            label: normalize(label.as_ref()),
            machine_type: normalize(machine_type.as_ref()),
            target: 0.0,
            machine_sam: 0.0,
            manual_sam: 0.0,
            source_index: 0,
            kind: OperationKind::Simple,
        }
    }

    /// Sets the target quantity.
    pub fn with_target(mut self, target: f64) -> Self {
        self.target = target;
        self
    }

    /// Sets machine and manual effort.
    pub fn with_sam(mut self, machine_sam: f64, manual_sam: f64) -> Self {
        self.machine_sam = machine_sam;
        self.manual_sam = manual_sam;
        self
    }

    /// Sets the original task-list position.
    pub fn with_source_index(mut self, index: usize) -> Self {
        self.source_index = index;
        self
    }

    /// Builds a combined operation from constituents.
    ///
    /// Target is the first constituent's target; efforts are summed.
    /// Returns `None` when `constituents` is empty.
    pub fn combine(
        name: impl AsRef<str>,
        machine_type: impl AsRef<str>,
        origin: CombinationOrigin,
        constituents: Vec<Operation>,
    ) -> Option<Self> {
        let first = constituents.first()?;
        let target = first.target;
        let source_index = first.source_index;
        let machine_sam = constituents.iter().map(|o| o.machine_sam).sum();
        let manual_sam = constituents.iter().map(|o| o.manual_sam).sum();
        Some(Self {
            label: normalize(name.as_ref()),
            machine_type: normalize(machine_type.as_ref()),
            target,
            machine_sam,
            manual_sam,
            source_index,
            kind: OperationKind::Combined(Combination {
                origin,
                constituents,
            }),
        })
    }

    /// Summed effort (machine + manual).
    #[inline]
    pub fn total_sam(&self) -> f64 {
        self.machine_sam + self.manual_sam
    }

    /// Whether this is a synthetic combination.
    pub fn is_combined(&self) -> bool {
        matches!(self.kind, OperationKind::Combined(_))
    }

    /// The combination details, if combined.
    pub fn combination(&self) -> Option<&Combination> {
        match &self.kind {
            OperationKind::Combined(c) => Some(c),
            OperationKind::Simple => None,
        }
    }

    /// Labels of the constituents (empty for simple operations).
    pub fn constituent_labels(&self) -> Vec<&str> {
        self.combination()
            .map(|c| c.constituents.iter().map(|o| o.label.as_str()).collect())
            .unwrap_or_default()
    }
}

/// The operation bulletin in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskList {
    operations: Vec<Operation>,
}

impl TaskList {
    /// Creates a task list; source indices are reassigned to input order.
    pub fn new(operations: Vec<Operation>) -> Self {
        let operations = operations
            .into_iter()
            .enumerate()
            .map(|(i, op)| op.with_source_index(i))
            .collect();
        Self { operations }
    }

    /// Builds the task list from a parsed operation bulletin.
    ///
    /// The table must already have passed
    /// [`validate_task_table`](crate::validation::validate_task_table).
    /// Rows without a machine type are dropped. Non-numeric target and SAM
    /// values read as 0; `MANUAL SAM` defaults to 0 when the column is absent.
    pub fn from_table(table: &Table) -> Self {
        let label_col = table.column_index(columns::OPERATION_DESCRIPTION);
        let machine_col = table.column_index(columns::MACHINE_TYPE);
        let target_col = table.column_index(columns::TARGET);
        let machine_sam_col = table.column_index(columns::MACHINE_SAM);
        let manual_sam_col = table.column_index(columns::MANUAL_SAM);

        let number = |row: usize, col: Option<usize>| {
            col.map(|c| table.cell(row, c).to_number_or_zero())
                .unwrap_or(0.0)
        };
        let text = |row: usize, col: Option<usize>| {
            col.map(|c| normalize(&table.cell(row, c).as_text()))
                .unwrap_or_default()
        };

        let mut operations = Vec::new();
        for row in 0..table.row_count() {
            let machine_type = text(row, machine_col);
            if machine_type.is_empty() {
                debug!(row, "dropping operation row without machine type");
                continue;
            }
            let op = Operation::new(text(row, label_col), machine_type)
                .with_target(number(row, target_col))
                .with_sam(number(row, machine_sam_col), number(row, manual_sam_col))
                .with_source_index(operations.len());
            operations.push(op);
        }
        Self { operations }
    }

    /// Operations in input order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Distinct labels in first-appearance order.
    pub fn unique_labels(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for op in &self.operations {
            if !seen.contains(&op.label.as_str()) {
                seen.push(op.label.as_str());
            }
        }
        seen
    }
}
