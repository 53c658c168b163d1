//! Allocation (solution) model.
//!
//! An allocation binds every operation of the working set to an operator, a
//! floater, or nobody. Real operators appear at most once per allocation;
//! the unfilled placeholder may repeat.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::rating::{actual_output, rating_for};

/// Operator label reported for operations nobody could staff.
pub const UNFILLED_OPERATOR: &str = "NO SKILLED OP";

/// How an operation was staffed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentOutcome {
    /// The most proficient available operator for the skill column.
    Matched {
        /// Operator name.
        operator: String,
    },
    /// No qualified operator; an unskilled operator at floater proficiency.
    Floater {
        /// Operator name.
        operator: String,
    },
    /// Pool exhausted; nobody assigned.
    Unfilled,
}

impl AssignmentOutcome {
    /// The real operator consumed by this outcome, if any.
    pub fn operator(&self) -> Option<&str> {
        match self {
            AssignmentOutcome::Matched { operator } | AssignmentOutcome::Floater { operator } => {
                Some(operator)
            }
            AssignmentOutcome::Unfilled => None,
        }
    }

    /// Display label: the operator name or [`UNFILLED_OPERATOR`].
    pub fn operator_label(&self) -> &str {
        self.operator().unwrap_or(UNFILLED_OPERATOR)
    }
}

/// One operation's staffing decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Position of the operation in the working set.
    pub position: usize,
    /// Operation label.
    pub operation: String,
    /// Machine category.
    pub machine_type: String,
    /// Target quantity.
    pub target: f64,
    /// Summed effort of the operation.
    pub total_sam: f64,
    /// Skill columns consulted (constituent columns for combined rows);
    /// empty when the label resolved to no column of the matrix.
    pub skill_columns: Vec<String>,
    /// Staffing outcome.
    pub outcome: AssignmentOutcome,
    /// Proficiency used for output (percentage).
    pub proficiency: f64,
}

impl Assignment {
    /// Expected output: `proficiency / 100 × target`.
    #[inline]
    pub fn actual_output(&self) -> f64 {
        actual_output(self.proficiency, self.target)
    }

    /// Performance tier (1-5).
    #[inline]
    pub fn rating(&self) -> u8 {
        rating_for(self.proficiency)
    }

    /// Operator label (name or the unfilled placeholder).
    pub fn operator_label(&self) -> &str {
        self.outcome.operator_label()
    }

    /// Whether the operation was staffed by skill match.
    pub fn is_matched(&self) -> bool {
        matches!(self.outcome, AssignmentOutcome::Matched { .. })
    }

    /// Whether the operation went to a floater.
    pub fn is_floater(&self) -> bool {
        matches!(self.outcome, AssignmentOutcome::Floater { .. })
    }

    /// Whether the operation was left unfilled.
    pub fn is_unfilled(&self) -> bool {
        matches!(self.outcome, AssignmentOutcome::Unfilled)
    }
}

/// Result of one allocation pass, in working-set order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Assignments sorted by position.
    pub assignments: Vec<Assignment>,
}

impl Allocation {
    /// Creates an empty allocation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Restores working-set order.
    pub fn sort_by_position(&mut self) {
        self.assignments.sort_by_key(|a| a.position);
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// The assignment at a working-set position.
    pub fn assignment_at(&self, position: usize) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.position == position)
    }

    /// The first assignment for an operation label.
    pub fn assignment_for_operation(&self, label: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.operation == label)
    }

    /// All assignments carrying an operator label (including the placeholder).
    pub fn assignments_for_operator(&self, label: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.operator_label() == label)
            .collect()
    }

    /// Distinct real operators consumed, in order of first assignment.
    pub fn operators_used(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.assignments
            .iter()
            .filter_map(|a| a.outcome.operator())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Number of skill-matched operations.
    pub fn matched_count(&self) -> usize {
        self.assignments.iter().filter(|a| a.is_matched()).count()
    }

    /// Number of floater assignments.
    pub fn floater_count(&self) -> usize {
        self.assignments.iter().filter(|a| a.is_floater()).count()
    }

    /// Number of unfilled operations.
    pub fn unfilled_count(&self) -> usize {
        self.assignments.iter().filter(|a| a.is_unfilled()).count()
    }
}
