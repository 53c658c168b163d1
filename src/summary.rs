//! Allocation roll-ups.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Operator summary | Per operator label: operations, summed target and output, mean proficiency |
//! | Machine summary | Operation count per machine type, before grouping |
//! | Total SAM | Sum of machine + manual SAM over the working set |
//! | Pitch time | Total SAM / distinct real operators allocated |
//!
//! Operator ratings are re-derived from the averaged proficiency, never
//! averaged from per-row ratings.

use serde::{Deserialize, Serialize};

use crate::models::{Allocation, Operation};
use crate::rating::rating_for;

/// Statistics for one operator label (the unfilled placeholder included).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorSummary {
    /// Operator name or the unfilled placeholder.
    pub operator: String,
    /// Number of operations carried.
    pub operations: usize,
    /// Summed target quantity.
    pub total_target: f64,
    /// Summed expected output.
    pub total_actual_output: f64,
    /// Mean proficiency over the operator's operations.
    pub average_proficiency: f64,
    /// Rating of the mean proficiency.
    pub rating: u8,
}

impl OperatorSummary {
    /// Summarizes an allocation by operator label, in order of first
    /// appearance.
    pub fn calculate(allocation: &Allocation) -> Vec<Self> {
        let mut summaries: Vec<Self> = Vec::new();
        let mut proficiency_sums: Vec<f64> = Vec::new();

        for assignment in &allocation.assignments {
            let label = assignment.operator_label();
            let idx = match summaries.iter().position(|s| s.operator == label) {
                Some(idx) => idx,
                None => {
                    summaries.push(Self {
                        operator: label.to_string(),
                        operations: 0,
                        total_target: 0.0,
                        total_actual_output: 0.0,
                        average_proficiency: 0.0,
                        rating: 1,
                    });
                    proficiency_sums.push(0.0);
                    summaries.len() - 1
                }
            };
            let summary = &mut summaries[idx];
            summary.operations += 1;
            summary.total_target += assignment.target;
            summary.total_actual_output += assignment.actual_output();
            proficiency_sums[idx] += assignment.proficiency;
        }

        for (summary, sum) in summaries.iter_mut().zip(proficiency_sums) {
            summary.average_proficiency = sum / summary.operations as f64;
            summary.rating = rating_for(summary.average_proficiency);
        }
        summaries
    }
}

/// One machine-type row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineTypeCount {
    /// Machine type.
    pub machine_type: String,
    /// Number of source operations.
    pub operations: usize,
}

/// Operation counts per machine type plus the total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineSummary {
    /// Rows in order of first appearance.
    pub rows: Vec<MachineTypeCount>,
    /// Sum of all row counts.
    pub total: usize,
}

impl MachineSummary {
    /// Counts source (pre-grouping) operations per machine type.
    pub fn calculate(operations: &[Operation]) -> Self {
        let mut rows: Vec<MachineTypeCount> = Vec::new();
        for op in operations {
            match rows.iter_mut().find(|r| r.machine_type == op.machine_type) {
                Some(row) => row.operations += 1,
                None => rows.push(MachineTypeCount {
                    machine_type: op.machine_type.clone(),
                    operations: 1,
                }),
            }
        }
        let total = rows.iter().map(|r| r.operations).sum();
        Self { rows, total }
    }

    /// Count for one machine type (0 when absent).
    pub fn count(&self, machine_type: &str) -> usize {
        self.rows
            .iter()
            .find(|r| r.machine_type == machine_type)
            .map_or(0, |r| r.operations)
    }
}

/// Line-level effort figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineBalance {
    /// Summed SAM of the working set.
    pub total_sam: f64,
    /// Distinct real operators allocated (matched or floater).
    pub operators_allocated: usize,
    /// Predicted pitch time; 0 when nobody was allocated.
    pub pitch_time: f64,
}

impl LineBalance {
    /// Computes line balance from the working set and its allocation.
    pub fn calculate(operations: &[Operation], allocation: &Allocation) -> Self {
        let total_sam: f64 = operations.iter().map(Operation::total_sam).sum();
        let operators_allocated = allocation.operators_used().len();
        let pitch_time = if operators_allocated == 0 {
            0.0
        } else {
            total_sam / operators_allocated as f64
        };
        Self {
            total_sam,
            operators_allocated,
            pitch_time,
        }
    }
}

/// Zig-zag station label for a 0-based row: `L1`, `R2`, `L3`, ...
pub fn position_label(index: usize) -> String {
    let side = if index % 2 == 0 { 'L' } else { 'R' };
    format!("{side}{}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignment, AssignmentOutcome, UNFILLED_OPERATOR};

    fn make(position: usize, outcome: AssignmentOutcome, proficiency: f64, target: f64) -> Assignment {
        Assignment {
            position,
            operation: format!("OP{position}"),
            machine_type: "SNLS".into(),
            target,
            total_sam: 0.5,
            skill_columns: Vec::new(),
            outcome,
            proficiency,
        }
    }

    fn matched(name: &str) -> AssignmentOutcome {
        AssignmentOutcome::Matched { operator: name.into() }
    }

    #[test]
    fn test_operator_summary() {
        let mut alloc = Allocation::new();
        alloc.add_assignment(make(0, matched("A"), 90.0, 100.0));
        alloc.add_assignment(make(1, AssignmentOutcome::Unfilled, 55.0, 100.0));
        alloc.add_assignment(make(2, AssignmentOutcome::Floater { operator: "B".into() }, 55.0, 40.0));
        alloc.add_assignment(make(3, AssignmentOutcome::Unfilled, 55.0, 200.0));

        let summary = OperatorSummary::calculate(&alloc);
        let names: Vec<&str> = summary.iter().map(|s| s.operator.as_str()).collect();
        assert_eq!(names, vec!["A", UNFILLED_OPERATOR, "B"]);

        let unfilled = &summary[1];
        assert_eq!(unfilled.operations, 2);
        assert!((unfilled.total_target - 300.0).abs() < 1e-10);
        assert!((unfilled.total_actual_output - 165.0).abs() < 1e-10);
        assert!((unfilled.average_proficiency - 55.0).abs() < 1e-10);
        assert_eq!(unfilled.rating, 1);
    }

    #[test]
    fn test_rating_from_average_proficiency() {
        let mut alloc = Allocation::new();
        alloc.add_assignment(make(0, matched("A"), 96.0, 100.0));
        alloc.add_assignment(make(1, matched("A"), 70.0, 100.0));
        let summary = OperatorSummary::calculate(&alloc);
        assert!((summary[0].average_proficiency - 83.0).abs() < 1e-10);
        assert_eq!(summary[0].rating, 3);

        let mut alloc = Allocation::new();
        alloc.add_assignment(make(0, matched("A"), 100.0, 100.0));
        alloc.add_assignment(make(1, matched("A"), 70.0, 100.0));
        // Mean 85 rates 4; the mean of ratings (5 + 2) / 2 would be 3.5.
        assert_eq!(OperatorSummary::calculate(&alloc)[0].rating, 4);
    }

    #[test]
    fn test_operator_summary_empty() {
        assert!(OperatorSummary::calculate(&Allocation::new()).is_empty());
    }

    #[test]
    fn test_machine_summary() {
        let ops = vec![
            Operation::new("SEW A", "SNLS"),
            Operation::new("IRON", "PRESS"),
            Operation::new("SEW B", "SNLS"),
        ];
        let summary = MachineSummary::calculate(&ops);
        assert_eq!(summary.rows.len(), 2);
        assert_eq!(summary.rows[0].machine_type, "SNLS");
        assert_eq!(summary.count("SNLS"), 2);
        assert_eq!(summary.count("PRESS"), 1);
        assert_eq!(summary.count("OL"), 0);
        assert_eq!(summary.total, 3);
    }

    #[test]
    fn test_line_balance() {
        let ops = vec![
            Operation::new("SEW", "SNLS").with_sam(0.5, 0.1),
            Operation::new("HEM", "SNLS").with_sam(0.4, 0.0),
            Operation::new("CUT", "SNLS").with_sam(0.2, 0.0),
        ];
        let mut alloc = Allocation::new();
        alloc.add_assignment(make(0, matched("A"), 90.0, 100.0));
        alloc.add_assignment(make(1, AssignmentOutcome::Floater { operator: "B".into() }, 55.0, 100.0));
        alloc.add_assignment(make(2, AssignmentOutcome::Unfilled, 55.0, 100.0));

        let balance = LineBalance::calculate(&ops, &alloc);
        assert!((balance.total_sam - 1.2).abs() < 1e-10);
        assert_eq!(balance.operators_allocated, 2);
        assert!((balance.pitch_time - 0.6).abs() < 1e-10);
    }

    #[test]
    fn test_line_balance_no_operators() {
        let ops = vec![Operation::new("SEW", "SNLS").with_sam(0.5, 0.0)];
        let mut alloc = Allocation::new();
        alloc.add_assignment(make(0, AssignmentOutcome::Unfilled, 55.0, 100.0));
        let balance = LineBalance::calculate(&ops, &alloc);
        assert_eq!(balance.operators_allocated, 0);
        assert_eq!(balance.pitch_time, 0.0);
    }

    #[test]
    fn test_position_label() {
        let labels: Vec<String> = (0..4).map(position_label).collect();
        assert_eq!(labels, vec!["L1", "R2", "L3", "R4"]);
    }
}
