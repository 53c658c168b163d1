//! Greedy operator allocation.
//!
//! # Algorithm
//!
//! 1. Order operations (input order, or summed SAM descending).
//! 2. For each operation, resolve the skill columns to consult: the mapped
//!    column for a simple operation, every constituent's mapped column for
//!    a combined one. Columns missing from the skill matrix are ignored.
//! 3. Among operators still in the pool, pick the highest proficiency on
//!    those columns (max across columns for combined rows). Ties go to the
//!    operator listed first in the skill matrix.
//! 4. No candidate: the first operator left in the pool works the operation
//!    as a floater at the floater proficiency. Pool empty: the operation is
//!    unfilled, credited at the floater proficiency.
//! 5. Selected operators leave the pool; results return to working-set order.
//!
//! The pass is greedy, not an optimal assignment. [`Allocator`] is the seam
//! for substituting a weighted bipartite matcher.
//!
//! # Complexity
//! O(n * m * c) where n=operations, m=operators, c=columns per operation.

mod ordering;

pub use ordering::visit_order;

use std::cmp::Ordering;
use tracing::{debug, info, warn};

use crate::config::{AllocationConfig, OrderingPolicy, DEFAULT_FLOATER_PROFICIENCY};
use crate::models::{Allocation, Assignment, AssignmentOutcome, Operation, Operator, SkillTable};
use crate::resolver::OperationMap;

/// Assigns operators to a working set of operations.
pub trait Allocator {
    /// Produces one assignment per operation, in working-set order.
    fn allocate(
        &self,
        operations: &[Operation],
        skills: &SkillTable,
        map: &OperationMap,
    ) -> Allocation;
}

/// Greedy "most proficient available operator first" allocator.
///
/// # Example
///
/// ```
/// use u_linebalance::allocation::{Allocator, GreedyAllocator};
/// use u_linebalance::models::{Operation, Operator, SkillTable};
/// use u_linebalance::resolver::OperationMap;
///
/// let skills = SkillTable::new()
///     .with_operator(Operator::new("A").with_proficiency("SEW", 90.0))
///     .with_operator(Operator::new("B").with_proficiency("SEW", 70.0));
/// let operations = vec![Operation::new("SEW", "SNLS").with_target(100.0)];
///
/// let allocation = GreedyAllocator::new().allocate(&operations, &skills, &OperationMap::new());
/// assert_eq!(allocation.assignments[0].operator_label(), "A");
/// assert_eq!(allocation.assignments[0].actual_output(), 90.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GreedyAllocator {
    ordering: OrderingPolicy,
    floater_proficiency: f64,
}

impl GreedyAllocator {
    /// Creates an allocator with input ordering and 55% floaters.
    pub fn new() -> Self {
        Self {
            ordering: OrderingPolicy::InputOrder,
            floater_proficiency: DEFAULT_FLOATER_PROFICIENCY,
        }
    }

    /// Creates an allocator from run configuration.
    pub fn from_config(config: &AllocationConfig) -> Self {
        Self {
            ordering: config.ordering,
            floater_proficiency: config.floater_proficiency,
        }
    }

    /// Sets the visiting order.
    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.ordering = ordering;
        self
    }

    /// Sets the floater proficiency.
    pub fn with_floater_proficiency(mut self, proficiency: f64) -> Self {
        self.floater_proficiency = proficiency;
        self
    }

    /// Skill columns to consult for an operation, deduplicated, in
    /// constituent order.
    fn skill_columns(operation: &Operation, skills: &SkillTable, map: &OperationMap) -> Vec<String> {
        let labels: Vec<&str> = match operation.combination() {
            Some(c) => c.constituents.iter().map(|o| o.label.as_str()).collect(),
            None => vec![operation.label.as_str()],
        };
        let mut columns: Vec<String> = Vec::new();
        for label in labels {
            let column = map.resolve(label);
            if skills.has_column(column) && !columns.iter().any(|c| c == column) {
                columns.push(column.to_string());
            }
        }
        columns
    }
}

impl Default for GreedyAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Index and value of the best available operator on `columns`.
fn select_best(operators: &[Operator], available: &[bool], columns: &[String]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, operator) in operators.iter().enumerate() {
        if !available[idx] {
            continue;
        }
        let Some(value) = operator.best_proficiency(columns.iter().map(String::as_str)) else {
            continue;
        };
        match best {
            Some((_, b)) if value.total_cmp(&b) != Ordering::Greater => {}
            _ => best = Some((idx, value)),
        }
    }
    best
}

impl Allocator for GreedyAllocator {
    fn allocate(
        &self,
        operations: &[Operation],
        skills: &SkillTable,
        map: &OperationMap,
    ) -> Allocation {
        let operators = skills.operators();
        let mut available = vec![true; operators.len()];
        let mut allocation = Allocation::new();

        for position in visit_order(operations, self.ordering) {
            let operation = &operations[position];
            let columns = Self::skill_columns(operation, skills, map);
            if columns.is_empty() {
                warn!(operation = %operation.label, "no skill column for operation");
            }

            let (outcome, proficiency) = match select_best(operators, &available, &columns) {
                Some((idx, value)) => {
                    available[idx] = false;
                    debug!(
                        operation = %operation.label,
                        operator = %operators[idx].name,
                        proficiency = value,
                        "matched operator"
                    );
                    (
                        AssignmentOutcome::Matched {
                            operator: operators[idx].name.clone(),
                        },
                        value,
                    )
                }
                None => match available.iter().position(|&a| a) {
                    Some(idx) => {
                        available[idx] = false;
                        debug!(
                            operation = %operation.label,
                            operator = %operators[idx].name,
                            "no qualified operator, assigned floater"
                        );
                        (
                            AssignmentOutcome::Floater {
                                operator: operators[idx].name.clone(),
                            },
                            self.floater_proficiency,
                        )
                    }
                    None => {
                        warn!(operation = %operation.label, "operator pool exhausted");
                        (AssignmentOutcome::Unfilled, self.floater_proficiency)
                    }
                },
            };

            allocation.add_assignment(Assignment {
                position,
                operation: operation.label.clone(),
                machine_type: operation.machine_type.clone(),
                target: operation.target,
                total_sam: operation.total_sam(),
                skill_columns: columns,
                outcome,
                proficiency,
            });
        }

        allocation.sort_by_position();
        info!(
            operations = allocation.assignment_count(),
            matched = allocation.matched_count(),
            floaters = allocation.floater_count(),
            unfilled = allocation.unfilled_count(),
            "allocation complete"
        );
        allocation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CombinationOrigin, TaskList, UNFILLED_OPERATOR};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn sew_skills() -> SkillTable {
        SkillTable::new()
            .with_operator(Operator::new("A").with_proficiency("SEW", 90.0))
            .with_operator(Operator::new("B").with_proficiency("SEW", 70.0))
    }

    fn op(label: &str, target: f64) -> Operation {
        Operation::new(label, "SNLS").with_target(target)
    }

    #[test]
    fn test_most_proficient_operator_wins() {
        crate::logging::init_test();
        let operations = vec![op("SEW", 100.0)];
        let alloc = GreedyAllocator::new().allocate(&operations, &sew_skills(), &OperationMap::new());

        let a = &alloc.assignments[0];
        assert_eq!(a.operator_label(), "A");
        assert!(a.is_matched());
        assert!((a.proficiency - 90.0).abs() < 1e-10);
        assert!((a.actual_output() - 90.0).abs() < 1e-10);
        assert_eq!(a.rating(), 4);
        assert_eq!(a.skill_columns, vec!["SEW"]);
    }

    #[test]
    fn test_operator_consumed_once() {
        let operations = TaskList::new(vec![op("SEW", 100.0), op("SEW", 100.0), op("SEW", 100.0)]);
        let alloc =
            GreedyAllocator::new().allocate(operations.operations(), &sew_skills(), &OperationMap::new());

        let names: Vec<&str> = alloc.assignments.iter().map(|a| a.operator_label()).collect();
        assert_eq!(names, vec!["A", "B", UNFILLED_OPERATOR]);
        assert!(alloc.assignments[2].is_unfilled());
        assert!((alloc.assignments[2].proficiency - 55.0).abs() < 1e-10);
    }

    #[test]
    fn test_tie_goes_to_first_operator() {
        let skills = SkillTable::new()
            .with_operator(Operator::new("X").with_proficiency("SEW", 80.0))
            .with_operator(Operator::new("Y").with_proficiency("SEW", 80.0));
        let alloc = GreedyAllocator::new().allocate(&[op("SEW", 10.0)], &skills, &OperationMap::new());
        assert_eq!(alloc.assignments[0].operator_label(), "X");
    }

    #[test]
    fn test_nan_proficiency_never_wins() {
        let mut nan_operator = Operator::new("B");
        nan_operator.proficiencies.insert("SEW".into(), f64::NAN);
        let skills = SkillTable::new()
            .with_operator(Operator::new("A").with_proficiency("SEW", 90.0))
            .with_operator(nan_operator)
            .with_operator(Operator::new("C").with_proficiency("SEW", f64::NAN));

        let alloc = GreedyAllocator::new().allocate(&[op("SEW", 100.0)], &skills, &OperationMap::new());
        let a = &alloc.assignments[0];
        assert_eq!(a.operator_label(), "A");
        assert!((a.proficiency - 90.0).abs() < 1e-10);
        assert!((a.actual_output() - 90.0).abs() < 1e-10);
    }

    #[test]
    fn test_unresolved_label_gets_floater() {
        let skills = sew_skills();
        let alloc = GreedyAllocator::new().allocate(&[op("BUTTON HOLE", 200.0)], &skills, &OperationMap::new());

        let a = &alloc.assignments[0];
        assert!(a.is_floater());
        assert_eq!(a.operator_label(), "A");
        assert!(a.skill_columns.is_empty());
        assert!((a.proficiency - 55.0).abs() < 1e-10);
        assert!((a.actual_output() - 110.0).abs() < 1e-10);
    }

    #[test]
    fn test_no_skilled_candidate_gets_floater() {
        let skills = SkillTable::new()
            .with_operator(Operator::new("A").with_proficiency("SEW", 90.0))
            .with_operator(Operator::new("B").with_proficiency("IRON", 70.0));
        // Both want SEW; only A is skilled, so the second goes to floater B.
        let operations = TaskList::new(vec![op("SEW", 100.0), op("SEW", 100.0)]);
        let alloc = GreedyAllocator::new().allocate(operations.operations(), &skills, &OperationMap::new());
        assert!(alloc.assignments[0].is_matched());
        assert!(alloc.assignments[1].is_floater());
        assert_eq!(alloc.assignments[1].operator_label(), "B");
    }

    #[test]
    fn test_empty_pool_unfilled() {
        let alloc = GreedyAllocator::new().allocate(
            &[op("SEW", 100.0)],
            &SkillTable::new().with_column("SEW"),
            &OperationMap::new(),
        );
        let a = &alloc.assignments[0];
        assert!(a.is_unfilled());
        assert_eq!(a.operator_label(), UNFILLED_OPERATOR);
        assert!((a.actual_output() - 55.0).abs() < 1e-10);
    }

    #[test]
    fn test_n_plus_one_operations_one_unfilled() {
        let skills = SkillTable::new()
            .with_operator(Operator::new("A").with_proficiency("SEW", 90.0))
            .with_operator(Operator::new("B").with_proficiency("CUT", 70.0))
            .with_operator(Operator::new("C"));
        let operations = TaskList::new(vec![
            op("SEW", 10.0),
            op("CUT", 10.0),
            op("HEM", 10.0),
            op("IRON", 10.0),
        ]);
        let alloc = GreedyAllocator::new().allocate(operations.operations(), &skills, &OperationMap::new());
        assert_eq!(alloc.unfilled_count(), 1);
        assert_eq!(alloc.assignments[3].operator_label(), UNFILLED_OPERATOR);
    }

    #[test]
    fn test_operation_map_used() {
        let map = OperationMap::new().with_entry("SEW SIDE SEEM", "SEW");
        let alloc = GreedyAllocator::new().allocate(&[op("SEW SIDE SEEM", 100.0)], &sew_skills(), &map);
        assert!(alloc.assignments[0].is_matched());
        assert_eq!(alloc.assignments[0].operator_label(), "A");
    }

    #[test]
    fn test_combined_operation_uses_best_constituent() {
        let skills = SkillTable::new()
            .with_operator(Operator::new("A").with_proficiency("IRON FRONT", 60.0))
            .with_operator(
                Operator::new("B")
                    .with_proficiency("IRON FRONT", 50.0)
                    .with_proficiency("IRON BACK", 88.0),
            )
            .with_operator(Operator::new("C").with_proficiency("CUT", 99.0));
        let combined = Operation::combine(
            "COMBINED IRON OPERATIONS (PRESS)",
            "PRESS",
            CombinationOrigin::Automatic { keyword: "IRON".into() },
            vec![
                Operation::new("IRON FRONT", "PRESS").with_target(100.0),
                Operation::new("IRON BACK", "PRESS").with_target(80.0),
            ],
        )
        .unwrap();

        let alloc = GreedyAllocator::new().allocate(&[combined], &skills, &OperationMap::new());
        let a = &alloc.assignments[0];
        assert_eq!(a.operator_label(), "B");
        assert!((a.proficiency - 88.0).abs() < 1e-10);
        assert!((a.actual_output() - 88.0).abs() < 1e-10);
        assert_eq!(a.skill_columns, vec!["IRON FRONT", "IRON BACK"]);
    }

    #[test]
    fn test_sam_priority_changes_who_gets_best() {
        let operations = TaskList::new(vec![
            op("SEW", 100.0).with_sam(0.2, 0.0),
            op("SEW", 100.0).with_sam(1.5, 0.0),
        ]);

        let input = GreedyAllocator::new().allocate(operations.operations(), &sew_skills(), &OperationMap::new());
        assert_eq!(input.assignments[0].operator_label(), "A");
        assert_eq!(input.assignments[1].operator_label(), "B");

        let prioritized = GreedyAllocator::new()
            .with_ordering(OrderingPolicy::SamPriority)
            .allocate(operations.operations(), &sew_skills(), &OperationMap::new());
        // Output stays in input order, but the heavier operation got A.
        assert_eq!(prioritized.assignments[0].position, 0);
        assert_eq!(prioritized.assignments[0].operator_label(), "B");
        assert_eq!(prioritized.assignments[1].operator_label(), "A");
    }

    #[test]
    fn test_custom_floater_proficiency() {
        let alloc = GreedyAllocator::from_config(&AllocationConfig::default().with_floater_proficiency(40.0))
            .allocate(&[op("HEM", 100.0)], &sew_skills(), &OperationMap::new());
        assert!((alloc.assignments[0].proficiency - 40.0).abs() < 1e-10);
    }

    #[test]
    fn test_deterministic() {
        let operations = TaskList::new(vec![op("SEW", 100.0), op("HEM", 50.0), op("SEW", 80.0)]);
        let allocator = GreedyAllocator::new();
        let first = allocator.allocate(operations.operations(), &sew_skills(), &OperationMap::new());
        let second = allocator.allocate(operations.operations(), &sew_skills(), &OperationMap::new());
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input() {
        let alloc = GreedyAllocator::new().allocate(&[], &SkillTable::new(), &OperationMap::new());
        assert_eq!(alloc.assignment_count(), 0);
    }

    fn arb_case() -> impl Strategy<Value = (SkillTable, Vec<Operation>, OrderingPolicy)> {
        let labels = ["SEW", "CUT", "HEM", "IRON", "TRIM"];
        let operators = prop::collection::vec(
            prop::collection::vec(prop::option::of(0.0f64..100.0), labels.len()),
            0..6,
        );
        let operations = prop::collection::vec((0..labels.len() + 1, 0.0f64..500.0, 0.0f64..2.0), 0..10);
        (operators, operations, any::<bool>()).prop_map(move |(ops, tasks, prioritized)| {
            let mut skills = SkillTable::new();
            for (i, row) in ops.iter().enumerate() {
                let mut operator = Operator::new(format!("OP{i}"));
                for (label, value) in labels.iter().zip(row) {
                    if let Some(v) = value {
                        operator = operator.with_proficiency(*label, *v);
                    }
                }
                skills = skills.with_operator(operator);
            }
            let operations = tasks
                .iter()
                .enumerate()
                .map(|(i, &(l, target, sam))| {
                    let label = labels.get(l).copied().unwrap_or("UNKNOWN");
                    Operation::new(label, "X")
                        .with_target(target)
                        .with_sam(sam, 0.0)
                        .with_source_index(i)
                })
                .collect();
            let policy = if prioritized {
                OrderingPolicy::SamPriority
            } else {
                OrderingPolicy::InputOrder
            };
            (skills, operations, policy)
        })
    }

    proptest! {
        #[test]
        fn prop_allocation_invariants((skills, operations, policy) in arb_case()) {
            let alloc = GreedyAllocator::new()
                .with_ordering(policy)
                .allocate(&operations, &skills, &OperationMap::new());

            prop_assert_eq!(alloc.assignment_count(), operations.len());

            let mut seen = HashSet::new();
            for (i, a) in alloc.assignments.iter().enumerate() {
                prop_assert_eq!(a.position, i);
                prop_assert_eq!(a.actual_output(), a.proficiency / 100.0 * operations[i].target);
                if let Some(name) = a.outcome.operator() {
                    prop_assert!(seen.insert(name.to_string()), "operator {} reused", name);
                }
            }

            let expected_unfilled = operations.len().saturating_sub(skills.operator_count());
            prop_assert_eq!(alloc.unfilled_count(), expected_unfilled);
        }
    }
}
