//! Operation grouping.
//!
//! Produces the working operation set the allocator staffs: the original
//! task list with low-effort operations merged into combined rows.
//!
//! # Working Set Order
//!
//! 1. Ungrouped operations, in task-list order.
//! 2. Automatically combined operations, in creation order.
//! 3. Manual combinations, in rule-log order.
//!
//! Every source operation belongs to at most one active combination.
//! Deleting a manual combination puts its constituents back at their
//! original positions, unchanged, where later rules may group them again.

mod auto;
mod rules;

pub use auto::{auto_group, combined_name};
pub use rules::{GroupingRule, ManualCombination, RuleLog};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AutoGrouping;
use crate::error::GroupingError;
use crate::models::{CombinationOrigin, Operation};
use crate::normalize::normalize;

/// The operations to staff, after grouping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkingSet {
    operations: Vec<Operation>,
}

/// Traceability record of one combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationRecord {
    /// Combined operation name.
    pub name: String,
    /// Category of the combined row.
    pub machine_type: String,
    /// How it was formed.
    pub origin: CombinationOrigin,
    /// Constituent labels in input order.
    pub constituents: Vec<String>,
}

impl WorkingSet {
    /// A working set with no grouping applied.
    pub fn ungrouped(operations: &[Operation]) -> Self {
        Self {
            operations: operations.to_vec(),
        }
    }

    /// Operations in working order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Combination records in working order.
    pub fn combinations(&self) -> Vec<CombinationRecord> {
        self.operations
            .iter()
            .filter_map(|op| {
                op.combination().map(|c| CombinationRecord {
                    name: op.label.clone(),
                    machine_type: op.machine_type.clone(),
                    origin: c.origin.clone(),
                    constituents: c.constituents.iter().map(|o| o.label.clone()).collect(),
                })
            })
            .collect()
    }

    /// Source operations with every combination expanded, in input order.
    pub fn source_operations(&self) -> Vec<Operation> {
        let mut out: Vec<Operation> = self
            .operations
            .iter()
            .flat_map(|op| match op.combination() {
                Some(c) => c.constituents.clone(),
                None => vec![op.clone()],
            })
            .collect();
        out.sort_by_key(|o| o.source_index);
        out
    }
}

/// Folds automatic grouping and the rule log over the base task list.
///
/// # Errors
/// Returns the first rule that cannot be applied.
pub fn apply_rules(
    base: &[Operation],
    auto: Option<&AutoGrouping>,
    log: &RuleLog,
) -> Result<WorkingSet, GroupingError> {
    let (mut ungrouped, auto_combined) = match auto {
        Some(rules) => auto_group(base, rules),
        None => (base.to_vec(), Vec::new()),
    };
    let mut manual: Vec<Operation> = Vec::new();

    for rule in log.rules() {
        match rule {
            GroupingRule::Combine(combination) => {
                let op = combine_manual(&mut ungrouped, &auto_combined, &manual, combination)?;
                manual.push(op);
            }
            GroupingRule::Delete { name } => {
                delete_manual(&mut ungrouped, &auto_combined, &mut manual, &normalize(name))?;
            }
        }
    }

    let mut operations = ungrouped;
    operations.extend(auto_combined);
    operations.extend(manual);
    Ok(WorkingSet { operations })
}

fn combine_manual(
    ungrouped: &mut Vec<Operation>,
    auto_combined: &[Operation],
    manual: &[Operation],
    combination: &ManualCombination,
) -> Result<Operation, GroupingError> {
    let name = &normalize(&combination.name);
    let labels: Vec<String> = combination.labels.iter().map(|l| normalize(l)).collect();
    if name.is_empty() {
        return Err(GroupingError::EmptyName);
    }
    if auto_combined.iter().chain(manual).any(|op| op.label == *name) {
        return Err(GroupingError::DuplicateName(name.clone()));
    }
    for label in &labels {
        if !ungrouped.iter().any(|op| op.label == *label) {
            return Err(GroupingError::UnknownOperation(label.clone()));
        }
    }

    let selected: Vec<usize> = ungrouped
        .iter()
        .enumerate()
        .filter(|(_, op)| labels.contains(&op.label))
        .map(|(i, _)| i)
        .collect();
    if selected.len() < 2 {
        return Err(GroupingError::TooFewOperations {
            name: name.clone(),
            count: selected.len(),
        });
    }

    let machine_type = match &combination.machine_type {
        Some(mt) => normalize(mt),
        None => {
            let mut types: Vec<String> = Vec::new();
            for &i in &selected {
                if !types.contains(&ungrouped[i].machine_type) {
                    types.push(ungrouped[i].machine_type.clone());
                }
            }
            if types.len() > 1 {
                return Err(GroupingError::MixedMachineTypes {
                    name: name.clone(),
                    machine_types: types,
                });
            }
            types.pop().unwrap_or_default()
        }
    };

    let mut constituents = Vec::with_capacity(selected.len());
    for &i in selected.iter().rev() {
        constituents.push(ungrouped.remove(i));
    }
    constituents.reverse();

    debug!(%name, count = constituents.len(), "manually combined operations");
    Operation::combine(name, machine_type, CombinationOrigin::Manual, constituents)
        .ok_or_else(|| GroupingError::TooFewOperations {
            name: name.clone(),
            count: 0,
        })
}

fn delete_manual(
    ungrouped: &mut Vec<Operation>,
    auto_combined: &[Operation],
    manual: &mut Vec<Operation>,
    name: &str,
) -> Result<(), GroupingError> {
    let Some(index) = manual.iter().position(|op| op.label == name) else {
        if auto_combined.iter().any(|op| op.label == name) {
            return Err(GroupingError::AutomaticCombination(name.to_string()));
        }
        return Err(GroupingError::UnknownCombination(name.to_string()));
    };

    let removed = manual.remove(index);
    if let Some(combination) = removed.combination() {
        ungrouped.extend(combination.constituents.iter().cloned());
        ungrouped.sort_by_key(|op| op.source_index);
    }
    debug!(%name, "deleted manual combination");
    Ok(())
}

/// Session-scoped grouping state: base operations plus the rule log.
///
/// Every edit is validated by replaying the log with the new rule appended;
/// the log only grows when the replay succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingSession {
    base: Vec<Operation>,
    auto: Option<AutoGrouping>,
    log: RuleLog,
}

impl GroupingSession {
    /// Starts a session over the original task list.
    pub fn new(base: Vec<Operation>, auto: Option<AutoGrouping>) -> Self {
        Self {
            base,
            auto,
            log: RuleLog::new(),
        }
    }

    /// Resumes a session from a stored log.
    ///
    /// # Errors
    /// Fails when the stored log does not replay on this task list.
    pub fn with_log(mut self, log: RuleLog) -> Result<Self, GroupingError> {
        apply_rules(&self.base, self.auto.as_ref(), &log)?;
        self.log = log;
        Ok(self)
    }

    /// Adds a manual combination.
    pub fn combine(&mut self, combination: ManualCombination) -> Result<(), GroupingError> {
        self.try_push(GroupingRule::Combine(combination))
    }

    /// Deletes a manual combination, restoring its constituents.
    pub fn uncombine(&mut self, name: impl AsRef<str>) -> Result<(), GroupingError> {
        self.try_push(GroupingRule::Delete {
            name: normalize(name.as_ref()),
        })
    }

    fn try_push(&mut self, rule: GroupingRule) -> Result<(), GroupingError> {
        let mut candidate = self.log.clone();
        candidate.push(rule);
        apply_rules(&self.base, self.auto.as_ref(), &candidate)?;
        self.log = candidate;
        Ok(())
    }

    /// The current working set.
    pub fn working_set(&self) -> Result<WorkingSet, GroupingError> {
        apply_rules(&self.base, self.auto.as_ref(), &self.log)
    }

    /// The rule log.
    pub fn log(&self) -> &RuleLog {
        &self.log
    }

    /// The original task list.
    pub fn base(&self) -> &[Operation] {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskList;

    fn base() -> Vec<Operation> {
        TaskList::new(vec![
            Operation::new("SEW SIDE", "SNLS").with_target(100.0).with_sam(1.2, 0.0),
            Operation::new("IRON FRONT", "PRESS").with_target(90.0).with_sam(0.3, 0.2),
            Operation::new("TRIM A", "HAND").with_target(120.0).with_sam(0.0, 0.4),
            Operation::new("IRON BACK", "PRESS").with_target(80.0).with_sam(0.5, 0.0),
            Operation::new("TRIM B", "HAND").with_target(110.0).with_sam(0.0, 0.3),
            Operation::new("FOLD", "TABLE").with_target(200.0).with_sam(0.0, 0.2),
        ])
        .operations()
        .to_vec()
    }

    fn labels(ws: &WorkingSet) -> Vec<&str> {
        ws.operations().iter().map(|o| o.label.as_str()).collect()
    }

    #[test]
    fn test_no_rules_is_identity() {
        let ws = apply_rules(&base(), None, &RuleLog::new()).unwrap();
        assert_eq!(ws.operations(), base().as_slice());
        assert!(ws.combinations().is_empty());
    }

    #[test]
    fn test_working_set_order() {
        let log = RuleLog::new().with_combine(ManualCombination::new("TRIMMING", ["TRIM A", "TRIM B"]));
        let ws = apply_rules(&base(), Some(&AutoGrouping::new(["IRON"], 2.0)), &log).unwrap();
        assert_eq!(
            labels(&ws),
            vec!["SEW SIDE", "FOLD", "COMBINED IRON OPERATIONS (PRESS)", "TRIMMING"]
        );
        let records = ws.combinations();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].origin,
            CombinationOrigin::Automatic { keyword: "IRON".into() }
        );
        assert_eq!(records[1].origin, CombinationOrigin::Manual);
        assert_eq!(records[1].constituents, vec!["TRIM A", "TRIM B"]);
        assert_eq!(records[1].machine_type, "HAND");
    }

    #[test]
    fn test_manual_aggregation() {
        let log = RuleLog::new().with_combine(ManualCombination::new("TRIMMING", ["TRIM B", "TRIM A"]));
        let ws = apply_rules(&base(), None, &log).unwrap();
        let combined = ws.operations().last().unwrap();
        // Constituents keep input order regardless of selection order.
        assert_eq!(combined.constituent_labels(), vec!["TRIM A", "TRIM B"]);
        assert!((combined.target - 120.0).abs() < 1e-10);
        assert!((combined.manual_sam - 0.7).abs() < 1e-10);
    }

    #[test]
    fn test_combine_then_delete_restores() {
        let log = RuleLog::new()
            .with_combine(ManualCombination::new("TRIMMING", ["TRIM A", "TRIM B"]))
            .with_delete("TRIMMING");
        let ws = apply_rules(&base(), None, &log).unwrap();
        assert_eq!(ws.operations(), base().as_slice());
    }

    #[test]
    fn test_restored_operations_can_be_regrouped() {
        let log = RuleLog::new()
            .with_combine(ManualCombination::new("TRIMMING", ["TRIM A", "TRIM B"]))
            .with_delete("TRIMMING")
            .with_combine(
                ManualCombination::new("FINISHING", ["TRIM A", "FOLD"]).with_machine_type("FINISH"),
            );
        let ws = apply_rules(&base(), None, &log).unwrap();
        let last = ws.operations().last().unwrap();
        assert_eq!(last.label, "FINISHING");
        assert_eq!(last.machine_type, "FINISH");
        assert!(labels(&ws).contains(&"TRIM B"));
        assert!(!labels(&ws).contains(&"TRIM A"));
    }

    #[test]
    fn test_mixed_machine_types_rejected() {
        let log = RuleLog::new().with_combine(ManualCombination::new("MIX", ["TRIM A", "FOLD"]));
        let err = apply_rules(&base(), None, &log).unwrap_err();
        assert!(matches!(err, GroupingError::MixedMachineTypes { .. }));
    }

    #[test]
    fn test_operation_in_one_combination_only() {
        let log = RuleLog::new()
            .with_combine(ManualCombination::new("T1", ["TRIM A", "TRIM B"]))
            .with_combine(ManualCombination::new("T2", ["TRIM A", "TRIM B"]));
        let err = apply_rules(&base(), None, &log).unwrap_err();
        assert_eq!(err, GroupingError::UnknownOperation("TRIM A".into()));

        // Auto-combined constituents are not available either.
        let log = RuleLog::new().with_combine(ManualCombination::new("X", ["IRON FRONT", "IRON BACK"]));
        let err = apply_rules(&base(), Some(&AutoGrouping::new(["IRON"], 2.0)), &log).unwrap_err();
        assert_eq!(err, GroupingError::UnknownOperation("IRON FRONT".into()));
    }

    #[test]
    fn test_rule_errors() {
        let one = RuleLog::new().with_combine(ManualCombination::new("T", ["TRIM A"]));
        assert!(matches!(
            apply_rules(&base(), None, &one).unwrap_err(),
            GroupingError::TooFewOperations { count: 1, .. }
        ));

        let unnamed = RuleLog::new().with_combine(ManualCombination::new(" ", ["TRIM A", "TRIM B"]));
        assert_eq!(apply_rules(&base(), None, &unnamed).unwrap_err(), GroupingError::EmptyName);

        let dup = RuleLog::new()
            .with_combine(ManualCombination::new("T", ["TRIM A", "TRIM B"]))
            .with_combine(ManualCombination::new("T", ["IRON FRONT", "IRON BACK"]));
        assert_eq!(
            apply_rules(&base(), None, &dup).unwrap_err(),
            GroupingError::DuplicateName("T".into())
        );

        let missing = RuleLog::new().with_delete("NOPE");
        assert_eq!(
            apply_rules(&base(), None, &missing).unwrap_err(),
            GroupingError::UnknownCombination("NOPE".into())
        );

        let auto = RuleLog::new().with_delete("COMBINED IRON OPERATIONS (PRESS)");
        assert!(matches!(
            apply_rules(&base(), Some(&AutoGrouping::new(["IRON"], 2.0)), &auto).unwrap_err(),
            GroupingError::AutomaticCombination(_)
        ));
    }

    #[test]
    fn test_session_commits_only_valid_rules() {
        let mut session = GroupingSession::new(base(), None);
        session
            .combine(ManualCombination::new("TRIMMING", ["TRIM A", "TRIM B"]))
            .unwrap();
        assert_eq!(session.log().len(), 1);

        let err = session
            .combine(ManualCombination::new("AGAIN", ["TRIM A", "FOLD"]))
            .unwrap_err();
        assert_eq!(err, GroupingError::UnknownOperation("TRIM A".into()));
        assert_eq!(session.log().len(), 1);

        session.uncombine("trimming").unwrap();
        assert_eq!(session.log().len(), 2);
        assert_eq!(session.working_set().unwrap().operations(), base().as_slice());
        assert!(session.uncombine("TRIMMING").is_err());
    }

    #[test]
    fn test_session_replay_is_repeatable() {
        let mut session = GroupingSession::new(base(), Some(AutoGrouping::new(["IRON"], 2.0)));
        session
            .combine(ManualCombination::new("TRIMMING", ["TRIM A", "TRIM B"]))
            .unwrap();
        let first = session.working_set().unwrap();
        let second = session.working_set().unwrap();
        assert_eq!(first, second);

        let resumed = GroupingSession::new(base(), Some(AutoGrouping::new(["IRON"], 2.0)))
            .with_log(session.log().clone())
            .unwrap();
        assert_eq!(resumed.working_set().unwrap(), first);
    }

    #[test]
    fn test_source_operations_expand_combinations() {
        let log = RuleLog::new().with_combine(ManualCombination::new("TRIMMING", ["TRIM A", "TRIM B"]));
        let ws = apply_rules(&base(), Some(&AutoGrouping::new(["IRON"], 2.0)), &log).unwrap();
        assert_eq!(ws.source_operations(), base());
        assert_eq!(WorkingSet::ungrouped(&base()).len(), 6);
    }
}
