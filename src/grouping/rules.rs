//! Manual combination rules.
//!
//! User edits are recorded as an ordered log of combine/delete rules rather
//! than applied to the working set in place. Replaying the log over the
//! original task list always yields the same working set.

use serde::{Deserialize, Serialize};

use crate::normalize::normalize;

/// A user-specified combination of existing operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualCombination {
    /// Name of the combined operation.
    pub name: String,
    /// Labels of the operations to combine.
    pub labels: Vec<String>,
    /// Category for the combined row; required when machine types differ.
    #[serde(default)]
    pub machine_type: Option<String>,
}

impl ManualCombination {
    /// Creates a rule; name and labels are normalized.
    pub fn new<I, S>(name: impl AsRef<str>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: normalize(name.as_ref()),
            labels: labels.into_iter().map(|l| normalize(l.as_ref())).collect(),
            machine_type: None,
        }
    }

    /// Sets an explicit category for the combined row.
    pub fn with_machine_type(mut self, machine_type: impl AsRef<str>) -> Self {
        self.machine_type = Some(normalize(machine_type.as_ref()));
        self
    }
}

/// One entry of the rule log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GroupingRule {
    /// Create a manual combination.
    Combine(ManualCombination),
    /// Undo the manual combination with this name.
    Delete {
        /// Name of the combination to delete.
        name: String,
    },
}

/// Ordered log of grouping rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleLog {
    rules: Vec<GroupingRule>,
}

impl RuleLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a combine rule.
    pub fn with_combine(mut self, combination: ManualCombination) -> Self {
        self.push(GroupingRule::Combine(combination));
        self
    }

    /// Appends a delete rule.
    pub fn with_delete(mut self, name: impl AsRef<str>) -> Self {
        self.push(GroupingRule::Delete {
            name: normalize(name.as_ref()),
        });
        self
    }

    /// Appends a rule.
    pub fn push(&mut self, rule: GroupingRule) {
        self.rules.push(rule);
    }

    /// Rules in application order.
    pub fn rules(&self) -> &[GroupingRule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
