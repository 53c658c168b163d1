//! Keyword/threshold grouping.
//!
//! # Algorithm
//! For each keyword (in configured order) and each machine type (in order
//! of first appearance), collect the not-yet-grouped operations whose label
//! contains the keyword and whose summed SAM is below the threshold. Two or
//! more such operations become one `COMBINED <KEYWORD> OPERATIONS (<type>)`
//! row.
//!
//! An operation is grouped by at most one keyword: the first keyword that
//! actually groups it. Keyword order is policy, configurable per run.

use tracing::debug;

use crate::config::AutoGrouping;
use crate::models::{CombinationOrigin, Operation};
use crate::normalize::normalize;

/// Name of an automatically combined operation.
pub fn combined_name(keyword: &str, machine_type: &str) -> String {
    format!("COMBINED {keyword} OPERATIONS ({machine_type})")
}

/// Splits `operations` into (ungrouped, combined) under the given rules.
///
/// Ungrouped operations keep their relative order; combined rows are in
/// creation order (keyword, then machine type).
pub fn auto_group(operations: &[Operation], rules: &AutoGrouping) -> (Vec<Operation>, Vec<Operation>) {
    let mut used = vec![false; operations.len()];
    let mut combined = Vec::new();

    let mut machine_types: Vec<&str> = Vec::new();
    for op in operations {
        if !machine_types.contains(&op.machine_type.as_str()) {
            machine_types.push(&op.machine_type);
        }
    }

    for keyword in rules.keywords.iter().map(|k| normalize(k)) {
        if keyword.is_empty() {
            continue;
        }
        for machine_type in &machine_types {
            let members: Vec<usize> = operations
                .iter()
                .enumerate()
                .filter(|(i, op)| {
                    !used[*i]
                        && op.machine_type == *machine_type
                        && op.label.contains(&keyword)
                        && op.total_sam() < rules.sam_threshold
                })
                .map(|(i, _)| i)
                .collect();

            if members.len() < 2 {
                continue;
            }

            let constituents: Vec<Operation> =
                members.iter().map(|&i| operations[i].clone()).collect();
            for &i in &members {
                used[i] = true;
            }
            let name = combined_name(&keyword, machine_type);
            debug!(%name, count = constituents.len(), "auto-combined operations");
            if let Some(op) = Operation::combine(
                &name,
                machine_type,
                CombinationOrigin::Automatic {
                    keyword: keyword.clone(),
                },
                constituents,
            ) {
                combined.push(op);
            }
        }
    }

    let ungrouped = operations
        .iter()
        .zip(&used)
        .filter(|(_, u)| !**u)
        .map(|(op, _)| op.clone())
        .collect();
    (ungrouped, combined)
}
