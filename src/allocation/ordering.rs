//! Visiting order of operations.
//!
//! Operations visited earlier see a larger operator pool, so the order
//! decides who gets the scarce high performers.

use crate::config::OrderingPolicy;
use crate::models::Operation;

/// Indices into `operations` in the order they claim operators.
///
/// `SamPriority` sorts by summed SAM descending; the sort is stable, so
/// equal SAM keeps input order.
pub fn visit_order(operations: &[Operation], policy: OrderingPolicy) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..operations.len()).collect();
    if policy == OrderingPolicy::SamPriority {
        indices.sort_by(|&a, &b| operations[b].total_sam().total_cmp(&operations[a].total_sam()));
    }
    indices
}
