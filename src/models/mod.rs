//! Line-balancing domain models.
//!
//! Provides the data types the allocator works on: the parsed input tables,
//! operators with their skill matrix, operations (simple or combined) and
//! the resulting allocation.
//!
//! # Domain Mappings
//!
//! | u-linebalance | Garment line | Assembly line |
//! |---------------|--------------|---------------|
//! | Operator | Sewing operator | Assembler |
//! | Operation | Bulletin operation | Work element |
//! | SkillTable | Skill matrix | Certification matrix |
//! | Allocation | Line plan | Station plan |

mod assignment;
mod operation;
mod operator;
mod table;

pub use assignment::{Allocation, Assignment, AssignmentOutcome, UNFILLED_OPERATOR};
pub use operation::{Combination, CombinationOrigin, Operation, OperationKind, TaskList};
pub use operator::{Operator, SkillTable};
pub use table::{columns, Cell, Table};
