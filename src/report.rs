//! End-to-end line-balancing run.
//!
//! # Pipeline
//!
//! ```text
//! tables ─ validate ─ parse ─ resolve labels ─ group ─ allocate ─ summarize
//! ```
//!
//! Schema problems, an invalid configuration or a rule log that does not
//! replay abort the run. Everything else (unresolved labels, non-numeric
//! cells, pool exhaustion) shows up in the report.

use serde::{Deserialize, Serialize};
use std::io;
use tracing::info;

use crate::allocation::{Allocator, GreedyAllocator};
use crate::config::AllocationConfig;
use crate::error::AllocationResult;
use crate::grouping::{apply_rules, CombinationRecord, RuleLog};
use crate::models::{Allocation, Operation, SkillTable, Table, TaskList};
use crate::resolver::{FuzzyResolver, OperationMap, ResolutionDiagnostic};
use crate::summary::{position_label, LineBalance, MachineSummary, OperatorSummary};
use crate::validation::validate_input;

/// One line of the allocation table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRow {
    /// Working-set position (0-based).
    pub position: usize,
    /// Zig-zag station label.
    pub station: String,
    /// Operation label.
    pub operation: String,
    /// Machine category.
    pub machine_type: String,
    /// Operator name or the unfilled placeholder.
    pub operator: String,
    /// Proficiency used (percentage).
    pub efficiency: f64,
    /// Target quantity.
    pub target: f64,
    /// Expected output.
    pub actual_output: f64,
    /// Performance tier (1-5).
    pub rating: u8,
}

#[derive(Serialize)]
struct CsvRecord<'a> {
    #[serde(rename = "OPERATION")]
    operation: &'a str,
    #[serde(rename = "MACHINE TYPE")]
    machine_type: &'a str,
    #[serde(rename = "OPERATOR")]
    operator: &'a str,
    #[serde(rename = "EFFICIENCY")]
    efficiency: f64,
    #[serde(rename = "TARGET")]
    target: f64,
    #[serde(rename = "ACTUAL OUTPUT")]
    actual_output: f64,
    #[serde(rename = "RATING")]
    rating: u8,
}

impl<'a> From<&'a AllocationRow> for CsvRecord<'a> {
    fn from(row: &'a AllocationRow) -> Self {
        Self {
            operation: &row.operation,
            machine_type: &row.machine_type,
            operator: &row.operator,
            efficiency: row.efficiency,
            target: row.target,
            actual_output: row.actual_output,
            rating: row.rating,
        }
    }
}

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationReport {
    /// Allocation table in working-set order.
    pub rows: Vec<AllocationRow>,
    /// Per-operator roll-up.
    pub operator_summary: Vec<OperatorSummary>,
    /// Per-machine-type counts of the source operations.
    pub machine_summary: MachineSummary,
    /// Line-level SAM and pitch time.
    pub line_balance: LineBalance,
    /// Labels without an exact skill column.
    pub diagnostics: Vec<ResolutionDiagnostic>,
    /// Active combinations.
    pub combinations: Vec<CombinationRecord>,
    /// Label → column mapping used for the run.
    pub operation_map: OperationMap,
}

impl AllocationReport {
    fn build(
        allocation: &Allocation,
        tasks: &TaskList,
        working: &[Operation],
        diagnostics: Vec<ResolutionDiagnostic>,
        combinations: Vec<CombinationRecord>,
        operation_map: OperationMap,
    ) -> Self {
        let rows = allocation
            .assignments
            .iter()
            .map(|a| AllocationRow {
                position: a.position,
                station: position_label(a.position),
                operation: a.operation.clone(),
                machine_type: a.machine_type.clone(),
                operator: a.operator_label().to_string(),
                efficiency: a.proficiency,
                target: a.target,
                actual_output: a.actual_output(),
                rating: a.rating(),
            })
            .collect();

        Self {
            rows,
            operator_summary: OperatorSummary::calculate(allocation),
            machine_summary: MachineSummary::calculate(tasks.operations()),
            line_balance: LineBalance::calculate(working, allocation),
            diagnostics,
            combinations,
            operation_map,
        }
    }

    /// Writes the allocation table as CSV.
    ///
    /// Columns: `OPERATION, MACHINE TYPE, OPERATOR, EFFICIENCY, TARGET,
    /// ACTUAL OUTPUT, RATING`.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> AllocationResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for row in &self.rows {
            csv.serialize(CsvRecord::from(row))?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Row for an operation label.
    pub fn row(&self, operation: &str) -> Option<&AllocationRow> {
        self.rows.iter().find(|r| r.operation == operation)
    }
}

/// Runs the whole pipeline for one configuration.
///
/// # Example
///
/// ```
/// use u_linebalance::config::AllocationConfig;
/// use u_linebalance::grouping::RuleLog;
/// use u_linebalance::models::{Cell, Table};
/// use u_linebalance::report::LineBalancer;
///
/// let skills = Table::new(["OPERATOR NAME", "SEW"])
///     .with_row([Cell::from("A"), Cell::from(90.0)])
///     .with_row([Cell::from("B"), Cell::from(70.0)]);
/// let tasks = Table::new(["OPERATION DESCRIPTION", "MACHINE TYPE", "TARGET", "MACHINE SAM"])
///     .with_row([Cell::from("SEW"), Cell::from("SNLS"), Cell::from(100.0), Cell::from(0.5)]);
///
/// let report = LineBalancer::new(AllocationConfig::default())
///     .run(&skills, &tasks, &RuleLog::new())
///     .unwrap();
/// assert_eq!(report.rows[0].operator, "A");
/// assert_eq!(report.rows[0].actual_output, 90.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineBalancer {
    config: AllocationConfig,
}

impl LineBalancer {
    /// Creates a balancer.
    pub fn new(config: AllocationConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// Runs with the greedy allocator built from the configuration.
    pub fn run(&self, skill_table: &Table, task_table: &Table, rules: &RuleLog) -> AllocationResult<AllocationReport> {
        let allocator = GreedyAllocator::from_config(&self.config);
        self.run_with(&allocator, skill_table, task_table, rules)
    }

    /// Runs with a caller-supplied allocator.
    ///
    /// # Errors
    /// - [`AllocationError::Config`](crate::error::AllocationError::Config) for out-of-range settings
    /// - [`AllocationError::Schema`](crate::error::AllocationError::Schema) for missing columns
    /// - [`AllocationError::Grouping`](crate::error::AllocationError::Grouping) when the rule log does not replay
    pub fn run_with<A: Allocator>(
        &self,
        allocator: &A,
        skill_table: &Table,
        task_table: &Table,
        rules: &RuleLog,
    ) -> AllocationResult<AllocationReport> {
        self.config.validate()?;
        validate_input(skill_table, task_table)?;

        let skills = SkillTable::from_table(skill_table);
        let tasks = TaskList::from_table(task_table);
        info!(
            operators = skills.operator_count(),
            skill_columns = skills.columns().len(),
            operations = tasks.len(),
            "loaded inputs"
        );

        let overrides = self
            .config
            .operation_map
            .iter()
            .fold(OperationMap::new(), |map, (label, column)| map.with_entry(label, column));
        let resolution = FuzzyResolver::new()
            .with_cutoff(self.config.similarity_cutoff)
            .with_overrides(overrides)
            .resolve(tasks.unique_labels(), skills.columns());

        let working = apply_rules(tasks.operations(), self.config.auto_grouping.as_ref(), rules)?;
        let allocation = allocator.allocate(working.operations(), &skills, &resolution.map);

        Ok(AllocationReport::build(
            &allocation,
            &tasks,
            working.operations(),
            resolution.diagnostics,
            working.combinations(),
            resolution.map,
        ))
    }
}
