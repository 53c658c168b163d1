//! Operator and skill-matrix model.
//!
//! An operator is a line worker with a proficiency percentage for each
//! operation they are trained on. The skill matrix is the collection of all
//! operators present for the run, kept in input order because that order is
//! the tie-break for every selection the allocator makes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use super::table::{columns, Cell, Table};
use crate::normalize::normalize;

/// A worker with per-operation proficiency values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    /// Unique operator name.
    pub name: String,
    /// Skill column → proficiency percentage (0-100). Absent = not skilled.
    pub proficiencies: HashMap<String, f64>,
}

impl Operator {
    /// Creates an operator with no recorded skills.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            proficiencies: HashMap::new(),
        }
    }

    /// Records a proficiency for a skill column.
    ///
    /// Non-finite values are not recorded; the operator stays unskilled on
    /// that column.
    pub fn with_proficiency(mut self, column: impl Into<String>, value: f64) -> Self {
        if value.is_finite() {
            self.proficiencies.insert(column.into(), value);
        }
        self
    }

    /// Proficiency on a skill column, `None` when not skilled.
    ///
    /// Non-finite entries read as missing.
    pub fn proficiency(&self, column: &str) -> Option<f64> {
        self.proficiencies
            .get(column)
            .copied()
            .filter(|v| v.is_finite())
    }

    /// Whether the operator has a usable value for the column.
    pub fn is_skilled_in(&self, column: &str) -> bool {
        self.proficiency(column).is_some()
    }

    /// Best proficiency across several columns, ignoring missing ones.
    pub fn best_proficiency<'a, I>(&self, columns: I) -> Option<f64>
    where
        I: IntoIterator<Item = &'a str>,
    {
        columns
            .into_iter()
            .filter_map(|c| self.proficiency(c))
            .max_by(|a, b| a.total_cmp(b))
    }
}

/// The skill matrix: operators in input order plus the known skill columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillTable {
    operators: Vec<Operator>,
    columns: Vec<String>,
}

impl SkillTable {
    /// Creates an empty skill table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an operator; any new skill columns are registered in order.
    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.push(operator);
        self
    }

    /// Registers a skill column nobody is skilled in yet.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        let column = column.into();
        if !self.columns.contains(&column) {
            self.columns.push(column);
        }
        self
    }

    fn push(&mut self, operator: Operator) {
        let mut new_columns: Vec<&String> = operator
            .proficiencies
            .keys()
            .filter(|c| !self.columns.contains(c))
            .collect();
        new_columns.sort();
        let new_columns: Vec<String> = new_columns.into_iter().cloned().collect();
        self.columns.extend(new_columns);
        self.operators.push(operator);
    }

    /// Builds the skill table from a parsed skill matrix.
    ///
    /// The table must already have passed
    /// [`validate_skill_table`](crate::validation::validate_skill_table).
    /// Every header not containing `OPERATOR` is a skill column. Blank or
    /// NaN cells mean "not skilled"; text that is not a number counts as a
    /// proficiency of 0.
    pub fn from_table(table: &Table) -> Self {
        let name_col = table.column_index(columns::OPERATOR_NAME);
        let skill_cols: Vec<(usize, String)> = table
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| (i, normalize(h)))
            .filter(|(_, h)| !h.is_empty() && !h.contains(columns::OPERATOR_MARKER))
            .collect();

        let mut skills = Self {
            operators: Vec::new(),
            columns: Vec::new(),
        };
        for (_, header) in &skill_cols {
            if !skills.columns.contains(header) {
                skills.columns.push(header.clone());
            }
        }

        let Some(name_col) = name_col else {
            return skills;
        };

        for row in 0..table.row_count() {
            let name = table.cell(row, name_col).as_text().trim().to_string();
            if name.is_empty() {
                debug!(row, "skipping skill-matrix row without operator name");
                continue;
            }
            if skills.operators.iter().any(|op| op.name == name) {
                warn!(row, operator = %name, "skipping duplicate operator name in skill matrix");
                continue;
            }
            let mut operator = Operator::new(name);
            for (col, header) in &skill_cols {
                let cell = table.cell(row, *col);
                if let Some(value) = proficiency_of(cell) {
                    operator.proficiencies.insert(header.clone(), value);
                }
            }
            skills.operators.push(operator);
        }
        skills
    }

    /// Operators in input order.
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// Skill columns in input order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether the skill column exists.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Number of operators.
    pub fn operator_count(&self) -> usize {
        self.operators.len()
    }

    /// Finds an operator by name.
    pub fn operator(&self, name: &str) -> Option<&Operator> {
        self.operators.iter().find(|o| o.name == name)
    }
}

fn proficiency_of(cell: &Cell) -> Option<f64> {
    if cell.is_missing() {
        None
    } else {
        Some(cell.to_number_or_zero())
    }
}
