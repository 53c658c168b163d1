//! Parsed tabular input.
//!
//! Spreadsheet ingestion happens outside this crate. What arrives here is an
//! ordered list of headers and rows of loosely typed cells, the same shape a
//! skill matrix or an operation bulletin has once it is read from disk.

use serde::{Deserialize, Serialize};

use crate::normalize::{normalize, parse_number};

/// Well-known column headers (normalized form).
pub mod columns {
    /// Operator identity column of the skill matrix.
    pub const OPERATOR_NAME: &str = "OPERATOR NAME";
    /// Substring marking non-skill identity columns in the skill matrix.
    pub const OPERATOR_MARKER: &str = "OPERATOR";
    /// Operation label column of the task list.
    pub const OPERATION_DESCRIPTION: &str = "OPERATION DESCRIPTION";
    /// Machine category column of the task list.
    pub const MACHINE_TYPE: &str = "MACHINE TYPE";
    /// Baseline quantity column of the task list.
    pub const TARGET: &str = "TARGET";
    /// Machine effort column of the task list.
    pub const MACHINE_SAM: &str = "MACHINE SAM";
    /// Manual effort column of the task list (optional).
    pub const MANUAL_SAM: &str = "MANUAL SAM";
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Cell {
    /// No value.
    #[default]
    Empty,
    /// A numeric value.
    Number(f64),
    /// Free text.
    Text(String),
}

impl Cell {
    /// Whether the cell carries no usable value (empty, blank text or NaN).
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Number(v) => v.is_nan(),
            Cell::Text(s) => s.trim().is_empty(),
        }
    }

    /// Numeric reading of the cell, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Empty => None,
            Cell::Number(v) => v.is_finite().then_some(*v),
            Cell::Text(s) => parse_number(s),
        }
    }

    /// Numeric reading with failures coerced to 0.
    pub fn to_number_or_zero(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }

    /// Text reading of the cell (numbers are formatted, empty is "").
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(v) if v.is_nan() => String::new(),
            Cell::Number(v) => v.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Empty)
    }
}

/// An in-memory table with ordered headers.
///
/// Rows shorter than the header list read as [`Cell::Empty`] in the missing
/// positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Column headers as supplied.
    pub headers: Vec<String>,
    /// Data rows.
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Creates an empty table with the given headers.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    pub fn with_row<I, C>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    /// Index of the column whose normalized header equals `name` (normalized).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = normalize(name);
        self.headers.iter().position(|h| normalize(h) == wanted)
    }

    /// Whether a column with the given (normalized) name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at (row, column), or [`Cell::Empty`] when out of range.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY)
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
