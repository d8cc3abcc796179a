//! Typed table abstraction for the spreadsheet side of a reconciliation.
//!
//! Source sheets have no reliable header row: the label that identifies the
//! amount column may sit in any cell of that column. Cells keep their source
//! typing so that numeric cells can be told apart from text that merely looks
//! numeric.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ReconError;

/// A single cell as decoded from the source workbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Cell {
    Empty,
    Float(f64),
    Int(i64),
    Text(String),
    Bool(bool),
    /// Spreadsheet date serial.
    DateTime(f64),
    Error(String),
}

impl Cell {
    /// Exact value of a genuine numeric cell.
    ///
    /// Only `Float` and `Int` count. Text is never coerced, even `"12.50"`;
    /// booleans, dates and non-finite floats are not money either. A finite
    /// float too large for `Decimal` is an error, not a skipped cell.
    pub fn numeric_value(&self) -> Result<Option<Decimal>, ReconError> {
        match self {
            Self::Int(n) => Ok(Some(Decimal::from(*n))),
            Self::Float(f) if f.is_finite() => float_to_decimal(*f)
                .map(Some)
                .ok_or_else(|| ReconError::AmountOutOfRange { value: f.to_string() }),
            // Bool stays out even though the legacy tool summed `True` as 1.
            _ => Ok(None),
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Float(f) => f.is_nan(),
            _ => false,
        }
    }
}

/// Shortest round-trip text of the float, so `100.5` becomes exactly `100.5`
/// rather than its binary expansion.
fn float_to_decimal(f: f64) -> Option<Decimal> {
    Decimal::from_str(&f.to_string()).ok().or_else(|| Decimal::from_f64(f))
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "nan"),
            Self::Float(n) | Self::DateTime(n) => {
                if n.is_finite() && n.fract() == 0.0 {
                    write!(f, "{n:.1}")
                } else {
                    write!(f, "{n}")
                }
            }
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Self::Error(e) => write!(f, "{e}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Cell::Empty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self { name: name.into(), cells }
    }

    /// True if any cell, as text, contains `label`.
    pub fn mentions(&self, label: &str) -> bool {
        self.cells.iter().any(|c| c.to_string().contains(label))
    }
}

/// Ordered columns; declared order drives the locator's tie-breaking.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Build a table from raw rows, using the first row as column names.
    ///
    /// Blank names become `Unnamed: <index>` and repeated names get a `.<n>`
    /// suffix, so every column stays addressable by name. Short rows are
    /// padded with `Cell::Empty`.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        let mut rows = rows.into_iter();
        let header = match rows.next() {
            Some(h) => h,
            None => return Self::default(),
        };
        let body: Vec<Vec<Cell>> = rows.collect();
        let width = body.iter().map(Vec::len).chain([header.len()]).max().unwrap_or(0);

        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut columns = Vec::with_capacity(width);
        for idx in 0..width {
            let base = match header.get(idx) {
                Some(cell) if !cell.is_missing() => header_name(cell),
                _ => format!("Unnamed: {idx}"),
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 { base.clone() } else { format!("{base}.{count}") };
            *count += 1;

            let cells = body
                .iter()
                .map(|row| row.get(idx).cloned().unwrap_or(Cell::Empty))
                .collect();
            columns.push(Column { name, cells });
        }

        Self { columns }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.columns.iter().map(|c| c.cells.len()).max().unwrap_or(0)
    }
}

fn header_name(cell: &Cell) -> String {
    match cell {
        Cell::Float(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        other => other.to_string(),
    }
}

/// First column (in declared order) with a cell containing `label`.
pub fn locate_column<'a>(table: &'a Table, label: &str) -> Option<&'a Column> {
    table.columns.iter().find(|c| c.mentions(label))
}

/// Exact sum of the genuine numeric cells of a column; `0` when there are none.
pub fn sum_numeric(column: &Column) -> Result<Decimal, ReconError> {
    checked_sum(column).map(|(total, _)| total)
}

/// Sum and count of the numeric cells, failing instead of overflowing.
fn checked_sum(column: &Column) -> Result<(Decimal, usize), ReconError> {
    column.cells.iter().try_fold((Decimal::ZERO, 0), |(total, counted), cell| {
        match cell.numeric_value()? {
            Some(value) => total
                .checked_add(value)
                .map(|sum| (sum, counted + 1))
                .ok_or_else(|| ReconError::AmountOutOfRange { value: format!("{total} + {value}") }),
            None => Ok((total, counted)),
        }
    })
}

/// Spreadsheet-side total plus how it was obtained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadsheetTotal {
    pub column: String,
    pub total: Decimal,
    pub counted: usize,
    pub skipped: usize,
}

/// Locate the labeled column and sum it.
pub fn spreadsheet_total(table: &Table, label: &str) -> Result<SpreadsheetTotal, ReconError> {
    let column = locate_column(table, label)
        .ok_or_else(|| ReconError::ColumnNotFound { label: label.to_string() })?;

    let present = column.cells.iter().filter(|c| !c.is_missing()).count();
    let (total, counted) = checked_sum(column)?;
    let skipped = present - counted;
    if skipped > 0 {
        log::debug!("column '{}': skipped {} non-numeric cell(s)", column.name, skipped);
    }

    Ok(SpreadsheetTotal {
        column: column.name.clone(),
        total,
        counted,
        skipped,
    })
}
