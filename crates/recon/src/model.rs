use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::classify::{Classification, Outcome};

// ---------------------------------------------------------------------------
// History records
// ---------------------------------------------------------------------------

/// One reconciliation event, as persisted in the history file.
///
/// `gain` is always `spreadsheet_total - invoice_total`; the only constructor
/// computes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationRecord {
    pub date: NaiveDate,
    pub location: String,
    pub spreadsheet_total: Decimal,
    pub invoice_total: Decimal,
    pub gain: Decimal,
}

impl ReconciliationRecord {
    pub fn new(
        date: NaiveDate,
        location: impl Into<String>,
        spreadsheet_total: Decimal,
        invoice_total: Decimal,
    ) -> Self {
        Self {
            date,
            location: location.into(),
            spreadsheet_total,
            invoice_total,
            gain: spreadsheet_total - invoice_total,
        }
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth::from(self.date)
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Calendar month truncation of a date. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Sum of gains for one (month, location) pair. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyAggregate {
    pub year_month: YearMonth,
    pub location: String,
    pub gain: Decimal,
    pub record_count: usize,
}

// ---------------------------------------------------------------------------
// Run output
// ---------------------------------------------------------------------------

/// One-row summary of a single run, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub date: NaiveDate,
    pub location: String,
    pub spreadsheet_total: Decimal,
    pub invoice_total: Decimal,
    pub gain: Decimal,
    pub classification: Classification,
}

impl RunSummary {
    pub fn new(record: &ReconciliationRecord, outcome: &Outcome) -> Self {
        Self {
            date: record.date,
            location: record.location.clone(),
            spreadsheet_total: record.spreadsheet_total,
            invoice_total: record.invoice_total,
            gain: record.gain,
            classification: outcome.classification,
        }
    }
}
