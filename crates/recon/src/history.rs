//! Append-only reconciliation history, persisted as CSV.
//!
//! The whole file is rewritten on every append (write to `<file>.tmp`, then
//! rename). There is no locking: with two concurrent writers the last rename
//! wins and the other run's record is lost.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::ReconError;
use crate::model::ReconciliationRecord;

/// Persisted header, in column order.
pub const HEADER: [&str; 5] = ["Date", "Location", "Valor Planilha", "Valor Nota Fiscal", "Ganho"];

/// Header names accepted on read for files written by earlier tooling.
const DATE_ALIASES: &[&str] = &["Date", "Data"];
const LOCATION_ALIASES: &[&str] = &["Location", "Loja"];

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// All records in append order. A missing or unreadable store reads as empty.
    pub fn load(&self) -> Vec<ReconciliationRecord> {
        match self.try_load() {
            Ok(records) => records,
            Err(e) => {
                log::warn!("{e}; continuing with empty history");
                Vec::new()
            }
        }
    }

    /// Like [`load`](Self::load), but surfaces read/decode failures.
    /// A missing file is still an empty history.
    pub fn try_load(&self) -> Result<Vec<ReconciliationRecord>, ReconError> {
        if !self.path.exists() {
            log::debug!("no history at {}, starting empty", self.path.display());
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.path).map_err(|e| self.unavailable(e))?;
        decode(&data).map_err(|reason| self.unavailable(reason))
    }

    /// Append one record and rewrite the store. Returns the full new history.
    ///
    /// An existing store that cannot be decoded is an error here rather than
    /// an empty history, so a rewrite never drops earlier records.
    pub fn append(
        &self,
        record: ReconciliationRecord,
    ) -> Result<Vec<ReconciliationRecord>, ReconError> {
        let mut records = self.try_load()?;
        records.push(record);
        self.write_all(&records)?;
        log::info!("history {}: {} record(s)", self.path.display(), records.len());
        Ok(records)
    }

    /// Replace the store contents atomically.
    fn write_all(&self, records: &[ReconciliationRecord]) -> Result<(), ReconError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.unavailable(e))?;
            }
        }

        let data = encode(records).map_err(|e| self.unavailable(e))?;
        let tmp_path = tmp_path_for(&self.path);
        if let Err(e) = fs::write(&tmp_path, data) {
            let _ = fs::remove_file(&tmp_path);
            return Err(self.unavailable(e));
        }
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            self.unavailable(e)
        })
    }

    fn unavailable(&self, reason: impl ToString) -> ReconError {
        ReconError::StoreUnavailable {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

// ---------------------------------------------------------------------------
// CSV codec
// ---------------------------------------------------------------------------

/// Serialize records with the persisted header.
pub fn encode(records: &[ReconciliationRecord]) -> Result<Vec<u8>, String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER).map_err(|e| format!("CSV write error: {e}"))?;

    for r in records {
        writer
            .write_record([
                r.date.format("%Y-%m-%d").to_string(),
                r.location.clone(),
                persisted_amount(r.spreadsheet_total),
                persisted_amount(r.invoice_total),
                persisted_amount(r.gain),
            ])
            .map_err(|e| format!("CSV write error: {e}"))?;
    }

    writer.into_inner().map_err(|e| format!("CSV flush error: {e}"))
}

/// Parse a history file. Columns are found by header name, so reordered
/// columns still load.
pub fn decode(data: &str) -> Result<Vec<ReconciliationRecord>, String> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let idx = |names: &[&str]| -> Result<usize, String> {
        headers
            .iter()
            .position(|h| names.contains(&h.as_str()))
            .ok_or_else(|| format!("missing column '{}'", names[0]))
    };

    let date_idx = idx(DATE_ALIASES)?;
    let location_idx = idx(LOCATION_ALIASES)?;
    let sheet_idx = idx(&[HEADER[2]])?;
    let invoice_idx = idx(&[HEADER[3]])?;
    let gain_idx = idx(&[HEADER[4]]).ok();

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.map_err(|e| e.to_string())?;
        // line 1 is the header
        let line = line + 2;
        let field = |i: usize| row.get(i).unwrap_or("").trim();

        let date_str = field(date_idx);
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|_| format!("line {line}: cannot parse date '{date_str}'"))?;
        let spreadsheet_total = parse_amount(field(sheet_idx), line)?;
        let invoice_total = parse_amount(field(invoice_idx), line)?;

        let record = ReconciliationRecord::new(date, field(location_idx), spreadsheet_total, invoice_total);
        if let Some(gi) = gain_idx {
            if let Ok(stored) = parse_amount(field(gi), line) {
                if stored != record.gain {
                    log::debug!("line {line}: stored gain {stored} differs from {}, recomputed", record.gain);
                }
            }
        }
        records.push(record);
    }

    Ok(records)
}

fn parse_amount(s: &str, line: usize) -> Result<Decimal, String> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| format!("line {line}: cannot parse amount '{s}'"))
}

/// `.` decimal point, at least two fractional digits, never rounded.
fn persisted_amount(value: Decimal) -> String {
    let mut v = value;
    if v.scale() < 2 {
        v.rescale(2);
    }
    v.to_string()
}
