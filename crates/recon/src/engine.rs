use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregate::monthly_aggregates;
use crate::classify::{classify, Outcome};
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::history::HistoryStore;
use crate::invoice::InvoiceExtractor;
use crate::model::{MonthlyAggregate, ReconciliationRecord, RunSummary};
use crate::table::{spreadsheet_total, SpreadsheetTotal, Table};

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Decodes a spreadsheet container into a typed table.
pub trait TableReader {
    /// Must fail with [`ReconError::SheetNotFound`] when `sheet` is absent.
    fn read_table(&self, path: &Path, sheet: &str) -> Result<Table, ReconError>;
}

/// Decodes a document container into plain text, pages concatenated in order.
pub trait DocumentReader {
    fn read_text(&self, path: &Path) -> Result<String, ReconError>;
}

// ---------------------------------------------------------------------------
// Pure reconciliation
// ---------------------------------------------------------------------------

/// Result of comparing one table against one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    pub spreadsheet: SpreadsheetTotal,
    pub invoice_total: Decimal,
    /// Further labeled totals after the first one, ignored for the result.
    pub extra_invoice_totals: Vec<Decimal>,
    pub outcome: Outcome,
    pub record: ReconciliationRecord,
}

/// Spreadsheet total, invoice total, classification, record. No I/O.
pub fn reconcile(
    config: &ReconConfig,
    table: &Table,
    document_text: &str,
    location: &str,
    date: NaiveDate,
) -> Result<Reconciliation, ReconError> {
    let spreadsheet = spreadsheet_total(table, &config.column_label)?;
    log::debug!(
        "spreadsheet total {} from column '{}' ({} numeric cell(s))",
        spreadsheet.total,
        spreadsheet.column,
        spreadsheet.counted
    );

    let extractor = InvoiceExtractor::new(&config.invoice_label);
    let invoice_total = extractor.extract(document_text)?;
    let extra_invoice_totals: Vec<Decimal> =
        extractor.find_all(document_text).into_iter().skip(1).collect();
    if !extra_invoice_totals.is_empty() {
        log::warn!(
            "document has {} more '{}' total(s) after the first; using {}",
            extra_invoice_totals.len(),
            extractor.label(),
            invoice_total
        );
    }

    let outcome = classify(spreadsheet.total, invoice_total, config.tolerance);
    let record = ReconciliationRecord::new(date, location, spreadsheet.total, invoice_total);

    Ok(Reconciliation { spreadsheet, invoice_total, extra_invoice_totals, outcome, record })
}

// ---------------------------------------------------------------------------
// Full run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RunRequest {
    pub spreadsheet: PathBuf,
    pub invoice: PathBuf,
    pub location: String,
    pub date: NaiveDate,
    /// Reconcile and aggregate without writing the record.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub reconciliation: Reconciliation,
    pub summary: RunSummary,
    pub monthly: Vec<MonthlyAggregate>,
    pub history_len: usize,
    pub persisted: bool,
    pub engine_version: String,
}

/// Read both inputs, reconcile, append to history, aggregate.
///
/// Any failure before the append leaves the store untouched.
pub fn run(
    config: &ReconConfig,
    request: &RunRequest,
    tables: &dyn TableReader,
    documents: &dyn DocumentReader,
    store: &HistoryStore,
) -> Result<RunReport, ReconError> {
    config.check_location(&request.location)?;

    let table = tables.read_table(&request.spreadsheet, &config.sheet)?;
    log::info!(
        "read sheet '{}' from {}: {} column(s), {} row(s)",
        config.sheet,
        request.spreadsheet.display(),
        table.columns.len(),
        table.row_count()
    );

    let text = documents.read_text(&request.invoice)?;
    log::info!("read {} byte(s) of text from {}", text.len(), request.invoice.display());

    let reconciliation = reconcile(config, &table, &text, &request.location, request.date)?;
    let summary = RunSummary::new(&reconciliation.record, &reconciliation.outcome);

    let history = if request.dry_run {
        let mut history = store.load();
        history.push(reconciliation.record.clone());
        history
    } else {
        store.append(reconciliation.record.clone())?
    };

    Ok(RunReport {
        monthly: monthly_aggregates(&history),
        history_len: history.len(),
        persisted: !request.dry_run,
        reconciliation,
        summary,
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classification;
    use crate::table::{Cell, Column};
    use rust_decimal_macros::dec;

    struct FixedTable(Table);

    impl TableReader for FixedTable {
        fn read_table(&self, _path: &Path, sheet: &str) -> Result<Table, ReconError> {
            if sheet == "Imput" {
                Ok(self.0.clone())
            } else {
                Err(ReconError::SheetNotFound { sheet: sheet.into(), available: vec!["Imput".into()] })
            }
        }
    }

    struct FixedText(&'static str);

    impl DocumentReader for FixedText {
        fn read_text(&self, _path: &Path) -> Result<String, ReconError> {
            Ok(self.0.to_string())
        }
    }

    fn table() -> Table {
        Table::new(vec![
            Column::new("Unnamed: 0", vec!["Item".into(), "A".into(), "B".into(), "C".into(), "D".into()]),
            Column::new(
                "Unnamed: 1",
                vec!["Preço Tt".into(), 100.50.into(), "N/A".into(), 200.25.into(), Cell::Empty],
            ),
        ])
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn request(dry_run: bool) -> RunRequest {
        RunRequest {
            spreadsheet: "planilha.xlsx".into(),
            invoice: "nota.pdf".into(),
            location: "Itaim".into(),
            date: date("2024-03-01"),
            dry_run,
        }
    }

    #[test]
    fn reconcile_shortfall() {
        let config = ReconConfig::default();
        let r = reconcile(&config, &table(), "Total Liquido: 1.234,56", "Itaim", date("2024-03-01")).unwrap();
        assert_eq!(r.spreadsheet.total, dec!(300.75));
        assert_eq!(r.invoice_total, dec!(1234.56));
        assert_eq!(r.outcome.gain, dec!(-933.81));
        assert_eq!(r.outcome.classification, Classification::Negative);
        assert_eq!(r.record.gain, r.outcome.gain);
        assert!(r.extra_invoice_totals.is_empty());
    }

    #[test]
    fn reconcile_keeps_first_total() {
        let config = ReconConfig::default();
        let text = "Total Liquido: 300,75\nTotal Liquido: 9.999,99";
        let r = reconcile(&config, &table(), text, "Itaim", date("2024-03-01")).unwrap();
        assert_eq!(r.invoice_total, dec!(300.75));
        assert_eq!(r.extra_invoice_totals, vec![dec!(9999.99)]);
        assert_eq!(r.outcome.classification, Classification::Neutral);
    }

    #[test]
    fn run_appends_and_aggregates() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("historico.csv"));
        let report = run(
            &ReconConfig::default(),
            &request(false),
            &FixedTable(table()),
            &FixedText("Total Liquido: 1.234,56"),
            &store,
        )
        .unwrap();

        assert!(report.persisted);
        assert_eq!(report.history_len, 1);
        assert_eq!(report.monthly.len(), 1);
        assert_eq!(report.monthly[0].year_month.to_string(), "2024-03");
        assert_eq!(report.monthly[0].gain, dec!(-933.81));
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn dry_run_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("historico.csv"));
        let report = run(
            &ReconConfig::default(),
            &request(true),
            &FixedTable(table()),
            &FixedText("Total Liquido: 1.234,56"),
            &store,
        )
        .unwrap();
        assert!(!report.persisted);
        assert_eq!(report.history_len, 1);
        assert!(!store.exists());
    }

    #[test]
    fn failures_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("historico.csv"));
        let config = ReconConfig::default();

        let err = run(&config, &request(false), &FixedTable(table()), &FixedText("sem total"), &store)
            .unwrap_err();
        assert!(matches!(err, ReconError::InvoiceAmountNotFound { .. }));

        let empty = Table::new(vec![Column::new("a", vec![1.0.into()])]);
        let err = run(&config, &request(false), &FixedTable(empty), &FixedText("Total Liquido: 1,00"), &store)
            .unwrap_err();
        assert!(matches!(err, ReconError::ColumnNotFound { .. }));

        let mut bad_location = request(false);
        bad_location.location = "Moema".into();
        let err = run(&config, &bad_location, &FixedTable(table()), &FixedText("Total Liquido: 1,00"), &store)
            .unwrap_err();
        assert!(matches!(err, ReconError::UnknownLocation { .. }));

        let mut other_sheet = config.clone();
        other_sheet.sheet = "Resumo".into();
        let err = run(&other_sheet, &request(false), &FixedTable(table()), &FixedText("Total Liquido: 1,00"), &store)
            .unwrap_err();
        assert!(matches!(err, ReconError::SheetNotFound { .. }));

        assert!(!store.exists());
    }
}
