// Human, CSV and JSON renderings of runs and history, plus the
// `history` and `monthly` commands

use std::path::Path;

use gainbook_recon::aggregate::{location_totals, monthly_aggregates};
use gainbook_recon::money::{format_brl, format_plain};
use gainbook_recon::{
    Classification, HistoryStore, MonthlyAggregate, Outcome, ReconConfig, ReconciliationRecord,
    RunReport, RunSummary,
};

use crate::render::{render_table, Align};
use crate::{print_json, resolve_config, CliError, StoreArgs};

/// `⚪ no difference` / `🟢 gain: R$ 5,00` / `🔴 shortfall: R$ -933,81`
pub(crate) fn classification_line(outcome: &Outcome) -> String {
    match outcome.classification {
        Classification::Neutral => format!("{} {}", outcome.classification.marker(), outcome.classification),
        Classification::Positive | Classification::Negative => format!(
            "{} {}: {}",
            outcome.classification.marker(),
            outcome.classification,
            format_brl(outcome.gain)
        ),
    }
}

pub(crate) fn format_run(report: &RunReport, config: &ReconConfig) -> String {
    let rec = &report.reconciliation;
    let mut out = String::new();

    out.push_str(&format!(
        "Spreadsheet total ({}): {}\n",
        config.column_label,
        format_brl(rec.spreadsheet.total)
    ));
    out.push_str(&format!(
        "Invoice total ({}): {}\n",
        config.invoice_label.trim_end_matches(':'),
        format_brl(rec.invoice_total)
    ));
    out.push_str(&classification_line(&rec.outcome));
    out.push_str("\n\n");

    out.push_str(&summary_table(&report.summary));
    out.push('\n');

    out.push_str("Monthly gains\n");
    out.push_str(&monthly_table(&report.monthly));
    out
}

fn summary_table(summary: &RunSummary) -> String {
    render_table(
        &["Date", "Location", "Valor Planilha", "Valor Nota Fiscal", "Ganho", "Result"],
        &[Align::Left, Align::Left, Align::Right, Align::Right, Align::Right, Align::Left],
        &[vec![
            summary.date.to_string(),
            summary.location.clone(),
            format_brl(summary.spreadsheet_total),
            format_brl(summary.invoice_total),
            format_brl(summary.gain),
            summary.classification.to_string(),
        ]],
    )
}

pub(crate) fn monthly_table(groups: &[MonthlyAggregate]) -> String {
    let rows: Vec<Vec<String>> = groups
        .iter()
        .map(|g| {
            vec![
                g.year_month.to_string(),
                g.location.clone(),
                format_brl(g.gain),
                g.record_count.to_string(),
            ]
        })
        .collect();
    render_table(
        &["Month", "Location", "Gain", "Runs"],
        &[Align::Left, Align::Left, Align::Right, Align::Right],
        &rows,
    )
}

pub(crate) fn history_table(records: &[ReconciliationRecord]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.date.to_string(),
                r.location.clone(),
                format_brl(r.spreadsheet_total),
                format_brl(r.invoice_total),
                format_brl(r.gain),
            ]
        })
        .collect();
    render_table(
        &["Date", "Location", "Valor Planilha", "Valor Nota Fiscal", "Ganho"],
        &[Align::Left, Align::Left, Align::Right, Align::Right, Align::Right],
        &rows,
    )
}

/// Chart data: `year_month,location,gain` with `.` decimals.
pub(crate) fn monthly_csv(groups: &[MonthlyAggregate]) -> Result<String, CliError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["year_month", "location", "gain"])
        .map_err(|e| CliError::other(format!("CSV write error: {}", e)))?;
    for g in groups {
        wtr.write_record([g.year_month.to_string(), g.location.clone(), format_plain(g.gain)])
            .map_err(|e| CliError::other(format!("CSV write error: {}", e)))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| CliError::other(format!("CSV write error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| CliError::other(format!("CSV write error: {}", e)))
}

/// Load the configured history, optionally narrowed to one known location.
fn load_history(
    settings: Option<&Path>,
    store_args: &StoreArgs,
    location: Option<&str>,
) -> Result<(HistoryStore, Vec<ReconciliationRecord>), CliError> {
    let resolved = resolve_config(settings, store_args)?;
    if let Some(location) = location {
        resolved.config.check_location(location).map_err(CliError::recon)?;
    }

    let store = HistoryStore::open(&resolved.config.history_path);
    let mut records = store.load();
    if let Some(location) = location {
        records.retain(|r| r.location == location);
    }
    Ok((store, records))
}

// ============================================================================
// history
// ============================================================================

pub(crate) fn cmd_history(
    settings: Option<&Path>,
    store_args: &StoreArgs,
    location: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let (store, records) = load_history(settings, store_args, location.as_deref())?;

    if json {
        return print_json(&records);
    }

    if records.is_empty() {
        eprintln!("no reconciliations recorded in {}", store.path().display());
        return Ok(());
    }

    print!("{}", history_table(&records));
    println!();
    for (location, total) in location_totals(&records) {
        println!("Total {}: {}", location, format_brl(total));
    }
    Ok(())
}

// ============================================================================
// monthly
// ============================================================================

pub(crate) fn cmd_monthly(
    settings: Option<&Path>,
    store_args: &StoreArgs,
    location: Option<String>,
    csv: bool,
    json: bool,
) -> Result<(), CliError> {
    let (store, records) = load_history(settings, store_args, location.as_deref())?;
    let groups = monthly_aggregates(&records);

    if json {
        print_json(&groups)
    } else if csv {
        print!("{}", monthly_csv(&groups)?);
        Ok(())
    } else {
        if groups.is_empty() {
            eprintln!("no reconciliations recorded in {}", store.path().display());
            return Ok(());
        }
        print!("{}", monthly_table(&groups));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gainbook_recon::classify;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn record(date: &str, location: &str, sheet: &str, invoice: &str) -> ReconciliationRecord {
        ReconciliationRecord::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            location,
            d(sheet),
            d(invoice),
        )
    }

    #[test]
    fn classification_lines_carry_sign() {
        let tol = d("0.01");
        assert_eq!(classification_line(&classify(d("300.75"), d("1234.56"), tol)), "🔴 shortfall: R$ -933,81");
        assert_eq!(classification_line(&classify(d("105"), d("100"), tol)), "🟢 gain: R$ 5,00");
        assert_eq!(classification_line(&classify(d("100.00"), d("100.005"), tol)), "⚪ no difference");
    }

    #[test]
    fn monthly_csv_uses_plain_decimals() {
        let groups = monthly_aggregates(&[
            record("2024-03-01", "Itaim", "300.75", "1234.56"),
            record("2024-03-15", "Jaçanã", "1500.00", "1000.00"),
        ]);
        let csv = monthly_csv(&groups).unwrap();
        assert_eq!(csv, "year_month,location,gain\n2024-03,Itaim,-933.81\n2024-03,Jaçanã,500.00\n");
    }

    #[test]
    fn history_table_lists_records_in_order() {
        let table = history_table(&[
            record("2024-03-02", "Jaçanã", "10", "5"),
            record("2024-03-01", "Itaim", "300.75", "1234.56"),
        ]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("2024-03-02  Jaçanã"));
        assert!(lines[3].starts_with("2024-03-01  Itaim"));
        assert!(lines[3].ends_with("R$ -933,81"));
    }

    #[test]
    fn empty_monthly_table_has_only_headers() {
        assert_eq!(monthly_table(&[]).lines().count(), 2);
    }
}
