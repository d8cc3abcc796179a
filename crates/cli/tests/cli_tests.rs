// End-to-end tests for the `gainbook` binary.
// Run with: cargo test -p gainbook-cli --test cli_tests -- --nocapture

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self { dir: tempfile::tempdir().unwrap() }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn history(&self) -> PathBuf {
        self.path("historico.csv")
    }

    /// `gainbook` with settings and history pinned inside the temp dir.
    fn gainbook(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_gainbook"));
        cmd.current_dir(self.dir.path());
        cmd.env("GAINBOOK_SETTINGS", self.path("settings.json"));
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Sheet "Imput" with `label` over the given cells. Numbers are written
    /// as number cells unless quoted with a leading `'`; `None` stays empty.
    fn workbook(&self, name: &str, label: &str, cells: &[Option<&str>]) -> PathBuf {
        let path = self.path(name);
        let mut wb = Workbook::new();
        let ws = wb.add_worksheet();
        ws.set_name("Imput").unwrap();
        // The first row becomes column names; the label sits in a cell below it.
        ws.write_string(0, 0, "Pedido de compra").unwrap();
        ws.write_string(1, 0, "Item").unwrap();
        ws.write_string(1, 1, label).unwrap();
        for (i, cell) in cells.iter().enumerate() {
            let row = i as u32 + 2;
            ws.write_string(row, 0, format!("item {}", row)).unwrap();
            let Some(text) = cell else { continue };
            match text.parse::<f64>() {
                Ok(n) if !text.starts_with('\'') => {
                    ws.write_number(row, 1, n).unwrap();
                }
                _ => {
                    ws.write_string(row, 1, text.trim_start_matches('\'')).unwrap();
                }
            }
        }
        wb.save(&path).unwrap();
        path
    }

    fn invoice(&self, name: &str, text: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, text).unwrap();
        path
    }

    fn run(&self, sheet: &Path, invoice: &Path, location: &str, date: &str, extra: &[&str]) -> Output {
        self.gainbook()
            .arg("run")
            .arg("--spreadsheet")
            .arg(sheet)
            .arg("--invoice")
            .arg(invoice)
            .args(["--location", location, "--date", date])
            .arg("--history")
            .arg(self.history())
            .args(extra)
            .output()
            .expect("gainbook run")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

const INVOICE: &str = "NOTA FISCAL\nItens diversos\nTotal Liquido: 1.234,56\n";

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_reports_shortfall_and_records_it() {
    let fx = Fixture::new();
    let sheet = fx.workbook("pedido.xlsx", "Preço Tt", &[Some("100.50"), Some("'N/A"), Some("200.25"), None]);
    let invoice = fx.invoice("nota.txt", INVOICE);

    let output = fx.run(&sheet, &invoice, "Itaim", "2024-03-01", &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("R$ 300,75"), "{}", out);
    assert!(out.contains("R$ 1.234,56"), "{}", out);
    assert!(out.contains("🔴 shortfall: R$ -933,81"), "{}", out);
    assert!(out.contains("2024-03  Itaim"), "{}", out);

    let history = fs::read_to_string(fx.history()).unwrap();
    let lines: Vec<&str> = history.lines().collect();
    assert_eq!(lines[0], "Date,Location,Valor Planilha,Valor Nota Fiscal,Ganho");
    assert_eq!(lines[1], "2024-03-01,Itaim,300.75,1234.56,-933.81");
    assert!(stderr(&output).contains("1 record(s)"));
}

#[test]
fn equal_totals_are_no_difference() {
    let fx = Fixture::new();
    let sheet = fx.workbook("pedido.xlsx", "Preço Tt", &[Some("1000"), Some("234.56")]);
    let invoice = fx.invoice("nota.txt", INVOICE);

    let output = fx.run(&sheet, &invoice, "Jaçanã", "2024-04-10", &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("⚪ no difference"));
}

#[test]
fn dry_run_json_reports_without_writing() {
    let fx = Fixture::new();
    let sheet = fx.workbook("pedido.xlsx", "Preço Tt", &[Some("100.50"), Some("200.25")]);
    let invoice = fx.invoice("nota.txt", INVOICE);

    let output = fx.run(&sheet, &invoice, "Itaim", "2024-03-01", &["--dry-run", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    assert_eq!(report["summary"]["classification"], "negative");
    assert_eq!(report["summary"]["gain"], "-933.81");
    assert_eq!(report["summary"]["location"], "Itaim");
    assert_eq!(report["persisted"], false);
    assert_eq!(report["monthly"][0]["year_month"], "2024-03");

    assert!(!fx.history().exists());
}

#[test]
fn missing_column_exits_10_and_writes_nothing() {
    let fx = Fixture::new();
    let sheet = fx.workbook("pedido.xlsx", "Preço Unit", &[Some("10")]);
    let invoice = fx.invoice("nota.txt", INVOICE);

    let output = fx.run(&sheet, &invoice, "Itaim", "2024-03-01", &[]);
    assert_eq!(output.status.code(), Some(10));
    assert!(stderr(&output).contains("error: column 'Preço Tt' not found"));
    assert!(!fx.history().exists());
}

#[test]
fn invoice_without_total_exits_11() {
    let fx = Fixture::new();
    let sheet = fx.workbook("pedido.xlsx", "Preço Tt", &[Some("10")]);
    let invoice = fx.invoice("nota.txt", "NOTA FISCAL\nSubtotal: 10,00\n");

    let output = fx.run(&sheet, &invoice, "Itaim", "2024-03-01", &[]);
    assert_eq!(output.status.code(), Some(11));
    assert!(stderr(&output).contains("hint:"));
    assert!(!fx.history().exists());
}

#[test]
fn unknown_location_exits_13() {
    let fx = Fixture::new();
    let sheet = fx.workbook("pedido.xlsx", "Preço Tt", &[Some("10")]);
    let invoice = fx.invoice("nota.txt", INVOICE);

    let output = fx.run(&sheet, &invoice, "Moema", "2024-03-01", &[]);
    assert_eq!(output.status.code(), Some(13));
    assert!(stderr(&output).contains("Itaim, Jaçanã"));
}

#[test]
fn missing_location_is_usage_error() {
    let fx = Fixture::new();
    let output = fx
        .gainbook()
        .args(["run", "--spreadsheet", "a.xlsx", "--invoice", "b.txt"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("--location"));
}

#[test]
fn missing_spreadsheet_is_io_error() {
    let fx = Fixture::new();
    let invoice = fx.invoice("nota.txt", INVOICE);
    let output = fx.run(&fx.path("nao-existe.xlsx"), &invoice, "Itaim", "2024-03-01", &[]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn bad_date_is_usage_error() {
    let fx = Fixture::new();
    let sheet = fx.workbook("pedido.xlsx", "Preço Tt", &[Some("10")]);
    let invoice = fx.invoice("nota.txt", INVOICE);
    let output = fx.run(&sheet, &invoice, "Itaim", "01/03/2024", &[]);
    assert_eq!(output.status.code(), Some(2));
}

// ---------------------------------------------------------------------------
// history / monthly
// ---------------------------------------------------------------------------

fn three_runs(fx: &Fixture) {
    let invoice = fx.invoice("nota.txt", INVOICE);
    let a = fx.workbook("a.xlsx", "Preço Tt", &[Some("100.50"), Some("200.25")]);
    let b = fx.workbook("b.xlsx", "Preço Tt", &[Some("1300")]);
    let c = fx.workbook("c.xlsx", "Preço Tt", &[Some("1234.56")]);

    for (sheet, location, date) in [
        (&a, "Itaim", "2024-03-01"),
        (&b, "Itaim", "2024-03-20"),
        (&c, "Jaçanã", "2024-04-02"),
    ] {
        let output = fx.run(sheet, &invoice, location, date, &[]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));
    }
}

#[test]
fn history_json_keeps_append_order() {
    let fx = Fixture::new();
    three_runs(&fx);

    let output = fx
        .gainbook()
        .arg("history")
        .arg("--history")
        .arg(fx.history())
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let records: Vec<serde_json::Value> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["date"], "2024-03-01");
    assert_eq!(records[1]["gain"], "65.44");
    assert_eq!(records[2]["location"], "Jaçanã");
}

#[test]
fn history_table_shows_location_totals() {
    let fx = Fixture::new();
    three_runs(&fx);

    let output = fx
        .gainbook()
        .arg("history")
        .arg("--history")
        .arg(fx.history())
        .output()
        .unwrap();
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Total Itaim: R$ -868,37"), "{}", out);
    assert!(out.contains("Total Jaçanã: R$ 0,00"), "{}", out);
}

#[test]
fn monthly_csv_is_chart_data() {
    let fx = Fixture::new();
    three_runs(&fx);

    let output = fx
        .gainbook()
        .arg("monthly")
        .arg("--history")
        .arg(fx.history())
        .arg("--csv")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "year_month,location,gain\n2024-03,Itaim,-868.37\n2024-04,Jaçanã,0.00\n"
    );
}

#[test]
fn monthly_location_filter() {
    let fx = Fixture::new();
    three_runs(&fx);

    let output = fx
        .gainbook()
        .arg("monthly")
        .arg("--history")
        .arg(fx.history())
        .args(["--json", "--location", "Jaçanã"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let groups: Vec<serde_json::Value> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["record_count"], 1);
}

#[test]
fn empty_history_is_not_an_error() {
    let fx = Fixture::new();
    let output = fx
        .gainbook()
        .arg("monthly")
        .arg("--history")
        .arg(fx.history())
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn config_validate_accepts_good_toml() {
    let fx = Fixture::new();
    let path = fx.path("run.toml");
    fs::write(&path, "sheet = \"Pedido\"\nlocations = [\"Itaim\"]\ntolerance = \"0.05\"\n").unwrap();

    let output = fx.gainbook().arg("config").arg("validate").arg(&path).output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).starts_with("ok:"));
}

#[test]
fn config_validate_rejects_duplicate_locations() {
    let fx = Fixture::new();
    let path = fx.path("run.toml");
    fs::write(&path, "locations = [\"Itaim\", \"Itaim\"]\n").unwrap();

    let output = fx.gainbook().arg("config").arg("validate").arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(14));
}

#[test]
fn config_file_changes_sheet_and_labels() {
    let fx = Fixture::new();
    let config = fx.path("run.toml");
    fs::write(
        &config,
        "sheet = \"Imput\"\ncolumn_label = \"Valor\"\ninvoice_label = \"TOTAL:\"\nlocations = [\"Centro\"]\n",
    )
    .unwrap();
    let sheet = fx.workbook("pedido.xlsx", "Valor", &[Some("12.5")]);
    let invoice = fx.invoice("nota.txt", "TOTAL: 10,00\n");

    let output = fx.run(&sheet, &invoice, "Centro", "2024-05-05", &["--config", config.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("🟢 gain: R$ 2,50"));
}

#[test]
fn config_path_honors_settings_override() {
    let fx = Fixture::new();
    let output = fx.gainbook().args(["config", "path"]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), fx.path("settings.json").display().to_string());
}
