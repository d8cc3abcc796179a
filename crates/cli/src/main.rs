// gainbook CLI - reconcile a supplier spreadsheet against its invoice
// and keep the per-location gain history

mod exit_codes;
mod render;
mod report;
mod run;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use gainbook_config::Settings;
use gainbook_recon::{ReconConfig, ReconError};

use exit_codes::{recon_exit_code, EXIT_ERROR, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "gainbook")]
#[command(about = "Compare a spreadsheet total with an invoice total and track gains per location")]
#[command(version)]
#[command(long_version = long_version())]
struct Cli {
    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file (default: <config dir>/gainbook/settings.json)
    #[arg(long, env = "GAINBOOK_SETTINGS", global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Where the run configuration and the history file come from.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct StoreArgs {
    /// TOML run configuration (replaces the settings file)
    #[arg(long)]
    config: Option<PathBuf>,

    /// History CSV (overrides the configured path)
    #[arg(long)]
    history: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile one spreadsheet against one invoice and record the result
    #[command(after_help = "\
The spreadsheet total is the sum of the numeric cells of the column whose
cells mention the configured label. The invoice total is the first amount
following the configured label in the document text. Gain = spreadsheet
total - invoice total.

Examples:
  gainbook run --spreadsheet pedido.xlsx --invoice nota.pdf --location Itaim
  gainbook run -s pedido.xlsx -i nota.pdf -l Jaçanã --date 2024-03-01
  gainbook run -s pedido.xlsx -i nota.txt -l Itaim --dry-run --json | jq .summary")]
    Run {
        /// Supplier spreadsheet (xlsx, xls, xlsb or ods)
        #[arg(long, short = 's')]
        spreadsheet: PathBuf,

        /// Invoice document (pdf, or already extracted .txt)
        #[arg(long, short = 'i')]
        invoice: PathBuf,

        /// Store location (one of the configured locations)
        #[arg(long, short = 'l')]
        location: Option<String>,

        /// Run date as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,

        #[command(flatten)]
        store: StoreArgs,

        /// Reconcile and report without writing the history file
        #[arg(long)]
        dry_run: bool,

        /// Print the full run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show every recorded reconciliation in the order it was made
    History {
        #[command(flatten)]
        store: StoreArgs,

        /// Only records for this location
        #[arg(long, short = 'l')]
        location: Option<String>,

        /// Output as JSON array
        #[arg(long)]
        json: bool,
    },

    /// Gains summed per month and location (chart data)
    #[command(after_help = "\
Examples:
  gainbook monthly
  gainbook monthly --csv > gains.csv
  gainbook monthly --json --location Itaim")]
    Monthly {
        #[command(flatten)]
        store: StoreArgs,

        /// Only groups for this location
        #[arg(long, short = 'l')]
        location: Option<String>,

        /// Output as CSV (year_month,location,gain)
        #[arg(long, conflicts_with = "json")]
        csv: bool,

        /// Output as JSON array
        #[arg(long)]
        json: bool,
    },

    /// Inspect and check configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective run configuration as TOML
    Show {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Check a TOML run configuration or a settings.json file
    Validate {
        /// File to check (.toml or .json)
        file: PathBuf,
    },

    /// Print the settings file path
    Path,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = cli.settings.as_deref();
    let result = match cli.command {
        Commands::Run { spreadsheet, invoice, location, date, store, dry_run, json } => {
            run::cmd_run(settings, &store, spreadsheet, invoice, location, date, dry_run, json)
        }
        Commands::History { store, location, json } => {
            report::cmd_history(settings, &store, location, json)
        }
        Commands::Monthly { store, location, csv, json } => {
            report::cmd_monthly(settings, &store, location, csv, json)
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show { store } => cmd_config_show(settings, &store),
            ConfigCommands::Validate { file } => cmd_config_validate(&file),
            ConfigCommands::Path => cmd_config_path(settings),
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GAINBOOK_COMMIT"), ")",
        "\nengine:  gainbook-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("GAINBOOK_TARGET"),
        "\nhistory: Date,Location,Valor Planilha,Valor Nota Fiscal,Ganho",
    )
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Create error from a reconciliation error with proper exit code.
    pub fn recon(err: ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            ReconError::ColumnNotFound { .. } => {
                Some("no cell of the sheet mentions the label; check `column_label` and `sheet`".to_string())
            }
            ReconError::InvoiceAmountNotFound { label } => {
                Some(format!("expected text like '{} 1.234,56'; is this the right invoice?", label))
            }
            ReconError::StoreUnavailable { .. } => {
                Some("the record was NOT saved; fix the history file and run again".to_string())
            }
            ReconError::SheetNotFound { available, .. } if !available.is_empty() => {
                Some("set `sheet` to one of the available sheets".to_string())
            }
            ReconError::DocumentRead { reason, .. } if reason.contains("pdftotext") => {
                Some("install poppler-utils, or pass the invoice as extracted .txt".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// Configuration resolution
// ============================================================================

/// Run configuration plus the settings-level default location.
#[derive(Debug, Clone)]
pub(crate) struct Resolved {
    pub config: ReconConfig,
    pub default_location: Option<String>,
}

/// `--config` replaces the settings file; `--history` overrides either.
pub(crate) fn resolve_config(settings: Option<&Path>, store: &StoreArgs) -> Result<Resolved, CliError> {
    let mut resolved = match store.config {
        Some(ref path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
            let config = ReconConfig::from_toml(&text)
                .map_err(|e| CliError::recon(e).with_hint(format!("fix {}", path.display())))?;
            Resolved { config, default_location: None }
        }
        None => {
            let (loaded, path) = match settings {
                Some(p) => (Settings::load_from(p), p.display().to_string()),
                None => (Settings::load(), Settings::config_path_display()),
            };
            let config = loaded
                .recon_config()
                .map_err(|e| CliError::recon(e).with_hint(format!("fix {}", path)))?;
            Resolved { config, default_location: loaded.default_location }
        }
    };

    if let Some(ref history) = store.history {
        resolved.config.history_path = history.to_string_lossy().into_owned();
    }
    log::debug!("history file: {}", resolved.config.history_path);

    Ok(resolved)
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::other(format!("JSON serialization failed: {}", e)))?;
    println!("{}", json);
    Ok(())
}

// ============================================================================
// config
// ============================================================================

fn cmd_config_show(settings: Option<&Path>, store: &StoreArgs) -> Result<(), CliError> {
    let resolved = resolve_config(settings, store)?;
    let toml = resolved.config.to_toml().map_err(CliError::recon)?;
    print!("{}", toml);
    if let Some(location) = resolved.default_location {
        eprintln!("default location: {}", location);
    }
    Ok(())
}

fn cmd_config_validate(file: &Path) -> Result<(), CliError> {
    let text = fs::read_to_string(file)
        .map_err(|e| CliError::io(format!("{}: {}", file.display(), e)))?;

    let is_json = file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let config = if is_json {
        let parsed = Settings::parse(&text)
            .map_err(|e| CliError::recon(ReconError::ConfigParse(e.to_string())))?;
        parsed.recon_config().map_err(CliError::recon)?
    } else {
        ReconConfig::from_toml(&text).map_err(CliError::recon)?
    };

    println!(
        "ok: {} (sheet '{}', {} location(s))",
        file.display(),
        config.sheet,
        config.locations.len()
    );
    Ok(())
}

fn cmd_config_path(settings: Option<&Path>) -> Result<(), CliError> {
    match settings {
        Some(path) => println!("{}", path.display()),
        None => println!("{}", Settings::config_path_display()),
    }
    Ok(())
}
