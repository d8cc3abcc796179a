// `gainbook run`: one spreadsheet, one invoice, one history record

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use gainbook_io::{DocumentTextReader, XlsxTableReader};
use gainbook_recon::{HistoryStore, RunRequest};

use crate::report::format_run;
use crate::{print_json, resolve_config, CliError, StoreArgs};

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_run(
    settings: Option<&Path>,
    store_args: &StoreArgs,
    spreadsheet: PathBuf,
    invoice: PathBuf,
    location: Option<String>,
    date: Option<String>,
    dry_run: bool,
    json: bool,
) -> Result<(), CliError> {
    let resolved = resolve_config(settings, store_args)?;
    let config = resolved.config;

    let location = match location.or(resolved.default_location) {
        Some(location) => location,
        None => {
            return Err(CliError::args("no location given")
                .with_hint(format!("pass --location <{}>", config.locations.join("|"))));
        }
    };
    let date = parse_date(date.as_deref())?;

    let request = RunRequest { spreadsheet, invoice, location, date, dry_run };
    let store = HistoryStore::open(&config.history_path);
    let report = gainbook_recon::run(
        &config,
        &request,
        &XlsxTableReader,
        &DocumentTextReader::new(),
        &store,
    )
    .map_err(CliError::recon)?;

    if json {
        print_json(&report)?;
    } else {
        print!("{}", format_run(&report, &config));
    }

    if report.persisted {
        eprintln!("saved to {} ({} record(s))", store.path().display(), report.history_len);
    } else {
        eprintln!("dry run: {} not modified", store.path().display());
    }
    Ok(())
}

/// `YYYY-MM-DD`, or today's local date when absent.
fn parse_date(arg: Option<&str>) -> Result<NaiveDate, CliError> {
    match arg {
        None => Ok(chrono::Local::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            CliError::args(format!("invalid date '{}'", s)).with_hint("use YYYY-MM-DD, e.g. 2024-03-01")
        }),
    }
}
