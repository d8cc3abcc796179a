//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                              |
//! |---------|-----------|------------------------------------------|
//! | 0       | Universal | Success                                  |
//! | 1       | Universal | General error (unspecified)              |
//! | 2       | Universal | CLI usage error (bad args, bad date)     |
//! | 3       | Universal | I/O error (unreadable input file)        |
//! | 4       | Universal | Parse error (malformed or huge amount)   |
//! | 10-19   | recon     | Reconciliation codes                     |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `recon_exit_code`

use gainbook_recon::ReconError;

// =============================================================================
// Universal (0-4)
// =============================================================================

/// Success - command completed without errors.
/// A shortfall is a result, not an error: it also exits 0.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// An input file could not be read or decoded.
pub const EXIT_IO: u8 = 3;

/// A located amount is not in `1.234,56` form.
pub const EXIT_PARSE: u8 = 4;

// =============================================================================
// Reconciliation (10-19)
// =============================================================================

/// The amount column label is in no column of the sheet.
pub const EXIT_RECON_COLUMN_NOT_FOUND: u8 = 10;

/// The invoice text has no labeled total.
pub const EXIT_RECON_INVOICE_AMOUNT_NOT_FOUND: u8 = 11;

/// The history file could not be read or rewritten. The record was not saved.
pub const EXIT_RECON_STORE_UNAVAILABLE: u8 = 12;

/// Location outside the configured set.
pub const EXIT_RECON_UNKNOWN_LOCATION: u8 = 13;

/// Configuration file fails to parse or validate.
pub const EXIT_RECON_CONFIG: u8 = 14;

/// The workbook has no sheet with the configured name.
pub const EXIT_RECON_SHEET_NOT_FOUND: u8 = 15;

/// Map a ReconError to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ColumnNotFound { .. } => EXIT_RECON_COLUMN_NOT_FOUND,
        ReconError::InvoiceAmountNotFound { .. } => EXIT_RECON_INVOICE_AMOUNT_NOT_FOUND,
        ReconError::Parse { .. } | ReconError::AmountOutOfRange { .. } => EXIT_PARSE,
        ReconError::StoreUnavailable { .. } => EXIT_RECON_STORE_UNAVAILABLE,
        ReconError::SheetNotFound { .. } => EXIT_RECON_SHEET_NOT_FOUND,
        ReconError::DocumentRead { .. } => EXIT_IO,
        ReconError::UnknownLocation { .. } => EXIT_RECON_UNKNOWN_LOCATION,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_RECON_CONFIG,
    }
}
