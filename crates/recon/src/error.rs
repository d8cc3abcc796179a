use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// No column of the input table carries the label in any cell.
    ColumnNotFound { label: String },
    /// The labeled total is absent from the document text.
    InvoiceAmountNotFound { label: String },
    /// A numeric substring does not follow the `1.234,56` format.
    Parse { value: String },
    /// History file cannot be read or rewritten.
    StoreUnavailable { path: String, reason: String },
    /// The workbook has no sheet with the requested name.
    SheetNotFound { sheet: String, available: Vec<String> },
    /// Spreadsheet or document could not be decoded into a table/text.
    DocumentRead { path: String, reason: String },
    /// Location outside the configured closed set.
    UnknownLocation { location: String, allowed: Vec<String> },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty label, duplicate location, etc.).
    ConfigValidation(String),
    /// A cell or a running sum exceeds what `Decimal` can hold.
    AmountOutOfRange { value: String },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnNotFound { label } => write!(f, "column '{label}' not found"),
            Self::InvoiceAmountNotFound { label } => {
                write!(f, "could not find the total ('{label}') in the invoice")
            }
            Self::Parse { value } => write!(f, "cannot parse amount '{value}'"),
            Self::StoreUnavailable { path, reason } => {
                write!(f, "history store '{path}' unavailable: {reason}")
            }
            Self::SheetNotFound { sheet, available } => {
                if available.is_empty() {
                    write!(f, "sheet '{sheet}' not found (workbook has no sheets)")
                } else {
                    write!(f, "sheet '{sheet}' not found (available: {})", available.join(", "))
                }
            }
            Self::DocumentRead { path, reason } => write!(f, "cannot read '{path}': {reason}"),
            Self::UnknownLocation { location, allowed } => {
                write!(f, "unknown location '{location}' (expected one of: {})", allowed.join(", "))
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::AmountOutOfRange { value } => {
                write!(f, "amount {value} is outside the supported range")
            }
        }
    }
}

impl std::error::Error for ReconError {}
