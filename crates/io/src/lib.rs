// File I/O: the collaborators the reconciliation engine reads through

pub mod pdf;
pub mod text;
pub mod xlsx;

pub use pdf::DocumentTextReader;
pub use xlsx::XlsxTableReader;
