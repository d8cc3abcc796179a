//! `gainbook-recon`: spreadsheet vs invoice reconciliation engine.
//!
//! Pure engine crate: receives a decoded table and document text, returns the
//! classified outcome, and keeps the per-location gain history. File-format
//! decoding lives behind [`TableReader`] and [`DocumentReader`].

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod invoice;
pub mod model;
pub mod money;
pub mod table;

pub use classify::{classify, Classification, Outcome};
pub use config::ReconConfig;
pub use engine::{reconcile, run, DocumentReader, Reconciliation, RunReport, RunRequest, TableReader};
pub use error::ReconError;
pub use history::HistoryStore;
pub use model::{MonthlyAggregate, ReconciliationRecord, RunSummary, YearMonth};
pub use table::{Cell, Column, Table};
