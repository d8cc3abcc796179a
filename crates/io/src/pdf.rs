//! Invoice text extraction.
//!
//! PDFs go through `pdftotext -layout` (poppler-utils), which emits pages in
//! order separated by form feeds. Files ending in `.txt` are taken as already
//! extracted text.

use std::path::{Path, PathBuf};
use std::process::Command;

use gainbook_recon::{DocumentReader, ReconError};

use crate::text::{decode_utf8_or_1252, read_file_as_utf8};

#[derive(Debug, Clone, Default)]
pub struct DocumentTextReader {
    /// Explicit `pdftotext` binary; `None` searches `PATH`.
    pdftotext: Option<PathBuf>,
}

impl DocumentTextReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pdftotext(path: impl Into<PathBuf>) -> Self {
        Self { pdftotext: Some(path.into()) }
    }

    fn pdftotext_binary(&self, file: &Path) -> Result<PathBuf, ReconError> {
        if let Some(ref bin) = self.pdftotext {
            return Ok(bin.clone());
        }
        which::which("pdftotext").map_err(|_| {
            read_error(file, "pdftotext not installed (poppler-utils)")
        })
    }

    /// Run `pdftotext -layout <file> -` and capture stdout.
    fn run_pdftotext(&self, file: &Path) -> Result<String, ReconError> {
        let bin = self.pdftotext_binary(file)?;

        let output = Command::new(&bin)
            .arg("-layout")
            .arg(file)
            .arg("-")
            .output()
            .map_err(|e| read_error(file, format!("failed to run pdftotext: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(read_error(
                file,
                format!(
                    "pdftotext failed (exit {}): {}",
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            ));
        }

        Ok(decode_utf8_or_1252(output.stdout))
    }
}

impl DocumentReader for DocumentTextReader {
    fn read_text(&self, path: &Path) -> Result<String, ReconError> {
        let text = if is_plain_text(path) {
            read_file_as_utf8(path).map_err(|e| read_error(path, e))?
        } else {
            self.run_pdftotext(path)?
        };

        if text.trim().is_empty() {
            return Err(read_error(
                path,
                "document has no extractable text (scanned/image-only PDF?)",
            ));
        }

        log::debug!("{}: {} page(s) of text", path.display(), text.matches('\u{c}').count().max(1));
        Ok(text)
    }
}

fn is_plain_text(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("txt"))
        .unwrap_or(false)
}

fn read_error(path: &Path, reason: impl Into<String>) -> ReconError {
    ReconError::DocumentRead { path: path.display().to_string(), reason: reason.into() }
}
