//! Invoice total extraction from plain document text.

use regex::Regex;
use rust_decimal::Decimal;

use crate::error::ReconError;
use crate::money::{parse_locale_amount, LOCALE_AMOUNT_PATTERN};

/// Finds `<label> <amount>` in document text, e.g. `Total Liquido: 1.234,56`.
#[derive(Debug, Clone)]
pub struct InvoiceExtractor {
    label: String,
    re: Regex,
}

impl InvoiceExtractor {
    pub fn new(label: &str) -> Self {
        let pattern = format!(r"{}\s*({LOCALE_AMOUNT_PATTERN})", regex::escape(label));
        // Escaped literal + fixed suffix always compiles.
        let re = Regex::new(&pattern).expect("escaped label forms a valid pattern");
        Self { label: label.to_string(), re }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// First labeled total in document order.
    pub fn extract(&self, text: &str) -> Result<Decimal, ReconError> {
        let caps = self
            .re
            .captures(text)
            .ok_or_else(|| ReconError::InvoiceAmountNotFound { label: self.label.clone() })?;
        // Group 1 is mandatory in the pattern.
        let raw = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        parse_locale_amount(raw)
    }

    /// Every labeled total, in document order. Unparseable captures are dropped.
    pub fn find_all(&self, text: &str) -> Vec<Decimal> {
        self.re
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .filter_map(|m| parse_locale_amount(m.as_str()).ok())
            .collect()
    }
}
