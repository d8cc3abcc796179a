//! Locale-formatted money (`1.234,56`): `.` groups thousands, `,` marks the
//! two cents digits. All arithmetic stays in `Decimal`; nothing here goes
//! through `f64`.

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::ReconError;

/// Pattern of a locale amount, without anchors. Shared with the invoice
/// extractor so both agree on what a total looks like.
pub const LOCALE_AMOUNT_PATTERN: &str = r"\d+(?:\.\d+)*,\d{2}";

fn anchored() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!("^{LOCALE_AMOUNT_PATTERN}$")).expect("valid amount pattern")
    })
}

/// Parse `"1.234,56"` into `1234.56`.
///
/// Surrounding whitespace is ignored. Anything else outside
/// `digits(.digits)*,dd` is rejected, including signs and currency symbols.
pub fn parse_locale_amount(s: &str) -> Result<Decimal, ReconError> {
    let trimmed = s.trim();
    if !anchored().is_match(trimmed) {
        return Err(ReconError::Parse { value: s.to_string() });
    }

    let canonical = trimmed.replace('.', "").replace(',', ".");
    Decimal::from_str(&canonical).map_err(|_| ReconError::Parse { value: s.to_string() })
}

/// Render `1234.56` as `"1.234,56"`. Always two fractional digits.
pub fn format_locale_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}{grouped},{frac_part}")
}

/// `R$ 1.234,56` / `R$ -933,81`.
pub fn format_brl(value: Decimal) -> String {
    format!("R$ {}", format_locale_amount(value))
}

/// Canonical persisted form: `.` decimal point, exactly two fractional digits.
pub fn format_plain(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}
