use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Amount below which a gain is treated as rounding noise.
pub const DEFAULT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// `|gain| < tolerance`
    Neutral,
    /// More was expected than billed.
    Positive,
    /// Billed more than expected.
    Negative,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Neutral => write!(f, "no difference"),
            Self::Positive => write!(f, "gain"),
            Self::Negative => write!(f, "shortfall"),
        }
    }
}

impl Classification {
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Neutral => "⚪",
            Self::Positive => "🟢",
            Self::Negative => "🔴",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub gain: Decimal,
    pub classification: Classification,
}

/// Compare the expected (spreadsheet) total with the billed (invoice) total.
///
/// Priority: neutral band first (strict `<`), then sign.
pub fn classify(spreadsheet_total: Decimal, invoice_total: Decimal, tolerance: Decimal) -> Outcome {
    let gain = spreadsheet_total - invoice_total;
    let classification = if gain.abs() < tolerance {
        Classification::Neutral
    } else if gain > Decimal::ZERO {
        Classification::Positive
    } else {
        Classification::Negative
    };
    Outcome { gain, classification }
}
