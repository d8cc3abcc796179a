use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::classify::DEFAULT_TOLERANCE;
use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Everything a run needs besides its two input files.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconConfig {
    /// Worksheet holding the receivables.
    pub sheet: String,
    /// Text that marks the amount column, anywhere in the column.
    pub column_label: String,
    /// Text that precedes the billed total in the invoice.
    pub invoice_label: String,
    /// Closed set of store locations.
    pub locations: Vec<String>,
    /// Gains strictly below this (absolute) are "no difference".
    pub tolerance: Decimal,
    /// History CSV. Relative paths resolve against the working directory.
    pub history_path: String,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            sheet: "Imput".into(),
            column_label: "Preço Tt".into(),
            invoice_label: "Total Liquido:".into(),
            locations: vec!["Itaim".into(), "Jaçanã".into()],
            tolerance: DEFAULT_TOLERANCE,
            history_path: "historico.csv".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ReconError> {
        toml::to_string_pretty(self).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (field, value) in [
            ("sheet", &self.sheet),
            ("column_label", &self.column_label),
            ("invoice_label", &self.invoice_label),
            ("history_path", &self.history_path),
        ] {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{field} must not be empty")));
            }
        }

        if self.locations.is_empty() {
            return Err(ReconError::ConfigValidation("at least one location is required".into()));
        }

        let mut seen = HashSet::new();
        for location in &self.locations {
            if location.trim().is_empty() {
                return Err(ReconError::ConfigValidation("location names must not be empty".into()));
            }
            if !seen.insert(location.as_str()) {
                return Err(ReconError::ConfigValidation(format!(
                    "duplicate location '{location}'"
                )));
            }
        }

        if self.tolerance <= Decimal::ZERO {
            return Err(ReconError::ConfigValidation(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }

        Ok(())
    }

    /// Exact, case-sensitive membership in the configured location set.
    pub fn check_location(&self, location: &str) -> Result<(), ReconError> {
        if self.locations.iter().any(|l| l == location) {
            Ok(())
        } else {
            Err(ReconError::UnknownLocation {
                location: location.to_string(),
                allowed: self.locations.clone(),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
