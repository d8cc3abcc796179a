// Application settings
// Loaded from ~/.config/gainbook/settings.json

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use gainbook_recon::{ReconConfig, ReconError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Spreadsheet input
    #[serde(rename = "spreadsheet.sheet")]
    pub sheet: String,

    #[serde(rename = "spreadsheet.columnLabel")]
    pub column_label: String,

    // Invoice input
    #[serde(rename = "invoice.totalLabel")]
    pub invoice_label: String,

    // Locations
    #[serde(rename = "locations")]
    pub locations: Vec<String>,

    /// Used when a run does not name a location
    #[serde(rename = "locations.default")]
    pub default_location: Option<String>,

    // Classification
    #[serde(rename = "reconcile.tolerance")]
    pub tolerance: Decimal,

    // History
    #[serde(rename = "history.path")]
    pub history_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        let recon = ReconConfig::default();
        Self {
            sheet: recon.sheet,
            column_label: recon.column_label,
            invoice_label: recon.invoice_label,
            locations: recon.locations,
            default_location: None,
            tolerance: recon.tolerance,
            history_path: recon.history_path,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gainbook");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(&path);
            return settings;
        }

        Self::load_from(&path)
    }

    /// Load from an explicit path. Missing, unreadable or invalid files give defaults.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("Error parsing {}: {}", path.display(), e);
                    log::warn!("Using default settings");
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned)
    }

    /// Engine configuration for a run, validated.
    pub fn recon_config(&self) -> Result<ReconConfig, ReconError> {
        let config = ReconConfig {
            sheet: self.sheet.clone(),
            column_label: self.column_label.clone(),
            invoice_label: self.invoice_label.clone(),
            locations: self.locations.clone(),
            tolerance: self.tolerance,
            history_path: self.history_path.clone(),
        };
        config.validate()?;

        if let Some(ref default) = self.default_location {
            config.check_location(default)?;
        }

        Ok(config)
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Error creating config directory: {}", e);
                return;
            }
        }

        let default_config = r#"{
    // Spreadsheet: worksheet name and the label marking the amount column
    "spreadsheet.sheet": "Imput",
    "spreadsheet.columnLabel": "Preço Tt",

    // Invoice: text right before the billed total (e.g. "Total Liquido: 1.234,56")
    "invoice.totalLabel": "Total Liquido:",

    // Store locations a run may be filed under
    "locations": ["Itaim", "Jaçanã"],
    "locations.default": null,

    // Gains below this absolute value count as "no difference"
    "reconcile.tolerance": "0.01",

    // History CSV (relative paths resolve against the working directory)
    "history.path": "historico.csv"
}
"#;

        if let Err(e) = fs::write(path, default_config) {
            log::warn!("Error writing default settings.json: {}", e);
        }
    }

    /// Get the config file path for display/opening
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}
