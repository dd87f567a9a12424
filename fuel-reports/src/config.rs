//! Scraper configuration: remote URLs plus the name-mapping tables.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::error::{Result, ScrapeError};

/// Immutable configuration consumed by the scrapers and reporters.
///
/// Loaded once from a YAML document and treated as read-only for the
/// lifetime of a report.
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Landing page of the freight calculator.
    pub calculator_url: String,
    /// Exchange page listing daily trade results.
    pub trade_results_url: String,
    /// Endpoint of the calculator JSON API.
    pub api_endpoint_url: String,
    /// Domain fuel name to the instrument code prefixes it covers.
    pub fuel_name_to_instrument_codes: BTreeMap<String, Vec<String>>,
    /// Domain fuel name to the calculator's fuel item. `null` marks a
    /// fuel the calculator cannot price.
    pub fuel_name_to_calculator_item: BTreeMap<String, Option<String>>,
    /// Calculator fuel item to its standard per-car weight, tonnes.
    pub calculator_item_weights: BTreeMap<String, u32>,
    /// Exchange delivery-basis text to the calculator station name.
    pub delivery_basis_to_calculator_station_name: BTreeMap<String, String>,
}

impl ScraperConfig {
    /// Load and validate configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&text).map_err(|e| {
            ScrapeError::Config(format!("failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)
            .map_err(|e| ScrapeError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency of the loaded tables.
    pub fn validate(&self) -> Result<()> {
        for (label, value) in [
            ("calculator_url", &self.calculator_url),
            ("trade_results_url", &self.trade_results_url),
            ("api_endpoint_url", &self.api_endpoint_url),
        ] {
            Url::parse(value)
                .map_err(|e| ScrapeError::Config(format!("{label} is not a valid URL: {e}")))?;
        }

        if self.fuel_name_to_instrument_codes.is_empty() {
            return Err(ScrapeError::Config(
                "fuel_name_to_instrument_codes must not be empty".to_string(),
            ));
        }

        for (fuel, prefixes) in &self.fuel_name_to_instrument_codes {
            if prefixes.is_empty() {
                return Err(ScrapeError::Config(format!(
                    "fuel {fuel} has no instrument code prefixes"
                )));
            }
            if !self.fuel_name_to_calculator_item.contains_key(fuel) {
                return Err(ScrapeError::Config(format!(
                    "fuel {fuel} is missing from fuel_name_to_calculator_item"
                )));
            }
        }

        for item in self.fuel_name_to_calculator_item.values().flatten() {
            if !self.calculator_item_weights.contains_key(item) {
                return Err(ScrapeError::Config(format!(
                    "calculator item {item} has no weight configured"
                )));
            }
        }

        Ok(())
    }
}
