//! Translation between the three naming systems involved in a report:
//! exchange instrument codes, exchange delivery-basis text, and the
//! calculator's own station and fuel names.
//!
//! Pure lookups over [`ScraperConfig`], no I/O.

use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};

/// Sentinel written into a report row whose delivery basis could not be
/// resolved to a calculator station.
pub const UNMAPPED_STATION: &str = "не удалось сопоставить название";

/// Marker the exchange puts in front of plain station names.
const STATION_PREFIX: &str = "ст. ";

/// Outcome of resolving a delivery basis to a calculator station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationMatch {
    /// Resolved to a station name the calculator accepts.
    Station(String),
    /// No mapping rule applies; pricing is skipped for the row.
    Unmapped,
}

/// Instrument code prefixes covered by the given domain fuel name.
///
/// Fails with an invalid-argument error when the fuel name is not a
/// configured key, listing the accepted names.
pub fn instrument_prefixes_for<'a>(
    config: &'a ScraperConfig,
    fuel_name: &str,
) -> Result<&'a [String]> {
    match config.fuel_name_to_instrument_codes.get(fuel_name) {
        Some(prefixes) => Ok(prefixes),
        None => {
            let known: Vec<&str> = config
                .fuel_name_to_instrument_codes
                .keys()
                .map(String::as_str)
                .collect();
            Err(ScrapeError::InvalidArgument(format!(
                "fuel_name should be one of {known:?}"
            )))
        }
    }
}

/// Calculator fuel item for the given domain fuel name.
///
/// `None` means the calculator cannot price this fuel (or the name is
/// not configured at all).
pub fn calculator_fuel_for<'a>(config: &'a ScraperConfig, fuel_name: &str) -> Option<&'a str> {
    config
        .fuel_name_to_calculator_item
        .get(fuel_name)
        .and_then(|item| item.as_deref())
}

/// Standard per-car shipment weight for a calculator fuel item.
pub fn standard_weight_for(config: &ScraperConfig, calculator_item: &str) -> Result<u32> {
    config
        .calculator_item_weights
        .get(calculator_item)
        .copied()
        .ok_or_else(|| {
            ScrapeError::InvalidArgument(format!(
                "no weight configured for calculator item {calculator_item}"
            ))
        })
}

/// Resolve delivery-basis text to a calculator station name.
///
/// Exact table entries win; otherwise text carrying the station marker
/// has the marker stripped; anything else is unmapped.
pub fn calculator_station_for(config: &ScraperConfig, delivery_basis: &str) -> StationMatch {
    if let Some(station) = config
        .delivery_basis_to_calculator_station_name
        .get(delivery_basis)
    {
        return StationMatch::Station(station.clone());
    }
    if let Some(rest) = delivery_basis.strip_prefix(STATION_PREFIX) {
        return StationMatch::Station(rest.to_string());
    }
    StationMatch::Unmapped
}
