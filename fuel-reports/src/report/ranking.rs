//! Departure-station ranking report.
//!
//! Enriches the day's instruments for one fuel with freight quotes to
//! a requested arrival station, then ranks rows by total cost (fuel
//! price plus marked-up freight).

use std::cmp::Ordering;

use tracing::{info, warn};

use crate::calculator::CalculatorClient;
use crate::config::ScraperConfig;
use crate::domain::InstrumentRecord;
use crate::error::{Result, ScrapeError};
use crate::exchange::{RECORD_COLUMNS, TradeResultsScraper};
use crate::mapping::{self, StationMatch};

use super::table::ReportTable;

/// Load capacity of the tanker cars quoted for every route, tonnes.
const CAR_CAPACITY: u32 = 66;

/// Margin applied on top of the quoted freight cost.
const FREIGHT_MARKUP: f64 = 1.1;

/// Columns appended after the record columns in the ranking report.
const ENRICHED_COLUMNS: [&str; 6] = [
    "Название станции (как в калькуляторе)",
    "Название топлива (как в калькуляторе)",
    "Вес топлива (проставляемый в калькуляторе)",
    "РЖД тариф",
    "РЖД тариф + 10%",
    "Итого",
];

/// One instrument with its freight enrichment.
#[derive(Debug, Clone, PartialEq)]
struct EnrichedRow {
    instrument: InstrumentRecord,
    /// Resolved departure station, or the unmapped sentinel.
    station: String,
    calculator_fuel: String,
    weight: u32,
    /// Quoted freight cost; `None` when the station is unmapped.
    shipping_cost: Option<f64>,
    shipping_with_margin: Option<f64>,
    /// Fuel price plus marked-up freight; `None` without a price or quote.
    total_cost: Option<f64>,
}

/// Source of freight quotes, so the report logic can run against a
/// scripted pricer in tests.
trait RoutePricer {
    async fn price(
        &mut self,
        departure: &str,
        arrival: &str,
        fuel: &str,
        weight: u32,
        capacity: u32,
    ) -> Result<f64>;
}

impl RoutePricer for CalculatorClient {
    async fn price(
        &mut self,
        departure: &str,
        arrival: &str,
        fuel: &str,
        weight: u32,
        capacity: u32,
    ) -> Result<f64> {
        let quote = self
            .price_route(departure, arrival, fuel, weight, capacity)
            .await?;
        Ok(quote.total_with_vat)
    }
}

/// Builds the departure-station ranking for one fuel and arrival.
pub struct DepartureStationsReporter {
    config: ScraperConfig,
    scraper: TradeResultsScraper,
    calculator: CalculatorClient,
}

impl DepartureStationsReporter {
    /// Create a reporter over the given configuration.
    pub fn new(config: ScraperConfig) -> Result<Self> {
        let scraper = TradeResultsScraper::new(&config)?;
        let calculator = CalculatorClient::new(&config)?;
        Ok(Self {
            config,
            scraper,
            calculator,
        })
    }

    /// Rank departure stations for `fuel_name` by the total cost of
    /// getting the fuel to `arrival`.
    ///
    /// `arrival` must be the station name as the calculator spells it.
    /// Rows whose delivery basis cannot be resolved keep the sentinel
    /// station and stay unpriced, sorting after every priced row. A
    /// failed lookup or quote aborts the whole report.
    pub async fn get_report(&mut self, arrival: &str, fuel_name: &str) -> Result<ReportTable> {
        let prefixes = mapping::instrument_prefixes_for(&self.config, fuel_name)?.to_vec();
        let calculator_fuel = mapping::calculator_fuel_for(&self.config, fuel_name)
            .ok_or_else(|| {
                ScrapeError::InvalidArgument(format!(
                    "no calculator fuel is configured for {fuel_name}"
                ))
            })?
            .to_string();
        let weight = mapping::standard_weight_for(&self.config, &calculator_fuel)?;

        let all_instruments = self.scraper.get_all_instruments().await?;
        let instruments = filter_by_prefixes(all_instruments, &prefixes);
        info!(
            fuel = fuel_name,
            arrival,
            count = instruments.len(),
            "pricing instruments"
        );

        let mut rows = build_rows(
            &self.config,
            &mut self.calculator,
            instruments,
            arrival,
            &calculator_fuel,
            weight,
        )
        .await?;
        rank_rows(&mut rows);

        Ok(to_table(&rows))
    }

    /// Release the underlying HTTP connections.
    pub fn close(self) {}
}

/// Keep the instruments whose code starts with one of the prefixes,
/// preserving input order.
fn filter_by_prefixes(
    instruments: Vec<InstrumentRecord>,
    prefixes: &[String],
) -> Vec<InstrumentRecord> {
    instruments
        .into_iter()
        .filter(|record| {
            prefixes
                .iter()
                .any(|prefix| record.code.starts_with(prefix.as_str()))
        })
        .collect()
}

/// Enrich the instruments one at a time, in input order.
///
/// Unmapped delivery bases are annotated and skipped; every other
/// failure aborts the report.
async fn build_rows<P: RoutePricer>(
    config: &ScraperConfig,
    pricer: &mut P,
    instruments: Vec<InstrumentRecord>,
    arrival: &str,
    calculator_fuel: &str,
    weight: u32,
) -> Result<Vec<EnrichedRow>> {
    let mut rows = Vec::with_capacity(instruments.len());

    for instrument in instruments {
        let station = match mapping::calculator_station_for(config, &instrument.delivery_basis) {
            StationMatch::Station(station) => station,
            StationMatch::Unmapped => {
                warn!(
                    delivery_basis = %instrument.delivery_basis,
                    "no calculator station for delivery basis"
                );
                rows.push(EnrichedRow {
                    instrument,
                    station: mapping::UNMAPPED_STATION.to_string(),
                    calculator_fuel: calculator_fuel.to_string(),
                    weight,
                    shipping_cost: None,
                    shipping_with_margin: None,
                    total_cost: None,
                });
                continue;
            }
        };

        let shipping = pricer
            .price(&station, arrival, calculator_fuel, weight, CAR_CAPACITY)
            .await?;
        let with_margin = shipping * FREIGHT_MARKUP;
        let total = instrument.avg_price.map(|price| price + with_margin);

        rows.push(EnrichedRow {
            instrument,
            station,
            calculator_fuel: calculator_fuel.to_string(),
            weight,
            shipping_cost: Some(shipping),
            shipping_with_margin: Some(with_margin),
            total_cost: total,
        });
    }

    Ok(rows)
}

/// Order rows ascending by total cost, then marked-up freight, then
/// fuel price; in every key an absent value sorts after all present
/// ones. The sort is stable, so fully tied rows keep input order.
fn rank_rows(rows: &mut [EnrichedRow]) {
    rows.sort_by(|a, b| {
        cmp_opt(a.total_cost, b.total_cost)
            .then_with(|| cmp_opt(a.shipping_with_margin, b.shipping_with_margin))
            .then_with(|| cmp_opt(a.instrument.avg_price, b.instrument.avg_price))
    });
}

/// Ascending with `None` after every `Some`.
fn cmp_opt(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Render the rows into the tabular report, record columns first.
fn to_table(rows: &[EnrichedRow]) -> ReportTable {
    let headers = RECORD_COLUMNS
        .iter()
        .chain(ENRICHED_COLUMNS.iter())
        .map(|header| header.to_string())
        .collect();

    let mut table = ReportTable::new(headers);
    for row in rows {
        table.push_row(vec![
            row.instrument.code.clone(),
            row.instrument.name.clone(),
            row.instrument.delivery_basis.clone(),
            format_opt(row.instrument.avg_price),
            format_opt(row.instrument.price_delta),
            row.station.clone(),
            row.calculator_fuel.clone(),
            row.weight.to_string(),
            format_opt(row.shipping_cost),
            format_opt(row.shipping_with_margin),
            format_opt(row.total_cost),
        ]);
    }
    table
}

/// Empty cell for an absent value.
fn format_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
