//! Exchange side of the pipeline: trade-results page and spreadsheet.

mod client;
mod sheet;

pub use client::TradeResultsScraper;
pub use sheet::{RECORD_COLUMNS, TRADE_COLUMNS};
