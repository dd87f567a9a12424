//! Fuel trade-results reports.
//!
//! Scrapes the exchange's daily oil-product trade results, prices
//! shipment routes through the rail freight calculator, and assembles
//! the two enriched reports the numbers feed into.

pub mod calculator;
pub mod config;
pub mod domain;
pub mod error;
pub mod exchange;
pub mod mapping;
pub mod report;
pub mod requester;
