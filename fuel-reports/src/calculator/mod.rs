//! Freight-cost calculator API client.

mod client;
mod types;

pub use client::CalculatorClient;
