//! Wire types of the calculator JSON API.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, ScrapeError};

/// Envelope common to every calculator API response.
///
/// `error` is whatever the backend felt like sending: absent, `false`,
/// `0`, an empty string, or a message. Only a truthy value signals
/// failure. `data` is `null` or absent when nothing matched.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub error: Value,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Fail when the backend set a truthy error flag.
    pub fn check_error(&self) -> Result<()> {
        if is_truthy(&self.error) {
            return Err(ScrapeError::ApiResponse("API returned error".to_string()));
        }
        Ok(())
    }
}

/// One entry of a `getData` lookup response.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupEntry {
    pub code: String,
    pub name: String,
}

/// Payload of a `getCalculation` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CalculationData {
    #[serde(default)]
    pub total: Option<TotalCost>,
}

impl CalculationData {
    /// Total cost including VAT as a number.
    ///
    /// Fails with [`ScrapeError::ApiResponse`] when the totals block or
    /// the money value is missing or malformed.
    pub fn total_with_vat(&self) -> Result<f64> {
        let total = self
            .total
            .as_ref()
            .ok_or_else(|| ScrapeError::ApiResponse("no total in response data".to_string()))?;
        parse_money(&total.sumt_with_vat)
    }
}

/// Cost totals of a calculation.
#[derive(Debug, Clone, Deserialize)]
pub struct TotalCost {
    /// Serialized by the backend as either a number or a numeric string.
    #[serde(rename = "sumtWithVat", default)]
    pub sumt_with_vat: Value,
}

/// Loose truthiness matching the backend's error convention.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Parse a money value sent as a number or a numeric string.
fn parse_money(value: &Value) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ScrapeError::ApiResponse(format!("unexpected money value: {value}")))
}
