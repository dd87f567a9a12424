/// One traded instrument from the exchange day summary, reduced to the
/// columns the reports consume.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentRecord {
    /// Instrument code, e.g. `A592AES060F`.
    pub code: String,
    /// Full instrument name.
    pub name: String,
    /// Delivery basis: the shipment point as printed by the exchange.
    pub delivery_basis: String,
    /// Weighted average price, absent when nothing settled that day.
    pub avg_price: Option<f64>,
    /// Change of the average price against the previous trading day.
    pub price_delta: Option<f64>,
}
