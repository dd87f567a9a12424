/// What a name lookup against the freight calculator searches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Station,
    Fuel,
}

/// A station or fuel entry as the calculator knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    pub kind: LookupKind,
    /// Internal calculator code, used in pricing requests.
    pub code: String,
    /// Canonical calculator spelling of the name.
    pub name: String,
}

/// A priced freight route between two stations.
#[derive(Debug, Clone, PartialEq)]
pub struct CostQuote {
    /// Departure station code.
    pub departure_code: String,
    /// Arrival station code.
    pub arrival_code: String,
    /// Fuel (cargo) code.
    pub fuel_code: String,
    /// Cargo weight per car, tonnes.
    pub weight: u32,
    /// Car load capacity, tonnes.
    pub capacity: u32,
    /// Total shipping cost including VAT, roubles.
    pub total_with_vat: f64,
}
