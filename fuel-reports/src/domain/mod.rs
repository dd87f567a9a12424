mod freight;
mod instrument;

pub use freight::{CostQuote, LookupKind, LookupResult};
pub use instrument::InstrumentRecord;
