//! Report assembly: template fill and departure-station ranking.

mod ranking;
mod table;
mod template;

pub use ranking::DepartureStationsReporter;
pub use table::ReportTable;
pub use template::DeliveryBasisReporter;
