//! Delivery-basis price report: a code-indexed grid template filled
//! with the day's average prices.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::ScraperConfig;
use crate::domain::InstrumentRecord;
use crate::error::Result;
use crate::exchange::TradeResultsScraper;

use super::table::ReportTable;

/// Descriptive columns before the fuel-type columns of the template.
const TEMPLATE_LEAD_COLUMNS: usize = 3;

/// Fills the delivery-basis template with current trade results.
pub struct DeliveryBasisReporter {
    scraper: TradeResultsScraper,
    template_path: PathBuf,
}

impl DeliveryBasisReporter {
    /// Create a reporter for the given template file.
    pub fn new(config: &ScraperConfig, template_path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            scraper: TradeResultsScraper::new(config)?,
            template_path: template_path.into(),
        })
    }

    /// Produce the filled template, same shape as the input grid.
    pub async fn get_report(&self) -> Result<ReportTable> {
        let instruments = self.scraper.get_all_instruments().await?;
        let template = ReportTable::from_csv_file(&self.template_path)?;
        Ok(fill_template(template, &instruments))
    }

    /// Release the underlying HTTP connections.
    pub fn close(self) {}
}

/// Write each instrument's average price into its template cell.
///
/// Cells stay untouched for instruments that did not trade (no price)
/// or do not appear in the template. The price delta, when present, is
/// appended in parentheses: `1000(5)`.
fn fill_template(mut template: ReportTable, instruments: &[InstrumentRecord]) -> ReportTable {
    let index = code_index(&template);

    for record in instruments {
        let Some(&(row, column)) = index.get(record.code.as_str()) else {
            continue;
        };
        let Some(price) = record.avg_price else {
            continue;
        };

        let mut cell = price.to_string();
        if let Some(delta) = record.price_delta {
            cell.push_str(&format!("({delta})"));
        }
        template.set_cell(row, column, cell);
    }

    template
}

/// Map every instrument code in the grid to its (row, column).
///
/// Only the fuel-type columns count; on duplicate codes the last
/// position in row order wins.
fn code_index(template: &ReportTable) -> HashMap<String, (usize, usize)> {
    let mut index = HashMap::new();
    for (row_idx, row) in template.rows().iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate().skip(TEMPLATE_LEAD_COLUMNS) {
            if !cell.is_empty() {
                index.insert(cell.clone(), (row_idx, col_idx));
            }
        }
    }
    index
}
