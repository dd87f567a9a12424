//! Scraper for the exchange's daily trade results.
//!
//! Finds the current results spreadsheet behind the listing page,
//! downloads it, and normalizes the summary sheet into records.

use std::io::Cursor;

use calamine::{Reader, open_workbook_auto_from_rs};
use scraper::{Html, Selector};
use tracing::info;
use url::Url;

use crate::config::ScraperConfig;
use crate::domain::InstrumentRecord;
use crate::error::{Result, ScrapeError};
use crate::requester::{Requester, RequesterConfig};

use super::sheet::{SheetCell, TRADE_SUMMARY_SHEET, normalize_rows};

/// Anchor carrying the link to the current results spreadsheet.
const RESULTS_LINK_SELECTOR: &str = "a.accordeon-inner__item-title.link.xls";

/// Client for the exchange's trade-results listing.
pub struct TradeResultsScraper {
    requester: Requester,
    results_url: String,
}

impl TradeResultsScraper {
    /// Create a scraper for the results page named in the configuration.
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            requester: Requester::new(RequesterConfig::new())?,
            results_url: config.trade_results_url.clone(),
        })
    }

    /// Download and normalize the current day's trade summary.
    ///
    /// Records come back in sheet order. Fails with
    /// [`ScrapeError::HtmlParsing`] when the listing page carries no
    /// spreadsheet link; transport and spreadsheet errors propagate.
    pub async fn get_all_instruments(&self) -> Result<Vec<InstrumentRecord>> {
        info!("retrieving link to the trade results file");
        let response = self.requester.get(&self.results_url).await?.error_for_status()?;
        let html = response.text().await?;
        let href = find_results_link(&html)?;
        let file_url = resolve_file_url(&self.results_url, &href)?;

        info!(url = %file_url, "retrieving trade results file");
        let response = self.requester.get(&file_url).await?.error_for_status()?;
        let bytes = response.bytes().await?;

        read_trade_summary(&bytes)
    }
}

/// Extract the spreadsheet link from the listing page.
fn find_results_link(html: &str) -> Result<String> {
    let selector = Selector::parse(RESULTS_LINK_SELECTOR)
        .map_err(|e| ScrapeError::HtmlParsing(format!("bad selector: {e}")))?;

    let document = Html::parse_document(html);
    let anchor = document.select(&selector).next().ok_or_else(|| {
        ScrapeError::HtmlParsing("failed to retrieve url to the trade results file".to_string())
    })?;
    let href = anchor.value().attr("href").ok_or_else(|| {
        ScrapeError::HtmlParsing("failed to retrieve url to the trade results file".to_string())
    })?;

    Ok(href.to_string())
}

/// Resolve the (typically root-relative) spreadsheet link against the
/// listing page URL.
fn resolve_file_url(results_url: &str, href: &str) -> Result<String> {
    let base = Url::parse(results_url)?;
    Ok(base.join(href)?.to_string())
}

/// Parse the workbook and normalize its summary sheet.
fn read_trade_summary(bytes: &[u8]) -> Result<Vec<InstrumentRecord>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook.worksheet_range(TRADE_SUMMARY_SHEET)?;
    let rows: Vec<Vec<SheetCell>> = range
        .rows()
        .map(|row| row.iter().map(SheetCell::from).collect())
        .collect();
    Ok(normalize_rows(&rows))
}
