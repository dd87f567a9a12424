//! Session-stateful client for the freight-cost calculator API.
//!
//! The API wants a session token scraped from its HTML landing page
//! before it answers lookups or price calculations. The token is
//! fetched lazily on the first call and cached for the lifetime of the
//! client; there is no refresh path, so a stale token keeps surfacing
//! as API errors until the client is recreated.

use scraper::{Html, Selector};

use crate::config::ScraperConfig;
use crate::domain::{CostQuote, LookupKind, LookupResult};
use crate::error::{Result, ScrapeError};
use crate::requester::{Requester, RequesterConfig};

use super::types::{ApiEnvelope, CalculationData, LookupEntry};

/// Element holding the session token on the calculator page.
const SESSID_SELECTOR: &str = "#sessid";

/// Lookup route prefixes; the searched name is appended.
const STATION_LOOKUP_ROUTE: &str = "/calculator/api/stations/filteredByNameOrCode/";
const FUEL_LOOKUP_ROUTE: &str = "/calculator/api/products/filteredByNameOrCode/";

// Fixed calculation parameters: oil-product tanker cars, one rented
// car with one escort car and one attendant, four axles.
const CAR_TYPE: &str = "43";
const CAR_COUNT: &str = "1";
const ESCORT_CAR_COUNT: &str = "1";
const ATTENDANT_COUNT: &str = "1";
const AXLE_COUNT: &str = "4";
const NOT_OWN_CAR: &str = "2";

/// Client for the calculator's lookup and price-calculation API.
///
/// Holds one lazily-fetched session token as instance state, so an
/// instance belongs to a single task; concurrent shared use needs
/// external synchronization.
pub struct CalculatorClient {
    requester: Requester,
    page_url: String,
    api_url: String,
    sessid: Option<String>,
}

impl CalculatorClient {
    /// Create a client for the calculator named in the configuration.
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            requester: Requester::new(RequesterConfig::new())?,
            page_url: config.calculator_url.clone(),
            api_url: config.api_endpoint_url.clone(),
            sessid: None,
        })
    }

    /// Return the cached session token, fetching it on first use.
    async fn ensure_session(&mut self) -> Result<String> {
        if let Some(sessid) = &self.sessid {
            return Ok(sessid.clone());
        }

        let response = self.requester.get(&self.page_url).await?.error_for_status()?;
        let html = response.text().await?;
        let sessid = extract_sessid(&html)?;
        self.sessid = Some(sessid.clone());
        Ok(sessid)
    }

    /// Look up a station or fuel by name.
    ///
    /// Returns the first match. Fails with [`ScrapeError::InvalidStation`]
    /// or [`ScrapeError::InvalidFuel`] when the name is unknown to the
    /// calculator, and with [`ScrapeError::ApiResponse`] when the backend
    /// flags an error.
    pub async fn lookup(&mut self, kind: LookupKind, name: &str) -> Result<LookupResult> {
        let sessid = self.ensure_session().await?;
        let route = format!("{}{name}", lookup_route(kind));
        let fields = [
            ("action", "getData".to_string()),
            ("sessid", sessid),
            ("route", route),
            ("limit", "1".to_string()),
        ];

        let response = self
            .requester
            .post_form(&self.api_url, &fields)
            .await?
            .error_for_status()?;
        let envelope: ApiEnvelope<Vec<LookupEntry>> = response.json().await?;
        envelope.check_error()?;

        let entry = envelope
            .data
            .filter(|entries| !entries.is_empty())
            .map(|mut entries| entries.remove(0))
            .ok_or_else(|| not_found(kind, name))?;

        Ok(LookupResult {
            kind,
            code: entry.code,
            name: entry.name,
        })
    }

    /// Price a route between two named stations for a named fuel.
    ///
    /// Resolves departure, arrival, and fuel codes through three
    /// sequential lookups, then runs the calculation. All calls share
    /// one session token.
    pub async fn price_route(
        &mut self,
        departure: &str,
        arrival: &str,
        fuel: &str,
        weight: u32,
        capacity: u32,
    ) -> Result<CostQuote> {
        let sessid = self.ensure_session().await?;

        let departure_code = self.lookup(LookupKind::Station, departure).await?.code;
        let arrival_code = self.lookup(LookupKind::Station, arrival).await?.code;
        let fuel_code = self.lookup(LookupKind::Fuel, fuel).await?.code;

        let fields = [
            ("action", "getCalculation".to_string()),
            ("sessid", sessid),
            ("type", CAR_TYPE.to_string()),
            ("st1", departure_code.clone()),
            ("st2", arrival_code.clone()),
            ("kgr", fuel_code.clone()),
            ("ves", weight.to_string()),
            ("gp", capacity.to_string()),
            ("nv", CAR_COUNT.to_string()),
            ("nvohr", ESCORT_CAR_COUNT.to_string()),
            ("nprov", ATTENDANT_COUNT.to_string()),
            ("osi", AXLE_COUNT.to_string()),
            ("sv", NOT_OWN_CAR.to_string()),
        ];

        let response = self
            .requester
            .post_form(&self.api_url, &fields)
            .await?
            .error_for_status()?;
        let envelope: ApiEnvelope<CalculationData> = response.json().await?;
        envelope.check_error()?;

        let data = envelope
            .data
            .ok_or_else(|| ScrapeError::ApiResponse("empty response data".to_string()))?;
        let total_with_vat = data.total_with_vat()?;

        Ok(CostQuote {
            departure_code,
            arrival_code,
            fuel_code,
            weight,
            capacity,
            total_with_vat,
        })
    }
}

fn lookup_route(kind: LookupKind) -> &'static str {
    match kind {
        LookupKind::Station => STATION_LOOKUP_ROUTE,
        LookupKind::Fuel => FUEL_LOOKUP_ROUTE,
    }
}

fn not_found(kind: LookupKind, name: &str) -> ScrapeError {
    match kind {
        LookupKind::Station => ScrapeError::InvalidStation(name.to_string()),
        LookupKind::Fuel => ScrapeError::InvalidFuel(name.to_string()),
    }
}

/// Scrape the session token from the calculator landing page.
fn extract_sessid(html: &str) -> Result<String> {
    let selector = Selector::parse(SESSID_SELECTOR)
        .map_err(|e| ScrapeError::HtmlParsing(format!("bad selector: {e}")))?;

    let document = Html::parse_document(html);
    let element = document
        .select(&selector)
        .next()
        .ok_or_else(|| ScrapeError::HtmlParsing("failed to retrieve sessid".to_string()))?;
    let value = element
        .value()
        .attr("value")
        .ok_or_else(|| ScrapeError::HtmlParsing("failed to retrieve sessid".to_string()))?;

    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use mockito::Matcher;

    use super::*;

    const CALC_PAGE: &str =
        r#"<html><body><input type="hidden" id="sessid" value="f00d1234"></body></html>"#;

    fn test_config(base_url: &str) -> ScraperConfig {
        ScraperConfig {
            calculator_url: format!("{base_url}/calc/"),
            trade_results_url: format!("{base_url}/markets/results/"),
            api_endpoint_url: format!("{base_url}/ajax.php"),
            fuel_name_to_instrument_codes: BTreeMap::new(),
            fuel_name_to_calculator_item: BTreeMap::new(),
            calculator_item_weights: BTreeMap::new(),
            delivery_basis_to_calculator_station_name: BTreeMap::new(),
        }
    }

    #[test]
    fn extracts_sessid_value() {
        assert_eq!(extract_sessid(CALC_PAGE).unwrap(), "f00d1234");
    }

    #[test]
    fn missing_sessid_is_a_parsing_error() {
        let err = extract_sessid("<html><body></body></html>").unwrap_err();
        assert!(matches!(err, ScrapeError::HtmlParsing(_)));
    }

    #[test]
    fn sessid_without_value_is_a_parsing_error() {
        let err = extract_sessid(r#"<input type="hidden" id="sessid">"#).unwrap_err();
        assert!(matches!(err, ScrapeError::HtmlParsing(_)));
    }

    #[tokio::test]
    async fn session_token_is_fetched_once() {
        let mut server = mockito::Server::new_async().await;
        let page_mock = server
            .mock("GET", "/calc/")
            .with_status(200)
            .with_body(CALC_PAGE)
            .expect(1)
            .create_async()
            .await;
        let lookup_mock = server
            .mock("POST", "/ajax.php")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("getData".to_string()),
                Matcher::Regex("f00d1234".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": null, "data": [{"code": "2010130", "name": "СУРГУТ"}]}"#)
            .expect(2)
            .create_async()
            .await;

        let mut client = CalculatorClient::new(&test_config(&server.url())).unwrap();
        let first = client.lookup(LookupKind::Station, "Сургут").await.unwrap();
        let second = client.lookup(LookupKind::Station, "Сургут").await.unwrap();

        assert_eq!(first.code, "2010130");
        assert_eq!(first.name, "СУРГУТ");
        assert_eq!(second, first);
        page_mock.assert_async().await;
        lookup_mock.assert_async().await;
    }

    #[tokio::test]
    async fn null_data_means_unknown_station() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/calc/")
            .with_status(200)
            .with_body(CALC_PAGE)
            .create_async()
            .await;
        server
            .mock("POST", "/ajax.php")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": null, "data": null}"#)
            .create_async()
            .await;

        let mut client = CalculatorClient::new(&test_config(&server.url())).unwrap();

        let err = client
            .lookup(LookupKind::Station, "Хогвартс")
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidStation(name) if name == "Хогвартс"));

        let err = client.lookup(LookupKind::Fuel, "Дрова").await.unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidFuel(name) if name == "Дрова"));
    }

    #[tokio::test]
    async fn empty_data_array_means_unknown_name() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/calc/")
            .with_status(200)
            .with_body(CALC_PAGE)
            .create_async()
            .await;
        server
            .mock("POST", "/ajax.php")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": null, "data": []}"#)
            .create_async()
            .await;

        let mut client = CalculatorClient::new(&test_config(&server.url())).unwrap();
        let err = client
            .lookup(LookupKind::Station, "Хогвартс")
            .await
            .unwrap_err();

        assert!(matches!(err, ScrapeError::InvalidStation(_)));
    }

    #[tokio::test]
    async fn error_flag_fails_the_lookup() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/calc/")
            .with_status(200)
            .with_body(CALC_PAGE)
            .create_async()
            .await;
        server
            .mock("POST", "/ajax.php")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "Сессия истекла", "data": null}"#)
            .create_async()
            .await;

        let mut client = CalculatorClient::new(&test_config(&server.url())).unwrap();
        let err = client
            .lookup(LookupKind::Station, "Сургут")
            .await
            .unwrap_err();

        assert!(matches!(err, ScrapeError::ApiResponse(_)));
    }

    #[tokio::test]
    async fn page_without_sessid_fails_the_first_call() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/calc/")
            .with_status(200)
            .with_body("<html><body>цены на перевозку</body></html>")
            .create_async()
            .await;

        let mut client = CalculatorClient::new(&test_config(&server.url())).unwrap();
        let err = client
            .lookup(LookupKind::Station, "Сургут")
            .await
            .unwrap_err();

        assert!(matches!(err, ScrapeError::HtmlParsing(_)));
    }

    #[tokio::test]
    async fn price_route_resolves_codes_then_calculates() {
        let mut server = mockito::Server::new_async().await;
        let page_mock = server
            .mock("GET", "/calc/")
            .with_status(200)
            .with_body(CALC_PAGE)
            .expect(1)
            .create_async()
            .await;
        let lookup_mock = server
            .mock("POST", "/ajax.php")
            .match_body(Matcher::Regex("getData".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": null, "data": [{"code": "2010130", "name": "СУРГУТ"}]}"#)
            .expect(3)
            .create_async()
            .await;
        let calc_mock = server
            .mock("POST", "/ajax.php")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("getCalculation".to_string()),
                Matcher::Regex("f00d1234".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": null, "data": {"total": {"sumtWithVat": "123456.78"}}}"#)
            .expect(1)
            .create_async()
            .await;

        let mut client = CalculatorClient::new(&test_config(&server.url())).unwrap();
        let quote = client
            .price_route("Сургут", "Комбинатская", "ТОПЛИВО ДИЗЕЛЬНОЕ", 65, 66)
            .await
            .unwrap();

        assert_eq!(quote.departure_code, "2010130");
        assert_eq!(quote.arrival_code, "2010130");
        assert_eq!(quote.fuel_code, "2010130");
        assert_eq!(quote.weight, 65);
        assert_eq!(quote.capacity, 66);
        assert_eq!(quote.total_with_vat, 123456.78);
        page_mock.assert_async().await;
        lookup_mock.assert_async().await;
        calc_mock.assert_async().await;
    }

    #[tokio::test]
    async fn calculation_without_data_is_an_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/calc/")
            .with_status(200)
            .with_body(CALC_PAGE)
            .create_async()
            .await;
        server
            .mock("POST", "/ajax.php")
            .match_body(Matcher::Regex("getData".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": null, "data": [{"code": "1", "name": "X"}]}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/ajax.php")
            .match_body(Matcher::Regex("getCalculation".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": null, "data": null}"#)
            .create_async()
            .await;

        let mut client = CalculatorClient::new(&test_config(&server.url())).unwrap();
        let err = client
            .price_route("Сургут", "Комбинатская", "ТОПЛИВО ДИЗЕЛЬНОЕ", 65, 66)
            .await
            .unwrap_err();

        assert!(matches!(err, ScrapeError::ApiResponse(_)));
    }
}
