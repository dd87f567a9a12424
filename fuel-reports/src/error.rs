use thiserror::Error;

/// Errors produced while fetching, parsing, or assembling report data.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Every attempt of a retried request timed out without a response.
    #[error("no response for {method} {url} after {tries} tries")]
    Timeout {
        method: reqwest::Method,
        url: String,
        tries: u32,
    },

    #[error("unexpected page structure: {0}")]
    HtmlParsing(String),

    #[error("unexpected API response: {0}")]
    ApiResponse(String),

    /// A station lookup produced no match; carries the offending name.
    #[error("invalid station: {0}")]
    InvalidStation(String),

    /// A fuel lookup produced no match; carries the offending name.
    #[error("invalid fuel: {0}")]
    InvalidFuel(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
