//! Retrying HTTP layer shared by the scrapers.
//!
//! Wraps a `reqwest::Client` to add per-attempt timeouts, retries with a
//! doubling timeout, and a structured log line per attempt.

use std::time::{Duration, Instant};

use reqwest::{Client, Method, Response, StatusCode};
use tracing::{error, info, warn};

use crate::error::{Result, ScrapeError};

/// Default timeout for the first attempt of a request.
pub const DEFAULT_INIT_TIMEOUT: Duration = Duration::from_secs(2);

/// Default number of attempts before giving up.
pub const DEFAULT_TRIES: u32 = 3;

/// Configuration for the requester.
#[derive(Debug, Clone)]
pub struct RequesterConfig {
    /// Timeout for the first attempt; doubles after every attempt.
    pub init_timeout: Duration,
    /// Number of attempts before giving up.
    pub tries: u32,
}

impl RequesterConfig {
    /// Create a config with the default timeout and retry count.
    pub fn new() -> Self {
        Self {
            init_timeout: DEFAULT_INIT_TIMEOUT,
            tries: DEFAULT_TRIES,
        }
    }

    /// Set the first-attempt timeout.
    pub fn with_init_timeout(mut self, timeout: Duration) -> Self {
        self.init_timeout = timeout;
        self
    }

    /// Set the number of attempts.
    pub fn with_tries(mut self, tries: u32) -> Self {
        self.tries = tries;
        self
    }
}

impl Default for RequesterConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP front door for the scrapers.
///
/// Every request is attempted up to `tries` times with a per-attempt
/// timeout that doubles after each attempt, so slow endpoints get
/// progressively more room. A timed-out attempt is logged and retried;
/// a 5xx response is kept and retried; any response below 500 is final.
/// When every attempt times out the request fails with
/// [`ScrapeError::Timeout`]; when at least one response arrived but all
/// were 5xx, the last response is returned so the caller can inspect it.
///
/// Statuses are never turned into errors here. Callers that want
/// raise-on-status semantics apply [`Response::error_for_status`] to the
/// returned response.
#[derive(Debug, Clone)]
pub struct Requester {
    client: Client,
    init_timeout: Duration,
    tries: u32,
}

impl Requester {
    /// Create a requester with the given configuration.
    pub fn new(config: RequesterConfig) -> Result<Self> {
        if config.init_timeout.is_zero() {
            return Err(ScrapeError::InvalidArgument(
                "init_timeout should be greater than 0".to_string(),
            ));
        }
        if config.tries < 1 {
            return Err(ScrapeError::InvalidArgument(
                "tries should be greater than 0".to_string(),
            ));
        }

        // No client-wide timeout: each attempt carries its own.
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            init_timeout: config.init_timeout,
            tries: config.tries,
        })
    }

    /// GET the given URL.
    pub async fn get(&self, url: &str) -> Result<Response> {
        self.request(Method::GET, url, None).await
    }

    /// POST the given fields as a multipart form.
    pub async fn post_form(
        &self,
        url: &str,
        fields: &[(&'static str, String)],
    ) -> Result<Response> {
        self.request(Method::POST, url, Some(fields)).await
    }

    /// Issue a request, retrying on timeout and 5xx.
    ///
    /// Transport errors other than a timeout propagate immediately. The
    /// multipart form, when given, is rebuilt for every attempt.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        form: Option<&[(&'static str, String)]>,
    ) -> Result<Response> {
        let mut timeout = self.init_timeout;
        let mut last_response = None;

        for _ in 0..self.tries {
            let mut builder = self.client.request(method.clone(), url).timeout(timeout);
            if let Some(fields) = form {
                let mut multipart = reqwest::multipart::Form::new();
                for (name, value) in fields {
                    multipart = multipart.text(*name, value.clone());
                }
                builder = builder.multipart(multipart);
            }

            let start = Instant::now();
            match builder.send().await {
                Err(e) if e.is_timeout() => {
                    warn!(
                        method = %method,
                        url,
                        timeout_secs = timeout.as_secs_f64(),
                        "request timed out"
                    );
                }
                Err(e) => return Err(e.into()),
                Ok(response) => {
                    let elapsed_ms = start.elapsed().as_millis() as u64;
                    let status = response.status();
                    if is_ok_status(status) {
                        info!(method = %method, url, status = status.as_u16(), elapsed_ms, "request");
                    } else {
                        error!(method = %method, url, status = status.as_u16(), elapsed_ms, "request");
                    }

                    if status.as_u16() < 500 {
                        return Ok(response);
                    }
                    last_response = Some(response);
                }
            }

            timeout *= 2;
        }

        match last_response {
            Some(response) => Ok(response),
            None => Err(ScrapeError::Timeout {
                method,
                url: url.to_string(),
                tries: self.tries,
            }),
        }
    }
}

/// An acceptable response status: anything below 400, redirects included.
fn is_ok_status(status: StatusCode) -> bool {
    status.as_u16() < 400
}
