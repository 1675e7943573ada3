use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use url::Url;

use crate::config::CheckerConfig;
use crate::error::{ConfigError, FetchError};

use super::options::{RequestOptions, default_headers};
use super::report;
use super::response::{FetchedResponse, RequestOutcome};

const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// The request capability probes consume.
///
/// Implementations never panic and never return anything but a complete
/// response or an explicit failure.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, method: Method, options: &RequestOptions) -> RequestOutcome;

    /// GET with the given options.
    async fn get(&self, url: &str, options: &RequestOptions) -> RequestOutcome {
        self.fetch(url, Method::GET, options).await
    }
}

/// Transport policy fixed for the lifetime of an executor.
#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub timeout: Duration,
    pub max_redirects: usize,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub retry_statuses: Vec<u16>,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self::from(&CheckerConfig::default())
    }
}

impl From<&CheckerConfig> for TransportSettings {
    fn from(config: &CheckerConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            max_redirects: config.max_redirects,
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            retry_statuses: config.retry_statuses.clone(),
        }
    }
}

/// reqwest-backed [`Fetcher`] with manual, bounded redirect handling.
///
/// The underlying client (connection pool, default headers, TLS) is shared
/// and never mutated; everything call-specific travels in [`RequestOptions`].
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
    settings: TransportSettings,
}

impl HttpExecutor {
    pub fn new(settings: TransportSettings) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .redirect(Policy::none())
            .default_headers(default_headers())
            .build()
            .map_err(|e| ConfigError::Transport(report(&e)))?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    async fn follow(&self, url: &str, method: Method, options: &RequestOptions) -> RequestOutcome {
        let mut current = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            detail: e.to_string(),
        })?;
        let mut hops = 0usize;

        loop {
            let response = self.send_with_retry(&current, &method, options).await?;

            if options.follow_redirects() && REDIRECT_STATUSES.contains(&response.status) {
                let location = response
                    .header(LOCATION.as_str())
                    .filter(|l| !l.trim().is_empty())
                    .ok_or_else(|| FetchError::MissingLocation {
                        url: current.to_string(),
                        status: response.status,
                    })?;
                let next = current.join(location.trim()).map_err(|e| FetchError::InvalidUrl {
                    url: location.to_string(),
                    detail: e.to_string(),
                })?;

                hops += 1;
                if hops > self.settings.max_redirects {
                    return Err(FetchError::TooManyRedirects {
                        url: next.to_string(),
                        limit: self.settings.max_redirects,
                    });
                }
                log::debug!("[transport] {} {} -> {}", response.status, current, next);
                current = next;
                continue;
            }

            if response.is_success() || REDIRECT_STATUSES.contains(&response.status) {
                return Ok(response);
            }
            return Err(FetchError::Status {
                url: current.to_string(),
                status: response.status,
            });
        }
    }

    /// One hop, retried on connect errors and configured server statuses.
    async fn send_with_retry(
        &self,
        url: &Url,
        method: &Method,
        options: &RequestOptions,
    ) -> RequestOutcome {
        let mut attempt = 0u32;
        loop {
            match self.send_once(url, method, options).await {
                Ok(resp)
                    if attempt < self.settings.max_retries
                        && self.settings.retry_statuses.contains(&resp.status) =>
                {
                    log::warn!(
                        "[transport] {url} answered HTTP {} (attempt {}/{}), retrying",
                        resp.status,
                        attempt + 1,
                        self.settings.max_retries
                    );
                }
                Ok(resp) => return Ok(resp),
                Err(e)
                    if attempt < self.settings.max_retries
                        && (e.is_connect() || e.is_timeout()) =>
                {
                    log::warn!(
                        "[transport] request to {url} failed (attempt {}/{}), retrying: {}",
                        attempt + 1,
                        self.settings.max_retries,
                        report(&e)
                    );
                }
                Err(e) => return Err(classify(url, &e)),
            }
            tokio::time::sleep(self.backoff(attempt)).await;
            attempt += 1;
        }
    }

    async fn send_once(
        &self,
        url: &Url,
        method: &Method,
        options: &RequestOptions,
    ) -> Result<FetchedResponse, reqwest::Error> {
        log::debug!("[transport] {method} {url}");
        let response = self
            .client
            .request(method.clone(), url.clone())
            .headers(options.headers_for(url.as_str()))
            .send()
            .await?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let final_url = response.url().to_string();
        let body = response.bytes().await?.to_vec();

        Ok(FetchedResponse {
            status,
            headers,
            body,
            final_url,
        })
    }

    /// Exponential backoff: base, 2x base, 4x base, ... capped at ten seconds.
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(16);
        self.settings.retry_backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

fn classify(url: &Url, err: &reqwest::Error) -> FetchError {
    if err.is_body() || err.is_decode() {
        FetchError::Body {
            url: url.to_string(),
            detail: report(err),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            detail: report(err),
        }
    }
}

#[async_trait]
impl Fetcher for HttpExecutor {
    async fn fetch(&self, url: &str, method: Method, options: &RequestOptions) -> RequestOutcome {
        let outcome = self.follow(url, method, options).await;
        if let Err(e) = &outcome {
            log::warn!("[transport] {e}");
        }
        outcome
    }
}
