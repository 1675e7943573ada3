use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Method;

use crate::error::FetchError;
use crate::transport::{FetchedResponse, Fetcher, RequestOptions, RequestOutcome};

use super::ProbeContext;

/// Scripted [`Fetcher`]: returns the outcome registered for a URL and a
/// network failure for anything else.
#[derive(Default)]
pub struct FakeFetcher {
    outcomes: HashMap<String, RequestOutcome>,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, response: FetchedResponse) -> Self {
        self.outcomes.insert(url.to_string(), Ok(response));
        self
    }

    /// Register a plain 200 response whose final URL is `url` itself.
    pub fn ok(self, url: &str, body: &str) -> Self {
        let response = FetchedResponse::new(200, url, body.as_bytes().to_vec());
        self.respond(url, response)
    }

    pub fn fail(mut self, url: &str, error: FetchError) -> Self {
        self.outcomes.insert(url.to_string(), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str, _method: Method, _options: &RequestOptions) -> RequestOutcome {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(url.to_string());
        }
        self.outcomes.get(url).cloned().unwrap_or_else(|| {
            Err(FetchError::Network {
                url: url.to_string(),
                detail: "simulated transport failure".to_string(),
            })
        })
    }
}

pub fn context(fetcher: Arc<FakeFetcher>) -> ProbeContext {
    ProbeContext::new(fetcher)
}

pub fn status_error(url: &str, status: u16) -> FetchError {
    FetchError::Status {
        url: url.to_string(),
        status,
    }
}
