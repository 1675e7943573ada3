use reqwest::header::{
    ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";

const MOBILE_SAFARI_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Mobile/15E148 Safari/604.1";
const DESKTOP_EDGE_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36 Edg/121.0.0.0";

/// Hosts that reject the default signature, matched by substring against the
/// request URL. The first matching entry wins.
pub const USER_AGENT_OVERRIDES: &[(&str, &str)] = &[
    ("facebook.com", MOBILE_SAFARI_UA),
    ("chatgpt.com", DESKTOP_EDGE_UA),
    ("chat.openai.com", DESKTOP_EDGE_UA),
];

/// Headers every request carries unless overridden per call. Installed once
/// on the shared client and never mutated afterwards.
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate, br"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers
}

/// User-Agent override for `url`, if its host is in [`USER_AGENT_OVERRIDES`].
pub fn user_agent_override(url: &str) -> Option<&'static str> {
    USER_AGENT_OVERRIDES
        .iter()
        .find(|(host, _)| url.contains(host))
        .map(|(_, ua)| *ua)
}

/// Per-call request options. Immutable once handed to a fetch; nothing here
/// is shared between calls.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    headers: HeaderMap,
    follow_redirects: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            headers: HeaderMap::new(),
            follow_redirects: true,
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay a header on the client defaults for this call only.
    /// Invalid names or values are dropped with a warning.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => log::warn!("[transport] ignoring invalid header {name}: {value}"),
        }
        self
    }

    /// Return 3xx responses as-is instead of following `Location`.
    pub fn no_redirects(mut self) -> Self {
        self.follow_redirects = false;
        self
    }

    pub fn follow_redirects(&self) -> bool {
        self.follow_redirects
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Headers to send for one hop to `url`: the host UA override, if any,
    /// then the caller's overlay on top.
    pub fn headers_for(&self, url: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(ua) = user_agent_override(url) {
            headers.insert(USER_AGENT, HeaderValue::from_static(ua));
        }
        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }
}
