use reqwest::header::{
    CONTENT_ENCODING, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, SET_COOKIE,
};

use crate::decode::{charset_of, decode_with_charset};
use crate::error::FetchError;

/// Result of a fetch: a complete response, or the reason none was obtained.
pub type RequestOutcome = Result<FetchedResponse, FetchError>;

/// A fully read response from the last hop of a request.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    /// URL of the hop that produced this response, after redirects.
    pub final_url: String,
}

impl FetchedResponse {
    pub fn new(status: u16, final_url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            final_url: final_url.into(),
        }
    }

    /// Append a header. Invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First value of header `name`, if present and valid text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_encoding(&self) -> &str {
        self.headers
            .get(CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }

    /// Charset declared by `Content-Type`, if any.
    pub fn charset(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_of)
    }

    /// Body decoded according to its `Content-Encoding` and charset.
    pub fn text(&self) -> String {
        decode_with_charset(&self.body, self.content_encoding(), self.charset())
    }

    /// Value of cookie `name` as set by this response's `Set-Cookie` headers.
    /// The last assignment wins.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|raw| {
                let pair = raw.split(';').next()?;
                let (key, value) = pair.split_once('=')?;
                (key.trim() == name).then(|| value.trim().to_string())
            })
            .last()
    }
}
