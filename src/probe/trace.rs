use std::collections::HashMap;

use crate::transport::RequestOptions;

use super::{CountryCode, ProbeContext, ProbeResult, Service};

pub const CLOUDFLARE_TRACE_URL: &str = "https://www.cloudflare.com/cdn-cgi/trace";

/// Parse an edge-trace body of `key=value` lines.
///
/// Lines without `=` are skipped, keys and values are trimmed, the first `=`
/// splits (values may contain more), and a repeated key keeps its last value.
pub fn parse_trace(text: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for line in text.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        fields.insert(key.to_string(), value.trim().to_string());
    }
    fields
}

/// Egress location as reported by Cloudflare's edge.
pub async fn cloudflare(ctx: &ProbeContext) -> ProbeResult {
    let service = Service::Cloudflare;
    let response = match ctx
        .fetcher
        .get(CLOUDFLARE_TRACE_URL, &RequestOptions::new())
        .await
    {
        Ok(resp) => resp,
        Err(_) => return ProbeResult::unknown(service),
    };

    let fields = parse_trace(&response.text());
    let country = fields
        .get("loc")
        .map(|loc| CountryCode::parse(loc))
        .unwrap_or_default();

    let mut result = if country.is_known() {
        ProbeResult::available(service).with_country(country)
    } else {
        ProbeResult::unknown(service)
    };
    for key in ["ip", "colo"] {
        if let Some(value) = fields.get(key) {
            result = result.with_extra(key, value.as_str());
        }
    }
    result
}
