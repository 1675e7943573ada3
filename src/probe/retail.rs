use url::Url;

use crate::transport::RequestOptions;

use super::{CountryCode, ProbeContext, ProbeResult, Service, UNKNOWN};

pub const AMAZON_URL: &str = "https://www.amazon.com/";

/// Country-code top-level domain of `url`'s host.
///
/// Only the last label counts, so `amazon.co.jp` and `google.com.hk` work
/// and a generic `.com` yields nothing. `uk` is reported as `GB`.
pub fn cc_tld(url: &str) -> Option<CountryCode> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.trim_end_matches('.');
    let label = host.rsplit('.').next()?;
    if label.eq_ignore_ascii_case("uk") {
        return Some(CountryCode::parse("GB"));
    }
    Some(CountryCode::parse(label)).filter(CountryCode::is_known)
}

/// Regional storefront the global home page redirects to.
pub async fn amazon(ctx: &ProbeContext) -> ProbeResult {
    let service = Service::Amazon;
    let Ok(response) = ctx.fetcher.get(AMAZON_URL, &RequestOptions::new()).await else {
        return ProbeResult::unknown(service).with_extra("url", UNKNOWN);
    };

    let mut result = ProbeResult::available(service);
    if let Some(country) = cc_tld(&response.final_url) {
        if let Some(name) = ctx.countries.name_of(country.as_str()) {
            result = result.with_region(name);
        }
        result = result.with_country(country);
    }
    result.with_extra("url", response.final_url.as_str())
}
