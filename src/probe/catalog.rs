use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use regex::Regex;

use crate::transport::RequestOptions;

use super::{CountryCode, ProbeContext, ProbeResult, Service};

/// A title catalogued in virtually every region, so the request is
/// redirected to the caller's regional page.
pub const NETFLIX_TITLE_ID: &str = "80018499";
pub const NETFLIX_TITLE_URL: &str = "https://www.netflix.com/title/80018499";
const IDENTITY_COOKIE: &str = "nfvdid";

const COOKIE_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Locale segment (`jp`, `hk-en`) preceding `/title/` in a catalog URL.
pub fn region_from_url(url: &str) -> Option<String> {
    let re = Regex::new(r"/([a-zA-Z]{2}(?:-[a-zA-Z]{2})?)/title/").ok()?;
    re.captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

/// Country embedded in the identification cookie: URL-encoded tail dropped,
/// the first segment base64-decoded and searched for a `"country"` field.
pub fn country_from_cookie(cookie: &str) -> Option<CountryCode> {
    let head = cookie.split('%').next()?;
    let head = urlencoding::decode(head).ok()?;
    let decoded = COOKIE_BASE64.decode(head.trim().as_bytes()).ok()?;
    let decoded = String::from_utf8_lossy(&decoded);

    let re = Regex::new(r#""country"\s*:\s*"([A-Z]{2})""#).ok()?;
    let code = re.captures(&decoded)?.get(1)?.as_str();
    Some(CountryCode::parse(code)).filter(CountryCode::is_known)
}

/// Streaming catalog region, by redirect locale, then identity cookie, then
/// the final status.
pub async fn netflix(ctx: &ProbeContext) -> ProbeResult {
    let service = Service::Netflix;
    let response = match ctx.fetcher.get(NETFLIX_TITLE_URL, &RequestOptions::new()).await {
        Ok(resp) => resp,
        Err(e) if matches!(e.status(), Some(403 | 404)) => {
            return ProbeResult::unavailable(service).with_region("Blocked");
        }
        Err(_) => return ProbeResult::unknown(service),
    };

    if let Some(region) = region_from_url(&response.final_url) {
        let country = CountryCode::parse(&region[..2]);
        return ProbeResult::available(service)
            .with_country(country)
            .with_region(region)
            .with_extra("final_url", response.final_url.as_str())
            .with_extra("method", "redirect");
    }

    if let Some(country) = response
        .cookie(IDENTITY_COOKIE)
        .and_then(|c| country_from_cookie(&c))
    {
        let region = country.as_str().to_ascii_lowercase();
        return ProbeResult::available(service)
            .with_country(country)
            .with_region(region)
            .with_extra("final_url", response.final_url.as_str())
            .with_extra("method", "cookie");
    }

    if matches!(response.status, 403 | 404) {
        return ProbeResult::unavailable(service).with_region("Blocked");
    }

    ProbeResult::available(service).with_extra("final_url", response.final_url.as_str())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use base64::engine::general_purpose::STANDARD;

    use super::*;
    use crate::probe::ProbeStatus;
    use crate::probe::testing::{FakeFetcher, context, status_error};
    use crate::transport::FetchedResponse;

    #[test]
    fn locale_segment_is_extracted() {
        assert_eq!(
            region_from_url("https://www.netflix.com/hk-en/title/80018499").as_deref(),
            Some("hk-en")
        );
        assert_eq!(
            region_from_url("https://www.netflix.com/jp/title/80018499").as_deref(),
            Some("jp")
        );
        assert_eq!(region_from_url("https://www.netflix.com/title/80018499"), None);
    }

    #[test]
    fn cookie_country_survives_stripped_padding() {
        let encoded = STANDARD.encode(r#"{"v":2,"country":"DE"}"#);
        let cookie = encoded.replace('=', "%3D");
        assert_eq!(
            country_from_cookie(&cookie).map(|c| c.as_str().to_string()),
            Some("DE".to_string())
        );
    }

    #[test]
    fn cookie_without_country_is_ignored() {
        let cookie = STANDARD.encode(r#"{"v":2}"#);
        assert_eq!(country_from_cookie(&cookie), None);
        assert_eq!(country_from_cookie("!!!not base64!!!"), None);
    }

    #[tokio::test]
    async fn region_comes_from_redirected_url() {
        let response = FetchedResponse::new(
            200,
            "https://www.netflix.com/hk-en/title/80018499",
            "<html></html>",
        );
        let fetcher = Arc::new(FakeFetcher::default().respond(NETFLIX_TITLE_URL, response));
        let result = netflix(&context(fetcher)).await;

        assert_eq!(result.status(), ProbeStatus::Available);
        assert_eq!(result.country().as_str(), "HK");
        assert_eq!(result.region(), "hk-en");
    }

    #[tokio::test]
    async fn cookie_is_used_when_url_has_no_locale() {
        let cookie = STANDARD.encode(r#"{"country":"JP"}"#).replace('=', "%3D");
        let response = FetchedResponse::new(200, NETFLIX_TITLE_URL, "")
            .with_header("set-cookie", &format!("nfvdid={cookie}; Path=/"));
        let fetcher = Arc::new(FakeFetcher::default().respond(NETFLIX_TITLE_URL, response));
        let result = netflix(&context(fetcher)).await;

        assert_eq!(result.country().as_str(), "JP");
        assert_eq!(result.region(), "jp");
        assert_eq!(result.extra("method"), Some("cookie"));
    }

    #[tokio::test]
    async fn not_found_is_blocked() {
        let fetcher = Arc::new(
            FakeFetcher::default().fail(NETFLIX_TITLE_URL, status_error(NETFLIX_TITLE_URL, 404)),
        );
        let result = netflix(&context(fetcher)).await;

        assert_eq!(result.status(), ProbeStatus::Unavailable);
        assert_eq!(result.region(), "Blocked");
        assert_eq!(result.country().as_str(), "Unknown");
    }

    #[tokio::test]
    async fn reachable_without_signals_is_available_but_unknown() {
        let fetcher = Arc::new(FakeFetcher::default().ok(NETFLIX_TITLE_URL, "<html></html>"));
        let result = netflix(&context(fetcher)).await;

        assert_eq!(result.status(), ProbeStatus::Available);
        assert_eq!(result.country().as_str(), "Unknown");
        assert_eq!(result.region(), "Unknown");
    }
}
