use regex::Regex;
use serde::Deserialize;

use crate::transport::RequestOptions;

use super::{CountryCode, ProbeContext, ProbeResult, Service, UNKNOWN};

pub const RESOLVER_ECHO_URL: &str = "https://only-185936-14-198-202-48.nstool.onmyojigame.com/";
pub const COUNTRY_API_BASE: &str = "https://api.country.is";

#[derive(Debug, Deserialize)]
struct CountryIsResponse {
    country: Option<String>,
}

fn capture_ip(pattern: &str, text: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Country of `ip` via the secondary per-IP geolocation service.
pub async fn country_of_ip(ctx: &ProbeContext, ip: &str) -> CountryCode {
    let ip = ip.trim();
    if ip.is_empty() || ip.eq_ignore_ascii_case(UNKNOWN) {
        return CountryCode::unknown();
    }

    let url = format!("{COUNTRY_API_BASE}/{ip}");
    let Ok(response) = ctx.fetcher.get(&url, &RequestOptions::new()).await else {
        return CountryCode::unknown();
    };
    match serde_json::from_str::<CountryIsResponse>(&response.text()) {
        Ok(body) => body
            .country
            .map(|c| CountryCode::parse(&c))
            .unwrap_or_default(),
        Err(e) => {
            log::debug!("[dns_match] unparseable geolocation for {ip}: {e}");
            CountryCode::unknown()
        }
    }
}

/// Compare the country of the public IP with that of the DNS resolver the
/// connection uses. A mismatch, or either side unresolved, reports
/// `match=false`.
pub async fn dns_match(ctx: &ProbeContext) -> ProbeResult {
    let service = Service::DnsMatch;
    let Ok(response) = ctx
        .fetcher
        .get(RESOLVER_ECHO_URL, &RequestOptions::new())
        .await
    else {
        return ProbeResult::unknown(service)
            .with_extra("public_ip", UNKNOWN)
            .with_extra("public_country", UNKNOWN)
            .with_extra("dns_ip", UNKNOWN)
            .with_extra("dns_country", UNKNOWN)
            .with_extra("match", "false");
    };

    let text = response.text();
    let public_ip = capture_ip(r"Your IP Address:\s*([\d.]+)", &text);
    let dns_ip = capture_ip(r"Your Local DNS Server:\s*([\d.]+)", &text);

    let public_ip = public_ip.unwrap_or_else(|| UNKNOWN.to_string());
    let dns_ip = dns_ip.unwrap_or_else(|| UNKNOWN.to_string());

    let (public_country, dns_country) = tokio::join!(
        country_of_ip(ctx, &public_ip),
        country_of_ip(ctx, &dns_ip)
    );
    let matched = public_country.is_known() && public_country == dns_country;

    let result = if public_country.is_known() || dns_country.is_known() {
        ProbeResult::available(service)
    } else {
        ProbeResult::unknown(service)
    };
    result
        .with_country(public_country.clone())
        .with_extra("public_ip", public_ip)
        .with_extra("public_country", public_country.as_str())
        .with_extra("dns_ip", dns_ip)
        .with_extra("dns_country", dns_country.as_str())
        .with_extra("match", matched.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::probe::ProbeStatus;
    use crate::probe::testing::{FakeFetcher, context};

    const PAGE: &str = "<html><body>Your IP Address: 1.2.3.4<br/>Your Local DNS Server: 5.6.7.8</body></html>";

    fn api(ip: &str) -> String {
        format!("{COUNTRY_API_BASE}/{ip}")
    }

    #[tokio::test]
    async fn different_countries_do_not_match() {
        let fetcher = Arc::new(
            FakeFetcher::default()
                .ok(RESOLVER_ECHO_URL, PAGE)
                .ok(&api("1.2.3.4"), r#"{"ip":"1.2.3.4","country":"JP"}"#)
                .ok(&api("5.6.7.8"), r#"{"ip":"5.6.7.8","country":"US"}"#),
        );
        let result = dns_match(&context(fetcher)).await;

        assert_eq!(result.status(), ProbeStatus::Available);
        assert_eq!(result.country().as_str(), "JP");
        assert_eq!(result.extra("public_country"), Some("JP"));
        assert_eq!(result.extra("dns_country"), Some("US"));
        assert_eq!(result.extra("match"), Some("false"));
    }

    #[tokio::test]
    async fn same_country_matches() {
        let fetcher = Arc::new(
            FakeFetcher::default()
                .ok(RESOLVER_ECHO_URL, PAGE)
                .ok(&api("1.2.3.4"), r#"{"country":"JP"}"#)
                .ok(&api("5.6.7.8"), r#"{"country":"JP"}"#),
        );
        let result = dns_match(&context(fetcher)).await;

        assert_eq!(result.extra("match"), Some("true"));
        assert_eq!(result.extra("public_ip"), Some("1.2.3.4"));
        assert_eq!(result.extra("dns_ip"), Some("5.6.7.8"));
    }

    #[tokio::test]
    async fn failed_lookup_on_one_side_is_not_a_match() {
        let fetcher = Arc::new(
            FakeFetcher::default()
                .ok(RESOLVER_ECHO_URL, PAGE)
                .ok(&api("1.2.3.4"), r#"{"country":"JP"}"#),
        );
        let result = dns_match(&context(fetcher)).await;

        assert_eq!(result.extra("dns_country"), Some("Unknown"));
        assert_eq!(result.extra("match"), Some("false"));
    }

    #[tokio::test]
    async fn missing_ips_are_never_looked_up() {
        let fetcher = Arc::new(FakeFetcher::default().ok(RESOLVER_ECHO_URL, "<html>nothing</html>"));
        let result = dns_match(&context(fetcher.clone())).await;

        assert_eq!(result.status(), ProbeStatus::Unknown);
        assert_eq!(result.extra("public_ip"), Some("Unknown"));
        assert_eq!(result.extra("match"), Some("false"));
        assert_eq!(fetcher.calls(), vec![RESOLVER_ECHO_URL.to_string()]);
    }

    #[tokio::test]
    async fn garbage_geolocation_body_is_unknown() {
        let fetcher = Arc::new(FakeFetcher::default().ok(&api("9.9.9.9"), "<html>rate limited</html>"));
        let country = country_of_ip(&context(fetcher), "9.9.9.9").await;
        assert!(!country.is_known());
    }
}
