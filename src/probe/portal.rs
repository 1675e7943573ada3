use url::Url;

use crate::transport::RequestOptions;

use super::html::short_fragments;
use super::retail::cc_tld;
use super::{CountryCode, ProbeContext, ProbeResult, Service};

pub const GOOGLE_HOME_URL: &str = "https://www.google.com.hk/?hl=zh-HK";
const FRAGMENT_SELECTOR: &str = "div, span, p, a";
const MAX_FRAGMENT_CHARS: usize = 30;

fn navigation_options() -> RequestOptions {
    RequestOptions::new()
        .header("Accept-Language", "zh-HK,zh;q=0.9,en;q=0.8")
        .header("Cache-Control", "max-age=0")
        .header("Sec-Fetch-Dest", "document")
        .header("Sec-Fetch-Mode", "navigate")
        .header("Sec-Fetch-Site", "none")
        .header("Sec-Fetch-User", "?1")
}

fn is_google_host(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
        .is_some_and(|h| h.contains("google."))
}

/// Location from the portal footer text, falling back to the country
/// domain the portal settled on.
pub async fn google(ctx: &ProbeContext) -> ProbeResult {
    let service = Service::Google;
    let Ok(response) = ctx
        .fetcher
        .get(GOOGLE_HOME_URL, &navigation_options())
        .await
    else {
        return ProbeResult::unknown(service);
    };

    let html = response.text();
    if let Some(snapshots) = &ctx.snapshots {
        snapshots.save_text(&html, "google_home.txt");
    }

    let stopwords = &ctx.classifier.portal_stopwords;
    let hit = short_fragments(&html, FRAGMENT_SELECTOR, MAX_FRAGMENT_CHARS)
        .into_iter()
        .filter(|f| !stopwords.iter().any(|s| s == f))
        .find_map(|fragment| {
            let entry = ctx.countries.lookup_entry(&fragment)?;
            Some((fragment, entry.name.to_string(), entry.code.to_string()))
        });

    if let Some((fragment, name, code)) = hit {
        log::debug!("[google] footer fragment {fragment:?} resolved to {code}");
        return ProbeResult::available(service)
            .with_country(CountryCode::parse(&code))
            .with_region(name)
            .with_extra("method", "bottom_text")
            .with_extra("fragment", fragment);
    }

    if is_google_host(&response.final_url) {
        if let Some(country) = cc_tld(&response.final_url) {
            let region = ctx.countries.name_of(country.as_str()).unwrap_or_default();
            return ProbeResult::available(service)
                .with_region(region)
                .with_country(country)
                .with_extra("method", "url");
        }
    }

    ProbeResult::available(service).with_extra("method", "none")
}
