//! Reachability-only probes: a service is available when one of its
//! endpoints answers with a success status.

use crate::transport::{FetchedResponse, RequestOptions};

use super::trace::parse_trace;
use super::{CountryCode, ProbeContext, ProbeResult, Service};

pub const X_URLS: &[&str] = &["https://twitter.com/"];
pub const TIKTOK_URLS: &[&str] = &["https://www.tiktok.com/"];
pub const INSTAGRAM_URLS: &[&str] = &["https://www.instagram.com/"];
pub const TELEGRAM_URLS: &[&str] = &["https://web.telegram.org/"];
pub const FACEBOOK_URLS: &[&str] = &[
    "https://www.facebook.com/favicon.ico",
    "https://m.facebook.com/favicon.ico",
    "https://graph.facebook.com/robots.txt",
];
pub const OPENAI_TRACE_URLS: &[&str] = &[
    "https://chat.openai.com/cdn-cgi/trace",
    "https://chatgpt.com/cdn-cgi/trace",
];

/// First endpoint, in order, that answers successfully.
async fn first_success<'a>(
    ctx: &ProbeContext,
    urls: &[&'a str],
) -> Option<(&'a str, FetchedResponse)> {
    for &url in urls {
        match ctx.fetcher.get(url, &RequestOptions::new()).await {
            Ok(response) if response.is_success() => return Some((url, response)),
            Ok(response) => log::debug!("[availability] {url} answered {}", response.status),
            Err(_) => {}
        }
    }
    None
}

/// Available with the endpoint that answered, or unavailable when none did.
pub async fn first_available(ctx: &ProbeContext, service: Service, urls: &[&str]) -> ProbeResult {
    match first_success(ctx, urls).await {
        Some((url, _)) => ProbeResult::available(service).with_extra("endpoint", url),
        None => ProbeResult::unavailable(service),
    }
}

pub async fn x(ctx: &ProbeContext) -> ProbeResult {
    first_available(ctx, Service::X, X_URLS).await
}

pub async fn tiktok(ctx: &ProbeContext) -> ProbeResult {
    first_available(ctx, Service::TikTok, TIKTOK_URLS).await
}

pub async fn facebook(ctx: &ProbeContext) -> ProbeResult {
    first_available(ctx, Service::Facebook, FACEBOOK_URLS).await
}

pub async fn instagram(ctx: &ProbeContext) -> ProbeResult {
    first_available(ctx, Service::Instagram, INSTAGRAM_URLS).await
}

pub async fn telegram(ctx: &ProbeContext) -> ProbeResult {
    first_available(ctx, Service::Telegram, TELEGRAM_URLS).await
}

/// Edge trace of the chat service. A reachable edge still blocks when the
/// trace says `warp=deny` or carries no client `ip`.
pub async fn openai(ctx: &ProbeContext) -> ProbeResult {
    let service = Service::OpenAI;
    let Some((url, response)) = first_success(ctx, OPENAI_TRACE_URLS).await else {
        return ProbeResult::unavailable(service);
    };

    let fields = parse_trace(&response.text());
    let country = fields
        .get("loc")
        .map(|loc| CountryCode::parse(loc))
        .unwrap_or_default();
    let denied = fields.get("warp").is_some_and(|w| w == "deny");
    let blocked = denied || !fields.contains_key("ip");

    let result = if blocked {
        ProbeResult::unavailable(service)
    } else {
        ProbeResult::available(service)
    };
    result.with_country(country).with_extra("endpoint", url)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::probe::ProbeStatus;
    use crate::probe::testing::{FakeFetcher, context, status_error};

    #[tokio::test]
    async fn later_endpoint_can_rescue_availability() {
        let fetcher = Arc::new(
            FakeFetcher::default()
                .fail(FACEBOOK_URLS[0], status_error(FACEBOOK_URLS[0], 403))
                .ok(FACEBOOK_URLS[2], "User-agent: *"),
        );
        let result = facebook(&context(fetcher.clone())).await;

        assert_eq!(result.status(), ProbeStatus::Available);
        assert_eq!(result.extra("endpoint"), Some(FACEBOOK_URLS[2]));
        assert_eq!(fetcher.calls().len(), 3);
    }

    #[tokio::test]
    async fn first_success_stops_the_scan() {
        let fetcher = Arc::new(FakeFetcher::default().ok(FACEBOOK_URLS[0], ""));
        facebook(&context(fetcher.clone())).await;
        assert_eq!(fetcher.calls(), vec![FACEBOOK_URLS[0].to_string()]);
    }

    #[tokio::test]
    async fn all_endpoints_failing_is_unavailable() {
        let result = telegram(&context(Arc::new(FakeFetcher::failing()))).await;
        assert_eq!(result.status(), ProbeStatus::Unavailable);
        assert_eq!(result.extra("endpoint"), None);
    }

    #[tokio::test]
    async fn non_success_status_is_not_availability() {
        let response = FetchedResponse::new(451, X_URLS[0], "");
        let fetcher = Arc::new(FakeFetcher::default().respond(X_URLS[0], response));
        let result = x(&context(fetcher)).await;
        assert_eq!(result.status(), ProbeStatus::Unavailable);
    }

    #[tokio::test]
    async fn chat_trace_reports_country() {
        let fetcher = Arc::new(
            FakeFetcher::default().ok(OPENAI_TRACE_URLS[0], "ip=1.2.3.4\nloc=JP\nwarp=off\n"),
        );
        let result = openai(&context(fetcher)).await;

        assert_eq!(result.status(), ProbeStatus::Available);
        assert_eq!(result.country().as_str(), "JP");
        assert_eq!(result.extra("endpoint"), Some(OPENAI_TRACE_URLS[0]));
    }

    #[tokio::test]
    async fn chat_trace_falls_back_to_second_domain() {
        let fetcher =
            Arc::new(FakeFetcher::default().ok(OPENAI_TRACE_URLS[1], "ip=1.2.3.4\nloc=SG\n"));
        let result = openai(&context(fetcher)).await;

        assert_eq!(result.country().as_str(), "SG");
        assert_eq!(result.extra("endpoint"), Some(OPENAI_TRACE_URLS[1]));
    }

    #[tokio::test]
    async fn denied_warp_blocks_even_when_reachable() {
        let fetcher = Arc::new(
            FakeFetcher::default().ok(OPENAI_TRACE_URLS[0], "ip=1.2.3.4\nloc=CN\nwarp=deny\n"),
        );
        let result = openai(&context(fetcher)).await;
        assert_eq!(result.status(), ProbeStatus::Unavailable);
    }

    #[tokio::test]
    async fn trace_without_ip_is_blocked() {
        let fetcher = Arc::new(FakeFetcher::default().ok(OPENAI_TRACE_URLS[0], "loc=US\n"));
        let result = openai(&context(fetcher)).await;
        assert_eq!(result.status(), ProbeStatus::Unavailable);
    }
}
