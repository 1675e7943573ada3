use crate::config::{ClassifierData, CurrencyMarker};
use crate::transport::RequestOptions;

use super::html::{script_text, visible_text};
use super::{CountryCode, ProbeContext, ProbeResult, Service};

pub const YOUTUBE_PREMIUM_URL: &str = "https://www.youtube.com/premium";

/// First currency group, in table order, with a marker present in `text`,
/// together with the marker that hit.
pub fn find_currency<'a>(
    data: &'a ClassifierData,
    text: &str,
) -> Option<(&'a CurrencyMarker, &'a str)> {
    data.currencies.iter().find_map(|group| {
        group
            .markers
            .iter()
            .find(|m| !m.is_empty() && text.contains(m.as_str()))
            .map(|m| (group, m.as_str()))
    })
}

/// Like [`find_currency`], but a marker only counts when a digit sits
/// directly before or after it (spaces allowed), as in `$13.99` or
/// `1,280 円`. Used on embedded script data, where bare `$` is code.
pub fn find_price<'a>(
    data: &'a ClassifierData,
    text: &str,
) -> Option<(&'a CurrencyMarker, &'a str)> {
    data.currencies.iter().find_map(|group| {
        group
            .markers
            .iter()
            .find(|m| !m.is_empty() && has_priced_marker(text, m))
            .map(|m| (group, m.as_str()))
    })
}

fn has_priced_marker(text: &str, marker: &str) -> bool {
    text.match_indices(marker).any(|(at, _)| {
        let before = text[..at].trim_end_matches(' ').chars().next_back();
        let after = text[at + marker.len()..]
            .trim_start_matches(' ')
            .chars()
            .next();
        before.is_some_and(|c| c.is_ascii_digit())
            || after.is_some_and(|c| c.is_ascii_digit())
    })
}

/// Whether `text` carries a localized "not available here" phrase.
pub fn mentions_unavailable(data: &ClassifierData, text: &str) -> bool {
    let lowered = text.to_lowercase();
    data.unavailable_phrases
        .iter()
        .any(|p| !p.is_empty() && lowered.contains(&p.to_lowercase()))
}

/// Subscription region from the currency the pricing page is shown in.
pub async fn youtube_premium(ctx: &ProbeContext) -> ProbeResult {
    let service = Service::YouTube;
    let Ok(response) = ctx
        .fetcher
        .get(YOUTUBE_PREMIUM_URL, &RequestOptions::new())
        .await
    else {
        return ProbeResult::unknown(service);
    };

    let html = response.text();
    let text = visible_text(&html);

    let hit = find_currency(&ctx.classifier, &text)
        .or_else(|| find_price(&ctx.classifier, &script_text(&html)));
    if let Some((group, marker)) = hit {
        return ProbeResult::available(service)
            .with_country(CountryCode::parse(&group.country))
            .with_region(group.region.as_str())
            .with_extra("marker", marker);
    }
    if mentions_unavailable(&ctx.classifier, &text) {
        return ProbeResult::unavailable(service).with_region("Blocked");
    }
    ProbeResult::available(service)
}
