use crate::transport::RequestOptions;

use super::{CountryCode, ProbeContext, ProbeResult, Service};

pub const DISNEY_PLUS_URL: &str = "https://www.disneyplus.com/";
pub const PHYSICAL_LOCATION_HEADER: &str = "physical-location";

/// Country part of a location value such as `US`, `jp-13` or `GB_ENG`.
pub fn country_of_location(value: &str) -> CountryCode {
    value
        .split(['-', '_'])
        .next()
        .map(CountryCode::parse)
        .unwrap_or_default()
}

/// Region as reported by the edge in a response header.
pub async fn disney_plus(ctx: &ProbeContext) -> ProbeResult {
    let service = Service::DisneyPlus;
    let Ok(response) = ctx
        .fetcher
        .get(DISNEY_PLUS_URL, &RequestOptions::new())
        .await
    else {
        return ProbeResult::unknown(service);
    };

    match response
        .header(PHYSICAL_LOCATION_HEADER)
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        Some(location) => ProbeResult::available(service)
            .with_country(country_of_location(location))
            .with_region(location)
            .with_extra("physical_location", location),
        None => ProbeResult::available(service),
    }
}
