use std::collections::BTreeMap;
use std::fmt;

use super::Service;

/// Placeholder for any field a probe could not determine.
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeStatus {
    Available,
    Unavailable,
    Unknown,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProbeStatus::Available => "Available",
            ProbeStatus::Unavailable => "Not Available",
            ProbeStatus::Unknown => UNKNOWN,
        };
        f.write_str(s)
    }
}

/// An ISO 3166-1 alpha-2 code, or unknown.
///
/// The only way to obtain a known code is [`CountryCode::parse`], which
/// accepts exactly two ASCII letters and uppercases them, so a known code is
/// never empty or lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CountryCode(Option<String>);

impl CountryCode {
    pub fn unknown() -> Self {
        Self(None)
    }

    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.len() == 2 && raw.chars().all(|c| c.is_ascii_alphabetic()) {
            Self(Some(raw.to_ascii_uppercase()))
        } else {
            Self(None)
        }
    }

    pub fn is_known(&self) -> bool {
        self.0.is_some()
    }

    /// The code, or `"Unknown"`.
    pub fn as_str(&self) -> &str {
        self.0.as_deref().unwrap_or(UNKNOWN)
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The verdict of one probe run. Built once by the probe, read-only after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    service: Service,
    status: ProbeStatus,
    country: CountryCode,
    region: String,
    extra: BTreeMap<String, String>,
}

impl ProbeResult {
    pub fn new(service: Service, status: ProbeStatus) -> Self {
        Self {
            service,
            status,
            country: CountryCode::unknown(),
            region: UNKNOWN.to_string(),
            extra: BTreeMap::new(),
        }
    }

    pub fn available(service: Service) -> Self {
        Self::new(service, ProbeStatus::Available)
    }

    pub fn unavailable(service: Service) -> Self {
        Self::new(service, ProbeStatus::Unavailable)
    }

    pub fn unknown(service: Service) -> Self {
        Self::new(service, ProbeStatus::Unknown)
    }

    pub fn with_country(mut self, country: CountryCode) -> Self {
        self.country = country;
        self
    }

    /// Set the region; blank values keep `"Unknown"`.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        let region = region.into();
        if !region.trim().is_empty() {
            self.region = region.trim().to_string();
        }
        self
    }

    pub fn with_extra(mut self, key: &str, value: impl Into<String>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn status(&self) -> ProbeStatus {
        self.status
    }

    pub fn is_available(&self) -> bool {
        self.status == ProbeStatus::Available
    }

    pub fn country(&self) -> &CountryCode {
        &self.country
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }

    pub fn extras(&self) -> &BTreeMap<String, String> {
        &self.extra
    }
}
