//! Per-service classifiers.
//!
//! Each probe is an async function of a [`ProbeContext`] returning a
//! [`ProbeResult`]. Probes never fail: a transport failure degrades to
//! `Unknown` (or `Unavailable` where the service's own signal says so), and
//! a response that matches no known pattern is an `Unknown` verdict.

pub mod availability;
pub mod catalog;
pub mod dns_match;
mod html;
pub mod header_meta;
pub mod portal;
pub mod pricing;
pub mod result;
pub mod retail;
pub mod trace;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::sync::Arc;

use crate::config::ClassifierData;
use crate::country::CountryLookup;
use crate::decode::snapshot::SnapshotWriter;
use crate::transport::Fetcher;

pub use result::{CountryCode, ProbeResult, ProbeStatus, UNKNOWN};

/// The services probed by a run, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Service {
    Cloudflare,
    DnsMatch,
    Netflix,
    YouTube,
    Google,
    Amazon,
    DisneyPlus,
    X,
    TikTok,
    OpenAI,
    Facebook,
    Instagram,
    Telegram,
}

impl Service {
    pub const ALL: [Service; 13] = [
        Service::Cloudflare,
        Service::DnsMatch,
        Service::Netflix,
        Service::YouTube,
        Service::Google,
        Service::Amazon,
        Service::DisneyPlus,
        Service::X,
        Service::TikTok,
        Service::OpenAI,
        Service::Facebook,
        Service::Instagram,
        Service::Telegram,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Service::Cloudflare => "Cloudflare",
            Service::DnsMatch => "DNSMatch",
            Service::Netflix => "Netflix",
            Service::YouTube => "YouTube",
            Service::Google => "Google",
            Service::Amazon => "Amazon",
            Service::DisneyPlus => "DisneyPlus",
            Service::X => "X",
            Service::TikTok => "TikTok",
            Service::OpenAI => "OpenAI",
            Service::Facebook => "Facebook",
            Service::Instagram => "Instagram",
            Service::Telegram => "Telegram",
        }
    }

    /// Run this service's probe.
    pub async fn run(self, ctx: &ProbeContext) -> ProbeResult {
        match self {
            Service::Cloudflare => trace::cloudflare(ctx).await,
            Service::DnsMatch => dns_match::dns_match(ctx).await,
            Service::Netflix => catalog::netflix(ctx).await,
            Service::YouTube => pricing::youtube_premium(ctx).await,
            Service::Google => portal::google(ctx).await,
            Service::Amazon => retail::amazon(ctx).await,
            Service::DisneyPlus => header_meta::disney_plus(ctx).await,
            Service::X => availability::x(ctx).await,
            Service::TikTok => availability::tiktok(ctx).await,
            Service::OpenAI => availability::openai(ctx).await,
            Service::Facebook => availability::facebook(ctx).await,
            Service::Instagram => availability::instagram(ctx).await,
            Service::Telegram => availability::telegram(ctx).await,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Capabilities injected into every probe.
#[derive(Clone)]
pub struct ProbeContext {
    pub fetcher: Arc<dyn Fetcher>,
    pub countries: Arc<CountryLookup>,
    pub classifier: Arc<ClassifierData>,
    pub snapshots: Option<SnapshotWriter>,
}

impl ProbeContext {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            countries: Arc::new(CountryLookup::default()),
            classifier: Arc::new(ClassifierData::default()),
            snapshots: None,
        }
    }

    pub fn with_classifier(mut self, classifier: ClassifierData) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    pub fn with_snapshots(mut self, snapshots: SnapshotWriter) -> Self {
        self.snapshots = Some(snapshots);
        self
    }
}
