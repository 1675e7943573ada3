use serde::Deserialize;

/// Runtime configuration for a probing run.
/// Every field has a default, so an empty YAML document is a valid config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Per-request timeout in seconds, shared by every probe.
    pub timeout_secs: u64,

    /// Directory receiving diagnostic snapshots of decoded bodies.
    /// Stale `.txt` snapshots in it are purged at startup.
    pub work_dir: String,

    /// Size of the worker pool the scheduler runs probes on.
    pub workers: usize,

    /// Maximum number of redirect hops followed by a single fetch.
    pub max_redirects: usize,

    /// Extra attempts on connect errors and retryable statuses.
    pub max_retries: u32,

    /// Base delay for exponential retry backoff.
    pub retry_backoff_ms: u64,

    /// Server statuses that trigger a retry.
    pub retry_statuses: Vec<u16>,

    /// Phrase and currency tables used by the text classifiers.
    pub classifier: ClassifierData,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            work_dir: "/tmp/geoip_check".to_string(),
            workers: 5,
            max_redirects: 10,
            max_retries: 2,
            retry_backoff_ms: 500,
            retry_statuses: default_retry_statuses(),
            classifier: ClassifierData::default(),
        }
    }
}

fn default_retry_statuses() -> Vec<u16> {
    vec![500, 502, 503, 504]
}

/// A currency marker group: any of `markers` appearing in page text
/// attributes the page to `country`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurrencyMarker {
    pub markers: Vec<String>,
    pub country: String,
    pub region: String,
}

impl CurrencyMarker {
    fn new(markers: &[&str], country: &str, region: &str) -> Self {
        Self {
            markers: markers.iter().map(|m| m.to_string()).collect(),
            country: country.to_string(),
            region: region.to_string(),
        }
    }
}

/// Data tables consumed by the heuristic classifiers.
///
/// Entries are matched in the order given, so more specific markers
/// (`HK$`) must precede the generic ones they contain (`$`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierData {
    pub currencies: Vec<CurrencyMarker>,
    pub unavailable_phrases: Vec<String>,
    pub portal_stopwords: Vec<String>,
}

impl Default for ClassifierData {
    fn default() -> Self {
        Self {
            currencies: vec![
                CurrencyMarker::new(&["HK$", "港币", "港幣"], "HK", "Hong Kong"),
                CurrencyMarker::new(&["NT$", "新台币", "新台幣"], "TW", "Taiwan"),
                CurrencyMarker::new(&["USD", "US$", "$"], "US", "United States"),
                CurrencyMarker::new(&["円", "¥"], "JP", "Japan"),
            ],
            unavailable_phrases: [
                "not available",
                "unavailable",
                "不可用",
                "利用できません",
                "사용할 수 없음",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            portal_stopwords: [
                "about", "advertising", "business", "how search works", "privacy", "terms",
                "settings", "advertise", "store", "all", "images", "videos", "news",
                "shopping", "tools", "search", "sign in", "gmail", "more", "maps", "play",
                "youtube", "drive", "calendar", "translate", "photos", "books", "blogger",
                "contacts", "docs", "finance", "groups", "hangouts", "keep", "meet",
                "jamboard", "earth", "chrome", "arts & culture", "podcasts", "stadia", "duo",
                "messages", "collections", "forms", "ads", "developers", "press", "location",
                "account", "help", "send feedback", "learn more", "cookies",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}
