use thiserror::Error;

/// Why a request produced no usable response.
///
/// Every variant is a transport-level failure from the point of view of a
/// probe: it is surfaced as the `Err` side of a `RequestOutcome`, never raised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection, timeout or TLS failure.
    #[error("request to {url} failed: {detail}")]
    Network { url: String, detail: String },

    /// The final hop answered with a non-2xx, non-redirect status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("redirect limit of {limit} hops exceeded at {url}")]
    TooManyRedirects { url: String, limit: usize },

    #[error("{url} answered HTTP {status} without a usable Location header")]
    MissingLocation { url: String, status: u16 },

    #[error("invalid url {url}: {detail}")]
    InvalidUrl { url: String, detail: String },

    #[error("failed to read body from {url}: {detail}")]
    Body { url: String, detail: String },
}

impl FetchError {
    /// HTTP status carried by a `Status` failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Startup failures. These are the only errors fatal to a run.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("cannot prepare working directory {path}: {source}")]
    WorkDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Transport(String),
}
