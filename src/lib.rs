//! Concurrent probing of where a connection appears to egress from, and
//! of which third-party services are reachable and in what region.

pub mod config;
pub mod country;
pub mod decode;
pub mod error;
pub mod probe;
pub mod scheduler;
pub mod transport;

use std::sync::Arc;

use config::CheckerConfig;
use decode::snapshot::SnapshotWriter;
use error::ConfigError;
use probe::ProbeContext;
use transport::{HttpExecutor, TransportSettings};

pub use probe::{CountryCode, ProbeResult, ProbeStatus, Service};
pub use scheduler::{ResultSet, run_all};

/// Build the shared probe capabilities from `config`.
///
/// Allocating the snapshot directory and constructing the HTTP client are
/// the only fatal steps of a run.
pub fn build_context(config: &CheckerConfig) -> Result<ProbeContext, ConfigError> {
    let snapshots = SnapshotWriter::new(&config.work_dir)?;
    let executor = HttpExecutor::new(TransportSettings::from(config))?;

    Ok(ProbeContext::new(Arc::new(executor))
        .with_classifier(config.classifier.clone())
        .with_snapshots(snapshots))
}
