pub mod executor;
pub mod options;
pub mod response;

use std::fmt::Write;

pub use executor::{Fetcher, HttpExecutor, TransportSettings};
pub use options::RequestOptions;
pub use response::{FetchedResponse, RequestOutcome};

/// Flatten an error and its `source()` chain into one line, so that hyper's
/// underlying cause ("connection refused", "certificate expired") survives
/// reqwest's generic outer message.
fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, ": {}", src);
        err = src;
    }
    s
}
