//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Filter used when neither `--log-level` nor `EPI_LOG` is given.
pub const DEFAULT_FILTER: &str = "warn";

/// Install a stderr fmt subscriber filtered by `directive`.
///
/// An unparsable directive falls back to [`DEFAULT_FILTER`]. Calling this
/// twice is harmless: the second install is ignored.
pub fn init(directive: Option<&str>) {
    let filter = directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false);

    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}
