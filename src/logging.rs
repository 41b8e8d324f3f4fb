use std::io;

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `JOBSCAN_LOG` overrides the level filter.
pub fn configure_logging(verbose: bool) {
    let default_filter = if verbose { "jobscan=debug" } else { "jobscan=warn" };
    let filter = EnvFilter::try_from_env("JOBSCAN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let stderr_log = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(filter);

    // A second call (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry().with(stderr_log).try_init();
}
