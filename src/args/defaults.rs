use std::time::Duration;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("urlprobe/", env!("CARGO_PKG_VERSION"));

/// Tasks per group when nothing else is configured.
pub(crate) const DEFAULT_CONCURRENCY: usize = 5;
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
