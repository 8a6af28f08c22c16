//! Constants for the fetch module (timeouts, throttling).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large media files).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Default pre-request delay applied by site extractors.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(1000);
