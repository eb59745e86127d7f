//! Log output for the binary
//!
//! Controlled by `TWIG_LOG`, an `EnvFilter` directive such as `debug` or
//! `twig::areas=trace`. Unset means `warn`. Events go to stderr so command
//! output on stdout is unaffected.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "TWIG_LOG";

const DEFAULT_FILTER: &str = "warn";

pub fn init() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // a second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
