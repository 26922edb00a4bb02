//! Tracing setup.
//!
//! Structured JSON (bunyan) logs to stderr, filtered by `RUST_LOG`
//! (default `info`). Stdout stays free for the CLI's own output.

use tracing::subscriber::{set_global_default, SetGlobalDefaultError};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_tracing(name: &str) -> Result<(), SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let formatting_layer = BunyanFormattingLayer::new(name.to_string(), std::io::stderr);

    let subscriber = Registry::default()
        .with(filter)
        .with(JsonStorageLayer)
        .with(formatting_layer);

    set_global_default(subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        // Another test may have installed a subscriber first; either way the
        // second call in this test must be rejected.
        let _ = init_tracing("syntropy-test");
        assert!(init_tracing("syntropy-test").is_err());
    }
}
