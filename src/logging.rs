//! Opt-in diagnostics for the preloaded library.
//!
//! The library runs inside arbitrary host processes, so it never writes
//! anything unless [`LOG_VAR`](crate::config::LOG_VAR) asks for it.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_DIRECTIVE: &str = "overridehosts=debug";

/// Installs a stderr subscriber filtered by `filter`.
///
/// Does nothing when `filter` is `None`. A host process that already owns the
/// global subscriber keeps it.
pub fn init(filter: Option<&str>) {
    let Some(directive) = filter else {
        return;
    };

    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let result = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_env_filter(filter)
        .try_init();

    match result {
        Ok(()) => tracing::debug!(filter = %directive, "overridehosts logging enabled"),
        Err(_) => tracing::debug!("global subscriber already installed, keeping it"),
    }
}
