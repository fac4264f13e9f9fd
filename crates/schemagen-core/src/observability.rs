//! Logging setup and spans for schemagen runs.
//!
//! Progress and outcomes are reported through `tracing` only; there is no
//! other report channel.

use std::path::Path;
use std::sync::Once;

use tracing::Span;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logs, one object per line.
    Json,
    /// Human-readable logs.
    #[default]
    Pretty,
}

/// Initializes the logging subsystem.
///
/// Safe to call more than once; only the first call installs a subscriber.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Controls log levels (default `info`, e.g. `schemagen_core=debug`)
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        match format {
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().json())
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().with_target(false))
                    .init();
            }
        }
    });
}

/// Span covering one generator run.
#[must_use]
pub fn generator_span(project_dir: &Path) -> Span {
    tracing::info_span!("schemagen", project_dir = %project_dir.display())
}

/// Span covering the work on a single catalog entry.
#[must_use]
pub fn model_span(unique_id: &str) -> Span {
    tracing::debug_span!("model", unique_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(LogFormat::Pretty);
        init_logging(LogFormat::Json);
    }

    #[test]
    fn test_spans_can_be_entered() {
        let span = generator_span(Path::new("/app/dbt_transform"));
        let _guard = span.enter();
        let inner = model_span("model.transform.orders");
        let _inner = inner.enter();
        tracing::info!("message inside spans");
    }
}
