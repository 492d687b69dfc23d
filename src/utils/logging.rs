//! Logging setup and configuration

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_DIR: &str = "output/logs";
const LOG_FILE: &str = "pair-pool-cache.log";

pub struct LoggingGuard {
    pub _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Console output plus an hourly rolling file under [`LOG_DIR`].
/// With `json_file` the file gets one JSON object per event instead of compact text.
pub fn setup_logging(json_file: bool) -> Result<Arc<LoggingGuard>> {
    std::fs::create_dir_all(LOG_DIR)?;

    let file_appender = tracing_appender::rolling::hourly(LOG_DIR, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let (json_layer, text_layer) = if json_file {
        let layer = fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_current_span(false);
        (Some(layer), None)
    } else {
        let layer = fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_ansi(false)
            .compact();
        (None, Some(layer))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_ansi(true)
        )
        .with(json_layer)
        .with(text_layer)
        .with(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    Ok(Arc::new(LoggingGuard { _guard: guard }))
}
