//! Warning sink used by the cache to report degraded lookups

use std::error::Error;
use std::sync::Arc;
use tracing::warn;
use crate::errors::CacheError;

/// Receives every error the cache swallows, with a short description of what failed.
pub type WarningSink = Arc<dyn Fn(&CacheError, &str) + Send + Sync>;

pub fn tracing_warning_sink() -> WarningSink {
    Arc::new(|err: &CacheError, context: &str| {
        warn!(kind = err.kind(), error = %error_chain(err), "⚠️ {}", context);
    })
}

/// Renders an error and all of its sources as `outer: inner: root`.
pub fn error_chain(err: &(dyn Error + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_includes_sources() {
        let err = CacheError::Upstream {
            message: "catalog fetch failed".to_string(),
            source: Some(anyhow::anyhow!("connection refused")),
            retry_count: 2,
        };
        assert_eq!(
            error_chain(&err),
            "Upstream error: catalog fetch failed: connection refused"
        );
    }
}
