//! Error types for the pair pool cache

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Upstream error: {message}")]
    Upstream {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        retry_count: u32,
    },

    #[error("Invalid token address {input:?}: {reason}")]
    InvalidAddress {
        input: String,
        reason: String,
    },
}

impl CacheError {
    pub fn upstream(message: impl Into<String>) -> Self {
        CacheError::Upstream {
            message: message.into(),
            source: None,
            retry_count: 0,
        }
    }

    /// Short label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            CacheError::Upstream { .. } => "upstream",
            CacheError::InvalidAddress { .. } => "invalid_address",
        }
    }
}

pub type CacheResult<T> = Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_labels() {
        assert_eq!(CacheError::upstream("boom").kind(), "upstream");
        let err = CacheError::InvalidAddress {
            input: "0xzz".to_string(),
            reason: "invalid character".to_string(),
        };
        assert_eq!(err.kind(), "invalid_address");
        assert!(err.to_string().contains("0xzz"));
    }
}
