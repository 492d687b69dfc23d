//! Upstream pool catalog abstraction

use async_trait::async_trait;
use crate::{errors::CacheResult, types::PoolRecord};

/// Read-only source of the top pools ranked by weight, descending.
///
/// Implementations may return fewer than `first` records. Any transport,
/// status or schema failure is reported as an error; the cache decides how
/// to degrade.
#[async_trait]
pub trait PoolSource: Send + Sync {
    async fn fetch_top_pools(&self, first: usize) -> CacheResult<Vec<PoolRecord>>;
}
