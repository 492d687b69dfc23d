//! Self-refreshing cache from token pairs to the pools trading them

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error};
use crate::{
    cache::{refresher::CatalogRefresher, state::CacheState},
    config::Config,
    errors::CacheResult,
    network::{PoolSource, SubgraphClient},
    types::{CacheStats, PairKey},
    utils::{tracing_warning_sink, WarningSink},
};

/// Maps an unordered token pair to the pool addresses trading it.
///
/// The catalog of top pools is loaded in the background on construction and
/// again every refresh interval. Targeted lookups fall back to their own fetch
/// on a miss and are bounded by a timeout. Every failure degrades to an empty
/// or stale answer; nothing is surfaced to the caller.
///
/// Must be constructed inside a tokio runtime. Call [`PairPoolCache::shutdown`]
/// before the runtime goes away.
pub struct PairPoolCache {
    state: Arc<CacheState>,
    refresher: CatalogRefresher,
    lookup_timeout: Duration,
}

impl PairPoolCache {
    pub fn new(source: Arc<dyn PoolSource>, config: &Config) -> Self {
        Self::with_warning_sink(source, config, tracing_warning_sink())
    }

    pub fn with_warning_sink(source: Arc<dyn PoolSource>, config: &Config, warn: WarningSink) -> Self {
        let state = Arc::new(CacheState::new(
            source,
            config.top_pools_fetched,
            config.cache_ttl,
            warn,
        ));
        let refresher = CatalogRefresher::spawn(Arc::clone(&state), config.refresh_interval);

        Self {
            state,
            refresher,
            lookup_timeout: config.lookup_timeout,
        }
    }

    /// Builds a cache backed by the subgraph configured in `config`.
    pub fn from_config(config: &Config) -> CacheResult<Self> {
        let client = SubgraphClient::from_config(config)?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// Pools for the pair, answered within the configured lookup timeout.
    pub async fn get_fresh_pools(&self, token_a: &str, token_b: &str) -> Vec<String> {
        self.get_fresh_pools_with_timeout(token_a, token_b, self.lookup_timeout).await
    }

    /// Races a targeted lookup against `timeout`, returning an empty list if the
    /// timer wins. The lookup runs as its own task and is abandoned, not
    /// cancelled: a late result still lands in the cache for the next caller.
    pub async fn get_fresh_pools_with_timeout(
        &self,
        token_a: &str,
        token_b: &str,
        timeout: Duration,
    ) -> Vec<String> {
        let state = Arc::clone(&self.state);
        let (token_a, token_b) = (token_a.to_string(), token_b.to_string());
        let started = Instant::now();

        let lookup = tokio::spawn(async move {
            state.get_and_save_fresh_pools(&token_a, &token_b).await
        });

        match tokio::time::timeout(timeout, lookup).await {
            Ok(Ok(pools)) => pools,
            Ok(Err(e)) => {
                error!("Pool lookup task failed: {}", e);
                Vec::new()
            }
            Err(_) => {
                debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Pool lookup timed out, abandoning");
                Vec::new()
            }
        }
    }

    /// Cached pools if unexpired, otherwise a fetch-and-filter with no timeout.
    pub async fn get_and_save_fresh_pools(&self, token_a: &str, token_b: &str) -> Vec<String> {
        self.state.get_and_save_fresh_pools(token_a, token_b).await
    }

    /// True when an unexpired entry exists for the pair. Never touches the network.
    pub fn is_fresh(&self, token_a: &str, token_b: &str) -> bool {
        PairKey::new(token_a, token_b)
            .ok()
            .and_then(|key| self.state.get_entry(&key))
            .is_some_and(|entry| !entry.is_expired_at(Instant::now()))
    }

    /// Cached pools for the pair, stale or not. Never touches the network.
    pub fn get_pool_addresses(&self, token_a: &str, token_b: &str) -> Vec<String> {
        PairKey::new(token_a, token_b)
            .ok()
            .and_then(|key| self.state.get_entry(&key))
            .map(|entry| entry.pools)
            .unwrap_or_default()
    }

    /// Reloads the full catalog now, outside the regular schedule.
    pub async fn refresh_catalog(&self) {
        self.state.refresh_catalog().await;
    }

    pub fn stats(&self) -> CacheStats {
        self.state.stats()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresher.is_running()
    }

    /// Stops the background refresh. Cached data stays readable. Idempotent.
    pub async fn shutdown(&self) {
        self.refresher.stop().await;
    }

    #[cfg(test)]
    pub(crate) fn insert_entry(&self, token_a: &str, token_b: &str, pools: Vec<String>, expires_at: Instant) {
        let key = PairKey::new(token_a, token_b).expect("valid test pair");
        self.state.cache_pools_for_pair(key, pools, expires_at);
    }
}
