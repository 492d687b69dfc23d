//! Shared cache store and the fetch paths that populate it

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};
use crate::{
    errors::{CacheError, CacheResult},
    network::PoolSource,
    types::{canonicalize, CacheEntry, CacheStats, PairKey, PoolRecord},
    utils::WarningSink,
};

pub(crate) struct CacheState {
    store: DashMap<PairKey, CacheEntry>,
    source: Arc<dyn PoolSource>,
    top_pools_fetched: usize,
    cache_ttl: Duration,
    warn: WarningSink,
    catalog_refreshes: AtomicU64,
    catalog_failures: AtomicU64,
    last_refresh: RwLock<Option<DateTime<Utc>>>,
}

impl CacheState {
    pub(crate) fn new(
        source: Arc<dyn PoolSource>,
        top_pools_fetched: usize,
        cache_ttl: Duration,
        warn: WarningSink,
    ) -> Self {
        Self {
            store: DashMap::new(),
            source,
            top_pools_fetched,
            cache_ttl,
            warn,
            catalog_refreshes: AtomicU64::new(0),
            catalog_failures: AtomicU64::new(0),
            last_refresh: RwLock::new(None),
        }
    }

    /// Reloads the top pools and upserts an entry for every pair in the batch.
    /// Pairs absent from the batch keep their previous entry and expiry.
    pub(crate) async fn refresh_catalog(&self) {
        let pools = match self.source.fetch_top_pools(self.top_pools_fetched).await {
            Ok(pools) => pools,
            Err(e) => {
                self.catalog_failures.fetch_add(1, Ordering::Relaxed);
                self.report(&e, "Failed to fetch top pools for catalog refresh");
                return;
            }
        };

        let mut by_pair: HashMap<PairKey, Vec<String>> = HashMap::new();
        let mut skipped = 0usize;
        for pool in &pools {
            match pool_entry(pool) {
                Ok((key, address)) => by_pair.entry(key).or_default().push(address),
                Err(e) => {
                    skipped += 1;
                    debug!(pool = %pool.id, error = %e, "Skipping pool with malformed addresses");
                }
            }
        }

        let pairs = by_pair.len();
        let expires_at = Instant::now() + self.cache_ttl;
        for (key, addresses) in by_pair {
            self.cache_pools_for_pair(key, addresses, expires_at);
        }

        self.catalog_refreshes.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_refresh.write() {
            *last = Some(Utc::now());
        }
        info!(pools = pools.len(), pairs, skipped, "🔄 Refreshed pool catalog");
    }

    /// Serves unexpired entries from the store; otherwise fetches, filters and
    /// caches the pools for this pair. Failures degrade to an empty list and
    /// are never cached.
    pub(crate) async fn get_and_save_fresh_pools(&self, token_a: &str, token_b: &str) -> Vec<String> {
        match self.lookup_pair(token_a, token_b).await {
            Ok(pools) => pools,
            Err(e) => {
                let context = match &e {
                    CacheError::Upstream { .. } => "Failed to fetch top pools for pair lookup",
                    CacheError::InvalidAddress { .. } => "Failed to normalize token pair",
                };
                self.report(&e, context);
                Vec::new()
            }
        }
    }

    async fn lookup_pair(&self, token_a: &str, token_b: &str) -> CacheResult<Vec<String>> {
        let key = PairKey::new(token_a, token_b)?;
        if let Some(pools) = self.fresh_pools(&key) {
            return Ok(pools);
        }

        let pools = self.fetch_pools_for_pair(key).await?;
        let expires_at = Instant::now() + self.cache_ttl;
        self.cache_pools_for_pair(key, pools.clone(), expires_at);
        debug!(pair = %key, count = pools.len(), "Cached pools for pair");
        Ok(pools)
    }

    async fn fetch_pools_for_pair(&self, key: PairKey) -> CacheResult<Vec<String>> {
        let pools = self.source.fetch_top_pools(self.top_pools_fetched).await?;

        Ok(pools
            .iter()
            .filter_map(|pool| match pool_entry(pool) {
                Ok((pool_key, address)) if pool_key == key => Some(address),
                Ok(_) => None,
                Err(e) => {
                    debug!(pool = %pool.id, error = %e, "Skipping pool with malformed addresses");
                    None
                }
            })
            .collect())
    }

    pub(crate) fn get_entry(&self, key: &PairKey) -> Option<CacheEntry> {
        self.store.get(key).map(|entry| entry.value().clone())
    }

    fn fresh_pools(&self, key: &PairKey) -> Option<Vec<String>> {
        self.get_entry(key)
            .filter(|entry| !entry.is_expired_at(Instant::now()))
            .map(|entry| entry.pools)
    }

    pub(crate) fn cache_pools_for_pair(&self, key: PairKey, pools: Vec<String>, expires_at: Instant) {
        self.store.insert(key, CacheEntry { pools, expires_at });
    }

    pub(crate) fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let fresh_entries = self
            .store
            .iter()
            .filter(|entry| !entry.value().is_expired_at(now))
            .count();

        CacheStats {
            entries: self.store.len(),
            fresh_entries,
            catalog_refreshes: self.catalog_refreshes.load(Ordering::Relaxed),
            catalog_failures: self.catalog_failures.load(Ordering::Relaxed),
            last_refresh: self.last_refresh.read().ok().and_then(|last| *last),
        }
    }

    fn report(&self, err: &CacheError, context: &str) {
        (self.warn)(err, context);
    }
}

/// Pair key and canonical pool address for one upstream record.
fn pool_entry(pool: &PoolRecord) -> CacheResult<(PairKey, String)> {
    let key = PairKey::new(&pool.token_a.id, &pool.token_b.id)?;
    let address = canonicalize(&pool.id)?;
    Ok((key, address))
}
