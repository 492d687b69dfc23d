//! Pair Pool Cache - service entry point
//!
//! Keeps the pool catalog warm and periodically resolves the configured watch pairs

use pair_pool_cache::*;
use anyhow::Result;
use std::time::Duration;
use tokio::time;
use tracing::{debug, info, warn};

const WATCH_INTERVAL_SECS: u64 = 30;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let config = CONFIG.clone();

    // Initialize logging
    let _logging_guard = utils::setup_logging(config.log_json)?;

    info!("🏊 Pair Pool Cache v{}", env!("CARGO_PKG_VERSION"));
    info!("📋 Configuration:");
    info!("   Subgraph: {}", config.subgraph_url.as_deref().unwrap_or("disabled"));
    info!("   Top pools fetched: {} (ordered by {})", config.top_pools_fetched, config.order_by);
    info!("   Cache TTL: {:?}", config.cache_ttl);
    info!("   Lookup timeout: {:?}", config.lookup_timeout);
    info!("   Refresh interval: {:?}", config.refresh_interval);
    info!("   Watch pairs: {}", config.watch_pairs.len());

    if config.subgraph_url.is_none() {
        warn!("⚠️  Subgraph disabled, lookups will always be empty");
    }

    let cache = PairPoolCache::from_config(&config)?;

    // Setup shutdown handler
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("\n📛 Received shutdown signal (Ctrl+C)..."),
            Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
        }
        let _ = shutdown_tx.send(());
    });

    let mut interval = time::interval(Duration::from_secs(WATCH_INTERVAL_SECS));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                run_watch_cycle(&cache, &config.watch_pairs).await;
            }
            _ = &mut shutdown_rx => {
                info!("Shutdown signal received, exiting main loop...");
                break;
            }
        }
    }

    cache.shutdown().await;
    print_final_statistics(&cache.stats());

    Ok(())
}

/// Resolve every watch pair and log cache health
async fn run_watch_cycle(cache: &PairPoolCache, watch_pairs: &[(String, String)]) {
    for (token_a, token_b) in watch_pairs {
        let was_fresh = cache.is_fresh(token_a, token_b);
        let pools = cache.get_fresh_pools(token_a, token_b).await;

        if pools.is_empty() {
            warn!("🔍 {} / {} | no pools available", token_a, token_b);
        } else {
            info!(
                "🔍 {} / {} | {} pools | {} | top: {}",
                token_a,
                token_b,
                pools.len(),
                if was_fresh { "cached" } else { "fetched" },
                pools[0]
            );
        }
    }

    let stats = cache.stats();
    info!(
        "🏥 Cache: {} pairs ({} fresh), refreshes={}, failures={}, last={}",
        stats.entries,
        stats.fresh_entries,
        stats.catalog_refreshes,
        stats.catalog_failures,
        stats
            .last_refresh
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "never".to_string())
    );

    match serde_json::to_string(&stats) {
        Ok(snapshot) => debug!(stats = %snapshot, "Cache stats snapshot"),
        Err(e) => warn!("Failed to serialize cache stats: {}", e),
    }
}

/// Print final statistics on shutdown
fn print_final_statistics(stats: &CacheStats) {
    info!("\n🛑 Shutting down gracefully...");
    info!("Final statistics:");
    info!("   Cached pairs: {}", stats.entries);
    info!("   Fresh pairs: {}", stats.fresh_entries);
    info!("   Catalog refreshes: {}", stats.catalog_refreshes);
    info!("   Catalog failures: {}", stats.catalog_failures);
}
