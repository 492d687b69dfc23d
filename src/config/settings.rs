//! Cache configuration and environment variable handling

use std::env;
use std::time::Duration;

// Configuration constants
pub const MAVERICK_V1_SUBGRAPH_URL: &str =
    "https://api.thegraph.com/subgraphs/name/maverickprotocol/maverick-mainnet";
pub const DEFAULT_TOP_POOLS_FETCHED: usize = 250;
pub const MAX_TOP_POOLS_FETCHED: usize = 1000;
pub const DEFAULT_ORDER_BY: &str = "balanceUSD";
pub const DEFAULT_CACHE_TTL_MS: u64 = 30 * 60 * 1000; // 30 minutes
pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 12 * 60 * 60; // twice a day
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_FETCH_MAX_ATTEMPTS: u32 = 2;
pub const MAX_FETCH_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` disables the upstream: every catalog fetch yields no pools.
    pub subgraph_url: Option<String>,
    pub top_pools_fetched: usize,
    pub order_by: String,
    pub cache_ttl: Duration,
    pub lookup_timeout: Duration,
    pub refresh_interval: Duration,
    pub http_timeout: Duration,
    pub fetch_max_attempts: u32,
    // Service binary only
    pub watch_pairs: Vec<(String, String)>,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subgraph_url: Some(MAVERICK_V1_SUBGRAPH_URL.to_string()),
            top_pools_fetched: DEFAULT_TOP_POOLS_FETCHED,
            order_by: DEFAULT_ORDER_BY.to_string(),
            cache_ttl: Duration::from_millis(DEFAULT_CACHE_TTL_MS),
            lookup_timeout: Duration::from_millis(DEFAULT_LOOKUP_TIMEOUT_MS),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            fetch_max_attempts: DEFAULT_FETCH_MAX_ATTEMPTS,
            watch_pairs: Vec::new(),
            log_json: false,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Self {
            subgraph_url: parse_subgraph_url(env::var("SUBGRAPH_URL").ok()),
            top_pools_fetched: env::var("TOP_POOLS_FETCHED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TOP_POOLS_FETCHED)
                .clamp(1, MAX_TOP_POOLS_FETCHED),
            order_by: env::var("POOL_ORDER_FIELD")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ORDER_BY.to_string()),
            cache_ttl: Duration::from_millis(
                env::var("CACHE_TTL_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_CACHE_TTL_MS)
                    .max(1),
            ),
            lookup_timeout: Duration::from_millis(
                env::var("LOOKUP_TIMEOUT_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_LOOKUP_TIMEOUT_MS),
            ),
            refresh_interval: Duration::from_secs(
                env::var("REFRESH_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_REFRESH_INTERVAL_SECS)
                    .max(1), // tokio intervals panic on zero
            ),
            http_timeout: Duration::from_secs(
                env::var("HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
                    .max(1),
            ),
            fetch_max_attempts: env::var("FETCH_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_FETCH_MAX_ATTEMPTS)
                .clamp(1, MAX_FETCH_ATTEMPTS),
            watch_pairs: env::var("WATCH_PAIRS")
                .map(|s| parse_watch_pairs(&s))
                .unwrap_or_default(),
            log_json: env::var("LOG_JSON")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        }
    }
}

fn parse_subgraph_url(value: Option<String>) -> Option<String> {
    match value {
        None => Some(MAVERICK_V1_SUBGRAPH_URL.to_string()),
        Some(s) => {
            let s = s.trim();
            if s.is_empty() || s.eq_ignore_ascii_case("disabled") {
                None
            } else {
                Some(s.to_string())
            }
        }
    }
}

/// Parses `tokenA:tokenB,tokenC:tokenD`. Malformed items are skipped.
pub fn parse_watch_pairs(value: &str) -> Vec<(String, String)> {
    value
        .split(',')
        .filter_map(|item| {
            let (a, b) = item.split_once(':')?;
            let (a, b) = (a.trim(), b.trim());
            if a.is_empty() || b.is_empty() {
                None
            } else {
                Some((a.to_string(), b.to_string()))
            }
        })
        .collect()
}
