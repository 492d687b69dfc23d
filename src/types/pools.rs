//! Upstream pool records and cache entries

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;
use tokio::time::Instant;

/// A pool as returned by the indexing service.
///
/// Only the addresses are load-bearing. `weight` and `decimals` are kept when
/// they parse and are `None` otherwise, so an out-of-range ranking value never
/// costs the record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRecord {
    pub id: String,
    pub token_a: TokenRef,
    pub token_b: TokenRef,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub weight: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenRef {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_decimals")]
    pub decimals: Option<u8>,
}

// Subgraphs serialize BigDecimal as strings; values beyond Decimal::MAX or in
// scientific notation that does not fit are dropped.
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let parse = |s: &str| {
        let s = s.trim();
        Decimal::from_str(s).or_else(|_| Decimal::from_scientific(s)).ok()
    };

    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => parse(&s),
        Value::Number(n) => parse(&n.to_string()),
        _ => None,
    })
}

// BigInt fields arrive as strings from subgraphs and as numbers from fixtures.
fn lenient_decimals<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Pool addresses known for one pair, valid until `expires_at`.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub pools: Vec<String>,
    pub expires_at: Instant,
}

impl CacheEntry {
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
