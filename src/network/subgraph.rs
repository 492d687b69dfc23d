//! GraphQL subgraph client for the pool catalog

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};
use crate::{
    config::{Config, DEFAULT_ORDER_BY},
    errors::{CacheError, CacheResult},
    network::{
        retry::{retry_with_backoff, RetryConfig},
        source::PoolSource,
    },
    types::PoolRecord,
};

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<PoolsData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

// Records are decoded one by one so a single malformed pool cannot fail the batch.
#[derive(Deserialize)]
struct PoolsData {
    pools: Vec<Value>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

pub struct SubgraphClient {
    client: reqwest::Client,
    endpoint: Option<String>,
    query: String,
    retry: RetryConfig,
}

impl SubgraphClient {
    pub fn new(
        endpoint: Option<String>,
        order_by: &str,
        http_timeout: Duration,
        max_attempts: u32,
    ) -> CacheResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(http_timeout)
            .build()
            .map_err(|e| {
                warn!("⚠️ Failed to initialize HTTP client: {}", e);
                CacheError::Upstream {
                    message: "Failed to build HTTP client".to_string(),
                    source: Some(e.into()),
                    retry_count: 0,
                }
            })?;

        Ok(Self {
            client,
            endpoint,
            query: top_pools_query(order_by),
            retry: RetryConfig {
                max_attempts: max_attempts.max(1),
                initial_delay_ms: 200,
                ..Default::default()
            },
        })
    }

    pub fn from_config(config: &Config) -> CacheResult<Self> {
        Self::new(
            config.subgraph_url.clone(),
            &config.order_by,
            config.http_timeout,
            config.fetch_max_attempts,
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    async fn request_top_pools(&self, endpoint: &str, first: usize) -> anyhow::Result<Vec<PoolRecord>> {
        let body = json!({
            "query": self.query,
            "variables": { "topPoolsFetched": first },
        });

        let response = self
            .client
            .post(endpoint)
            .json(&body)
            .send()
            .await
            .context("HTTP request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Subgraph error: {} - {}", status, body));
        }

        let parsed: GraphQlResponse = response
            .json()
            .await
            .context("Failed to parse subgraph response")?;

        if !parsed.errors.is_empty() {
            let messages: Vec<&str> = parsed.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(anyhow::anyhow!("Subgraph query errors: {}", messages.join("; ")));
        }

        parsed
            .data
            .map(|data| parse_pool_records(data.pools))
            .ok_or_else(|| anyhow::anyhow!("Missing 'data.pools' in subgraph response"))
    }
}

#[async_trait]
impl PoolSource for SubgraphClient {
    async fn fetch_top_pools(&self, first: usize) -> CacheResult<Vec<PoolRecord>> {
        let Some(endpoint) = self.endpoint.as_deref() else {
            return Ok(Vec::new());
        };

        let pools = retry_with_backoff(
            || self.request_top_pools(endpoint, first),
            &self.retry,
            "subgraph top pools fetch",
        )
        .await?;

        debug!(count = pools.len(), requested = first, "Fetched top pools from subgraph");
        Ok(pools)
    }
}

fn parse_pool_records(raw: Vec<Value>) -> Vec<PoolRecord> {
    let total = raw.len();
    let records: Vec<PoolRecord> = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<PoolRecord>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "Skipping malformed pool record");
                None
            }
        })
        .collect();

    if records.len() < total {
        debug!(skipped = total - records.len(), total, "Dropped malformed pool records");
    }
    records
}

/// The ranking field is aliased to `weight` so records parse the same way
/// whichever field the subgraph orders by.
fn top_pools_query(order_by: &str) -> String {
    let field = if is_graphql_name(order_by) {
        order_by
    } else {
        warn!("Ignoring invalid pool order field {:?}, using {}", order_by, DEFAULT_ORDER_BY);
        DEFAULT_ORDER_BY
    };

    format!(
        "query ($topPoolsFetched: Int) {{ \
         pools(first: $topPoolsFetched, orderBy: {field}, orderDirection: desc) {{ \
         id tokenA {{ id decimals }} tokenB {{ id decimals }} weight: {field} }} }}"
    )
}

fn is_graphql_name(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_aliases_order_field_as_weight() {
        let query = top_pools_query("volumeUSD");
        assert!(query.contains("orderBy: volumeUSD"));
        assert!(query.contains("weight: volumeUSD"));
        assert!(query.contains("orderDirection: desc"));
    }

    #[test]
    fn invalid_order_field_falls_back_to_default() {
        let query = top_pools_query("balanceUSD } evil {");
        assert!(query.contains("orderBy: balanceUSD,"));
        assert!(!query.contains("evil"));
    }

    #[test]
    fn malformed_records_are_skipped_individually() {
        let raw = vec![
            json!({ "id": 7, "tokenA": { "id": "0xaa" }, "tokenB": { "id": "0xbb" } }),
            json!({ "id": "0x01", "tokenA": { "id": "0xaa", "decimals": null } }),
            json!({ "id": "0x02", "tokenA": { "id": "0xaa" }, "tokenB": { "id": "0xbb" }, "weight": "1e40" }),
        ];
        let records = parse_pool_records(raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "0x02");
        assert_eq!(records[0].weight, None);
    }

    #[tokio::test]
    async fn disabled_endpoint_returns_no_pools() {
        let client = SubgraphClient::new(None, "balanceUSD", Duration::from_secs(1), 1).unwrap();
        assert!(!client.is_enabled());
        assert!(client.fetch_top_pools(250).await.unwrap().is_empty());
    }
}
