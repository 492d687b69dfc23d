//! Cache health snapshot

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub fresh_entries: usize,
    pub catalog_refreshes: u64,
    pub catalog_failures: u64,
    pub last_refresh: Option<DateTime<Utc>>,
}
