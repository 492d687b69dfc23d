//! Pair Pool Cache - token pair to liquidity pool lookups for price routing
//!
//! Keeps an in-memory map from an unordered token pair to the pool addresses
//! trading it, filled from a subgraph catalog of the top pools by weight.
//! Routing code gets an answer within a fixed timeout even when the subgraph
//! is slow, rate limited or down.

pub mod config;
pub mod types;
pub mod errors;
pub mod network;
pub mod cache;
pub mod utils;

// Re-export commonly used items
pub use cache::{CatalogRefresher, PairPoolCache};
pub use config::{Config, CONFIG};
pub use errors::{CacheError, CacheResult};
pub use network::{PoolSource, SubgraphClient};
pub use types::*;
pub use utils::{tracing_warning_sink, WarningSink};
