//! Pair to pool lookup cache with background refresh

mod state;
pub mod refresher;
pub mod pair_pool_cache;

pub use refresher::*;
pub use pair_pool_cache::*;
