//! Error taxonomy for upstream and address failures

pub mod cache_error;

pub use cache_error::*;
