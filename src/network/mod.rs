//! Upstream pool catalog access

pub mod retry;
pub mod source;
pub mod subgraph;

pub use retry::*;
pub use source::*;
pub use subgraph::*;
