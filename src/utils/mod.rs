//! Utility functions and helpers

pub mod logging;
pub mod warnings;

pub use logging::*;
pub use warnings::*;
