//! Core data types and structures

pub mod pair;
pub mod pools;
pub mod health;

pub use pair::*;
pub use pools::*;
pub use health::*;
