//! Address canonicalization and order-independent pair keys

use alloy::primitives::Address;
use std::fmt;
use std::str::FromStr;
use crate::errors::{CacheError, CacheResult};

/// Parses a token or pool identifier into an address, accepting any hex case
/// with or without the `0x` prefix.
pub fn parse_address(input: &str) -> CacheResult<Address> {
    Address::from_str(input.trim()).map_err(|e| CacheError::InvalidAddress {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// EIP-55 checksummed form of an address string.
pub fn canonicalize(input: &str) -> CacheResult<String> {
    parse_address(input).map(|address| address.to_checksum(None))
}

/// Unordered token pair. The lesser address (numeric order) always comes first,
/// so `PairKey::new(a, b) == PairKey::new(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    lesser: Address,
    greater: Address,
}

impl PairKey {
    pub fn new(token_a: &str, token_b: &str) -> CacheResult<Self> {
        Ok(Self::from_addresses(parse_address(token_a)?, parse_address(token_b)?))
    }

    pub fn from_addresses(a: Address, b: Address) -> Self {
        if a <= b {
            Self { lesser: a, greater: b }
        } else {
            Self { lesser: b, greater: a }
        }
    }

    pub fn lesser(&self) -> Address {
        self.lesser
    }

    pub fn greater(&self) -> Address {
        self.greater
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.lesser.to_checksum(None),
            self.greater.to_checksum(None)
        )
    }
}

/// Canonical `"<lesser>-<greater>"` key for two token addresses.
pub fn normalize_key(token_a: &str, token_b: &str) -> CacheResult<String> {
    PairKey::new(token_a, token_b).map(|key| key.to_string())
}
