//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use pair_pool_cache::{CacheError, CacheResult, PoolRecord, PoolSource, TokenRef, WarningSink};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const X: &str = "0x1111111111111111111111111111111111111111";
pub const Y: &str = "0x2222222222222222222222222222222222222222";
pub const Z: &str = "0x3333333333333333333333333333333333333333";
pub const P1: &str = "0x00000000000000000000000000000000000000a1";
pub const P2: &str = "0x00000000000000000000000000000000000000b2";
pub const P3: &str = "0x00000000000000000000000000000000000000c3";

#[derive(Clone)]
pub enum Mode {
    Pools(Vec<PoolRecord>),
    Fail,
    Hang,
}

/// Pool source stub that counts fetches and answers according to its mode.
pub struct StubSource {
    mode: Mutex<Mode>,
    delay: Duration,
    calls: AtomicUsize,
}

impl StubSource {
    pub fn new(mode: Mode) -> Arc<Self> {
        Self::with_delay(mode, Duration::ZERO)
    }

    pub fn with_delay(mode: Mode, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            mode: Mutex::new(mode),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set_mode(&self, mode: Mode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PoolSource for StubSource {
    async fn fetch_top_pools(&self, first: usize) -> CacheResult<Vec<PoolRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mode = self.mode.lock().unwrap().clone();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match mode {
            Mode::Pools(pools) => Ok(pools.into_iter().take(first).collect()),
            Mode::Fail => Err(CacheError::upstream("stub failure")),
            Mode::Hang => std::future::pending().await,
        }
    }
}

pub fn pool(id: &str, token_a: &str, token_b: &str) -> PoolRecord {
    PoolRecord {
        id: id.to_string(),
        token_a: TokenRef { id: token_a.to_string(), decimals: Some(18) },
        token_b: TokenRef { id: token_b.to_string(), decimals: Some(18) },
        weight: Some(Decimal::ONE),
    }
}

/// Warning sink that only counts invocations.
pub fn counting_sink() -> (WarningSink, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    let sink: WarningSink = Arc::new(move |_: &CacheError, _: &str| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    (sink, count)
}

/// Lets spawned tasks (the initial catalog refresh) run under a paused clock.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
