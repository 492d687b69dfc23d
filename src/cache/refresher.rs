//! Background catalog refresh task

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};
use super::state::CacheState;

/// Handle to the task that reloads the pool catalog every `interval`.
///
/// The first reload starts immediately. `stop` ends the loop and waits for it;
/// dropping the handle without stopping aborts the task.
pub struct CatalogRefresher {
    shutdown_tx: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl CatalogRefresher {
    pub(crate) fn spawn(state: Arc<CacheState>, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                // An in-flight refresh is dropped on shutdown; it never holds
                // a partially written entry across an await.
                tokio::select! {
                    _ = async {
                        ticker.tick().await;
                        state.refresh_catalog().await;
                    } => {}
                    _ = shutdown_rx.changed() => {
                        info!("🛑 Catalog refresher stopping");
                        break;
                    }
                }
            }
        });

        Self {
            shutdown_tx,
            handle: Mutex::new(Some(handle)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .map(|handle| handle.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    pub async fn stop(&self) {
        let _ = self.shutdown_tx.send(true);

        let handle = self.handle.lock().ok().and_then(|mut handle| handle.take());
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!("Catalog refresher ended abnormally: {}", e);
                }
            }
        }
    }
}

impl Drop for CatalogRefresher {
    fn drop(&mut self) {
        if let Ok(mut handle) = self.handle.lock() {
            if let Some(handle) = handle.take() {
                handle.abort();
            }
        }
    }
}
