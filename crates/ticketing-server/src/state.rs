use std::sync::{Arc, Mutex};

use ticketing_core::clock::Clock;
use ticketing_core::{Error, Result};
use ticketing_store::Store;

/// Shared handler state: one SQLite connection behind a mutex plus the clock
/// used for every date rule.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<Store>>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            clock,
        }
    }

    /// Run blocking store work, including its audit appends, off the async
    /// executor.
    pub async fn with_store<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Store, &dyn Clock) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let clock = Arc::clone(&self.clock);
        tokio::task::spawn_blocking(move || {
            let mut guard = store
                .lock()
                .map_err(|_| Error::Storage("store lock poisoned".to_string()))?;
            f(&mut guard, clock.as_ref())
        })
        .await
        .map_err(|e| Error::Storage(format!("store task failed: {}", e)))?
    }
}
