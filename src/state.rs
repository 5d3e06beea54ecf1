use std::{path::Path, sync::Arc};

use anyhow::Result;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::db::Db;

// === App State ===
#[derive(Debug, Clone)]
pub struct AppState {
    state: Arc<RwLock<Db>>,
    trust_proxy_headers: bool,
}
impl AppState {
    pub fn new(db: Db) -> Self {
        Self {
            state: Arc::new(RwLock::new(db)),
            trust_proxy_headers: false,
        }
    }
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Db::open(path)?))
    }
    pub fn temporary() -> Result<Self> {
        Ok(Self::new(Db::temporary()?))
    }

    pub fn with_trusted_proxy(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }
    pub fn trusts_proxy_headers(&self) -> bool {
        self.trust_proxy_headers
    }

    // borrow immutable state
    pub async fn read(&self) -> RwLockReadGuard<'_, Db> {
        self.state.read().await
    }
    // borrow mutable state; serializes read-modify-write updates
    pub async fn write(&self) -> RwLockWriteGuard<'_, Db> {
        self.state.write().await
    }
}
