// 🔄 Atlas Store
// Holds the current snapshot and swaps in a fresh one on reload.
//
// Readers clone the `Arc` and keep using it for as long as they like; a
// reload builds the new snapshot without holding the read/write lock, so
// a reader never sees a half-merged table. Reloads themselves run one at
// a time, so an older build can never replace a newer one.

use crate::config::AtlasConfig;
use crate::error::AtlasResult;
use crate::pipeline;
use crate::query::Snapshot;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use tracing::info;

pub struct AtlasStore {
    config: AtlasConfig,
    current: RwLock<Arc<Snapshot>>,
    reload_lock: Mutex<()>,
}

impl AtlasStore {
    /// Load the initial snapshot. Fails if the master source is missing.
    pub fn load(config: AtlasConfig) -> AtlasResult<Self> {
        let snapshot = pipeline::load(&config)?;
        Ok(AtlasStore::new(config, snapshot))
    }

    pub fn new(config: AtlasConfig, snapshot: Snapshot) -> Self {
        AtlasStore {
            config,
            current: RwLock::new(Arc::new(snapshot)),
            reload_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        // A poisoned lock still guards a complete Arc; the swap is one store.
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    fn swap(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let fresh = Arc::new(snapshot);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::clone(&fresh);
        fresh
    }

    fn lock_reload(&self) -> MutexGuard<'_, ()> {
        match self.reload_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Load and swap; caller holds `reload_lock`.
    fn rebuild(&self) -> AtlasResult<Arc<Snapshot>> {
        let snapshot = pipeline::load(&self.config)?;
        info!(id = %snapshot.id(), regions = snapshot.len(), "snapshot reloaded");
        Ok(self.swap(snapshot))
    }

    /// Rebuild from the sources and swap. On failure the current snapshot
    /// stays in place.
    pub fn reload(&self) -> AtlasResult<Arc<Snapshot>> {
        let _guard = self.lock_reload();
        self.rebuild()
    }

    /// Reload only when the source fingerprint changed. Returns the new
    /// snapshot, or `None` when nothing changed on disk.
    pub fn reload_if_changed(&self) -> AtlasResult<Option<Arc<Snapshot>>> {
        let _guard = self.lock_reload();
        let current = self.snapshot();
        if pipeline::fingerprint(&self.config) == current.fingerprint() {
            info!("sources unchanged, keeping snapshot {}", current.id());
            return Ok(None);
        }
        self.rebuild().map(Some)
    }
}

// ============================================================================
// TESTS
// ============================================================================
