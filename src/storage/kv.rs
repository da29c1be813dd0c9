use std::collections::HashMap as StdHashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

use super::{ContextId, SessionStore, StorageEvent, StorageEvents, StorageResult};
use crate::error::StorageError;

pub const EVENT_CAPACITY: usize = 64;
const SNAPSHOT_FILE: &str = "storage.bin";

struct Inner {
    map: parking_lot::RwLock<StdHashMap<String, String>>,
    /// Serializes mutations so snapshot files and events land in write order.
    writer: parking_lot::Mutex<()>,
    events: broadcast::Sender<StorageEvent>,
    /// Write-through snapshot location; `None` keeps the origin purely in memory.
    snapshot: Option<PathBuf>,
    available: AtomicBool,
}

/// The storage origin shared by all browsing contexts.
#[derive(Clone)]
pub struct LocalStorage {
    inner: Arc<Inner>,
}

impl LocalStorage {
    fn with_snapshot(map: StdHashMap<String, String>, snapshot: Option<PathBuf>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                map: parking_lot::RwLock::new(map),
                writer: parking_lot::Mutex::new(()),
                events,
                snapshot,
                available: AtomicBool::new(true),
            }),
        }
    }

    pub fn in_memory() -> Self { Self::with_snapshot(StdHashMap::new(), None) }

    /// Open (or create) a persisted origin under `dir`, loading the previous snapshot if any.
    pub fn open(dir: &Path) -> StorageResult<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(SNAPSHOT_FILE);
        let map = if path.exists() {
            let bytes = std::fs::read(&path)?;
            bincode::deserialize::<StdHashMap<String, String>>(&bytes)?
        } else {
            StdHashMap::new()
        };
        tracing::debug!(path = %path.display(), keys = map.len(), "storage opened");
        Ok(Self::with_snapshot(map, Some(path)))
    }

    /// Handle for a new browsing context.
    pub fn context(&self) -> ContextStorage { self.context_with_id(ContextId::new()) }

    pub fn context_with_id(&self, id: ContextId) -> ContextStorage {
        ContextStorage { storage: self.clone(), id }
    }

    /// Toggle availability; while unavailable every operation fails like disabled browser storage.
    pub fn set_available(&self, available: bool) {
        self.inner.available.store(available, Ordering::SeqCst);
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.map.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.inner.available.load(Ordering::SeqCst) { Ok(()) } else { Err(StorageError::Unavailable("storage is disabled".into())) }
    }

    fn write_snapshot(&self, path: &Path, bytes: &[u8]) -> StorageResult<()> {
        let tmp = path.with_extension("bin.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.check_available()?;
        Ok(self.inner.map.read().get(key).cloned())
    }

    /// Apply one change. The map lock is held only to update and encode it; the snapshot
    /// file is written afterwards, and on failure the key is restored and no event is sent.
    /// Readers never wait on disk I/O. Writers do: the snapshot is synchronous write-through.
    fn mutate(&self, origin: ContextId, key: &str, new_value: Option<&str>) -> StorageResult<()> {
        self.check_available()?;
        let _writer = self.inner.writer.lock();
        let (old_value, bytes) = {
            let mut w = self.inner.map.write();
            let old_value = w.get(key).cloned();
            if old_value.as_deref() == new_value { return Ok(()); }
            match new_value {
                Some(v) => { w.insert(key.to_string(), v.to_string()); }
                None => { w.remove(key); }
            }
            let bytes = match self.inner.snapshot {
                Some(_) => match bincode::serialize(&*w) {
                    Ok(b) => Some(b),
                    Err(e) => {
                        restore(&mut w, key, old_value);
                        return Err(e.into());
                    }
                },
                None => None,
            };
            (old_value, bytes)
        };
        if let (Some(path), Some(bytes)) = (self.inner.snapshot.as_deref(), bytes) {
            if let Err(e) = self.write_snapshot(path, &bytes) {
                restore(&mut self.inner.map.write(), key, old_value);
                return Err(e);
            }
        }
        // Still under the writer lock, so event order matches write order.
        let _ = self.inner.events.send(StorageEvent {
            key: key.to_string(),
            old_value,
            new_value: new_value.map(|v| v.to_string()),
            origin,
        });
        Ok(())
    }
}

fn restore(map: &mut StdHashMap<String, String>, key: &str, old_value: Option<String>) {
    match old_value {
        Some(v) => { map.insert(key.to_string(), v); }
        None => { map.remove(key); }
    }
}

/// One browsing context's view of the shared origin.
#[derive(Clone)]
pub struct ContextStorage {
    storage: LocalStorage,
    id: ContextId,
}

impl ContextStorage {
    pub fn id(&self) -> ContextId { self.id }
    pub fn origin(&self) -> &LocalStorage { &self.storage }
}

impl SessionStore for ContextStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> { self.storage.get(key) }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> { self.storage.mutate(self.id, key, Some(value)) }

    fn remove(&self, key: &str) -> StorageResult<()> { self.storage.mutate(self.id, key, None) }

    fn subscribe(&self) -> StorageEvents {
        StorageEvents::new(self.storage.inner.events.subscribe(), Some(self.id))
    }
}
