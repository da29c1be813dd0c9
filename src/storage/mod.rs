//!
//! danawarga client storage
//! ------------------------
//! Models the browser-local key/value medium the session lives in. One `LocalStorage`
//! is shared by every browsing context of an origin; each context talks to it through
//! a `ContextStorage` handle. Writes are atomic per key and every effective change is
//! broadcast as a `StorageEvent` that other contexts observe (a context never sees its
//! own writes as events).
//!
//! Consumers depend only on the `SessionStore` trait so tests can inject fakes.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::StorageError;

pub mod kv;
pub mod prefs;

pub use kv::{LocalStorage, ContextStorage, EVENT_CAPACITY};
pub use prefs::{Preferences, PrefKey};

pub type StorageResult<T> = Result<T, StorageError>;

/// Identifies one browsing context (tab/window) sharing a storage origin.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(uuid::Uuid);

impl ContextId {
    pub fn new() -> Self { Self(uuid::Uuid::new_v4()) }
}

impl Default for ContextId {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // short form keeps logs readable
        let s = self.0.simple().to_string();
        write!(f, "ctx-{}", &s[..8])
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Debug::fmt(self, f) }
}

/// A change to one key. `new_value: None` means the key was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub origin: ContextId,
}

impl StorageEvent {
    pub fn is_removal(&self) -> bool { self.new_value.is_none() }
}

/// What a subscriber learns from the origin: one change, or that it fell behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageNotice {
    Change(StorageEvent),
    /// `n` changes were dropped before this subscriber saw them; re-read anything you track.
    Missed(u64),
}

/// Change notifications as seen by one context: events caused by that context are skipped.
pub struct StorageEvents {
    rx: broadcast::Receiver<StorageEvent>,
    own: Option<ContextId>,
}

impl StorageEvents {
    pub fn new(rx: broadcast::Receiver<StorageEvent>, own: Option<ContextId>) -> Self { Self { rx, own } }

    /// Next foreign change or lag notice; `None` once the storage has been dropped.
    pub async fn next_notice(&mut self) -> Option<StorageNotice> {
        loop {
            match self.rx.recv().await {
                Ok(ev) => {
                    if Some(ev.origin) == self.own { continue; }
                    return Some(StorageNotice::Change(ev));
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "storage event subscriber lagged");
                    return Some(StorageNotice::Missed(n));
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next foreign event, stepping over lag notices.
    pub async fn recv(&mut self) -> Option<StorageEvent> {
        loop {
            match self.next_notice().await? {
                StorageNotice::Change(ev) => return Some(ev),
                StorageNotice::Missed(_) => continue,
            }
        }
    }
}

/// Injectable key/value session medium.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
    fn subscribe(&self) -> StorageEvents;
}

pub type SharedSessionStore = Arc<dyn SessionStore>;

/// Read and decode a JSON value. Undecodable content is reported, not silently dropped.
pub fn read_json<T: DeserializeOwned>(store: &dyn SessionStore, key: &str) -> StorageResult<Option<T>> {
    match store.get(key)? {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Serialization { key: key.to_string(), source }),
    }
}

pub fn write_json<T: Serialize>(store: &dyn SessionStore, key: &str, value: &T) -> StorageResult<()> {
    let raw = serde_json::to_string(value)
        .map_err(|source| StorageError::Serialization { key: key.to_string(), source })?;
    store.set(key, &raw)
}
