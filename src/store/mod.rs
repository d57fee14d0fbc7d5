pub mod backend;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::error::AppError;

const CHANNEL_CAPACITY: usize = 256;

/// Namespaced keys within the key-value store, one per collection.
pub mod keys {
    pub const USERS: &str = "tcs_users";
    pub const SESSION: &str = "tcs_session";
    pub const EVENTS: &str = "tcs_events";
    pub const TICKETS: &str = "tcs_tickets";
    pub const CABINET: &str = "tcs_cabinet";
    pub const FACULTY: &str = "tcs_faculty";
    pub const THEME: &str = "tcs_theme";
    pub const HOME_CONTENT: &str = "tcs_home_content";
    pub const ANNOUNCEMENTS: &str = "tcs_announcements";
    pub const PROGRAMS: &str = "tcs_programs";
    pub const DEGREES: &str = "tcs_degrees";
    pub const GALLERY_ALBUMS: &str = "tcs_gallery_albums";
}

/// Fired after every successful write so open views can refresh. This is
/// the only cross-component signal in the system.
#[derive(Debug, Clone)]
pub struct StoreEvent {
    pub key: String,
}

/// Typed JSON key-value store over a pluggable [`StorageBackend`].
///
/// Reads that hit corrupt or missing JSON fall back to the caller's default
/// instead of erroring: a usable default state beats strict surfacing for
/// storage corruption.
pub struct Store {
    backend: Box<dyn StorageBackend>,
    bus: broadcast::Sender<StoreEvent>,
}

impl Store {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        let (bus, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            backend: Box::new(backend),
            bus,
        }
    }

    /// In-memory store, the test and embedding default.
    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self::new(MemoryBackend::new()))
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.backend.load(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding corrupt stored value");
                None
            }
        }
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        self.get(key).unwrap_or(fallback)
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let raw = serde_json::to_string(value)?;
        self.backend.save(key, &raw)?;
        self.notify(key);
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), AppError> {
        self.backend.remove(key)?;
        self.notify(key);
        Ok(())
    }

    /// Subscribe to write notifications. Every `set`/`remove` lands a
    /// [`StoreEvent`] on all live receivers.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.bus.subscribe()
    }

    fn notify(&self, key: &str) {
        // Ignore send errors (no active receivers)
        let _ = self.bus.send(StoreEvent {
            key: key.to_string(),
        });
    }
}
