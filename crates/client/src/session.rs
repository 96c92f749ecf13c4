//! Persisted session identity.
//!
//! The identity lives under a single key. [`Session`] is the only writer; it
//! is created once per process and handed to every view controller.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use carpool_core::SessionIdentity;

/// Name of the single key holding the serialized identity.
pub const SESSION_KEY: &str = "currentUser";

/// Backing store for one string value.
pub trait SessionStorage: Send + Sync {
    fn read(&self) -> io::Result<Option<String>>;
    fn write(&self, value: &str) -> io::Result<()>;
    fn remove(&self) -> io::Result<()>;
}

/// One file on disk holds the key's value.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn read(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write(&self, value: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, value)
    }

    fn remove(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

/// Process-local storage, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    value: Mutex<Option<String>>,
}

impl MemoryStorage {
    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.value.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStorage for MemoryStorage {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.slot().clone())
    }

    fn write(&self, value: &str) -> io::Result<()> {
        *self.slot() = Some(value.to_string());
        Ok(())
    }

    fn remove(&self) -> io::Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

/// Handle to the logged-in identity. Cheap to clone; clones share storage.
#[derive(Clone)]
pub struct Session {
    storage: Arc<dyn SessionStorage>,
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::default())
    }

    /// The persisted identity, or `None` if absent or unreadable.
    pub fn current_user(&self) -> Option<SessionIdentity> {
        let raw = match self.storage.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read session");
                return None;
            }
        };

        match serde_json::from_str::<Option<SessionIdentity>>(&raw) {
            Ok(identity) => identity,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unparseable session");
                None
            }
        }
    }

    pub fn persist(&self, identity: &SessionIdentity) -> io::Result<()> {
        let raw = serde_json::to_string(identity).map_err(io::Error::other)?;
        self.storage.write(&raw)?;
        tracing::info!(user_id = %identity.id, role = %identity.role, "session stored");
        Ok(())
    }

    pub fn clear(&self) -> io::Result<()> {
        self.storage.remove()?;
        tracing::info!("session cleared");
        Ok(())
    }
}
