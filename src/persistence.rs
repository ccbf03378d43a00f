//! Durable wizard state.
//!
//! The wizard persists through a deliberately small key-value port —
//! `get`/`set`/`remove` by string key — so the same logic runs against an
//! in-memory fake in tests and a file-backed store in the CLI, and could
//! sit on any other backend. Records are keyed per authenticated user so
//! two identities on the same machine never see each other's in-progress
//! wizard.
//!
//! A corrupt or stale persisted blob is never fatal: it is logged and the
//! wizard starts fresh.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{debug, warn};

use crate::boundary::UserId;
use crate::wizard::{WizardSnapshot, WizardState};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Minimal durable key-value port.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;

    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.lock().expect("store lock poisoned").get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries
            .lock()
            .expect("store lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.entries.lock().expect("store lock poisoned").remove(key);
        Ok(())
    }
}

/// File-per-key store rooted at a directory. Writes go through a temp file
/// and a rename so a crash mid-write cannot leave a half-written record.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let sanitized: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '-' })
            .collect();
        self.root.join(format!("{sanitized}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Wizard-shaped view over a key-value store: snapshot serialization,
/// per-user keying, and corruption fallback.
#[derive(Clone)]
pub struct WizardStorage {
    store: Arc<dyn KeyValueStore>,
}

impl WizardStorage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn key_for(user: &UserId) -> String {
        format!("wizard-{user}")
    }

    /// Load the persisted wizard for a user. Returns `None` when nothing
    /// usable is stored; a corrupt, unreadable, or version-mismatched
    /// record is logged and treated the same as absent.
    pub fn load(&self, user: &UserId) -> Option<WizardState> {
        let key = Self::key_for(user);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(user = %user, error = %e, "failed to read persisted wizard state, starting fresh");
                return None;
            }
        };
        match serde_json::from_str::<WizardSnapshot>(&raw) {
            Ok(snapshot) if snapshot.is_usable() => {
                debug!(user = %user, step = snapshot.current_step, "recovered persisted wizard state");
                Some(snapshot.into_state())
            }
            Ok(snapshot) => {
                warn!(
                    user = %user,
                    version = %snapshot.version,
                    "persisted wizard state is unusable, starting fresh"
                );
                None
            }
            Err(e) => {
                warn!(user = %user, error = %e, "persisted wizard state is corrupt, starting fresh");
                None
            }
        }
    }

    /// Persist the durable portion of the state for a user.
    pub fn save(&self, user: &UserId, state: &WizardState) -> Result<(), PersistenceError> {
        let serialized = serde_json::to_string(&state.snapshot())?;
        self.store.set(&Self::key_for(user), &serialized)
    }

    /// Remove the durable record for a user.
    pub fn clear(&self, user: &UserId) -> Result<(), PersistenceError> {
        self.store.remove(&Self::key_for(user))
    }
}
