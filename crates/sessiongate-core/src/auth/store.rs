//! Durable storage for the session token.
//!
//! Every backend is a single named slot. Platform failures are logged and
//! treated as "no token" so callers never have to handle storage errors.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::SessionToken;

/// Name of the slot holding the raw token string
pub const TOKEN_KEY: &str = "authToken";

/// Storage file name in the cache directory
const STORAGE_FILE: &str = "storage.json";

/// Single-slot persistent token holder.
///
/// The store is the only durable owner of the token. `SessionContext` is the
/// only writer; `RequestClient` reads it on every request.
pub trait TokenStore: Send + Sync {
    /// Current token, or `None` when unauthenticated. Never fails.
    fn read(&self) -> Option<SessionToken>;

    /// Persist `token`; later reads, including after a restart, return it.
    fn write(&self, token: &SessionToken);

    /// Remove the token; later reads return `None`.
    fn clear(&self);
}

// ============================================================================
// File-backed store
// ============================================================================

/// Token slot inside a small JSON key/value file, the local-storage analogue
/// for a terminal client. Unrelated keys in the file are left alone.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(cache_dir: impl AsRef<Path>) -> Self {
        Self {
            path: cache_dir.as_ref().join(STORAGE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_entries(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let contents =
            std::fs::read_to_string(&self.path).context("Failed to read storage file")?;
        serde_json::from_str(&contents).context("Failed to parse storage file")
    }

    fn save_entries(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create cache directory")?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents).context("Failed to write storage file")?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn read(&self) -> Option<SessionToken> {
        match self.load_entries() {
            Ok(entries) => entries
                .get(TOKEN_KEY)
                .and_then(Value::as_str)
                .and_then(SessionToken::new),
            Err(e) => {
                warn!(error = %e, path = ?self.path, "Unreadable token storage, treating as absent");
                None
            }
        }
    }

    fn write(&self, token: &SessionToken) {
        // A corrupt file is replaced rather than blocking the login
        let mut entries = self.load_entries().unwrap_or_default();
        entries.insert(TOKEN_KEY.to_string(), Value::String(token.as_str().to_string()));
        if let Err(e) = self.save_entries(&entries) {
            warn!(error = %e, path = ?self.path, "Failed to persist token");
        } else {
            debug!(path = ?self.path, "Token persisted");
        }
    }

    fn clear(&self) {
        // An unreadable file already reads as absent
        let mut entries = self.load_entries().unwrap_or_default();
        if entries.remove(TOKEN_KEY).is_none() {
            return;
        }
        if let Err(e) = self.save_entries(&entries) {
            warn!(error = %e, path = ?self.path, "Failed to clear token");
        }
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local slot. Does not survive a restart.
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<SessionToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: SessionToken) -> Self {
        Self {
            slot: Mutex::new(Some(token)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn read(&self) -> Option<SessionToken> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn write(&self, token: &SessionToken) {
        *self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token.clone());
    }

    fn clear(&self) {
        *self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(raw: &str) -> SessionToken {
        SessionToken::new(raw).unwrap()
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryTokenStore::new();
        assert!(store.read().is_none());

        store.write(&token("abc123"));
        assert_eq!(store.read(), Some(token("abc123")));

        store.clear();
        assert!(store.read().is_none());
    }

    #[test]
    fn test_file_store_missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested"));
        assert!(store.read().is_none());
    }

    #[test]
    fn test_file_store_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        FileTokenStore::new(dir.path()).write(&token("tok-999"));

        let reopened = FileTokenStore::new(dir.path());
        assert_eq!(reopened.read(), Some(token("tok-999")));
    }

    #[test]
    fn test_file_store_layout_uses_auth_token_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());
        store.write(&token("abc123"));

        let contents = std::fs::read_to_string(store.path()).unwrap();
        let value: Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["authToken"], "abc123");
    }

    #[test]
    fn test_file_store_corrupt_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());
        std::fs::write(store.path(), "{ not json").unwrap();

        assert!(store.read().is_none());

        // Writing recovers the slot
        store.write(&token("fresh"));
        assert_eq!(store.read(), Some(token("fresh")));
    }

    #[test]
    fn test_file_store_clear_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());
        std::fs::write(store.path(), r#"{"theme":"dark","authToken":"abc123"}"#).unwrap();

        store.clear();
        assert!(store.read().is_none());

        let contents = std::fs::read_to_string(store.path()).unwrap();
        let value: Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["theme"], "dark");
        assert!(value.get("authToken").is_none());
    }

    #[test]
    fn test_file_store_empty_value_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());
        std::fs::write(store.path(), r#"{"authToken":""}"#).unwrap();
        assert!(store.read().is_none());
    }
}
