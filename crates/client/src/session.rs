//! Durable storage for the admin session.
//!
//! The console never keeps a token only in memory: every login goes through a
//! `SessionStore`, and a stored token is revalidated before it is trusted.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Token and username of a logged-in admin.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub username: String,
}

impl std::fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredSession")
            .field("token", &"[REDACTED]")
            .field("username", &self.username)
            .finish()
    }
}

/// Where the console keeps its session between runs.
pub trait SessionStore {
    /// Read the stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the backing storage cannot be read.
    fn load(&self) -> Result<Option<StoredSession>, ClientError>;

    /// Replace the stored session.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the backing storage cannot be written.
    fn save(&self, session: &StoredSession) -> Result<(), ClientError>;

    /// Forget the stored session. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the backing storage cannot be written.
    fn clear(&self) -> Result<(), ClientError>;
}

/// Session persisted as a small JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<StoredSession>, ClientError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, session: &StoredSession) -> Result<(), ClientError> {
        let bytes = serde_json::to_vec_pretty(session)?;

        // Token grants admin access; the file is owner-only before any byte lands
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        std::os::unix::fs::OpenOptionsExt::mode(&mut options, 0o600);
        let mut file = options.open(&self.path)?;

        // `mode` only applies on creation
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(&bytes)?;

        tracing::debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process session store. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    slot: Arc<Mutex<Option<StoredSession>>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<StoredSession>> {
        self.slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<StoredSession>, ClientError> {
        Ok(self.lock().clone())
    }

    fn save(&self, session: &StoredSession) -> Result<(), ClientError> {
        *self.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn session() -> StoredSession {
        StoredSession {
            token: "eyJ.secret.token".to_owned(),
            username: "owner".to_owned(),
        }
    }

    #[test]
    fn test_file_store_roundtrip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));

        assert!(store.load().unwrap().is_none());
        store.save(&session()).unwrap();
        assert_eq!(store.load().unwrap(), Some(session()));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.save(&session()).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileSessionStore::new(path);
        store.save(&session()).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.load().unwrap(), Some(session()));
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"not json").unwrap();

        let store = FileSessionStore::new(path);
        assert!(matches!(store.load(), Err(ClientError::SessionFormat(_))));
    }

    #[test]
    fn test_memory_store_clones_share_state() {
        let store = MemorySessionStore::new();
        let other = store.clone();
        store.save(&session()).unwrap();
        assert_eq!(other.load().unwrap(), Some(session()));
        other.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", session());
        assert!(debug.contains("owner"));
        assert!(!debug.contains("secret"));
    }
}
