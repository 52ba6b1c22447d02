//! JSON file holding the single persisted session record.

use std::path::{Path, PathBuf};

use super::models::StoredSession;
use crate::error::ClientError;

/// File-backed store for the [`StoredSession`].
///
/// Writes go to a sibling temporary file that is then renamed over the
/// record, so a crash never leaves a half-written session behind.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Creates a store for the record at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the record.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the record. A missing file is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Session`] if the file cannot be read or does
    /// not hold a session record.
    pub async fn load(&self) -> Result<Option<StoredSession>, ClientError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error("read", &e)),
        };
        serde_json::from_str(&raw).map(Some).map_err(|e| {
            ClientError::Session(format!("{} is not a session record: {e}", self.path.display()))
        })
    }

    /// Writes the record, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Session`] on any I/O failure.
    pub async fn save(&self, session: &StoredSession) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error("create directory for", &e))?;
        }
        let json = serde_json::to_vec_pretty(session)
            .map_err(|e| ClientError::Session(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| self.io_error("write", &e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error("replace", &e))
    }

    /// Deletes the record. Deleting a missing record succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Session`] if the file exists but cannot be
    /// removed.
    pub async fn clear(&self) -> Result<(), ClientError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error("remove", &e)),
        }
    }

    fn io_error(&self, action: &str, err: &std::io::Error) -> ClientError {
        ClientError::Session(format!("cannot {action} {}: {err}", self.path.display()))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn session() -> StoredSession {
        let Ok(session) = serde_json::from_str(
            r#"{"id":4,"token":"t-1","email":"admin@eventconnect.com","nom":"Admin","prenom":"Super","role":"ADMIN"}"#,
        ) else {
            panic!("valid session");
        };
        session
    }

    #[tokio::test]
    async fn missing_file_is_no_session() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let store = SessionStore::new(dir.path().join("currentUser.json"));
        assert!(matches!(store.load().await, Ok(None)));
        assert!(store.clear().await.is_ok());
    }

    #[tokio::test]
    async fn save_load_clear() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let store = SessionStore::new(dir.path().join("nested").join("currentUser.json"));
        assert!(store.save(&session()).await.is_ok());

        let Ok(Some(loaded)) = store.load().await else {
            panic!("session should load");
        };
        assert_eq!(loaded, session());

        assert!(store.clear().await.is_ok());
        assert!(matches!(store.load().await, Ok(None)));
    }

    #[tokio::test]
    async fn corrupt_file_is_a_session_error() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("currentUser.json");
        let Ok(()) = tokio::fs::write(&path, "not json").await else {
            panic!("write failed");
        };
        let store = SessionStore::new(path);
        assert!(matches!(store.load().await, Err(ClientError::Session(_))));
    }
}
