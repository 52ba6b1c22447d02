//! Explicit session lifecycle.
//!
//! [`SessionContext`] is created once and injected into the services that
//! need credentials. It is initialized by [`SessionContext::restore`] at
//! startup, replaced by [`SessionContext::establish`] on login and torn
//! down by [`SessionContext::end`] on logout.

use tokio::sync::RwLock;

use crate::error::ClientError;
use crate::persistence::{SessionStore, StoredSession};

/// The current session, backed by a [`SessionStore`].
#[derive(Debug)]
pub struct SessionContext {
    store: SessionStore,
    current: RwLock<Option<StoredSession>>,
}

impl SessionContext {
    /// Creates a context with no active session.
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            current: RwLock::new(None),
        }
    }

    /// Loads the persisted session, if any.
    ///
    /// An unreadable record is logged and treated as logged out.
    pub async fn restore(&self) -> Option<StoredSession> {
        let loaded = match self.store.load().await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable session record");
                None
            }
        };
        if let Some(session) = &loaded {
            tracing::info!(email = %session.email, "session restored");
        }
        self.current.write().await.clone_from(&loaded);
        loaded
    }

    /// Makes `session` current and persists it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] for an empty token and
    /// [`ClientError::Session`] if the record cannot be written; the
    /// previous session stays current in both cases.
    pub async fn establish(&self, session: StoredSession) -> Result<(), ClientError> {
        if session.token.trim().is_empty() {
            return Err(ClientError::Auth("login response carried no token".to_string()));
        }
        let mut current = self.current.write().await;
        self.store.save(&session).await?;
        tracing::info!(email = %session.email, "session established");
        *current = Some(session);
        Ok(())
    }

    /// Clears the session from memory and disk.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Session`] if the record cannot be removed.
    /// The in-memory session is cleared regardless.
    pub async fn end(&self) -> Result<(), ClientError> {
        let previous = self.current.write().await.take();
        if let Some(session) = previous {
            tracing::info!(email = %session.email, "session ended");
        }
        self.store.clear().await
    }

    /// The current session.
    pub async fn current(&self) -> Option<StoredSession> {
        self.current.read().await.clone()
    }

    /// Returns `true` while a session is active.
    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Bearer token of the current session.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] when nobody is logged in.
    pub async fn bearer_token(&self) -> Result<String, ClientError> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or_else(|| ClientError::Auth("no active session".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use tokio_test::assert_ok;

    use super::*;

    fn session(token: &str) -> StoredSession {
        StoredSession {
            id: None,
            token: token.to_string(),
            token_type: "Bearer".to_string(),
            email: "admin@eventconnect.com".to_string(),
            nom: "Admin".to_string(),
            prenom: "Super".to_string(),
            role: None,
        }
    }

    fn context(dir: &tempfile::TempDir) -> SessionContext {
        SessionContext::new(SessionStore::new(dir.path().join("currentUser.json")))
    }

    #[tokio::test]
    async fn lifecycle_survives_restart() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let first = context(&dir);
        assert!(first.restore().await.is_none());
        assert!(matches!(first.bearer_token().await, Err(ClientError::Auth(_))));

        assert_ok!(first.establish(session("t-1")).await);
        assert_eq!(first.bearer_token().await.ok().as_deref(), Some("t-1"));

        let second = context(&dir);
        assert!(second.restore().await.is_some());
        assert!(second.is_authenticated().await);

        assert_ok!(second.end().await);
        assert!(!second.is_authenticated().await);
        assert!(context(&dir).restore().await.is_none());
    }

    #[tokio::test]
    async fn empty_token_is_refused() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let ctx = context(&dir);
        assert!(matches!(
            ctx.establish(session("  ")).await,
            Err(ClientError::Auth(_))
        ));
        assert!(!ctx.is_authenticated().await);
    }

    #[tokio::test]
    async fn corrupt_record_restores_as_logged_out() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let Ok(()) = tokio::fs::write(dir.path().join("currentUser.json"), "{").await else {
            panic!("write failed");
        };
        let ctx = context(&dir);
        assert!(ctx.restore().await.is_none());
    }
}
