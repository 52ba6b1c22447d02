//! User directory: the account list with its filter and summary.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::api::Backend;
use crate::domain::{
    ClientEvent, EventBus, FilteredView, User, UserField, UserId, UserStatus, UserSummary,
};
use crate::error::ClientError;

/// Account list as shown on the users page.
#[derive(Debug)]
pub struct UserDirectory<B: Backend> {
    backend: Arc<B>,
    view: RwLock<FilteredView<User>>,
    event_bus: EventBus,
}

impl<B: Backend> UserDirectory<B> {
    /// Creates an empty directory.
    #[must_use]
    pub fn new(backend: Arc<B>, event_bus: EventBus) -> Self {
        Self {
            backend,
            view: RwLock::new(FilteredView::new(Vec::new(), UserField::ALL)),
            event_bus,
        }
    }

    /// Reloads every account. Returns the number loaded.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the previous list is kept.
    pub async fn load(&self) -> Result<usize, ClientError> {
        let users = self.backend.users().await?;
        let count = users.len();
        self.view.write().await.set_source(users);
        tracing::debug!(count, "users loaded");
        Ok(count)
    }

    /// Enables a disabled account or disables an enabled one.
    ///
    /// The local record is replaced by the backend's answer only after the
    /// backend acknowledged the change.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotFound`] if the account is not loaded, or the
    /// backend error; the list is unchanged in both cases.
    pub async fn toggle_status(&self, id: UserId) -> Result<User, ClientError> {
        if !self.view.read().await.source().iter().any(|u| u.id == id) {
            return Err(ClientError::NotFound {
                kind: "user",
                id: id.get(),
            });
        }
        let updated = self.backend.toggle_user_status(id).await.inspect_err(|e| {
            tracing::warn!(user_id = %id, error = %e, "user status not changed");
        })?;

        {
            let mut view = self.view.write().await;
            let source = view
                .source()
                .iter()
                .map(|u| if u.id == id { updated.clone() } else { u.clone() })
                .collect();
            view.set_source(source);
        }

        tracing::info!(user_id = %id, active = updated.active, "user status toggled");
        let _ = self.event_bus.publish(ClientEvent::UserStatusToggled {
            user_id: id,
            active: updated.active,
            timestamp: Utc::now(),
        });
        Ok(updated)
    }

    /// Keeps only accounts in `status`; `None` keeps all.
    pub async fn set_status_filter(&self, status: Option<UserStatus>) {
        self.view.write().await.set_status(status);
    }

    /// Searches first name, last name and email.
    pub async fn set_search(&self, text: &str) {
        self.view.write().await.set_text(text);
    }

    /// Accounts matching the current filter, in load order.
    pub async fn visible(&self) -> Vec<User> {
        self.view.read().await.items().cloned().collect()
    }

    /// Every loaded account.
    pub async fn all(&self) -> Vec<User> {
        self.view.read().await.source().to_vec()
    }

    /// Counters over every loaded account, regardless of the filter.
    pub async fn summary(&self) -> UserSummary {
        UserSummary::from_users(self.view.read().await.source())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use tokio_test::assert_err;

    use super::*;
    use crate::test_support::{FakeBackend, user};

    async fn directory() -> (UserDirectory<FakeBackend>, Arc<FakeBackend>) {
        let backend = Arc::new(FakeBackend::new());
        backend
            .set_users(vec![
                user(1, "Jean", "Dupont", true),
                user(2, "Marie", "Martin", false),
                user(3, "Pierre", "Durand", true),
            ])
            .await;
        let dir = UserDirectory::new(Arc::clone(&backend), EventBus::new(16));
        let Ok(3) = dir.load().await else {
            panic!("three users");
        };
        (dir, backend)
    }

    #[tokio::test]
    async fn toggle_replaces_the_record() {
        let (dir, backend) = directory().await;
        let mut rx = dir.event_bus.subscribe();

        let Ok(updated) = dir.toggle_status(UserId::new(2)).await else {
            panic!("toggle");
        };
        assert!(updated.active);
        assert_eq!(dir.summary().await.active, 3);
        assert_eq!(backend.calls("toggle_user_status").await, 1);
        let Ok(ClientEvent::UserStatusToggled { active: true, .. }) = rx.recv().await else {
            panic!("expected user_status_toggled");
        };
    }

    #[tokio::test]
    async fn failed_toggle_keeps_the_list() {
        let (dir, backend) = directory().await;
        backend
            .fail(
                "toggle_user_status",
                ClientError::HttpStatus {
                    status: 500,
                    message: "boom".to_string(),
                },
            )
            .await;
        assert_err!(dir.toggle_status(UserId::new(1)).await);
        assert_eq!(dir.summary().await.inactive, 1);

        assert!(matches!(
            dir.toggle_status(UserId::new(42)).await,
            Err(ClientError::NotFound { kind: "user", .. })
        ));
    }

    #[tokio::test]
    async fn filter_by_status_and_text() {
        let (dir, _backend) = directory().await;
        dir.set_status_filter(Some(UserStatus::Active)).await;
        let names: Vec<String> = dir.visible().await.iter().map(User::display_name).collect();
        assert_eq!(names, vec!["Jean Dupont", "Pierre Durand"]);

        dir.set_search("DUR").await;
        let names: Vec<String> = dir.visible().await.iter().map(User::display_name).collect();
        assert_eq!(names, vec!["Pierre Durand"]);

        dir.set_status_filter(None).await;
        dir.set_search("martin@").await;
        assert_eq!(dir.visible().await.len(), 1);
        assert_eq!(dir.all().await.len(), 3);
    }
}
