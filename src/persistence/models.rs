//! Persisted client-side records.

use serde::{Deserialize, Serialize};

use crate::domain::{Role, UserId};

/// The authenticated user and its bearer token, as stored under
/// `currentUser`.
///
/// Field names follow the backend's login response so a record written
/// by the web client can be read back.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    /// Account identifier, when the login response carried it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    /// Bearer token.
    pub token: String,
    /// Token type; always `Bearer` in practice.
    #[serde(rename = "type", default = "default_token_type")]
    pub token_type: String,
    /// Login email.
    pub email: String,
    /// Family name.
    #[serde(default)]
    pub nom: String,
    /// Given name.
    #[serde(default)]
    pub prenom: String,
    /// Account role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl StoredSession {
    /// `"prenom nom"`, or the email when both are blank.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.prenom.trim(), self.nom.trim());
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}

// The token is a credential: keep it out of logs.
impl std::fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredSession")
            .field("id", &self.id)
            .field("token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn reads_login_response_shape() {
        let Ok(session) = serde_json::from_str::<StoredSession>(
            r#"{"token":"abc","type":"Bearer","email":"admin@eventconnect.com","nom":"Admin","prenom":"Super"}"#,
        ) else {
            panic!("parse failed");
        };
        assert_eq!(session.display_name(), "Super Admin");
        assert_eq!(session.id, None);
    }

    #[test]
    fn debug_hides_token() {
        let session = StoredSession {
            id: Some(UserId::new(4)),
            token: "secret-token".to_string(),
            token_type: default_token_type(),
            email: "admin@eventconnect.com".to_string(),
            nom: String::new(),
            prenom: String::new(),
            role: Some(Role::Admin),
        };
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-token"));
        assert_eq!(session.display_name(), "admin@eventconnect.com");
    }
}
