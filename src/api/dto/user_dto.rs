//! User DTOs for `/utilisateurs` endpoints.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::{Role, User, UserId};
use crate::error::ClientError;

/// User account as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    /// Account identifier.
    pub id: i64,
    /// Family name.
    #[serde(default)]
    pub nom: Option<String>,
    /// Given name.
    #[serde(default)]
    pub prenom: Option<String>,
    /// Login email.
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub telephone: Option<String>,
    /// Role; `USER` when absent.
    #[serde(default)]
    pub role: Option<Role>,
    /// Enabled flag; enabled when absent.
    #[serde(default)]
    pub actif: Option<bool>,
    /// Registration timestamp.
    #[serde(default)]
    pub date_inscription: Option<NaiveDateTime>,
    /// Server-computed reservation count.
    #[serde(default)]
    pub total_reservations: Option<u32>,
    /// Server-computed spend.
    #[serde(default)]
    pub total_depense: Option<Decimal>,
}

impl TryFrom<UserDto> for User {
    type Error = ClientError;

    fn try_from(dto: UserDto) -> Result<Self, Self::Error> {
        let mut user = Self::new(
            UserId::new(dto.id),
            dto.prenom.as_deref().unwrap_or_default(),
            dto.nom.as_deref().unwrap_or_default(),
            dto.email.as_deref().unwrap_or_default(),
            dto.role.unwrap_or(Role::User),
            dto.actif.unwrap_or(true),
        )
        .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;
        user.phone = dto.telephone;
        user.registered_at = dto.date_inscription;
        user.reservation_count = dto.total_reservations.unwrap_or(0);
        user.total_spent = dto.total_depense.unwrap_or_default();
        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn converts_backend_user() {
        let Ok(dto) = serde_json::from_str::<UserDto>(
            r#"{"id":1,"nom":"Dupont","prenom":"Jean","email":"jean.dupont@email.com",
                "role":"ORGANISATEUR","actif":false,"dateInscription":"2024-01-15T10:30:00",
                "totalReservations":5,"totalDepense":450.0}"#,
        ) else {
            panic!("dto should parse");
        };
        let Ok(user) = User::try_from(dto) else {
            panic!("conversion failed");
        };
        assert_eq!(user.display_name(), "Jean Dupont");
        assert_eq!(user.role, Role::Organizer);
        assert!(!user.active);
        assert_eq!(user.reservation_count, 5);
        assert_eq!(user.total_spent, Decimal::new(450, 0));
    }

    #[test]
    fn missing_email_is_malformed() {
        let Ok(dto) = serde_json::from_str::<UserDto>(r#"{"id":3,"nom":"Durand"}"#) else {
            panic!("dto should parse");
        };
        assert!(matches!(
            User::try_from(dto),
            Err(ClientError::MalformedResponse(_))
        ));
    }

    #[test]
    fn defaults_role_and_activity() {
        let Ok(dto) = serde_json::from_str::<UserDto>(r#"{"id":4,"email":"a@b.c"}"#) else {
            panic!("dto should parse");
        };
        let Ok(user) = User::try_from(dto) else {
            panic!("conversion failed");
        };
        assert_eq!(user.role, Role::User);
        assert!(user.active);
    }
}
