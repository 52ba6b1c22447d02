//! User accounts as listed by the admin client.
//!
//! Aggregate counters (`reservation_count`, `total_spent`) are computed by
//! the backend and never modified locally.

use std::borrow::Cow;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::UserId;
use super::filter::Searchable;
use crate::error::ClientError;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Regular member.
    #[serde(rename = "USER")]
    User,
    /// Platform administrator.
    #[serde(rename = "ADMIN")]
    Admin,
    /// Event organizer.
    #[serde(rename = "ORGANISATEUR", alias = "ORGANIZER")]
    Organizer,
}

/// Account activity, derived from the `active` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// The account can log in.
    Active,
    /// The account is disabled.
    Inactive,
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    /// Backend identifier.
    pub id: UserId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Login email.
    pub email: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Account role.
    pub role: Role,
    /// Whether the account is enabled.
    pub active: bool,
    /// Registration timestamp.
    pub registered_at: Option<NaiveDateTime>,
    /// Server-computed number of reservations.
    pub reservation_count: u32,
    /// Server-computed total spend.
    pub total_spent: Decimal,
}

impl User {
    /// Builds a user, requiring a non-empty email.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidRequest`] when `email` is blank.
    pub fn new(
        id: UserId,
        first_name: &str,
        last_name: &str,
        email: &str,
        role: Role,
        active: bool,
    ) -> Result<Self, ClientError> {
        if email.trim().is_empty() {
            return Err(ClientError::InvalidRequest(format!("user {id}: email is required")));
        }
        Ok(Self {
            id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone: None,
            role,
            active,
            registered_at: None,
            reservation_count: 0,
            total_spent: Decimal::ZERO,
        })
    }

    /// `"first last"`, or the email when both names are blank.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }

    /// Activity status derived from the `active` flag.
    #[must_use]
    pub const fn status(&self) -> UserStatus {
        if self.active {
            UserStatus::Active
        } else {
            UserStatus::Inactive
        }
    }
}

/// Entry of the organizer picker on the event form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organizer {
    /// Account identifier.
    pub id: UserId,
    /// Full name, or the email when no name is set.
    pub name: String,
    /// Login email.
    pub email: String,
}

impl From<&User> for Organizer {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.display_name(),
            email: user.email.clone(),
        }
    }
}

/// Text fields of a user that a search can look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    /// Given name.
    FirstName,
    /// Family name.
    LastName,
    /// Login email.
    Email,
}

impl UserField {
    /// Every searchable field.
    pub const ALL: [Self; 3] = [Self::FirstName, Self::LastName, Self::Email];
}

impl Searchable for User {
    type Status = UserStatus;
    type Field = UserField;

    fn status(&self) -> UserStatus {
        User::status(self)
    }

    fn field_text(&self, field: UserField) -> Cow<'_, str> {
        match field {
            UserField::FirstName => Cow::Borrowed(&self.first_name),
            UserField::LastName => Cow::Borrowed(&self.last_name),
            UserField::Email => Cow::Borrowed(&self.email),
        }
    }
}

/// Counters over a list of users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    /// Number of accounts.
    pub total: usize,
    /// Enabled accounts.
    pub active: usize,
    /// Disabled accounts.
    pub inactive: usize,
    /// Accounts with the `ADMIN` role.
    pub admins: usize,
    /// Sum of server-computed spend.
    pub total_spent: Decimal,
}

impl UserSummary {
    /// Folds a list of users into counters.
    pub fn from_users<'a, I>(users: I) -> Self
    where
        I: IntoIterator<Item = &'a User>,
    {
        users.into_iter().fold(Self::default(), |mut acc, u| {
            acc.total += 1;
            if u.active {
                acc.active += 1;
            } else {
                acc.inactive += 1;
            }
            if u.role == Role::Admin {
                acc.admins += 1;
            }
            acc.total_spent += u.total_spent;
            acc
        })
    }
}
