//! Reservations, their status state machine, and list summaries.

use std::borrow::Cow;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::filter::Searchable;
use super::{EventId, ReservationId, UserId};
use crate::error::ClientError;

/// Lifecycle status of a reservation.
///
/// ```text
/// PENDING ──► CONFIRMED
///    │            │
///    └──► CANCELLED ◄┘   (terminal)
/// ```
///
/// On the wire the backend uses the French labels. The backend's
/// `EXPIREE` and `REMBOURSEE` states no longer hold places and are read as
/// [`ReservationStatus::Cancelled`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationStatus {
    /// Created, awaiting confirmation.
    #[serde(rename = "EN_ATTENTE", alias = "PENDING")]
    Pending,
    /// Confirmed by an administrator.
    #[serde(rename = "CONFIRMEE", alias = "CONFIRMED")]
    Confirmed,
    /// Cancelled; places returned to the event.
    #[serde(
        rename = "ANNULEE",
        alias = "CANCELLED",
        alias = "EXPIREE",
        alias = "REMBOURSEE"
    )]
    Cancelled,
}

/// Outcome of applying a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The status changed.
    Changed,
    /// The reservation was already in the requested status.
    Unchanged,
}

impl ReservationStatus {
    /// Status label used in logs and errors.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Whether a reservation in this status holds places of its event.
    #[must_use]
    pub const fn holds_places(self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Checks a move to `target` against the state machine.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidTransition`] for `CONFIRMED → PENDING`
    /// and for any move out of `CANCELLED`.
    pub fn transition_to(self, target: Self) -> Result<Transition, ClientError> {
        match (self, target) {
            (from, to) if from == to => Ok(Transition::Unchanged),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
            | (Self::Confirmed, Self::Cancelled) => Ok(Transition::Changed),
            (from, to) => Err(ClientError::InvalidTransition {
                from: from.label(),
                to: to.label(),
            }),
        }
    }
}

/// A reservation as held in local state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reservation {
    /// Backend identifier.
    pub id: ReservationId,
    /// Reserved event.
    pub event_id: EventId,
    /// Account that made the reservation, when the backend sent it.
    pub user_id: Option<UserId>,
    /// Price paid for all places.
    pub total_price: Decimal,
    /// Creation timestamp.
    pub created_at: NaiveDateTime,
    /// Display name of the account holder.
    pub user_name: String,
    /// Email of the account holder.
    pub user_email: String,
    /// Title of the reserved event.
    pub event_title: String,
    seat_count: u32,
    status: ReservationStatus,
}

impl Reservation {
    /// Placeholder for a missing holder name.
    pub const UNKNOWN_USER: &'static str = "Unknown user";
    /// Placeholder for a missing event title.
    pub const UNKNOWN_EVENT: &'static str = "Unknown event";

    /// Builds a reservation.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidRequest`] when `seat_count` is zero.
    pub fn new(
        id: ReservationId,
        event_id: EventId,
        seat_count: u32,
        total_price: Decimal,
        status: ReservationStatus,
        created_at: NaiveDateTime,
    ) -> Result<Self, ClientError> {
        if seat_count == 0 {
            return Err(ClientError::InvalidRequest(format!(
                "reservation {id}: seat count must be at least 1"
            )));
        }
        Ok(Self {
            id,
            event_id,
            user_id: None,
            total_price,
            created_at,
            user_name: Self::UNKNOWN_USER.to_string(),
            user_email: String::new(),
            event_title: Self::UNKNOWN_EVENT.to_string(),
            seat_count,
            status,
        })
    }

    /// Attaches the account holder.
    #[must_use]
    pub fn with_holder(mut self, user_id: Option<UserId>, name: &str, email: &str) -> Self {
        self.user_id = user_id;
        if !name.trim().is_empty() {
            self.user_name = name.to_string();
        } else if !email.trim().is_empty() {
            self.user_name = email.to_string();
        }
        self.user_email = email.to_string();
        self
    }

    /// Attaches the event title.
    #[must_use]
    pub fn with_event_title(mut self, title: &str) -> Self {
        if !title.trim().is_empty() {
            self.event_title = title.to_string();
        }
        self
    }

    /// Number of places reserved (at least 1).
    #[must_use]
    pub const fn seat_count(&self) -> u32 {
        self.seat_count
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> ReservationStatus {
        self.status
    }

    /// Whether this reservation currently holds places of its event.
    #[must_use]
    pub const fn holds_places(&self) -> bool {
        self.status.holds_places()
    }

    /// Moves to `target` following the state machine.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidTransition`] when the move is not
    /// defined; the status is left untouched.
    pub fn apply(&mut self, target: ReservationStatus) -> Result<Transition, ClientError> {
        let transition = self.status.transition_to(target)?;
        self.status = target;
        Ok(transition)
    }
}

/// Text fields of a reservation that a search can look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationField {
    /// Holder display name.
    UserName,
    /// Holder email.
    UserEmail,
    /// Reserved event title.
    EventTitle,
}

impl ReservationField {
    /// Every searchable field.
    pub const ALL: [Self; 3] = [Self::UserName, Self::UserEmail, Self::EventTitle];
}

impl Searchable for Reservation {
    type Status = ReservationStatus;
    type Field = ReservationField;

    fn status(&self) -> ReservationStatus {
        self.status
    }

    fn field_text(&self, field: ReservationField) -> Cow<'_, str> {
        match field {
            ReservationField::UserName => Cow::Borrowed(&self.user_name),
            ReservationField::UserEmail => Cow::Borrowed(&self.user_email),
            ReservationField::EventTitle => Cow::Borrowed(&self.event_title),
        }
    }
}

/// Counters over a list of reservations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReservationSummary {
    /// Number of reservations.
    pub total: usize,
    /// Reservations in `CONFIRMED`.
    pub confirmed: usize,
    /// Reservations in `PENDING`.
    pub pending: usize,
    /// Reservations in `CANCELLED`.
    pub cancelled: usize,
    /// Sum of `total_price` over confirmed reservations only.
    pub revenue: Decimal,
}

impl ReservationSummary {
    /// Folds a list of reservations into counters.
    pub fn from_reservations<'a, I>(reservations: I) -> Self
    where
        I: IntoIterator<Item = &'a Reservation>,
    {
        reservations
            .into_iter()
            .fold(Self::default(), |mut acc, r| {
                acc.total += 1;
                match r.status {
                    ReservationStatus::Pending => acc.pending += 1,
                    ReservationStatus::Confirmed => {
                        acc.confirmed += 1;
                        acc.revenue += r.total_price;
                    }
                    ReservationStatus::Cancelled => acc.cancelled += 1,
                }
                acc
            })
    }
}
