//! Notifications emitted after every published snapshot and every local
//! mutation.
//!
//! The rendering collaborator subscribes to the [`super::EventBus`] and
//! redraws whatever a [`ClientEvent`] touches.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{EventId, ReservationId, UserId};

/// How a published cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOutcomeKind {
    /// Every source answered.
    Ready,
    /// At least one source was defaulted.
    ReadyWithErrors,
}

/// Event emitted after a state change of the client core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// A load cycle completed and its snapshot became current.
    SnapshotPublished {
        /// Generation of the published cycle.
        generation: u64,
        /// Whether any source was defaulted.
        outcome: CycleOutcomeKind,
        /// Number of defaulted sources.
        failures: usize,
        /// Publication timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A cycle completed after a newer one had started; its results
    /// were dropped.
    CycleDiscarded {
        /// Generation of the dropped cycle.
        generation: u64,
        /// Generation current at the time.
        current: u64,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A reservation was accepted and its places debited.
    ReservationCreated {
        /// New reservation.
        reservation_id: ReservationId,
        /// Reserved event.
        event_id: EventId,
        /// Places taken.
        seats: u32,
        /// Places left on the event.
        places_available: u32,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A reservation moved to `CONFIRMED`.
    ReservationConfirmed {
        /// Reservation.
        reservation_id: ReservationId,
        /// Reserved event.
        event_id: EventId,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A reservation moved to `CANCELLED`.
    ReservationCancelled {
        /// Reservation.
        reservation_id: ReservationId,
        /// Reserved event.
        event_id: EventId,
        /// Places returned to the event.
        seats_released: u32,
        /// Places left on the event, when it is loaded.
        places_available: Option<u32>,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A user account was enabled or disabled.
    UserStatusToggled {
        /// Account.
        user_id: UserId,
        /// New `active` flag.
        active: bool,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An event was created or updated.
    EventSaved {
        /// Event.
        event_id: EventId,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An event was deleted.
    EventRemoved {
        /// Event.
        event_id: EventId,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl ClientEvent {
    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::SnapshotPublished { .. } => "snapshot_published",
            Self::CycleDiscarded { .. } => "cycle_discarded",
            Self::ReservationCreated { .. } => "reservation_created",
            Self::ReservationConfirmed { .. } => "reservation_confirmed",
            Self::ReservationCancelled { .. } => "reservation_cancelled",
            Self::UserStatusToggled { .. } => "user_status_toggled",
            Self::EventSaved { .. } => "event_saved",
            Self::EventRemoved { .. } => "event_removed",
        }
    }

    /// Returns the event id this notification concerns, if any.
    #[must_use]
    pub const fn event_id(&self) -> Option<EventId> {
        match self {
            Self::ReservationCreated { event_id, .. }
            | Self::ReservationConfirmed { event_id, .. }
            | Self::ReservationCancelled { event_id, .. }
            | Self::EventSaved { event_id, .. }
            | Self::EventRemoved { event_id, .. } => Some(*event_id),
            Self::SnapshotPublished { .. }
            | Self::CycleDiscarded { .. }
            | Self::UserStatusToggled { .. } => None,
        }
    }
}
