//! Domain layer: entities, booking state, filtering, and notifications.
//!
//! This module contains the client-side model: typed identifiers, events
//! with their capacity invariant, reservations with their status state
//! machine, users, the dashboard snapshot, the filter engine, the booking
//! registry holding per-event ledgers, and the event bus for broadcasting
//! state changes.

pub mod booking_registry;
pub mod client_event;
pub mod event;
pub mod event_bus;
pub mod filter;
pub mod ids;
pub mod reservation;
pub mod snapshot;
pub mod user;

pub use booking_registry::{BookingRegistry, EventLedger, StatusChange};
pub use client_event::{ClientEvent, CycleOutcomeKind};
pub use event::{Event, EventDetails, EventDraft};
pub use event_bus::{EventBus, Notification, Subscription};
pub use filter::{FilterSpec, FilteredView, Searchable, filter};
pub use ids::{EventId, ReservationId, UserId};
pub use reservation::{
    Reservation, ReservationField, ReservationStatus, ReservationSummary, Transition,
};
pub use snapshot::{
    DashboardSnapshot, EventTotals, Period, PeriodPoint, RecentEvent, RecentReservation,
    ReservationTotals, UserTotals,
};
pub use user::{Organizer, Role, User, UserField, UserStatus, UserSummary};
