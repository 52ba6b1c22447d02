//! Fixtures and an in-memory [`Backend`] for unit tests.

#![allow(clippy::panic)]

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, Notify};

use crate::api::{Backend, BookingRequest};
use crate::domain::{
    Event, EventDetails, EventDraft, EventId, EventTotals, Period, PeriodPoint, Reservation,
    ReservationId, ReservationStatus, ReservationTotals, Role, User, UserId, UserTotals,
};
use crate::error::ClientError;

/// `2025-08-15T10:30:00`, shifted by `days`.
pub fn timestamp(days: i64) -> NaiveDateTime {
    let Some(base) = NaiveDate::from_ymd_opt(2025, 8, 15).and_then(|d| d.and_hms_opt(10, 30, 0))
    else {
        panic!("valid date");
    };
    base + chrono::Duration::days(days)
}

/// An upcoming event with the given counters.
pub fn event(id: i64, capacity: u32, reserved: u32) -> Event {
    let starts_at = timestamp(30);
    let details = EventDetails {
        title: format!("Event {id}"),
        description: None,
        starts_at,
        ends_at: starts_at + chrono::Duration::hours(8),
        location: "Paris".to_string(),
        category: Some("CONFERENCE".to_string()),
        price: Decimal::new(2500, 2),
    };
    let Ok(event) = Event::new(EventId::new(id), details, capacity, reserved) else {
        panic!("valid event");
    };
    event
}

/// A reservation priced in cents.
pub fn reservation(
    id: i64,
    event_id: i64,
    seats: u32,
    status: ReservationStatus,
    price_cents: i64,
) -> Reservation {
    let Ok(reservation) = Reservation::new(
        ReservationId::new(id),
        EventId::new(event_id),
        seats,
        Decimal::new(price_cents, 2),
        status,
        timestamp(0),
    ) else {
        panic!("valid reservation");
    };
    reservation
}

/// A `USER` account with a derived email.
pub fn user(id: i64, first: &str, last: &str, active: bool) -> User {
    let email = format!("{}.{}@email.com", first.to_lowercase(), last.to_lowercase());
    let Ok(user) = User::new(UserId::new(id), first, last, &email, Role::User, active) else {
        panic!("valid user");
    };
    user
}

#[derive(Debug, Default)]
struct FakeState {
    event_totals: EventTotals,
    user_totals: UserTotals,
    reservation_totals: ReservationTotals,
    daily: Vec<PeriodPoint>,
    monthly: Vec<PeriodPoint>,
    events: Vec<Event>,
    reservations: Vec<Reservation>,
    users: Vec<User>,
    failures: HashMap<&'static str, ClientError>,
    calls: HashMap<&'static str, usize>,
    next_id: i64,
}

/// Scriptable in-memory backend.
///
/// - [`FakeBackend::fail`] makes one endpoint return an error until cleared.
/// - [`FakeBackend::gate`] holds the next call of an endpoint, after it has
///   read its answer, until the returned [`Notify`] is signalled.
/// - The fake keeps its own copy of events and enforces capacity on
///   `create_reservation`, so other clients can be simulated with
///   [`FakeBackend::take_seats`].
#[derive(Debug, Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
    gates: Mutex<HashMap<&'static str, Arc<Notify>>>,
}

impl FakeBackend {
    /// An empty backend.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_id: 1000,
                ..FakeState::default()
            }),
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// A backend serving the given events and reservations.
    pub async fn with_data(events: Vec<Event>, reservations: Vec<Reservation>) -> Self {
        let backend = Self::new();
        {
            let mut state = backend.state.lock().await;
            state.events = events;
            state.reservations = reservations;
        }
        backend
    }

    /// Makes `endpoint` fail with `error`.
    pub async fn fail(&self, endpoint: &'static str, error: ClientError) {
        self.state.lock().await.failures.insert(endpoint, error);
    }

    /// Lets `endpoint` succeed again.
    pub async fn clear_failure(&self, endpoint: &'static str) {
        self.state.lock().await.failures.remove(endpoint);
    }

    /// Holds the next call of `endpoint` until the returned handle is
    /// notified.
    pub async fn gate(&self, endpoint: &'static str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates.lock().await.insert(endpoint, Arc::clone(&notify));
        notify
    }

    /// Number of calls made to `endpoint`.
    pub async fn calls(&self, endpoint: &'static str) -> usize {
        self.state.lock().await.calls.get(endpoint).copied().unwrap_or(0)
    }

    /// Sets the `GET /evenements/stats` answer.
    pub async fn set_event_totals(&self, totals: EventTotals) {
        self.state.lock().await.event_totals = totals;
    }

    /// Sets the `GET /reservations/stats` answer.
    pub async fn set_reservation_totals(&self, totals: ReservationTotals) {
        self.state.lock().await.reservation_totals = totals;
    }

    /// Sets the `GET /utilisateurs/stats` answer.
    pub async fn set_user_totals(&self, totals: UserTotals) {
        self.state.lock().await.user_totals = totals;
    }

    /// Sets both history series.
    pub async fn set_history(&self, daily: Vec<PeriodPoint>, monthly: Vec<PeriodPoint>) {
        let mut state = self.state.lock().await;
        state.daily = daily;
        state.monthly = monthly;
    }

    /// Sets the `GET /utilisateurs` answer.
    pub async fn set_users(&self, users: Vec<User>) {
        self.state.lock().await.users = users;
    }

    /// Books seats server-side on behalf of another client.
    pub async fn take_seats(&self, event_id: EventId, seats: u32) {
        let mut state = self.state.lock().await;
        let Some(event) = state.events.iter_mut().find(|e| e.id == event_id) else {
            panic!("unknown event {event_id}");
        };
        let Ok(()) = event.debit(seats) else {
            panic!("not enough seats to take");
        };
    }

    /// Server-side view of an event.
    pub async fn server_event(&self, event_id: EventId) -> Option<Event> {
        self.state
            .lock()
            .await
            .events
            .iter()
            .find(|e| e.id == event_id)
            .cloned()
    }

    /// Records the call, returns the injected failure, and reads the answer.
    async fn answer<T>(
        &self,
        endpoint: &'static str,
        read: impl FnOnce(&mut FakeState) -> Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        let gate = self.gates.lock().await.remove(endpoint);
        let result = {
            let mut state = self.state.lock().await;
            *state.calls.entry(endpoint).or_insert(0) += 1;
            match state.failures.get(endpoint) {
                Some(error) => Err(error.clone()),
                None => read(&mut state),
            }
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        result
    }
}

impl Backend for FakeBackend {
    async fn event_stats(&self) -> Result<EventTotals, ClientError> {
        self.answer("event_stats", |s| Ok(s.event_totals.clone())).await
    }

    async fn user_stats(&self) -> Result<UserTotals, ClientError> {
        self.answer("user_stats", |s| Ok(s.user_totals.clone())).await
    }

    async fn reservation_stats(&self) -> Result<ReservationTotals, ClientError> {
        self.answer("reservation_stats", |s| Ok(s.reservation_totals.clone()))
            .await
    }

    async fn historical_stats(
        &self,
        period: Period,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<PeriodPoint>, ClientError> {
        match period {
            Period::Daily => self.answer("daily_history", |s| Ok(s.daily.clone())).await,
            Period::Monthly => self.answer("monthly_history", |s| Ok(s.monthly.clone())).await,
        }
    }

    async fn active_events(&self) -> Result<Vec<Event>, ClientError> {
        self.answer("active_events", |s| Ok(s.events.clone())).await
    }

    async fn search_events(&self, query: &str) -> Result<Vec<Event>, ClientError> {
        let needle = query.to_lowercase();
        self.answer("search_events", |s| {
            Ok(s.events
                .iter()
                .filter(|e| e.details.title.to_lowercase().contains(&needle))
                .cloned()
                .collect())
        })
        .await
    }

    async fn event(&self, id: EventId) -> Result<Event, ClientError> {
        self.answer("event", |s| {
            s.events
                .iter()
                .find(|e| e.id == id)
                .cloned()
                .ok_or(ClientError::HttpStatus {
                    status: 404,
                    message: "Not Found".to_string(),
                })
        })
        .await
    }

    async fn create_event(&self, draft: &EventDraft) -> Result<Event, ClientError> {
        self.answer("create_event", |s| {
            s.next_id += 1;
            let event = Event::new(
                EventId::new(s.next_id),
                draft.details.clone(),
                draft.capacity_max,
                0,
            )?;
            s.events.push(event.clone());
            Ok(event)
        })
        .await
    }

    async fn update_event(&self, id: EventId, draft: &EventDraft) -> Result<Event, ClientError> {
        self.answer("update_event", |s| {
            let Some(event) = s.events.iter_mut().find(|e| e.id == id) else {
                return Err(ClientError::HttpStatus {
                    status: 404,
                    message: "Not Found".to_string(),
                });
            };
            event
                .revise(draft.details.clone(), draft.capacity_max)
                .map_err(|e| ClientError::HttpStatus {
                    status: 400,
                    message: e.to_string(),
                })?;
            Ok(event.clone())
        })
        .await
    }

    async fn delete_event(&self, id: EventId) -> Result<(), ClientError> {
        self.answer("delete_event", |s| {
            s.events.retain(|e| e.id != id);
            Ok(())
        })
        .await
    }

    async fn users(&self) -> Result<Vec<User>, ClientError> {
        self.answer("users", |s| Ok(s.users.clone())).await
    }

    async fn toggle_user_status(&self, id: UserId) -> Result<User, ClientError> {
        self.answer("toggle_user_status", |s| {
            let Some(user) = s.users.iter_mut().find(|u| u.id == id) else {
                return Err(ClientError::HttpStatus {
                    status: 404,
                    message: "Not Found".to_string(),
                });
            };
            user.active = !user.active;
            Ok(user.clone())
        })
        .await
    }

    async fn reservations(&self) -> Result<Vec<Reservation>, ClientError> {
        self.answer("reservations", |s| Ok(s.reservations.clone())).await
    }

    async fn create_reservation(
        &self,
        request: BookingRequest,
        token: &str,
    ) -> Result<Reservation, ClientError> {
        let token = token.to_string();
        self.answer("create_reservation", move |s| {
            if token.is_empty() {
                return Err(ClientError::Auth("Unauthorized".to_string()));
            }
            let Some(event) = s.events.iter_mut().find(|e| e.id == request.event_id) else {
                return Err(ClientError::HttpStatus {
                    status: 404,
                    message: "Not Found".to_string(),
                });
            };
            if event.debit(request.seats).is_err() {
                return Err(ClientError::CapacityExhausted {
                    requested: request.seats,
                    available: None,
                    reason: "Places insuffisantes".to_string(),
                });
            }
            let price = event.details.price * Decimal::from(request.seats);
            s.next_id += 1;
            let reservation = Reservation::new(
                ReservationId::new(s.next_id),
                request.event_id,
                request.seats,
                price,
                ReservationStatus::Pending,
                timestamp(1),
            )?;
            s.reservations.push(reservation.clone());
            Ok(reservation)
        })
        .await
    }

    async fn confirm_reservation(&self, id: ReservationId) -> Result<(), ClientError> {
        self.answer("confirm_reservation", |s| {
            let Some(reservation) = s.reservations.iter_mut().find(|r| r.id == id) else {
                return Err(ClientError::HttpStatus {
                    status: 404,
                    message: "Not Found".to_string(),
                });
            };
            reservation.apply(ReservationStatus::Confirmed).map(drop)
        })
        .await
    }

    async fn cancel_reservation(&self, id: ReservationId) -> Result<(), ClientError> {
        self.answer("cancel_reservation", |s| {
            let Some(reservation) = s.reservations.iter_mut().find(|r| r.id == id) else {
                return Err(ClientError::HttpStatus {
                    status: 404,
                    message: "Not Found".to_string(),
                });
            };
            let seats = reservation.seat_count();
            let event_id = reservation.event_id;
            let held = reservation.holds_places();
            reservation.apply(ReservationStatus::Cancelled)?;
            if held && let Some(event) = s.events.iter_mut().find(|e| e.id == event_id) {
                event.credit(seats)?;
            }
            Ok(())
        })
        .await
    }
}
