//! Booking service: keeps event capacity and reservation status consistent.
//!
//! Every operation is pessimistic: the backend acknowledges first, then
//! the event's capacity and the reservation's status are updated
//! together under the event's ledger lock. The lock is held from the
//! local pre-check until the commit, so concurrent actions on one event
//! observe each other's effects and a local refusal never races a
//! commit.

use std::sync::Arc;

use chrono::Utc;

use crate::api::{Backend, BookingRequest};
use crate::domain::{
    BookingRegistry, ClientEvent, Event, EventBus, EventId, FilterSpec, Reservation,
    ReservationField, ReservationId, ReservationStatus, ReservationSummary, StatusChange,
    Transition, filter,
};
use crate::error::ClientError;
use crate::service::SessionContext;

/// Status change requested by an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusAction {
    Confirm,
    Cancel,
}

impl StatusAction {
    const fn target(self) -> ReservationStatus {
        match self {
            Self::Confirm => ReservationStatus::Confirmed,
            Self::Cancel => ReservationStatus::Cancelled,
        }
    }
}

/// Create, confirm and cancel reservations against loaded events.
#[derive(Debug)]
pub struct BookingService<B: Backend> {
    backend: Arc<B>,
    registry: Arc<BookingRegistry>,
    session: Arc<SessionContext>,
    event_bus: EventBus,
}

impl<B: Backend> BookingService<B> {
    /// Creates a new `BookingService`.
    #[must_use]
    pub fn new(
        backend: Arc<B>,
        registry: Arc<BookingRegistry>,
        session: Arc<SessionContext>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            backend,
            registry,
            session,
            event_bus,
        }
    }

    /// Returns a reference to the inner [`BookingRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<BookingRegistry> {
        &self.registry
    }

    /// Reloads active events and all reservations from the backend.
    ///
    /// # Errors
    ///
    /// Returns the first backend error; local state is left unchanged.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let (events, reservations) =
            tokio::try_join!(self.backend.active_events(), self.backend.reservations())?;
        tracing::debug!(
            events = events.len(),
            reservations = reservations.len(),
            "booking state reloaded"
        );
        self.registry.replace_all(events, reservations).await;
        Ok(())
    }

    /// Books `seats` places on `event_id` for the logged-in user.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidRequest`] if `seats` is zero.
    /// - [`ClientError::Auth`] without an active session.
    /// - [`ClientError::NotFound`] if the event is not loaded.
    /// - [`ClientError::CapacityExhausted`] if fewer than `seats` places are
    ///   available locally, or the backend refused the booking.
    /// - Transport and HTTP errors from the backend.
    ///
    /// Local state changes only when the backend accepted the booking.
    pub async fn create(&self, event_id: EventId, seats: u32) -> Result<Reservation, ClientError> {
        if seats == 0 {
            return Err(ClientError::InvalidRequest(
                "at least one place must be booked".to_string(),
            ));
        }
        let token = self.session.bearer_token().await?;
        let ledger = self.registry.ledger(event_id).await?;
        let mut guard = ledger.lock().await;

        if let Err(e) = guard.check_capacity(seats) {
            tracing::warn!(%event_id, seats, error = %e, "reservation refused locally");
            return Err(e);
        }

        let request = BookingRequest { event_id, seats };
        let created = match self.backend.create_reservation(request, &token).await {
            Ok(created) => created,
            Err(e) => {
                tracing::warn!(
                    %event_id,
                    seats,
                    error = %e,
                    retryable = e.is_retryable(),
                    "reservation not created"
                );
                return Err(e);
            }
        };
        let created = self.with_session_holder(created).await;

        let available = match self.registry.commit_created(&mut guard, created.clone()).await {
            Ok(available) => available,
            Err(e) => {
                tracing::error!(
                    %event_id,
                    reservation_id = %created.id,
                    error = %e,
                    "backend accepted reservation but local state could not be updated"
                );
                return Err(e);
            }
        };
        drop(guard);

        tracing::info!(
            %event_id,
            reservation_id = %created.id,
            seats,
            places_available = available,
            "reservation created"
        );
        let _ = self.event_bus.publish(ClientEvent::ReservationCreated {
            reservation_id: created.id,
            event_id,
            seats,
            places_available: available,
            timestamp: Utc::now(),
        });
        Ok(created)
    }

    /// Confirms a reservation.
    ///
    /// Confirming a `CONFIRMED` reservation returns it unchanged without
    /// calling the backend. Capacity is not touched: places were taken at
    /// creation.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotFound`] for an unknown reservation.
    /// - [`ClientError::InvalidTransition`] for a `CANCELLED` reservation.
    /// - Transport and HTTP errors from the backend; the status is unchanged.
    pub async fn confirm(&self, id: ReservationId) -> Result<Reservation, ClientError> {
        self.change_status(id, StatusAction::Confirm)
            .await
            .map(|change| change.reservation)
    }

    /// Cancels a reservation and returns its places to the event.
    ///
    /// Cancelling a `CANCELLED` reservation returns it unchanged without
    /// calling the backend.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotFound`] for an unknown reservation.
    /// - Transport and HTTP errors from the backend; nothing is changed.
    pub async fn cancel(&self, id: ReservationId) -> Result<Reservation, ClientError> {
        self.change_status(id, StatusAction::Cancel)
            .await
            .map(|change| change.reservation)
    }

    async fn change_status(
        &self,
        id: ReservationId,
        action: StatusAction,
    ) -> Result<StatusChange, ClientError> {
        let target = action.target();
        let ledger = self.registry.ledger_of(id).await?;
        let mut guard = ledger.lock().await;

        let current = guard.reservation(id).ok_or(ClientError::NotFound {
            kind: "reservation",
            id: id.get(),
        })?;
        if current.status().transition_to(target)? == Transition::Unchanged {
            tracing::debug!(reservation_id = %id, status = target.label(), "status already set");
            return Ok(StatusChange {
                transition: Transition::Unchanged,
                seats_released: 0,
                reservation: current.clone(),
            });
        }

        let acknowledged = match action {
            StatusAction::Confirm => self.backend.confirm_reservation(id).await,
            StatusAction::Cancel => self.backend.cancel_reservation(id).await,
        };
        if let Err(e) = acknowledged {
            tracing::warn!(
                reservation_id = %id,
                status = target.label(),
                error = %e,
                retryable = e.is_retryable(),
                "status change not applied"
            );
            return Err(e);
        }

        let change = self
            .registry
            .commit_status(&mut guard, id, target)
            .inspect_err(|e| {
                tracing::error!(
                    reservation_id = %id,
                    status = target.label(),
                    error = %e,
                    "backend acknowledged status change but local state could not be updated"
                );
            })?;
        let event_id = guard.event_id();
        let places_available = guard.event().map(Event::places_available);
        drop(guard);

        tracing::info!(
            reservation_id = %id,
            %event_id,
            status = target.label(),
            seats_released = change.seats_released,
            "reservation status changed"
        );
        let timestamp = Utc::now();
        let _ = self.event_bus.publish(match action {
            StatusAction::Confirm => ClientEvent::ReservationConfirmed {
                reservation_id: id,
                event_id,
                timestamp,
            },
            StatusAction::Cancel => ClientEvent::ReservationCancelled {
                reservation_id: id,
                event_id,
                seats_released: change.seats_released,
                places_available,
                timestamp,
            },
        });
        Ok(change)
    }

    /// Every loaded reservation, in load order.
    pub async fn reservations(&self) -> Vec<Reservation> {
        self.registry.all_reservations().await
    }

    /// Loaded reservations matching `spec`, in load order.
    pub async fn filter_reservations(
        &self,
        spec: &FilterSpec<ReservationStatus, ReservationField>,
    ) -> Vec<Reservation> {
        let all = self.registry.all_reservations().await;
        filter(&all, spec).into_iter().cloned().collect()
    }

    /// Counters and confirmed revenue over every loaded reservation.
    pub async fn summary(&self) -> ReservationSummary {
        ReservationSummary::from_reservations(&self.registry.all_reservations().await)
    }

    /// Returns one loaded event.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if the event is not loaded.
    pub async fn event(&self, event_id: EventId) -> Result<Event, ClientError> {
        self.registry.event(event_id).await
    }

    async fn with_session_holder(&self, reservation: Reservation) -> Reservation {
        if reservation.user_id.is_some() || !reservation.user_email.is_empty() {
            return reservation;
        }
        match self.session.current().await {
            Some(session) => {
                let name = session.display_name();
                reservation.with_holder(session.id, &name, &session.email)
            }
            None => reservation,
        }
    }
}
