//! The REST collaborator consumed by the services.
//!
//! [`Backend`] mirrors the backend's endpoints one method per route and
//! returns domain types. [`super::HttpBackend`] is the production
//! implementation; tests substitute an in-memory one.

use std::future::Future;

use chrono::NaiveDate;

use crate::domain::{
    Event, EventDraft, EventId, EventTotals, Period, PeriodPoint, Reservation, ReservationId,
    ReservationTotals, User, UserId, UserTotals,
};
use crate::error::ClientError;

/// Reservation request sent on `POST /reservations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingRequest {
    /// Event to book.
    pub event_id: EventId,
    /// Places requested (at least 1).
    pub seats: u32,
}

/// Backend endpoints used by the admin client.
///
/// Every method resolves to a domain value or a [`ClientError`]; shape
/// errors in the response body surface as
/// [`ClientError::MalformedResponse`].
pub trait Backend: Send + Sync + 'static {
    /// `GET /evenements/stats`
    fn event_stats(&self) -> impl Future<Output = Result<EventTotals, ClientError>> + Send;

    /// `GET /utilisateurs/stats`
    fn user_stats(&self) -> impl Future<Output = Result<UserTotals, ClientError>> + Send;

    /// `GET /reservations/stats`
    fn reservation_stats(
        &self,
    ) -> impl Future<Output = Result<ReservationTotals, ClientError>> + Send;

    /// `GET /reservations/stats/historique?period=&startDate=&endDate=`
    fn historical_stats(
        &self,
        period: Period,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<Vec<PeriodPoint>, ClientError>> + Send;

    /// `GET /evenements/actifs`
    fn active_events(&self) -> impl Future<Output = Result<Vec<Event>, ClientError>> + Send;

    /// `GET /evenements/search?q=`
    fn search_events(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<Event>, ClientError>> + Send;

    /// `GET /evenements/{id}`
    fn event(&self, id: EventId) -> impl Future<Output = Result<Event, ClientError>> + Send;

    /// `POST /evenements`
    fn create_event(
        &self,
        draft: &EventDraft,
    ) -> impl Future<Output = Result<Event, ClientError>> + Send;

    /// `PUT /evenements/{id}`
    fn update_event(
        &self,
        id: EventId,
        draft: &EventDraft,
    ) -> impl Future<Output = Result<Event, ClientError>> + Send;

    /// `DELETE /evenements/{id}`
    fn delete_event(&self, id: EventId) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// `GET /utilisateurs`
    fn users(&self) -> impl Future<Output = Result<Vec<User>, ClientError>> + Send;

    /// `PATCH /utilisateurs/{id}/toggle-status`
    fn toggle_user_status(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<User, ClientError>> + Send;

    /// `GET /reservations`
    fn reservations(&self) -> impl Future<Output = Result<Vec<Reservation>, ClientError>> + Send;

    /// `POST /reservations` with a bearer token.
    ///
    /// A rejection by the backend (capacity exhausted, duplicate booking,
    /// past event) resolves to [`ClientError::CapacityExhausted`].
    fn create_reservation(
        &self,
        request: BookingRequest,
        token: &str,
    ) -> impl Future<Output = Result<Reservation, ClientError>> + Send;

    /// `PATCH /reservations/{id}/confirmer`
    fn confirm_reservation(
        &self,
        id: ReservationId,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// `PATCH /reservations/{id}/annuler`
    fn cancel_reservation(
        &self,
        id: ReservationId,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}
