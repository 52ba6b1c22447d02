//! `reqwest` implementation of [`Backend`].

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::backend::{Backend, BookingRequest};
use super::dto::{
    CreateReservationRequest, EventDto, EventStatsDto, EventWriteRequest, HistoryPointDto,
    ReservationDto, ReservationStatsDto, UserDto, UserStatsDto,
};
use crate::domain::{
    Event, EventDraft, EventId, EventTotals, Period, PeriodPoint, Reservation, ReservationId,
    ReservationTotals, User, UserId, UserTotals,
};
use crate::error::ClientError;

/// Header carrying a fresh key for every reservation attempt.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// HTTP client for the EventConnect REST API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Creates a client rooted at `base_url` (e.g. `http://localhost:8080/api`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidRequest`] if `base_url` cannot carry a
    /// path, or [`ClientError::Transport`] if the TLS backend fails to
    /// initialize.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ClientError> {
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidRequest(format!(
                "{base_url} cannot be used as an API base"
            )));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Base URL all paths are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ClientError::InvalidRequest(format!("{} cannot be used as an API base", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        let url = self.url(segments)?;
        debug!(%method, %url, "backend request");
        Ok(self.client.request(method, url))
    }

    /// Sends the request and returns the body of a 2xx response.
    async fn send(&self, request: RequestBuilder, booking: Option<u32>) -> Result<String, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(ClientError::from_status(status.as_u16(), &body, booking))
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let body = self.send(request, None).await?;
        decode(&body)
    }

    async fn fetch_list<D, T>(&self, request: RequestBuilder) -> Result<Vec<T>, ClientError>
    where
        D: DeserializeOwned,
        T: TryFrom<D, Error = ClientError>,
    {
        let items: Vec<D> = self.fetch(request).await?;
        items.into_iter().map(T::try_from).collect()
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|e| {
        ClientError::MalformedResponse(format!("unexpected response shape: {e}"))
    })
}

impl Backend for HttpBackend {
    async fn event_stats(&self) -> Result<EventTotals, ClientError> {
        let dto: EventStatsDto = self
            .fetch(self.request(Method::GET, &["evenements", "stats"])?)
            .await?;
        Ok(dto.into())
    }

    async fn user_stats(&self) -> Result<UserTotals, ClientError> {
        let dto: UserStatsDto = self
            .fetch(self.request(Method::GET, &["utilisateurs", "stats"])?)
            .await?;
        Ok(dto.into())
    }

    async fn reservation_stats(&self) -> Result<ReservationTotals, ClientError> {
        let dto: ReservationStatsDto = self
            .fetch(self.request(Method::GET, &["reservations", "stats"])?)
            .await?;
        Ok(dto.into())
    }

    async fn historical_stats(
        &self,
        period: Period,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PeriodPoint>, ClientError> {
        let mut url = self.url(&["reservations", "stats", "historique"])?;
        url.query_pairs_mut()
            .append_pair("period", period.as_query())
            .append_pair("startDate", &start.format("%Y-%m-%d").to_string())
            .append_pair("endDate", &end.format("%Y-%m-%d").to_string());
        debug!(%url, "backend request");
        self.fetch_list::<HistoryPointDto, _>(self.client.get(url))
            .await
    }

    async fn active_events(&self) -> Result<Vec<Event>, ClientError> {
        self.fetch_list::<EventDto, _>(self.request(Method::GET, &["evenements", "actifs"])?)
            .await
    }

    async fn search_events(&self, query: &str) -> Result<Vec<Event>, ClientError> {
        let mut url = self.url(&["evenements", "search"])?;
        url.query_pairs_mut().append_pair("q", query);
        debug!(%url, "backend request");
        self.fetch_list::<EventDto, _>(self.client.get(url)).await
    }

    async fn event(&self, id: EventId) -> Result<Event, ClientError> {
        let id = id.to_string();
        let dto: EventDto = self
            .fetch(self.request(Method::GET, &["evenements", &id])?)
            .await?;
        dto.try_into()
    }

    async fn create_event(&self, draft: &EventDraft) -> Result<Event, ClientError> {
        let request = self
            .request(Method::POST, &["evenements"])?
            .json(&EventWriteRequest::from(draft));
        let dto: EventDto = self.fetch(request).await?;
        dto.try_into()
    }

    async fn update_event(&self, id: EventId, draft: &EventDraft) -> Result<Event, ClientError> {
        let id = id.to_string();
        let request = self
            .request(Method::PUT, &["evenements", &id])?
            .json(&EventWriteRequest::from(draft));
        let dto: EventDto = self.fetch(request).await?;
        dto.try_into()
    }

    async fn delete_event(&self, id: EventId) -> Result<(), ClientError> {
        let id = id.to_string();
        self.send(self.request(Method::DELETE, &["evenements", &id])?, None)
            .await
            .map(drop)
    }

    async fn users(&self) -> Result<Vec<User>, ClientError> {
        self.fetch_list::<UserDto, _>(self.request(Method::GET, &["utilisateurs"])?)
            .await
    }

    async fn toggle_user_status(&self, id: UserId) -> Result<User, ClientError> {
        let id = id.to_string();
        let dto: UserDto = self
            .fetch(self.request(Method::PATCH, &["utilisateurs", &id, "toggle-status"])?)
            .await?;
        dto.try_into()
    }

    async fn reservations(&self) -> Result<Vec<Reservation>, ClientError> {
        self.fetch_list::<ReservationDto, _>(self.request(Method::GET, &["reservations"])?)
            .await
    }

    async fn create_reservation(
        &self,
        request: BookingRequest,
        token: &str,
    ) -> Result<Reservation, ClientError> {
        let body = CreateReservationRequest {
            evenement_id: request.event_id,
            nombre_places: request.seats,
        };
        let key = uuid::Uuid::new_v4();
        let http = self
            .request(Method::POST, &["reservations"])?
            .bearer_auth(token)
            .header(IDEMPOTENCY_HEADER, key.to_string())
            .json(&body);
        let raw = self.send(http, Some(request.seats)).await?;
        let dto: ReservationDto = decode(&raw)?;
        dto.try_into()
    }

    async fn confirm_reservation(&self, id: ReservationId) -> Result<(), ClientError> {
        let id = id.to_string();
        self.send(
            self.request(Method::PATCH, &["reservations", &id, "confirmer"])?,
            None,
        )
        .await
        .map(drop)
    }

    async fn cancel_reservation(&self, id: ReservationId) -> Result<(), ClientError> {
        let id = id.to_string();
        self.send(
            self.request(Method::PATCH, &["reservations", &id, "annuler"])?,
            None,
        )
        .await
        .map(drop)
    }
}
