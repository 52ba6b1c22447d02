//! Event catalog: search, read and edit events.
//!
//! Every event the backend returns is merged into the shared
//! [`BookingRegistry`], so capacity bookkeeping lives in one place for
//! the booking service and the catalog alike.

use std::sync::Arc;

use chrono::Utc;

use crate::api::Backend;
use crate::domain::{BookingRegistry, ClientEvent, Event, EventBus, EventDraft, EventId, Organizer};
use crate::error::ClientError;

/// Reads and edits events.
#[derive(Debug)]
pub struct EventCatalog<B: Backend> {
    backend: Arc<B>,
    registry: Arc<BookingRegistry>,
    event_bus: EventBus,
}

impl<B: Backend> EventCatalog<B> {
    /// Creates a new `EventCatalog`.
    #[must_use]
    pub fn new(backend: Arc<B>, registry: Arc<BookingRegistry>, event_bus: EventBus) -> Self {
        Self {
            backend,
            registry,
            event_bus,
        }
    }

    /// Loaded events, sorted by start date.
    pub async fn events(&self) -> Vec<Event> {
        self.registry.events().await
    }

    /// Searches events by text.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn search(&self, query: &str) -> Result<Vec<Event>, ClientError> {
        let found = self.backend.search_events(query.trim()).await?;
        for event in &found {
            self.registry.upsert_event(event.clone()).await;
        }
        tracing::debug!(query, count = found.len(), "event search");
        Ok(found)
    }

    /// Fetches one event from the backend.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn get(&self, id: EventId) -> Result<Event, ClientError> {
        let event = self.backend.event(id).await?;
        self.registry.upsert_event(event.clone()).await;
        Ok(event)
    }

    /// Creates an event.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] for an invalid draft (nothing is sent),
    /// or the backend error.
    pub async fn create(&self, draft: &EventDraft) -> Result<Event, ClientError> {
        draft.validate()?;
        let created = self.backend.create_event(draft).await.inspect_err(|e| {
            tracing::warn!(title = %draft.details.title, error = %e, "event not created");
        })?;
        self.registry.upsert_event(created.clone()).await;
        self.saved(created.id, "event created");
        Ok(created)
    }

    /// Updates an event.
    ///
    /// When the event is loaded, its ledger stays locked until the answer
    /// is merged, so no booking can slip in between the capacity check and
    /// the update.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] for an invalid draft or a capacity
    /// below the places already reserved (nothing is sent), or the backend
    /// error.
    pub async fn update(&self, id: EventId, draft: &EventDraft) -> Result<Event, ClientError> {
        draft.validate()?;
        let Ok(ledger) = self.registry.ledger(id).await else {
            let updated = self.backend.update_event(id, draft).await?;
            self.registry.upsert_event(updated.clone()).await;
            self.saved(id, "event updated");
            return Ok(updated);
        };

        let mut guard = ledger.lock().await;
        if let Some(reserved) = guard.event().map(Event::places_reserved)
            && draft.capacity_max < reserved
        {
            return Err(ClientError::Validation(vec![format!(
                "capaciteMax: capacity {} is below the {reserved} places already reserved",
                draft.capacity_max
            )]));
        }
        let updated = self.backend.update_event(id, draft).await.inspect_err(|e| {
            tracing::warn!(event_id = %id, error = %e, "event not updated");
        })?;
        self.registry.commit_event(&mut guard, updated.clone())?;
        drop(guard);

        self.saved(id, "event updated");
        Ok(updated)
    }

    /// Deletes an event and forgets its reservations.
    ///
    /// # Errors
    ///
    /// Returns the backend error; local state is unchanged.
    pub async fn delete(&self, id: EventId) -> Result<(), ClientError> {
        let ledger = self.registry.ledger(id).await.ok();
        {
            let _guard = match &ledger {
                Some(ledger) => Some(ledger.lock().await),
                None => None,
            };
            self.backend.delete_event(id).await.inspect_err(|e| {
                tracing::warn!(event_id = %id, error = %e, "event not deleted");
            })?;
        }
        self.registry.remove_event(id).await;

        tracing::info!(event_id = %id, "event deleted");
        let _ = self.event_bus.publish(ClientEvent::EventRemoved {
            event_id: id,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Accounts selectable as organizer on the event form.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn organizers(&self) -> Result<Vec<Organizer>, ClientError> {
        let users = self.backend.users().await?;
        Ok(users.iter().map(Organizer::from).collect())
    }

    fn saved(&self, event_id: EventId, message: &'static str) {
        tracing::info!(%event_id, "{message}");
        let _ = self.event_bus.publish(ClientEvent::EventSaved {
            event_id,
            timestamp: Utc::now(),
        });
    }
}
