//! Shared application state: every service wired around one backend.

use std::sync::Arc;

use crate::api::{Backend, HttpBackend};
use crate::config::ClientConfig;
use crate::domain::{BookingRegistry, EventBus};
use crate::error::ClientError;
use crate::persistence::SessionStore;
use crate::service::{
    BookingService, DashboardAggregator, EventCatalog, SessionContext, UserDirectory,
};

/// Shared application state handed to the rendering collaborator.
///
/// The dashboard, the booking service and the event catalog share one
/// [`BookingRegistry`], so a published dashboard cycle and a booking
/// action see the same capacity counters.
#[derive(Debug)]
pub struct AppState<B: Backend = HttpBackend> {
    /// Current session.
    pub session: Arc<SessionContext>,
    /// Dashboard fan-out aggregator.
    pub dashboard: Arc<DashboardAggregator<B>>,
    /// Reservation actions.
    pub bookings: Arc<BookingService<B>>,
    /// Event catalog.
    pub events: Arc<EventCatalog<B>>,
    /// User directory.
    pub users: Arc<UserDirectory<B>>,
    /// Notifications for the rendering collaborator.
    pub event_bus: EventBus,
}

impl AppState<HttpBackend> {
    /// Builds the state around an [`HttpBackend`] described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let backend = HttpBackend::new(config.api_base_url.clone(), config.request_timeout)?;
        Ok(Self::new(Arc::new(backend), config))
    }
}

impl<B: Backend> AppState<B> {
    /// Builds the state around `backend`.
    #[must_use]
    pub fn new(backend: Arc<B>, config: &ClientConfig) -> Self {
        let registry = Arc::new(BookingRegistry::new());
        let event_bus = EventBus::new(config.event_bus_capacity);
        let session = Arc::new(SessionContext::new(SessionStore::new(
            config.session_path.clone(),
        )));

        let dashboard = Arc::new(DashboardAggregator::new(
            Arc::clone(&backend),
            Arc::clone(&registry),
            config.dashboard_settings(),
            event_bus.clone(),
        ));
        let bookings = Arc::new(BookingService::new(
            Arc::clone(&backend),
            Arc::clone(&registry),
            Arc::clone(&session),
            event_bus.clone(),
        ));
        let events = Arc::new(EventCatalog::new(
            Arc::clone(&backend),
            registry,
            event_bus.clone(),
        ));
        let users = Arc::new(UserDirectory::new(backend, event_bus.clone()));

        Self {
            session,
            dashboard,
            bookings,
            events,
            users,
            event_bus,
        }
    }
}
