//! # eventconnect-admin
//!
//! Client core of the EventConnect administration console.
//!
//! The crate talks to the EventConnect REST backend and keeps the state
//! an admin console renders: a dashboard assembled from independent
//! statistic sources that may fail one by one, a booking layer that
//! keeps each event's capacity consistent with its reservations, and
//! deterministic filtering over the loaded lists. Rendering is left to
//! whoever subscribes to the [`domain::EventBus`].
//!
//! ## Architecture
//!
//! ```text
//! Rendering collaborator
//!     │            ▲
//!     │            └── EventBus (domain/)
//!     │
//!     ├── DashboardAggregator, BookingService,
//!     │   EventCatalog, UserDirectory (service/)
//!     │
//!     ├── BookingRegistry, FilterEngine (domain/)
//!     │
//!     ├── Backend trait / HttpBackend (api/)
//!     │
//!     └── SessionStore (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;

#[cfg(test)]
mod test_support;
