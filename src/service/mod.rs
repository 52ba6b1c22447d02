//! Service layer: business logic orchestration.
//!
//! [`DashboardAggregator`] fans out the dashboard sources and publishes
//! one snapshot per cycle. [`BookingService`] keeps event capacity and
//! reservation status consistent. [`EventCatalog`] and [`UserDirectory`]
//! cover the remaining admin pages, and [`SessionContext`] holds the
//! credentials they need. All of them emit through the
//! [`super::domain::EventBus`].

pub mod booking_service;
pub mod dashboard;
pub mod defaulting;
pub mod event_service;
pub mod session;
pub mod user_service;

pub use booking_service::BookingService;
pub use dashboard::{
    CycleHandle, CycleOutcome, CycleStatus, DashboardAggregator, DashboardSettings,
    PublishedDashboard,
};
pub use defaulting::{Resolved, SourceFailure, fetch_or_default};
pub use event_service::EventCatalog;
pub use session::SessionContext;
pub use user_service::UserDirectory;
