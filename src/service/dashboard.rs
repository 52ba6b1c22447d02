//! Dashboard fan-out: one load cycle queries every source concurrently
//! and publishes a complete snapshot.
//!
//! Each cycle is tagged with a generation number taken from an atomic
//! counter. Starting a cycle invalidates every older one; a cycle that
//! completes after a newer one started is discarded at publication time
//! and never overwrites the current snapshot.
//!
//! ```text
//! begin_cycle() ──► generation N
//!                     │
//! run_cycle(N) ──► join!(event_stats, user_stats, reservation_stats,
//!                        daily, monthly, active_events, reservations)
//!                     │  each wrapped in fetch_or_default + timeout
//!                     ▼
//!               N still current? ── no ──► CycleDiscarded
//!                     │ yes
//!                     ▼
//!   refresh booking registry, unless a booking committed or is in flight
//!                     │
//!                     ▼
//!               publish snapshot
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Datelike, Local, Months, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use super::defaulting::{SourceFailure, fetch_or_default};
use crate::api::Backend;
use crate::domain::{
    BookingRegistry, ClientEvent, CycleOutcomeKind, DashboardSnapshot, Event, EventBus,
    EventTotals, Period, RecentEvent, RecentReservation, Reservation, ReservationTotals,
    UserTotals,
};

/// Tunables of the dashboard load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    /// Deadline for each source fetch.
    pub source_timeout: Duration,
    /// Days covered by the daily revenue series (including today).
    pub history_days: u32,
    /// Months covered by the monthly revenue series (including the
    /// current month).
    pub history_months: u32,
    /// Size of the recent events and recent reservations lists.
    pub recent_items: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            source_timeout: Duration::from_millis(8_000),
            history_days: 7,
            history_months: 12,
            recent_items: 3,
        }
    }
}

/// Lifecycle of the dashboard as seen by the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "failures", rename_all = "snake_case")]
pub enum CycleStatus {
    /// A cycle is in flight and nothing newer has been published.
    Loading,
    /// Every source answered.
    Ready,
    /// Some sources were defaulted; their reasons are listed.
    ReadyWithErrors(Vec<SourceFailure>),
}

impl CycleStatus {
    /// Human-readable reasons of the defaulted sources.
    #[must_use]
    pub fn failures(&self) -> &[SourceFailure] {
        match self {
            Self::ReadyWithErrors(failures) => failures,
            Self::Loading | Self::Ready => &[],
        }
    }
}

/// Ticket for one load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleHandle {
    generation: u64,
}

impl CycleHandle {
    /// Generation number of this cycle.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// A snapshot that has been made visible.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedDashboard {
    /// Generation of the cycle that built it.
    pub generation: u64,
    /// The snapshot.
    pub snapshot: DashboardSnapshot,
    /// `Ready` or `ReadyWithErrors`.
    pub status: CycleStatus,
    /// Completion time.
    pub completed_at: DateTime<Utc>,
}

/// Result of running a cycle.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// The cycle was current and its snapshot is now visible.
    Published(Arc<PublishedDashboard>),
    /// A newer cycle started before this one completed.
    Superseded {
        /// Generation of the discarded cycle.
        generation: u64,
        /// Generation current at completion.
        current: u64,
    },
}

impl CycleOutcome {
    /// The published dashboard, if this cycle was current.
    #[must_use]
    pub fn published(&self) -> Option<&Arc<PublishedDashboard>> {
        match self {
            Self::Published(dashboard) => Some(dashboard),
            Self::Superseded { .. } => None,
        }
    }
}

/// Fan-out aggregator for the admin dashboard.
#[derive(Debug)]
pub struct DashboardAggregator<B: Backend> {
    backend: Arc<B>,
    registry: Arc<BookingRegistry>,
    settings: DashboardSettings,
    generation: AtomicU64,
    published: RwLock<Option<Arc<PublishedDashboard>>>,
    event_bus: EventBus,
}

impl<B: Backend> DashboardAggregator<B> {
    /// Creates an aggregator with nothing published.
    #[must_use]
    pub fn new(
        backend: Arc<B>,
        registry: Arc<BookingRegistry>,
        settings: DashboardSettings,
        event_bus: EventBus,
    ) -> Self {
        Self {
            backend,
            registry,
            settings,
            generation: AtomicU64::new(0),
            published: RwLock::new(None),
            event_bus,
        }
    }

    /// Starts a new cycle, invalidating every cycle started before it.
    pub fn begin_cycle(&self) -> CycleHandle {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(generation, "dashboard cycle started");
        CycleHandle { generation }
    }

    /// Generation of the most recently started cycle.
    #[must_use]
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// The last published dashboard.
    pub async fn current(&self) -> Option<Arc<PublishedDashboard>> {
        self.published.read().await.clone()
    }

    /// `Loading` while the newest started cycle has not published yet,
    /// otherwise the status of the published snapshot.
    pub async fn status(&self) -> CycleStatus {
        let current = self.current_generation();
        match self.published.read().await.as_ref() {
            Some(dashboard) if dashboard.generation == current => dashboard.status.clone(),
            _ => CycleStatus::Loading,
        }
    }

    /// Starts and runs a cycle for today's date.
    pub async fn reload(&self) -> CycleOutcome {
        let handle = self.begin_cycle();
        self.run_cycle(handle, Local::now().date_naive()).await
    }

    /// Queries every source concurrently and publishes the snapshot if
    /// `handle` is still the current cycle.
    pub async fn run_cycle(&self, handle: CycleHandle, today: NaiveDate) -> CycleOutcome {
        let generation = handle.generation;
        let timeout = self.settings.source_timeout;
        let backend = &self.backend;
        let (daily_start, monthly_start) = self.history_starts(today);
        let registry_version = self.registry.version();

        let (event_totals, user_totals, reservation_totals, daily, monthly, events, reservations) = tokio::join!(
            fetch_or_default(
                "event_stats",
                EventTotals::default(),
                timeout,
                generation,
                backend.event_stats()
            ),
            fetch_or_default(
                "user_stats",
                UserTotals::default(),
                timeout,
                generation,
                backend.user_stats()
            ),
            fetch_or_default(
                "reservation_stats",
                ReservationTotals::default(),
                timeout,
                generation,
                backend.reservation_stats()
            ),
            fetch_or_default(
                "daily_history",
                Vec::new(),
                timeout,
                generation,
                backend.historical_stats(Period::Daily, daily_start, today)
            ),
            fetch_or_default(
                "monthly_history",
                Vec::new(),
                timeout,
                generation,
                backend.historical_stats(Period::Monthly, monthly_start, today)
            ),
            fetch_or_default(
                "active_events",
                Vec::new(),
                timeout,
                generation,
                backend.active_events()
            ),
            fetch_or_default(
                "reservations",
                Vec::new(),
                timeout,
                generation,
                backend.reservations()
            ),
        );
        let lists_loaded = !events.is_defaulted() && !reservations.is_defaulted();

        let mut failures = Vec::new();
        let events: Vec<Event> = events.collect_into(&mut failures);
        let reservations: Vec<Reservation> = reservations.collect_into(&mut failures);
        let snapshot = DashboardSnapshot {
            events: event_totals.collect_into(&mut failures),
            users: user_totals.collect_into(&mut failures),
            reservations: reservation_totals.collect_into(&mut failures),
            daily: daily.collect_into(&mut failures),
            monthly: monthly.collect_into(&mut failures),
            recent_events: self.recent_events(&events),
            recent_reservations: self.recent_reservations(&reservations),
        };

        if lists_loaded && generation == self.current_generation() {
            let installed = self
                .registry
                .replace_all_if_unchanged(registry_version, events, reservations)
                .await;
            if !installed {
                tracing::debug!(generation, "booking state changed during cycle, registry kept");
            }
        }

        let mut published = self.published.write().await;
        let current = self.current_generation();
        let newer_published = published.as_ref().is_some_and(|p| p.generation >= generation);
        if generation != current || newer_published {
            drop(published);
            tracing::debug!(generation, current, "stale dashboard cycle discarded");
            let _ = self.event_bus.publish(ClientEvent::CycleDiscarded {
                generation,
                current,
                timestamp: Utc::now(),
            });
            return CycleOutcome::Superseded {
                generation,
                current,
            };
        }

        let failure_count = failures.len();
        let (status, outcome) = if failures.is_empty() {
            (CycleStatus::Ready, CycleOutcomeKind::Ready)
        } else {
            (
                CycleStatus::ReadyWithErrors(failures),
                CycleOutcomeKind::ReadyWithErrors,
            )
        };
        let dashboard = Arc::new(PublishedDashboard {
            generation,
            snapshot,
            status,
            completed_at: Utc::now(),
        });
        *published = Some(Arc::clone(&dashboard));
        drop(published);

        tracing::info!(generation, failures = failure_count, "dashboard snapshot published");
        let _ = self.event_bus.publish(ClientEvent::SnapshotPublished {
            generation,
            outcome,
            failures: failure_count,
            timestamp: dashboard.completed_at,
        });
        CycleOutcome::Published(dashboard)
    }

    fn history_starts(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let days = u64::from(self.settings.history_days.saturating_sub(1));
        let daily = today
            .checked_sub_days(chrono::Days::new(days))
            .unwrap_or(today);
        let first_of_month = today.with_day(1).unwrap_or(today);
        let months = self.settings.history_months.saturating_sub(1);
        let monthly = first_of_month
            .checked_sub_months(Months::new(months))
            .unwrap_or(first_of_month);
        (daily, monthly)
    }

    fn recent_events(&self, events: &[Event]) -> Vec<RecentEvent> {
        events
            .iter()
            .take(self.settings.recent_items)
            .map(|e| RecentEvent {
                id: e.id,
                title: e.details.title.clone(),
                starts_at: e.details.starts_at,
                places_reserved: e.places_reserved(),
            })
            .collect()
    }

    fn recent_reservations(&self, reservations: &[Reservation]) -> Vec<RecentReservation> {
        reservations
            .iter()
            .take(self.settings.recent_items)
            .map(|r| RecentReservation {
                id: r.id,
                user_name: r.user_name.clone(),
                event_title: r.event_title.clone(),
                status: r.status(),
            })
            .collect()
    }
}
