//! Dashboard snapshot assembled by one load cycle.
//!
//! A [`DashboardSnapshot`] is built wholesale from the results of every
//! source of a cycle and replaced as a unit; it is never patched field by
//! field across cycles.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{EventId, ReservationId, ReservationStatus};

/// Event counters from `GET /evenements/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventTotals {
    /// All events.
    pub total: u64,
    /// Events starting in the future.
    pub upcoming: u64,
    /// Events with places left.
    pub available: u64,
}

/// User counters from `GET /utilisateurs/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserTotals {
    /// All user accounts.
    pub total: u64,
}

/// Reservation counters from `GET /reservations/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReservationTotals {
    /// All reservations.
    pub total: u64,
    /// Reservations awaiting confirmation.
    pub pending: u64,
    /// Total revenue.
    pub revenue: Decimal,
}

/// Granularity of a revenue time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Period {
    /// One point per day.
    Daily,
    /// One point per month.
    Monthly,
}

impl Period {
    /// Query-string value expected by the backend.
    #[must_use]
    pub const fn as_query(self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Monthly => "MONTHLY",
        }
    }
}

/// One point of a revenue time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodPoint {
    /// `YYYY-MM-DD` for daily points, `YYYY-MM` for monthly points.
    pub period: String,
    /// Revenue over the period.
    pub revenue: Decimal,
    /// Reservations made over the period.
    pub reservation_count: u64,
}

/// Compact event row for the dashboard's "recent events" card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentEvent {
    /// Event identifier.
    pub id: EventId,
    /// Display title.
    pub title: String,
    /// Start of the event.
    pub starts_at: NaiveDateTime,
    /// Places reserved so far.
    pub places_reserved: u32,
}

/// Compact reservation row for the dashboard's "recent reservations" card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentReservation {
    /// Reservation identifier.
    pub id: ReservationId,
    /// Holder display name.
    pub user_name: String,
    /// Reserved event title.
    pub event_title: String,
    /// Current status.
    pub status: ReservationStatus,
}

/// Everything the dashboard shows, as of one completed cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    /// Event counters.
    pub events: EventTotals,
    /// User counters.
    pub users: UserTotals,
    /// Reservation counters and revenue.
    pub reservations: ReservationTotals,
    /// Daily revenue series.
    pub daily: Vec<PeriodPoint>,
    /// Monthly revenue series.
    pub monthly: Vec<PeriodPoint>,
    /// First few active events.
    pub recent_events: Vec<RecentEvent>,
    /// First few reservations.
    pub recent_reservations: Vec<RecentReservation>,
}

impl DashboardSnapshot {
    /// Sum of revenue over the daily series.
    #[must_use]
    pub fn daily_revenue(&self) -> Decimal {
        self.daily.iter().map(|p| p.revenue).sum()
    }

    /// Sum of revenue over the monthly series.
    #[must_use]
    pub fn monthly_revenue(&self) -> Decimal {
        self.monthly.iter().map(|p| p.revenue).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_zeroed() {
        let snapshot = DashboardSnapshot::default();
        assert_eq!(snapshot.events.total, 0);
        assert_eq!(snapshot.reservations.revenue, Decimal::ZERO);
        assert!(snapshot.daily.is_empty());
        assert_eq!(snapshot.monthly_revenue(), Decimal::ZERO);
    }

    #[test]
    fn series_revenue_sums_points() {
        let snapshot = DashboardSnapshot {
            daily: vec![
                PeriodPoint {
                    period: "2025-08-15".to_string(),
                    revenue: Decimal::new(30000, 2),
                    reservation_count: 2,
                },
                PeriodPoint {
                    period: "2025-08-16".to_string(),
                    revenue: Decimal::new(15050, 2),
                    reservation_count: 1,
                },
            ],
            ..DashboardSnapshot::default()
        };
        assert_eq!(snapshot.daily_revenue(), Decimal::new(45050, 2));
    }

    #[test]
    fn period_query_values() {
        assert_eq!(Period::Daily.as_query(), "DAILY");
        assert_eq!(Period::Monthly.as_query(), "MONTHLY");
    }
}
