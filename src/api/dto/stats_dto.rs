//! Statistics DTOs for the dashboard sources.
//!
//! Missing counters read as zero. A body of the wrong JSON type (an
//! array where an object is expected, or the reverse) fails to parse and
//! is reported as a malformed response by the caller.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::{EventTotals, PeriodPoint, ReservationTotals, UserTotals};
use crate::error::ClientError;

/// Body of `GET /evenements/stats`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventStatsDto {
    /// All events.
    #[serde(default, alias = "totalEvents")]
    pub total: u64,
    /// Upcoming events.
    #[serde(default, alias = "activeEvents")]
    pub futurs: u64,
    /// Events with places left.
    #[serde(default)]
    pub disponibles: u64,
}

impl From<EventStatsDto> for EventTotals {
    fn from(dto: EventStatsDto) -> Self {
        Self {
            total: dto.total,
            upcoming: dto.futurs,
            available: dto.disponibles,
        }
    }
}

/// Body of `GET /utilisateurs/stats`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsDto {
    /// All accounts.
    #[serde(default)]
    pub total_users: u64,
}

impl From<UserStatsDto> for UserTotals {
    fn from(dto: UserStatsDto) -> Self {
        Self {
            total: dto.total_users,
        }
    }
}

/// Body of `GET /reservations/stats`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationStatsDto {
    /// All reservations.
    #[serde(default)]
    pub total_reservations: u64,
    /// Reservations awaiting confirmation.
    #[serde(default, alias = "pendingReservations")]
    pub reservations_en_attente: u64,
    /// Revenue.
    #[serde(default, alias = "totalRevenue")]
    pub chiffre_affaires_total: Decimal,
}

impl From<ReservationStatsDto> for ReservationTotals {
    fn from(dto: ReservationStatsDto) -> Self {
        Self {
            total: dto.total_reservations,
            pending: dto.reservations_en_attente,
            revenue: dto.chiffre_affaires_total,
        }
    }
}

/// One element of `GET /reservations/stats/historique`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPointDto {
    /// Day label, for daily series.
    #[serde(default)]
    pub date: Option<String>,
    /// Month label, for monthly series.
    #[serde(default)]
    pub month: Option<String>,
    /// Revenue over the period.
    #[serde(default)]
    pub total_revenue: Decimal,
    /// Reservations over the period.
    #[serde(default)]
    pub total_reservations: u64,
}

impl TryFrom<HistoryPointDto> for PeriodPoint {
    type Error = ClientError;

    fn try_from(dto: HistoryPointDto) -> Result<Self, Self::Error> {
        let period = dto.date.or(dto.month).ok_or_else(|| {
            ClientError::MalformedResponse("history point without date or month".to_string())
        })?;
        Ok(Self {
            period,
            revenue: dto.total_revenue,
            reservation_count: dto.total_reservations,
        })
    }
}
