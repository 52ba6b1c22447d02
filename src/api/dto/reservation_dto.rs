//! Reservation DTOs for `/reservations` endpoints.
//!
//! The backend sends holder and event either nested (`utilisateur`,
//! `evenement`) or flattened (`utilisateurNom`, `evenementTitre`, ...);
//! both shapes are accepted, nested values taking precedence.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{EventId, Reservation, ReservationId, ReservationStatus, UserId};
use crate::error::ClientError;

/// Nested holder reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRefDto {
    /// Account identifier.
    #[serde(default)]
    pub id: Option<i64>,
    /// Pre-formatted full name.
    #[serde(default)]
    pub nom_complet: Option<String>,
    /// Family name.
    #[serde(default)]
    pub nom: Option<String>,
    /// Given name.
    #[serde(default)]
    pub prenom: Option<String>,
    /// Email.
    #[serde(default)]
    pub email: Option<String>,
}

impl UserRefDto {
    fn full_name(&self) -> Option<String> {
        if let Some(name) = self.nom_complet.as_ref().filter(|n| !n.trim().is_empty()) {
            return Some(name.clone());
        }
        let joined = format!(
            "{} {}",
            self.prenom.as_deref().unwrap_or_default(),
            self.nom.as_deref().unwrap_or_default()
        );
        let joined = joined.trim();
        (!joined.is_empty()).then(|| joined.to_string())
    }
}

/// Nested event reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRefDto {
    /// Event identifier.
    #[serde(default)]
    pub id: Option<i64>,
    /// Title.
    #[serde(default)]
    pub titre: Option<String>,
}

/// Reservation as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDto {
    /// Reservation identifier.
    pub id: i64,
    /// Places reserved.
    pub nombre_places: u32,
    /// Price paid.
    #[serde(default)]
    pub montant_total: Option<Decimal>,
    /// Status; `EN_ATTENTE` when absent.
    #[serde(default)]
    pub statut: Option<ReservationStatus>,
    /// Creation timestamp.
    pub date_reservation: NaiveDateTime,
    /// Nested holder.
    #[serde(default)]
    pub utilisateur: Option<UserRefDto>,
    /// Nested event.
    #[serde(default)]
    pub evenement: Option<EventRefDto>,
    /// Flattened holder id.
    #[serde(default)]
    pub utilisateur_id: Option<i64>,
    /// Flattened holder name.
    #[serde(default)]
    pub utilisateur_nom: Option<String>,
    /// Flattened holder email.
    #[serde(default)]
    pub utilisateur_email: Option<String>,
    /// Flattened event id.
    #[serde(default)]
    pub evenement_id: Option<i64>,
    /// Flattened event title.
    #[serde(default, alias = "evenementNom")]
    pub evenement_titre: Option<String>,
}

impl TryFrom<ReservationDto> for Reservation {
    type Error = ClientError;

    fn try_from(dto: ReservationDto) -> Result<Self, Self::Error> {
        let id = ReservationId::new(dto.id);
        let user = dto.utilisateur.unwrap_or_default();
        let event = dto.evenement.unwrap_or_default();

        let event_id = event.id.or(dto.evenement_id).ok_or_else(|| {
            ClientError::MalformedResponse(format!("reservation {id}: missing event id"))
        })?;
        let user_id = user.id.or(dto.utilisateur_id).map(UserId::new);
        let user_name = user.full_name().or(dto.utilisateur_nom).unwrap_or_default();
        let user_email = user.email.or(dto.utilisateur_email).unwrap_or_default();
        let event_title = event.titre.or(dto.evenement_titre).unwrap_or_default();

        let reservation = Reservation::new(
            id,
            EventId::new(event_id),
            dto.nombre_places,
            dto.montant_total.unwrap_or_default(),
            dto.statut.unwrap_or(ReservationStatus::Pending),
            dto.date_reservation,
        )
        .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;
        Ok(reservation
            .with_holder(user_id, &user_name, &user_email)
            .with_event_title(&event_title))
    }
}

/// Request body for `POST /reservations`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    /// Event to book.
    pub evenement_id: EventId,
    /// Places requested.
    pub nombre_places: u32,
}
