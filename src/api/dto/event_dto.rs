//! Event DTOs for `/evenements` endpoints.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Event, EventDetails, EventDraft, EventId};
use crate::error::ClientError;

/// Placeholder for an event sent without a title.
pub const UNTITLED_EVENT: &str = "Untitled event";

/// Event as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    /// Event identifier.
    pub id: i64,
    /// Title.
    #[serde(default)]
    pub titre: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Start timestamp (`yyyy-MM-ddTHH:mm:ss`).
    pub date_debut: NaiveDateTime,
    /// End timestamp.
    #[serde(default)]
    pub date_fin: Option<NaiveDateTime>,
    /// Venue.
    #[serde(default)]
    pub lieu: Option<String>,
    /// Category label.
    #[serde(default)]
    pub categorie: Option<String>,
    /// Price of one place.
    #[serde(default, alias = "prix")]
    pub prix_place: Option<Decimal>,
    /// Total capacity.
    #[serde(default, alias = "placesMax")]
    pub capacite_max: Option<u32>,
    /// Places held by non-cancelled reservations.
    #[serde(default)]
    pub places_reservees: Option<u32>,
    /// Places left.
    #[serde(default)]
    pub places_disponibles: Option<u32>,
}

impl TryFrom<EventDto> for Event {
    type Error = ClientError;

    /// Validates the counters: a missing capacity or a reserved count above
    /// capacity is a malformed response, never an event in local state.
    fn try_from(dto: EventDto) -> Result<Self, Self::Error> {
        let id = EventId::new(dto.id);
        let capacity = dto.capacite_max.ok_or_else(|| {
            ClientError::MalformedResponse(format!("event {id}: missing capaciteMax"))
        })?;
        let reserved = match (dto.places_reservees, dto.places_disponibles) {
            (Some(reserved), _) => reserved,
            (None, Some(available)) => capacity.checked_sub(available).ok_or_else(|| {
                ClientError::MalformedResponse(format!(
                    "event {id}: {available} places available exceeds capacity {capacity}"
                ))
            })?,
            (None, None) => 0,
        };
        let title = dto
            .titre
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNTITLED_EVENT.to_string());
        let details = EventDetails {
            title,
            description: dto.description,
            starts_at: dto.date_debut,
            ends_at: dto.date_fin.unwrap_or(dto.date_debut),
            location: dto.lieu.unwrap_or_default(),
            category: dto.categorie,
            price: dto.prix_place.unwrap_or_default(),
        };
        Event::new(id, details, capacity, reserved)
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }
}

/// Request body for `POST /evenements` and `PUT /evenements/{id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventWriteRequest<'a> {
    /// Title.
    pub titre: &'a str,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    /// Start timestamp.
    pub date_debut: NaiveDateTime,
    /// End timestamp.
    pub date_fin: NaiveDateTime,
    /// Venue.
    pub lieu: &'a str,
    /// Category label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categorie: Option<&'a str>,
    /// Total capacity.
    pub capacite_max: u32,
    /// Price of one place.
    pub prix_place: Decimal,
}

impl<'a> From<&'a EventDraft> for EventWriteRequest<'a> {
    fn from(draft: &'a EventDraft) -> Self {
        let d = &draft.details;
        Self {
            titre: &d.title,
            description: d.description.as_deref(),
            date_debut: d.starts_at,
            date_fin: d.ends_at,
            lieu: &d.location,
            categorie: d.category.as_deref(),
            capacite_max: draft.capacity_max,
            prix_place: d.price,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Event, ClientError> {
        let Ok(dto) = serde_json::from_str::<EventDto>(json) else {
            panic!("dto should parse");
        };
        Event::try_from(dto)
    }

    #[test]
    fn converts_backend_event() {
        let Ok(event) = parse(
            r#"{"id":1,"titre":"Conférence Tech 2025","dateDebut":"2025-09-15T09:00:00",
                "dateFin":"2025-09-15T18:00:00","lieu":"Centre de Congrès, Paris",
                "capaciteMax":500,"prixPlace":150.00,"categorie":"CONFERENCE",
                "placesReservees":234,"placesDisponibles":266}"#,
        ) else {
            panic!("conversion failed");
        };
        assert_eq!(event.places_available(), 266);
        assert_eq!(event.details.price, Decimal::new(150, 0));
        assert_eq!(event.details.category.as_deref(), Some("CONFERENCE"));
    }

    #[test]
    fn derives_reserved_from_available_and_reads_aliases() {
        let Ok(event) = parse(
            r#"{"id":2,"dateDebut":"2025-09-20T14:00:00","placesMax":30,
                "placesDisponibles":2,"prix":"25.50"}"#,
        ) else {
            panic!("conversion failed");
        };
        assert_eq!(event.places_reserved(), 28);
        assert_eq!(event.details.title, UNTITLED_EVENT);
        assert_eq!(event.details.price, Decimal::new(2550, 2));
    }

    #[test]
    fn inconsistent_counters_are_malformed() {
        let result = parse(r#"{"id":3,"dateDebut":"2025-09-20T14:00:00","capaciteMax":2,"placesReservees":3}"#);
        assert!(matches!(result, Err(ClientError::MalformedResponse(_))));

        let result = parse(r#"{"id":4,"dateDebut":"2025-09-20T14:00:00"}"#);
        assert!(matches!(result, Err(ClientError::MalformedResponse(_))));
    }

    #[test]
    fn write_request_uses_wire_names() {
        let Ok(event) = parse(
            r#"{"id":1,"titre":"Meetup","dateDebut":"2025-10-01T19:00:00","lieu":"Lyon","capaciteMax":40}"#,
        ) else {
            panic!("conversion failed");
        };
        let draft = EventDraft {
            details: event.details,
            capacity_max: 40,
        };
        let Ok(json) = serde_json::to_value(EventWriteRequest::from(&draft)) else {
            panic!("serialization failed");
        };
        assert_eq!(json.get("titre").and_then(|v| v.as_str()), Some("Meetup"));
        assert_eq!(json.get("capaciteMax").and_then(|v| v.as_u64()), Some(40));
        assert_eq!(
            json.get("dateDebut").and_then(|v| v.as_str()),
            Some("2025-10-01T19:00:00")
        );
        assert!(json.get("description").is_none());
    }
}
