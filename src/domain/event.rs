//! Event aggregate with its capacity counters.
//!
//! An [`Event`] can only be built through [`Event::new`], which enforces
//! `places_reserved <= capacity_max`. The counters are private: the only
//! way to move them is [`Event::debit`] and [`Event::credit`], both of
//! which refuse to break the invariant, so an inconsistent event never
//! reaches local state.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use super::EventId;
use crate::error::ClientError;

/// Descriptive fields of an event. None of them take part in the
/// capacity invariant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDetails {
    /// Display title.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Start of the event.
    pub starts_at: NaiveDateTime,
    /// End of the event.
    pub ends_at: NaiveDateTime,
    /// Venue.
    pub location: String,
    /// Category label.
    pub category: Option<String>,
    /// Price of one place.
    pub price: Decimal,
}

/// An event with its capacity bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Backend identifier.
    pub id: EventId,
    /// Descriptive fields.
    pub details: EventDetails,
    capacity_max: u32,
    places_reserved: u32,
}

impl Event {
    /// Builds an event, validating the capacity invariant.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Invariant`] if `places_reserved` exceeds
    /// `capacity_max`.
    pub fn new(
        id: EventId,
        details: EventDetails,
        capacity_max: u32,
        places_reserved: u32,
    ) -> Result<Self, ClientError> {
        if places_reserved > capacity_max {
            return Err(ClientError::Invariant(format!(
                "event {id}: {places_reserved} places reserved exceeds capacity {capacity_max}"
            )));
        }
        Ok(Self {
            id,
            details,
            capacity_max,
            places_reserved,
        })
    }

    /// Total number of places.
    #[must_use]
    pub const fn capacity_max(&self) -> u32 {
        self.capacity_max
    }

    /// Places held by non-cancelled reservations.
    #[must_use]
    pub const fn places_reserved(&self) -> u32 {
        self.places_reserved
    }

    /// `capacity_max - places_reserved`; never underflows.
    #[must_use]
    pub const fn places_available(&self) -> u32 {
        self.capacity_max - self.places_reserved
    }

    /// Returns `true` when `seats` more places fit.
    #[must_use]
    pub const fn can_accommodate(&self, seats: u32) -> bool {
        seats <= self.places_available()
    }

    /// Returns `true` when no place is left.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.places_reserved == self.capacity_max
    }

    /// Takes `seats` places out of the available pool.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::CapacityExhausted`] if fewer than `seats`
    /// places are available. The event is left untouched.
    pub fn debit(&mut self, seats: u32) -> Result<(), ClientError> {
        if !self.can_accommodate(seats) {
            return Err(ClientError::capacity(seats, self.places_available()));
        }
        self.places_reserved += seats;
        Ok(())
    }

    /// Returns `seats` places to the available pool.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Invariant`] if more places would be released
    /// than are currently reserved. The event is left untouched.
    pub fn credit(&mut self, seats: u32) -> Result<(), ClientError> {
        if seats > self.places_reserved {
            return Err(ClientError::Invariant(format!(
                "event {}: cannot release {seats} places, only {} reserved",
                self.id, self.places_reserved
            )));
        }
        self.places_reserved -= seats;
        Ok(())
    }

    /// Replaces the descriptive fields and capacity, keeping the reserved
    /// count.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Invariant`] if the new capacity is below the
    /// places already reserved.
    pub fn revise(&mut self, details: EventDetails, capacity_max: u32) -> Result<(), ClientError> {
        if capacity_max < self.places_reserved {
            return Err(ClientError::Invariant(format!(
                "event {}: capacity {capacity_max} below {} reserved places",
                self.id, self.places_reserved
            )));
        }
        self.details = details;
        self.capacity_max = capacity_max;
        Ok(())
    }
}

/// Writable fields of an event, sent on create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    /// Descriptive fields.
    pub details: EventDetails,
    /// Total number of places.
    pub capacity_max: u32,
}

impl EventDraft {
    /// Checks the draft before it is sent.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] listing every offending field.
    pub fn validate(&self) -> Result<(), ClientError> {
        let mut problems = Vec::new();
        if self.details.title.trim().is_empty() {
            problems.push("titre: title is required".to_string());
        }
        if self.details.location.trim().is_empty() {
            problems.push("lieu: location is required".to_string());
        }
        if self.details.ends_at < self.details.starts_at {
            problems.push("dateFin: end must not precede start".to_string());
        }
        if self.capacity_max == 0 {
            problems.push("capaciteMax: capacity must be at least 1".to_string());
        }
        if self.details.price.is_sign_negative() {
            problems.push("prixPlace: price must not be negative".to_string());
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ClientError::Validation(problems))
        }
    }
}
