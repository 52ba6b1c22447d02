//! Type-safe backend identifiers.
//!
//! The backend keys every entity with a 64-bit integer. [`EventId`],
//! [`ReservationId`] and [`UserId`] wrap that integer so that an event id
//! can never be passed where a reservation id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! backend_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw backend identifier.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw backend identifier.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

backend_id!(
    /// Identifier of an event (`/evenements/{id}`).
    EventId
);

backend_id!(
    /// Identifier of a reservation (`/reservations/{id}`).
    ReservationId
);

backend_id!(
    /// Identifier of a user account (`/utilisateurs/{id}`).
    UserId
);
