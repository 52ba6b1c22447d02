//! Data Transfer Objects for the backend's JSON wire format.
//!
//! Field names follow the backend (French, camelCase). Every response DTO
//! converts into a domain type through a validating `TryFrom`/`From`; a
//! conversion failure is a [`crate::error::ClientError::MalformedResponse`].

pub mod event_dto;
pub mod reservation_dto;
pub mod stats_dto;
pub mod user_dto;

pub use event_dto::*;
pub use reservation_dto::*;
pub use stats_dto::*;
pub use user_dto::*;
