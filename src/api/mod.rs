//! Backend access layer: the [`Backend`] trait, its HTTP implementation,
//! and the wire DTOs.
//!
//! All paths are resolved under the configured base URL (by default
//! `http://localhost:8080/api`).

pub mod backend;
pub mod dto;
pub mod http;

pub use backend::{Backend, BookingRequest};
pub use http::HttpBackend;
