//! Persistence layer: the single session record kept across restarts.
//!
//! Dashboard, booking and filter state are rebuilt every session; only
//! the authenticated user and its bearer token are written to disk, as a
//! JSON file managed by [`SessionStore`].

pub mod models;
pub mod session_store;

pub use models::StoredSession;
pub use session_store::SessionStore;
