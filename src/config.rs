//! Client configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::service::DashboardSettings;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_SESSION_PATH: &str = ".eventconnect/currentUser.json";

/// Top-level client configuration.
///
/// Loaded once at startup via [`ClientConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every backend path is appended to.
    pub api_base_url: Url,

    /// Timeout applied to every HTTP request.
    pub request_timeout: Duration,

    /// Per-source timeout of a dashboard load cycle.
    pub source_timeout: Duration,

    /// Location of the persisted session record.
    pub session_path: PathBuf,

    /// Days covered by the daily revenue series.
    pub history_days: u32,

    /// Months covered by the monthly revenue series.
    pub history_months: u32,

    /// Number of recent events and reservations on the dashboard.
    pub recent_items: usize,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,

    /// Emit logs as JSON lines.
    pub log_json: bool,
}

impl ClientConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set or
    /// cannot be parsed. Calls `dotenvy::dotenv().ok()` to optionally
    /// load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `API_BASE_URL` is set but is not an absolute
    /// URL.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let api_base_url = Url::parse(
            std::env::var("API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
                .trim(),
        )?;

        let session_path = std::env::var("SESSION_PATH")
            .map_or_else(|_| PathBuf::from(DEFAULT_SESSION_PATH), PathBuf::from);

        let dashboard = DashboardSettings::default();
        let source_timeout_ms =
            u64::try_from(dashboard.source_timeout.as_millis()).unwrap_or(u64::MAX);

        Ok(Self {
            api_base_url,
            request_timeout: Duration::from_millis(parse_env("REQUEST_TIMEOUT_MS", 10_000)),
            source_timeout: Duration::from_millis(parse_env("SOURCE_TIMEOUT_MS", source_timeout_ms)),
            session_path,
            history_days: parse_env("HISTORY_DAYS", dashboard.history_days).max(1),
            history_months: parse_env("HISTORY_MONTHS", dashboard.history_months).max(1),
            recent_items: parse_env("RECENT_ITEMS", dashboard.recent_items),
            event_bus_capacity: parse_env("EVENT_BUS_CAPACITY", 1024),
            log_json: parse_env_bool("LOG_JSON", false),
        })
    }

    /// Settings of the dashboard aggregator.
    #[must_use]
    pub const fn dashboard_settings(&self) -> DashboardSettings {
        DashboardSettings {
            source_timeout: self.source_timeout,
            history_days: self.history_days,
            history_months: self.history_months,
            recent_items: self.recent_items,
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key)
        .ok()
        .map(|v| v.trim().to_ascii_lowercase())
        .as_deref()
    {
        Some("true" | "1") => true,
        Some("false" | "0") => false,
        _ => default,
    }
}
