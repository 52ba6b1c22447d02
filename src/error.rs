//! Client error taxonomy with backend error-body parsing.
//!
//! [`ClientError`] is the central error type of the crate. Transport and
//! HTTP failures produced by [`crate::api::HttpBackend`], business
//! rejections of booking actions, and local precondition failures all end
//! up here, so callers can match on one enum.

use serde::Deserialize;

/// Error body returned by the backend's exception handler.
///
/// Two shapes are accepted:
/// ```json
/// { "status": 400, "error": "Bad Request", "message": "...", "details": ["..."] }
/// { "errors": [ { "field": "nombrePlaces", "defaultMessage": "..." } ] }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BackendErrorBody {
    /// HTTP status echoed in the body.
    pub status: Option<u16>,
    /// Short error label (e.g. `"Bad Request"`).
    pub error: Option<String>,
    /// Human-readable message.
    pub message: Option<String>,
    /// Per-field validation messages.
    pub details: Vec<String>,
    /// Spring binding errors.
    pub errors: Vec<FieldError>,
}

/// One entry of a Spring binding error list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldError {
    /// Name of the offending field.
    pub field: Option<String>,
    /// Validation message for that field.
    pub default_message: Option<String>,
}

impl BackendErrorBody {
    /// Parses a raw response body, returning `None` when it is not JSON.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    /// Collects every field-level message in body order.
    #[must_use]
    pub fn field_messages(&self) -> Vec<String> {
        let mut messages: Vec<String> = self
            .errors
            .iter()
            .filter_map(|e| e.default_message.clone())
            .collect();
        messages.extend(self.details.iter().cloned());
        messages
    }
}

/// Error enum for every operation of the admin client core.
///
/// # Error Code Ranges
///
/// | Range     | Category                 |
/// |-----------|--------------------------|
/// | 1000–1999 | Validation / preconditions |
/// | 2000–2999 | State / not found        |
/// | 3000–3999 | Transport / server       |
/// | 4000–4999 | Booking / auth           |
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// Network failure or timeout before a response was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx response without a more specific meaning.
    #[error("http {status}: {message}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the body, or the canonical reason.
        message: String,
    },

    /// 400 response carrying per-field messages.
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    /// Response was well-formed JSON but not the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Missing or expired credentials.
    #[error("authentication required: {0}")]
    Auth(String),

    /// The booking was refused, either by the local capacity check or by
    /// the backend (seats taken concurrently, duplicate booking, past event).
    #[error("booking rejected: {reason}")]
    CapacityExhausted {
        /// Seats requested by the caller.
        requested: u32,
        /// Seats known to be available, when the refusal was local.
        available: Option<u32>,
        /// Human-readable reason.
        reason: String,
    },

    /// A precondition failed before any request was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// An entity was not present in local state.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Entity kind (`"event"`, `"reservation"`, `"user"`).
        kind: &'static str,
        /// Entity identifier.
        id: i64,
    },

    /// A reservation status change that the state machine does not define.
    #[error("cannot move reservation from {from} to {to}")]
    InvalidTransition {
        /// Current status label.
        from: &'static str,
        /// Requested status label.
        to: &'static str,
    },

    /// Applying a change would break the capacity invariant.
    #[error("capacity invariant violated: {0}")]
    Invariant(String),

    /// Session record could not be read or written.
    #[error("session store error: {0}")]
    Session(String),
}

impl ClientError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Validation(_) => 1002,
            Self::NotFound { .. } => 2001,
            Self::InvalidTransition { .. } => 2002,
            Self::Invariant(_) => 2003,
            Self::Transport(_) => 3001,
            Self::HttpStatus { .. } => 3002,
            Self::MalformedResponse(_) => 3003,
            Self::Session(_) => 3004,
            Self::CapacityExhausted { .. } => 4001,
            Self::Auth(_) => 4010,
        }
    }

    /// Returns `true` for faults worth retrying: transport failures,
    /// rate limiting and 5xx responses.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns `true` for definitive business outcomes of a booking action.
    #[must_use]
    pub const fn is_business_rejection(&self) -> bool {
        matches!(
            self,
            Self::CapacityExhausted { .. } | Self::InvalidTransition { .. } | Self::Validation(_)
        )
    }

    /// Builds the local refusal for a request exceeding available places.
    #[must_use]
    pub fn capacity(requested: u32, available: u32) -> Self {
        Self::CapacityExhausted {
            requested,
            available: Some(available),
            reason: format!("requested {requested} places, {available} available"),
        }
    }

    /// Maps a non-2xx response to the taxonomy.
    ///
    /// `booking` carries the requested seat count for `POST /reservations`,
    /// where a bare 400, 409 or 422 means the backend refused the
    /// reservation itself.
    #[must_use]
    pub fn from_status(status: u16, raw_body: &str, booking: Option<u32>) -> Self {
        let body = BackendErrorBody::parse(raw_body).unwrap_or_default();
        let fields = body.field_messages();
        let message = body
            .message
            .clone()
            .or_else(|| body.error.clone())
            .unwrap_or_else(|| reason_phrase(status).to_string());

        match status {
            401 | 403 => Self::Auth(message),
            400 if !fields.is_empty() => Self::Validation(fields),
            400 | 409 | 422 => match booking {
                Some(requested) => Self::CapacityExhausted {
                    requested,
                    available: None,
                    reason: message,
                },
                None => Self::HttpStatus { status, message },
            },
            _ => Self::HttpStatus { status, message },
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500..=599 => "Server Error",
        _ => "Unexpected Status",
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_joined() {
        let raw = r#"{"errors":[{"field":"titre","defaultMessage":"Le titre est obligatoire"},
                     {"field":"lieu","defaultMessage":"Le lieu est obligatoire"}]}"#;
        let err = ClientError::from_status(400, raw, None);
        assert_eq!(
            err.to_string(),
            "Le titre est obligatoire; Le lieu est obligatoire"
        );
        assert_eq!(err.error_code(), 1002);
    }

    #[test]
    fn details_count_as_field_messages() {
        let raw = r#"{"status":400,"error":"Bad Request","message":"Validation","details":["a","b"]}"#;
        let ClientError::Validation(messages) = ClientError::from_status(400, raw, None) else {
            panic!("expected validation error");
        };
        assert_eq!(messages, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn bare_400_on_booking_is_a_rejection() {
        let err = ClientError::from_status(400, "", Some(2));
        assert!(matches!(
            err,
            ClientError::CapacityExhausted { requested: 2, available: None, .. }
        ));
        assert!(err.is_business_rejection());
        assert!(!err.is_retryable());
    }

    #[test]
    fn bare_400_elsewhere_is_http_status() {
        let err = ClientError::from_status(400, "", None);
        let ClientError::HttpStatus { status, message } = err else {
            panic!("expected http status error");
        };
        assert_eq!(status, 400);
        assert_eq!(message, "Bad Request");
    }

    #[test]
    fn unauthorized_maps_to_auth() {
        let err = ClientError::from_status(401, r#"{"message":"token expired"}"#, Some(1));
        assert!(matches!(err, ClientError::Auth(ref m) if m == "token expired"));
    }

    #[test]
    fn server_errors_are_retryable() {
        let err = ClientError::from_status(503, "", None);
        assert!(err.is_retryable());
        assert!(ClientError::Transport("reset".to_string()).is_retryable());
        assert!(!ClientError::MalformedResponse("x".to_string()).is_retryable());
    }

    #[test]
    fn capacity_error_display() {
        let err = ClientError::capacity(2, 1);
        assert_eq!(
            err.to_string(),
            "booking rejected: requested 2 places, 1 available"
        );
        assert_eq!(err.error_code(), 4001);
    }
}
