//! Per-source failure isolation for the dashboard fan-out.
//!
//! [`fetch_or_default`] runs one fetch under a timeout. Success yields the
//! fetched value; a transport error, non-2xx, malformed body or timeout
//! yields the source's default together with a [`SourceFailure`]. It never
//! returns an error.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;

use crate::error::ClientError;

/// A source that was defaulted, with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    /// Source name, e.g. `"event_stats"`.
    pub source: &'static str,
    /// Why the source was defaulted.
    pub reason: String,
}

/// Outcome of one defaulted fetch.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// Fetched value, or the default on failure.
    pub value: T,
    /// Set when the default was used.
    pub failure: Option<SourceFailure>,
}

impl<T> Resolved<T> {
    /// Returns `true` if the default was used.
    #[must_use]
    pub const fn is_defaulted(&self) -> bool {
        self.failure.is_some()
    }

    /// Moves any failure into `failures` and returns the value.
    pub fn collect_into(self, failures: &mut Vec<SourceFailure>) -> T {
        failures.extend(self.failure);
        self.value
    }
}

/// Runs `fetch` with a deadline, substituting `default` on any failure.
pub async fn fetch_or_default<T, F>(
    source: &'static str,
    default: T,
    timeout: Duration,
    generation: u64,
    fetch: F,
) -> Resolved<T>
where
    F: Future<Output = Result<T, ClientError>>,
{
    let reason = match tokio::time::timeout(timeout, fetch).await {
        Ok(Ok(value)) => {
            return Resolved {
                value,
                failure: None,
            };
        }
        Ok(Err(err)) => err.to_string(),
        Err(_) => format!("timed out after {}ms", timeout.as_millis()),
    };
    tracing::warn!(source, %reason, generation, "source defaulted");
    Resolved {
        value: default,
        failure: Some(SourceFailure { source, reason }),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn success_passes_value_through() {
        let resolved = fetch_or_default("numbers", Vec::new(), Duration::from_secs(1), 1, async {
            Ok::<_, ClientError>(vec![1, 2, 3])
        })
        .await;
        assert_eq!(resolved.value, vec![1, 2, 3]);
        assert!(!resolved.is_defaulted());
    }

    #[tokio::test]
    async fn error_yields_default_and_reason() {
        let resolved = fetch_or_default("user_stats", 0_u64, Duration::from_secs(1), 1, async {
            Err(ClientError::MalformedResponse("expected an object".to_string()))
        })
        .await;
        assert_eq!(resolved.value, 0);
        assert_eq!(
            resolved.failure,
            Some(SourceFailure {
                source: "user_stats",
                reason: "malformed response: expected an object".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn timeout_yields_default() {
        let resolved = fetch_or_default("slow", 7_u32, Duration::from_millis(50), 1, async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(1)
        })
        .await;
        assert_eq!(resolved.value, 7);
        let Some(failure) = resolved.failure else {
            panic!("expected a failure");
        };
        assert!(failure.reason.contains("timed out"));
    }
}
