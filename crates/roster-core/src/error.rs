// ── Core error types ──
//
// User-facing errors from roster-core. Consumers never see reqwest errors
// or JSON parse failures directly: `From<roster_api::Error>` translates
// transport-layer errors into domain variants.

use std::time::Duration;

use thiserror::Error;

use crate::command::Operation;
use crate::model::RecordId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error(
        "Server request timed out{}",
        .timeout_secs.map(|s| format!(" after {s}s")).unwrap_or_default()
    )]
    Timeout { timeout_secs: Option<u64> },

    // ── Server-reported errors ───────────────────────────────────────
    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Malformed server response: {message}")]
    MalformedResponse { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Contract errors (caller bugs, never touch state) ─────────────
    #[error("Unknown form field: {name}")]
    UnknownField { name: String },

    #[error("Student {id} is not in the current list")]
    NotInCollection { id: String },

    #[error("No delete is awaiting confirmation")]
    NoPendingDelete,

    #[error("Cannot {action} while a {active} request is in flight")]
    Busy {
        action: &'static str,
        active: Operation,
    },
}

impl CoreError {
    /// `true` for errors caused by the caller misusing the controller,
    /// as opposed to recoverable runtime failures.
    pub fn is_contract_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownField { .. }
                | Self::NotInCollection { .. }
                | Self::NoPendingDelete
                | Self::Busy { .. }
        )
    }

    /// Translate a failed request against the student resource.
    ///
    /// Fills in what the transport error cannot carry: the timeout the
    /// client enforces, and the record a 404 on an item URL refers to.
    pub fn from_request(
        err: roster_api::Error,
        timeout: Option<Duration>,
        id: Option<&RecordId>,
    ) -> Self {
        if err.is_timeout() {
            return Self::Timeout {
                timeout_secs: timeout.map(|t| t.as_secs()),
            };
        }
        match id {
            Some(id) if err.is_not_found() => Self::NotFound {
                entity_type: "student".into(),
                identifier: id.to_string(),
            },
            _ => err.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<roster_api::Error> for CoreError {
    fn from(err: roster_api::Error) -> Self {
        match err {
            roster_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: None }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            roster_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            roster_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            roster_api::Error::Status { status, message } => CoreError::Api {
                message: format!("HTTP {status}: {message}"),
                status: Some(status),
            },
            roster_api::Error::Deserialization { message, body: _ } => {
                CoreError::MalformedResponse { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_404_names_the_requested_record() {
        let err = CoreError::from_request(
            roster_api::Error::Status {
                status: 404,
                message: "<html><body>Not Found</body></html>".into(),
            },
            None,
            Some(&RecordId::Number(7)),
        );
        match &err {
            CoreError::NotFound { identifier, .. } => assert_eq!(identifier, "7"),
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert!(!err.to_string().contains("html"));
        assert!(!err.is_contract_error());
    }

    #[test]
    fn collection_404_is_an_api_error() {
        let err = CoreError::from_request(
            roster_api::Error::Status {
                status: 404,
                message: "no route".into(),
            },
            None,
            None,
        );
        assert!(matches!(err, CoreError::Api { status: Some(404), .. }));
    }

    #[test]
    fn timeout_message_reports_known_duration() {
        let known = CoreError::Timeout {
            timeout_secs: Some(30),
        };
        assert_eq!(known.to_string(), "Server request timed out after 30s");
        let unknown = CoreError::Timeout { timeout_secs: None };
        assert_eq!(unknown.to_string(), "Server request timed out");
    }

    #[test]
    fn other_status_maps_to_api() {
        let err: CoreError = roster_api::Error::Status {
            status: 500,
            message: "boom".into(),
        }
        .into();
        match err {
            CoreError::Api { status, message } => {
                assert_eq!(status, Some(500));
                assert!(message.contains("boom"));
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn deserialization_maps_to_malformed() {
        let err: CoreError = roster_api::Error::Deserialization {
            message: "expected array".into(),
            body: "{}".into(),
        }
        .into();
        assert!(matches!(err, CoreError::MalformedResponse { .. }));
    }

    #[test]
    fn contract_errors_are_flagged() {
        assert!(CoreError::NoPendingDelete.is_contract_error());
        assert!(
            CoreError::UnknownField {
                name: "id".into()
            }
            .is_contract_error()
        );
        assert!(
            CoreError::Busy {
                action: "delete",
                active: Operation::Creating,
            }
            .is_contract_error()
        );
        assert!(!CoreError::Timeout { timeout_secs: None }.is_contract_error());
    }
}
