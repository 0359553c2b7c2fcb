//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use roster_config::ConfigError;
use roster_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to roster server at {url}")]
    #[diagnostic(
        code(roster::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             URL: {url}\n\
             Try: roster students list --server http://localhost:8080"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(
        "Request timed out{}",
        .seconds.map(|s| format!(" after {s}s")).unwrap_or_default()
    )]
    #[diagnostic(
        code(roster::timeout),
        help("Increase timeout with --timeout or check server responsiveness.")
    )]
    Timeout { seconds: Option<u64> },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(roster::not_found),
        help("Run: roster {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(
        code(roster::busy),
        help("Wait for the running request to finish, then try again.")
    )]
    Busy { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Server error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    #[diagnostic(code(roster::api_error))]
    ApiError {
        status: Option<u16>,
        message: String,
    },

    #[error("Unexpected response from server: {message}")]
    #[diagnostic(
        code(roster::malformed_response),
        help("Check that --resource points at the student collection endpoint.")
    )]
    MalformedResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(roster::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(roster::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: roster config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(roster::no_config),
        help(
            "Pass --server <URL>, set ROSTER_SERVER, or create a profile with: roster config init\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(roster::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(roster::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Internal / IO ────────────────────────────────────────────────
    #[error("Internal error: {message}")]
    #[diagnostic(code(roster::internal))]
    Internal { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Busy { .. } => exit_code::CONFLICT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: format!("{entity_type}s list"),
                resource_type: entity_type,
                identifier,
            },

            CoreError::NotInCollection { id } => CliError::NotFound {
                resource_type: "student".into(),
                identifier: id,
                list_command: "students list".into(),
            },

            CoreError::Api { message, status } => CliError::ApiError { status, message },

            CoreError::MalformedResponse { message } => CliError::MalformedResponse { message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::UnknownField { name } => CliError::Validation {
                field: "field".into(),
                reason: format!("unknown field '{name}'"),
            },

            err @ CoreError::Busy { .. } => CliError::Busy {
                message: err.to_string(),
            },

            err @ CoreError::NoPendingDelete => CliError::Internal {
                message: err.to_string(),
            },

        }
    }
}

#[cfg(test)]
mod tests {
    use roster_core::Operation;

    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (
                CoreError::ConnectionFailed {
                    url: "http://x".into(),
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (
                CoreError::Timeout {
                    timeout_secs: Some(5),
                },
                exit_code::TIMEOUT,
            ),
            (
                CoreError::NotInCollection { id: "9".into() },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::Busy {
                    action: "submit",
                    active: Operation::Creating,
                },
                exit_code::CONFLICT,
            ),
            (
                CoreError::Api {
                    message: "boom".into(),
                    status: Some(500),
                },
                exit_code::GENERAL,
            ),
        ];
        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn api_error_mentions_status() {
        let err = CliError::ApiError {
            status: Some(400),
            message: "email missing".into(),
        };
        assert_eq!(err.to_string(), "Server error (HTTP 400): email missing");
    }
}
