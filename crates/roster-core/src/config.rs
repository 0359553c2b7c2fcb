// ── Runtime connection configuration ──
//
// Describes *where* the student resource lives and how to reach it.
// Never touches disk: the CLI/TUI builds a `RosterConfig` (usually via
// roster-config) and hands it in.

use std::time::Duration;

use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed development servers).
    DangerAcceptInvalid,
}

/// Configuration for talking to one roster backend.
#[derive(Debug, Clone)]
pub struct RosterConfig {
    /// Server root (e.g., `http://localhost:8080`).
    pub base_url: Url,
    /// Collection path under the root (e.g., `/api/students`).
    pub resource_path: String,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl RosterConfig {
    /// Defaults for everything but the server root.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            resource_path: roster_api::DEFAULT_RESOURCE_PATH.into(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Transport settings for the HTTP layer.
    pub fn transport(&self) -> roster_api::TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => roster_api::TlsMode::System,
            TlsVerification::CustomCa(path) => roster_api::TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => roster_api::TlsMode::DangerAcceptInvalid,
        };
        roster_api::TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}
