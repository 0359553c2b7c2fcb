//! CLI configuration: thin wrapper around `roster_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--server, --timeout, etc.).

use roster_core::{RosterConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use roster_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Build the runtime config from the config file, active profile and
/// CLI overrides. Flags win over the profile, the profile over defaults.
pub fn resolve_roster_config(global: &GlobalOpts, cfg: &Config) -> Result<RosterConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let base = match (cfg.profiles.get(&profile_name), global.server.as_deref()) {
        (Some(profile), server) => {
            let mut profile = profile.clone();
            if let Some(server) = server {
                server.clone_into(&mut profile.server);
            }
            profile
        }
        (None, Some(server)) => {
            // An explicitly requested profile must exist.
            if global.profile.is_some() {
                return Err(profile_not_found(&profile_name, cfg));
            }
            Profile::new(server)
        }
        (None, None) => {
            if global.profile.is_some() {
                return Err(profile_not_found(&profile_name, cfg));
            }
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    let mut rc = roster_config::profile_to_roster_config(&base, &cfg.defaults)?;
    if let Some(ref resource) = global.resource {
        rc.resource_path.clone_from(resource);
    }
    if global.insecure {
        rc.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        rc.timeout = std::time::Duration::from_secs(secs);
    }
    Ok(rc)
}

fn profile_not_found(name: &str, cfg: &Config) -> CliError {
    let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    available.sort_unstable();
    CliError::ProfileNotFound {
        name: name.into(),
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}
