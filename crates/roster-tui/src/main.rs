//! `roster-tui`: terminal front end for a REST-backed student roster.
//!
//! Built on [ratatui](https://ratatui.rs). One screen: the student form on
//! top, the student table below, both kept in sync with the server by
//! `roster-core`'s [`Roster`](roster_core::Roster).
//!
//! Logs are written to a file (default `/tmp/roster-tui.log`) so they never
//! corrupt the terminal.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screens;
mod theme;
mod tui;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, bail};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use roster_config::Profile;
use roster_core::{Roster, RosterConfig};

use crate::app::App;

/// Browse, add, edit and delete students from the terminal.
#[derive(Parser, Debug)]
#[command(name = "roster-tui", version, about)]
struct Cli {
    /// Server base URL (e.g., http://localhost:8080)
    #[arg(short = 'S', long, env = "ROSTER_SERVER")]
    server: Option<String>,

    /// Config profile to use
    #[arg(short = 'p', long, env = "ROSTER_PROFILE")]
    profile: Option<String>,

    /// Collection path on the server (defaults to /api/students)
    #[arg(long, env = "ROSTER_RESOURCE")]
    resource: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(short = 'k', long, env = "ROSTER_INSECURE")]
    insecure: bool,

    /// Log file path
    #[arg(long, default_value = "/tmp/roster-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-only tracing. Anything written to stdout or stderr would land in
/// the middle of the UI. Hold the guard until exit so the log flushes.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "roster_tui={log_level},roster_core={log_level},roster_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("roster-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Resolve the server from flags and the shared config file.
/// Priority: flags > profile > defaults.
fn resolve_config(cli: &Cli) -> Result<RosterConfig> {
    let cfg = roster_config::load_config_or_default();
    let name = cfg.active_profile_name(cli.profile.as_deref());

    let mut profile = if cli.profile.is_some() || cfg.profiles.contains_key(&name) {
        let mut profile = cfg.profile(&name)?.clone();
        if let Some(server) = cli.server.as_deref() {
            server.clone_into(&mut profile.server);
        }
        profile
    } else if let Some(server) = cli.server.as_deref() {
        Profile::new(server)
    } else {
        bail!(
            "no server configured: pass --server <URL> or run `roster config init` (config file: {})",
            roster_config::config_path().display()
        );
    };

    if let Some(ref resource) = cli.resource {
        profile.resource = Some(resource.clone());
    }
    if cli.insecure {
        profile.insecure = Some(true);
    }

    Ok(roster_config::profile_to_roster_config(
        &profile,
        &cfg.defaults,
    )?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tui::install_hooks()?;
    let _log_guard = setup_tracing(&cli);

    let config = resolve_config(&cli)?;
    info!(server = %config.base_url, resource = %config.resource_path, "starting roster-tui");

    let roster = Roster::from_config(&config)?;
    let mut app = App::new(roster);
    app.run().await?;

    Ok(())
}
