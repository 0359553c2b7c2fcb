//! Command handlers, one module per top-level subcommand.

pub mod config_cmd;
pub mod students;
pub mod util;

use roster_core::{RemoteCollection, Roster};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a command that needs a server connection.
pub async fn dispatch<R: RemoteCollection>(
    cmd: Command,
    roster: &Roster<R>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Students(args) => students::handle(roster, args, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal {
            message: "command does not use a server connection".into(),
        }),
    }
}
