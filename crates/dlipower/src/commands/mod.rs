//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod outlets;

use dlipower_core::{Command as CoreCommand, PowerSwitch};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a switch-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    switch: &PowerSwitch,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::List => outlets::list(switch, global).await,
        Command::Status(args) => outlets::query(switch, CoreCommand::Status, &args, global).await,
        Command::GetName(args) => {
            outlets::query(switch, CoreCommand::GetOutletName, &args, global).await
        }
        Command::On(args) => outlets::power(switch, CoreCommand::On, &args).await,
        Command::Off(args) => outlets::power(switch, CoreCommand::Off, &args).await,
        Command::Cycle(args) => outlets::power(switch, CoreCommand::Cycle, &args).await,
        Command::SetName(args) => outlets::set_name(switch, &args).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
