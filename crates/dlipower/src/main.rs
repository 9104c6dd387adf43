mod cli;
mod commands;
mod error;
mod output;
mod range;

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use dlipower_config::FileConfig;
use dlipower_core::PowerSwitch;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command.unwrap_or(Command::List) {
        // Config commands don't need a switch connection
        Command::Config(args) => commands::config_cmd::handle(&args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "dlipower", &mut std::io::stdout());
            Ok(())
        }

        // All other commands talk to the switch
        cmd => {
            let switch = connect(&cli.global).await?;

            debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &switch, &cli.global).await
        }
    }
}

/// Resolve settings (flags > environment > file > defaults) and log in.
async fn connect(global: &GlobalOpts) -> Result<PowerSwitch, CliError> {
    let file = load_file_config();
    let overrides = global.overrides();
    let config = dlipower_config::resolve(&file, &overrides)?;

    if global.save_settings {
        let saved = dlipower_config::load_saved_config().unwrap_or_default();
        dlipower_config::save_config(&saved.merged(&overrides))?;
        debug!(path = %dlipower_config::config_path().display(), "settings saved");
    }

    Ok(PowerSwitch::connect(config).await?)
}

/// Load the config file, falling back to the defaults if it is unusable.
fn load_file_config() -> FileConfig {
    dlipower_config::load_config().unwrap_or_else(|err| {
        warn!(
            path = %dlipower_config::config_path().display(),
            error = %err,
            "ignoring unreadable configuration file"
        );
        FileConfig::default()
    })
}
