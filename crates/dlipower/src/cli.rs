//! Clap derive structures for the `dlipower` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};
use secrecy::SecretString;

use dlipower_config::Overrides;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// dlipower -- control Digital Loggers web power switches
#[derive(Debug, Parser)]
#[command(
    name = "dlipower",
    version,
    about = "Control Digital Loggers web power switches from the command line",
    long_about = "Query and switch the outlets of a Digital Loggers web power switch.\n\n\
        Outlets are given by number or name. Numbers accept ranges:\n\
        `dlipower on 1-3,7` switches outlets 1, 2, 3 and 7.\n\
        Without a command, prints the status of every outlet.",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Option<Command>,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Hostname or IP of the power switch (optionally with :port)
    #[arg(long, global = true)]
    pub hostname: Option<String>,

    /// User id to log in with
    #[arg(long, visible_alias = "userid", global = true)]
    pub user: Option<String>,

    /// Password to log in with
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<f64>,

    /// Delay between the off and on halves of a power cycle, in seconds
    #[arg(long, global = true)]
    pub cycletime: Option<f64>,

    /// Attempts per request before the switch counts as unreachable
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    /// Connect to the switch over HTTPS
    #[arg(long, global = true)]
    pub ssl: bool,

    /// Save the connection settings to the configuration file
    #[arg(long, alias = "save_settings", global = true)]
    pub save_settings: bool,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "DLIPOWER_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

impl GlobalOpts {
    /// Connection settings given on the command line.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            hostname: self.hostname.clone(),
            userid: self.user.clone(),
            password: self.password.clone().map(SecretString::from),
            timeout: self.timeout,
            cycletime: self.cycletime,
            retries: self.retries,
            use_https: self.ssl,
        }
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Plain text (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show every outlet with its name and state (default)
    #[command(alias = "ls")]
    List,

    /// Print the state of outlets (ON, OFF or Unknown)
    Status(OutletArgs),

    /// Switch outlets on
    #[command(alias = "poweron")]
    On(OutletArgs),

    /// Switch outlets off
    #[command(alias = "poweroff")]
    Off(OutletArgs),

    /// Power-cycle outlets (off, wait --cycletime, on)
    Cycle(OutletArgs),

    /// Print the names of outlets
    #[command(
        name = "get-name",
        aliases = ["get_name", "getname", "get_outlet_name", "getoutletname"]
    )]
    GetName(OutletArgs),

    /// Rename an outlet
    #[command(
        name = "set-name",
        aliases = ["set_name", "setname", "set_outlet_name", "setoutletname"]
    )]
    SetName(SetNameArgs),

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Outlet Arguments ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct OutletArgs {
    /// Outlet numbers, ranges (1-3,7) or names
    #[arg(required = true, num_args = 1..)]
    pub outlets: Vec<String>,
}

#[derive(Debug, Args)]
pub struct SetNameArgs {
    /// Outlet number or current name
    pub outlet: String,

    /// New name for the outlet
    pub name: String,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the resolved configuration
    Show,

    /// Print the configuration file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
