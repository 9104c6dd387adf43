//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use dlipower_config::ConfigError;
use dlipower_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Unable to communicate to the Web power switch at {host}")]
    #[diagnostic(
        code(dlipower::unreachable),
        help(
            "Check that the switch is powered and reachable, and that the\n\
             credentials are right. Raise --timeout or --retries on slow links."
        )
    )]
    Unreachable { host: String },

    #[error("Could not connect to power switch at {url}")]
    #[diagnostic(code(dlipower::connection_failed), help("{reason}"))]
    ConnectionFailed { url: String, reason: String },

    // ── Outlets ──────────────────────────────────────────────────────

    #[error("Outlet '{identifier}' not found")]
    #[diagnostic(
        code(dlipower::not_found),
        help("Run: dlipower list to see outlet numbers and names")
    )]
    OutletNotFound { identifier: String },

    #[error("Outlet {number} out of range")]
    #[diagnostic(
        code(dlipower::out_of_range),
        help("The switch has {count} outlets, numbered from 1")
    )]
    OutletOutOfRange { number: i64, count: u32 },

    #[error("{operation} operation failed")]
    #[diagnostic(
        code(dlipower::operation_failed),
        help("The switch did not report the requested state afterwards.")
    )]
    OperationFailed { operation: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(dlipower::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(dlipower::config),
        help("Check the configuration file: dlipower config path")
    )]
    Config(Box<ConfigError>),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    #[diagnostic(code(dlipower::json))]
    Json(#[from] serde_json::Error),
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
            Self::Unreachable { .. } | Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::OutletNotFound { .. } | Self::OutletOutOfRange { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownOutlet { identifier } => CliError::OutletNotFound { identifier },

            CoreError::OutletOutOfRange { number, count } => {
                CliError::OutletOutOfRange { number, count }
            }

            CoreError::Validation { message } => CliError::Validation {
                field: "outlets".into(),
                reason: message,
            },

            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }

            CoreError::Config { message } => CliError::Validation {
                field: "configuration".into(),
                reason: message,
            },
        }
    }
}
