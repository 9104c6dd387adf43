// ── Core error types ──
//
// User-facing errors from dlipower-core. An unreachable switch is not an
// error at this layer (it reads as an empty outlet list); what remains are
// bad outlet identifiers, invalid requests, and client construction.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Outlet resolution ────────────────────────────────────────────
    #[error("Outlet name '{identifier}' unknown")]
    UnknownOutlet { identifier: String },

    #[error("Outlet number {number} out of range (switch has {count} outlets)")]
    OutletOutOfRange { number: i64, count: u32 },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to power switch at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<dlipower_api::Error> for CoreError {
    fn from(err: dlipower_api::Error) -> Self {
        match err {
            dlipower_api::Error::Tls(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason,
            },
            dlipower_api::Error::InvalidHostname { hostname, reason } => CoreError::Config {
                message: format!("Invalid hostname '{hostname}': {reason}"),
            },
        }
    }
}
