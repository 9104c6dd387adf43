use thiserror::Error;

/// Top-level error type for the `dlipower-api` crate.
///
/// Fetches and logins never surface these: an unreachable switch shows up
/// as an absent body or an unauthenticated session. What remains are
/// failures to build the client itself.
#[derive(Debug, Error)]
pub enum Error {
    // ── Client construction ─────────────────────────────────────────
    /// TLS backend or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Configuration ───────────────────────────────────────────────
    /// The hostname cannot be turned into a base URL.
    #[error("Invalid hostname '{hostname}': {reason}")]
    InvalidHostname { hostname: String, reason: String },
}

