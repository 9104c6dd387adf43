// ── Runtime switch configuration ──
//
// Describes how to reach one power switch: address, account, and the
// timing knobs of the fetch loop. Never touches disk. The CLI builds a
// `SwitchConfig` (via `dlipower-config`) and hands it in.

use std::time::Duration;

use dlipower_api::{Credentials, Scheme, TransportConfig};

pub const DEFAULT_HOSTNAME: &str = "192.168.0.100";
pub const DEFAULT_USERID: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "4321";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_CYCLETIME: Duration = Duration::from_secs(3);
pub const DEFAULT_RETRIES: u32 = 3;

/// Connection settings for a single power switch.
#[derive(Debug, Clone)]
pub struct SwitchConfig {
    /// Host name or address, optionally with `:port`.
    pub hostname: String,
    pub credentials: Credentials,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Pause between the off and on halves of a power cycle.
    pub cycletime: Duration,
    /// Attempts per request before the switch counts as unreachable.
    pub retries: u32,
    pub use_https: bool,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.into(),
            credentials: Credentials::new(DEFAULT_USERID, DEFAULT_PASSWORD),
            timeout: DEFAULT_TIMEOUT,
            cycletime: DEFAULT_CYCLETIME,
            retries: DEFAULT_RETRIES,
            use_https: false,
        }
    }
}

impl SwitchConfig {
    pub fn scheme(&self) -> Scheme {
        Scheme::from_https(self.use_https)
    }

    /// Transport settings for the device client.
    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: self.timeout,
            retries: self.retries,
            ..TransportConfig::default()
        }
    }
}
