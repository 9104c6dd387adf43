// Shared transport configuration for building reqwest::Client instances.
//
// The device client keeps three HTTP clients (cookie session, challenge
// probe without redirects, and a cookie-less basic-auth client). They all
// share timeout and TLS settings through this module.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::redirect::Policy;

use crate::error::Error;

/// Timeout for the unauthenticated challenge page fetched during login.
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(2);

const USER_AGENT: &str = concat!("dlipower/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
///
/// Power switches ship self-signed certificates, so certificate
/// verification is always disabled.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Timeout for the login challenge page.
    pub login_timeout: Duration,
    /// Attempts made by the fetch loop before giving up.
    pub retries: u32,
    pub cookie_jar: Option<Arc<Jar>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            login_timeout: LOGIN_TIMEOUT,
            retries: 3,
            cookie_jar: None,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// `follow_redirects = false` is used for the first login request, which
    /// has to see the redirect itself to rewrite the base URL.
    pub fn build_client(&self, follow_redirects: bool) -> Result<reqwest::Client, Error> {
        let policy = if follow_redirects {
            Policy::default()
        } else {
            Policy::none()
        };

        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .redirect(policy)
            .danger_accept_invalid_certs(true);

        if let Some(ref jar) = self.cookie_jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Create a config with a fresh cookie jar (for session auth).
    pub fn with_cookie_jar(mut self) -> Self {
        self.cookie_jar = Some(Arc::new(Jar::default()));
        self
    }

    /// The same settings without a cookie jar (for basic-auth requests).
    pub fn without_cookies(&self) -> Self {
        Self {
            cookie_jar: None,
            ..self.clone()
        }
    }
}
