// Challenge-response login and session state.
//
// The switch serves a login form carrying a one-time `Challenge`. The client
// answers with MD5(challenge + user + password + challenge); a session cookie
// in the reply upgrades the session to cookie auth, otherwise every request
// falls back to HTTP basic auth.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use md5::{Digest, Md5};
use reqwest::StatusCode;
use reqwest::header::{LOCATION, SET_COOKIE};
use scraper::{Html, Selector};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};
use url::Url;

use crate::client::DeviceClient;

/// Form field carrying the login challenge.
const CHALLENGE_FIELD: &str = "Challenge";

/// Endpoint receiving the login form.
const LOGIN_PATH: &str = "login.tgi";

/// URL scheme used to reach the switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    pub fn from_https(use_https: bool) -> Self {
        if use_https { Self::Https } else { Self::Http }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account used for both the login form and basic auth.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub userid: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(userid: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            userid: userid.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Mutable connection state owned by a [`DeviceClient`].
///
/// Only [`DeviceClient::login`] rewrites it, with one exception: the admin
/// flag, which the status reader may lower (never raise) from `&self`.
#[derive(Debug)]
pub struct Session {
    pub(crate) base_url: String,
    pub(crate) credentials: Credentials,
    pub(crate) is_secure: bool,
    admin_mode: AtomicBool,
}

impl Session {
    pub(crate) fn new(base_url: String, credentials: Credentials) -> Self {
        Self {
            base_url,
            credentials,
            is_secure: false,
            admin_mode: AtomicBool::new(true),
        }
    }

    /// Base URL without a trailing slash, possibly rewritten by a login redirect.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `true` once login produced a session cookie.
    pub fn is_secure(&self) -> bool {
        self.is_secure
    }

    /// `false` once a status page came back without the admin table.
    pub fn is_admin(&self) -> bool {
        self.admin_mode.load(Ordering::Relaxed)
    }

    /// Record that the account only sees the restricted-user layout.
    pub(crate) fn downgrade_admin(&self) {
        if self.admin_mode.swap(false, Ordering::Relaxed) {
            debug!("switching to restricted-user mode");
        }
    }
}

/// Compute the login digest the switch expects.
///
/// MD5 is mandated by the device firmware; it protects nothing beyond not
/// sending the password in clear text.
pub fn challenge_response(challenge: &str, userid: &str, password: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(challenge.as_bytes());
    hasher.update(userid.as_bytes());
    hasher.update(password.as_bytes());
    hasher.update(challenge.as_bytes());
    hex::encode(hasher.finalize())
}

/// Collect every named `<input>` of a page into `name -> value`.
pub fn form_fields(html: &str) -> HashMap<String, String> {
    let document = Html::parse_document(html);
    let Ok(inputs) = Selector::parse("input[name]") else {
        return HashMap::new();
    };

    document
        .select(&inputs)
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            if name.is_empty() {
                return None;
            }
            let value = input.value().attr("value").unwrap_or_default();
            Some((name.to_owned(), value.to_owned()))
        })
        .collect()
}

impl DeviceClient {
    /// Negotiate a session with the switch.
    ///
    /// Never fails. Any transport problem or unexpected reply leaves the
    /// session unauthenticated, and later fetches send basic auth instead.
    pub async fn login(&mut self) {
        self.session.is_secure = false;

        let Some(page) = self.fetch_login_page().await else {
            return;
        };

        let fields = form_fields(&page);
        let Some(challenge) = fields.get(CHALLENGE_FIELD) else {
            warn!("login page has no challenge field, using basic auth");
            return;
        };

        let credentials = &self.session.credentials;
        let digest = challenge_response(
            challenge,
            &credentials.userid,
            credentials.password.expose_secret(),
        );
        let form = [
            ("Username", credentials.userid.as_str()),
            ("Password", digest.as_str()),
        ];

        let url = format!("{}/{LOGIN_PATH}", self.session.base_url);
        debug!("logging in at {url}");

        let resp = match self
            .http
            .post(url.as_str())
            .form(&form)
            .timeout(self.transport.timeout)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "login request failed, using basic auth");
                return;
            }
        };

        if resp.status() == StatusCode::OK && resp.headers().contains_key(SET_COOKIE) {
            self.session.is_secure = true;
            debug!("login successful, using session cookie");
        } else {
            debug!(status = %resp.status(), "no session cookie issued, using basic auth");
        }
    }

    /// Fetch the challenge page, following one redirect by hand so the
    /// redirect target becomes the new base URL.
    async fn fetch_login_page(&mut self) -> Option<String> {
        let timeout = self.transport.login_timeout;

        let resp = match self
            .probe
            .get(self.session.base_url.as_str())
            .timeout(timeout)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "switch unreachable during login");
                return None;
            }
        };

        let resp = if resp.status().is_redirection() {
            let location = resp
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(String::from)?;
            self.session.base_url = redirect_base(&self.session.base_url, &location);
            debug!("redirecting to: {}", self.session.base_url);

            match self
                .http
                .get(self.session.base_url.as_str())
                .timeout(timeout)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    warn!(error = %e, "redirected login page unreachable");
                    return None;
                }
            }
        } else {
            resp
        };

        match resp.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(error = %e, "failed to read login page");
                None
            }
        }
    }
}

/// Resolve a `Location` header against the current base, minus trailing `/`.
fn redirect_base(base: &str, location: &str) -> String {
    let target = Url::parse(location)
        .or_else(|_| Url::parse(base).and_then(|b| b.join(location)))
        .map_or_else(|_| location.to_owned(), String::from);
    target.trim_end_matches('/').to_owned()
}
