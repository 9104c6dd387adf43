// Device HTTP client
//
// Wraps three `reqwest::Client`s with the switch's URL layout and the
// retrying fetch loop. Login lives in `auth.rs` as inherent methods on the
// same type to keep this module focused on request mechanics.

use bytes::Bytes;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use tracing::{debug, trace, warn};

use crate::auth::{Credentials, Scheme, Session};
use crate::error::Error;
use crate::model::{OutletRecord, OutletState};
use crate::parser::parse_status;
use crate::transport::TransportConfig;

/// Status page listing every outlet.
pub const STATUS_PAGE: &str = "index.htm";

/// Raw HTTP client for one power switch.
///
/// Every read goes through [`fetch`](Self::fetch), which never fails: an
/// exhausted retry budget is reported as `None` ("switch unreachable").
pub struct DeviceClient {
    /// Cookie session client, follows redirects.
    pub(crate) http: reqwest::Client,
    /// Cookie session client that reports redirects instead of following them.
    pub(crate) probe: reqwest::Client,
    /// Cookie-less client for per-request basic auth.
    pub(crate) plain: reqwest::Client,
    pub(crate) session: Session,
    pub(crate) transport: TransportConfig,
}

impl DeviceClient {
    /// Create a client for `hostname` (optionally with a `:port`).
    ///
    /// Does NOT log in -- call [`login()`](Self::login) before fetching.
    pub fn new(
        hostname: &str,
        scheme: Scheme,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let hostname = hostname.trim().trim_end_matches('/');
        if hostname.is_empty() {
            return Err(Error::InvalidHostname {
                hostname: hostname.into(),
                reason: "hostname is empty".into(),
            });
        }
        let base_url = format!("{scheme}://{hostname}");
        url::Url::parse(&base_url).map_err(|e| Error::InvalidHostname {
            hostname: hostname.into(),
            reason: e.to_string(),
        })?;

        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };

        Ok(Self {
            http: config.build_client(true)?,
            probe: config.build_client(false)?,
            plain: config.without_cookies().build_client(true)?,
            session: Session::new(base_url, credentials),
            transport: config,
        })
    }

    /// Current session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    // ── Fetch loop ───────────────────────────────────────────────────

    /// GET `{base_url}/{path}`, retrying up to the configured budget.
    ///
    /// Uses the session cookie when login succeeded, basic auth otherwise.
    /// Returns the body of the first `200 OK`, or `None` when every attempt
    /// failed.
    pub async fn fetch(&self, path: &str) -> Option<Bytes> {
        let url = format!("{}/{path}", self.session.base_url);
        let retries = self.transport.retries;
        debug!("requesting url: {url}");

        let mut last_status = None;
        for attempt in 1..=retries {
            let request = if self.session.is_secure {
                self.http.get(url.as_str())
            } else {
                let credentials = &self.session.credentials;
                self.plain.get(url.as_str()).basic_auth(
                    &credentials.userid,
                    Some(credentials.password.expose_secret()),
                )
            };

            let resp = match request.timeout(self.transport.timeout).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    warn!(
                        error = %e,
                        retries_left = retries - attempt,
                        "request failed"
                    );
                    continue;
                }
            };

            let status = resp.status();
            last_status = Some(status);
            if status != StatusCode::OK {
                debug!(%status, retries_left = retries - attempt, "unexpected response status");
                continue;
            }

            match resp.bytes().await {
                Ok(body) => {
                    trace!(len = body.len(), "response received");
                    return Some(body);
                }
                Err(e) => {
                    warn!(error = %e, retries_left = retries - attempt, "failed to read response body");
                }
            }
        }

        debug!(?last_status, "giving up on {url}");
        None
    }

    /// `true` if the status page can be fetched.
    pub async fn verify(&self) -> bool {
        self.fetch(STATUS_PAGE).await.is_some()
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Read and parse the status page.
    ///
    /// An empty list means the switch was unreachable or the page was not
    /// recognized. A page without the admin table permanently drops the
    /// session into restricted-user mode.
    pub async fn read_outlets(&self) -> Vec<OutletRecord> {
        let Some(body) = self.fetch(STATUS_PAGE).await else {
            return Vec::new();
        };
        let page = parse_status(&String::from_utf8_lossy(&body));
        if !page.layout.is_admin() {
            self.session.downgrade_admin();
        }
        page.outlets
    }

    /// Ask the switch to turn outlet `number` on or off.
    ///
    /// Returns whether the switch answered; the caller confirms the effect
    /// with a fresh status read.
    pub async fn send_outlet_state(&self, number: u32, state: OutletState) -> bool {
        let Some(keyword) = state.command_keyword() else {
            return false;
        };
        self.fetch(&format!("outlet?{number}={keyword}")).await.is_some()
    }

    /// Ask the switch to rename outlet `number`.
    pub async fn send_outlet_name(&self, number: u32, name: &str) -> bool {
        let encoded = urlencoding::encode(name);
        self.fetch(&format!("unitnames.cgi?outname{number}={encoded}"))
            .await
            .is_some()
    }
}
