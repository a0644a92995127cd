//! Per-user session configuration.
//!
//! Each Goose user builds one [`SessionConfig`] when it starts. It is created
//! from the one-time login link in the `ULI` environment variable and the host
//! being load tested, and is never modified afterwards. The HTTP client of the
//! user is built from it, and it is kept in the user's session data so later
//! transactions can read it.

use reqwest::{Client, ClientBuilder};
use std::env;
use url::Url;

use crate::{BenchmarkError, APP_USER_AGENT};

/// Environment variable holding the full one-time login URL.
pub const LOGIN_URL_VAR: &str = "ULI";

/// Immutable configuration of one simulated user session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// The host being load tested, without a trailing slash.
    pub host: String,
    /// The one-time login URL exactly as configured.
    pub login_url: String,
    /// The path requested to log in, derived from `login_url` and `host`.
    pub login_path: String,
    /// Accept invalid and self-signed certificates.
    pub accept_invalid_certs: bool,
}

impl SessionConfig {
    /// Build the configuration of a session from the host being load tested and
    /// the one-time login URL.
    ///
    /// # Example
    /// ```rust
    /// use drupal_benchmark::session::SessionConfig;
    ///
    /// let session = SessionConfig::new(
    ///     "https://example.com",
    ///     "https://example.com/user/reset/1/1700000000/abc/login\n",
    /// );
    /// assert_eq!(session.login_path, "/user/reset/1/1700000000/abc/login");
    /// assert!(session.accept_invalid_certs);
    /// ```
    pub fn new(host: &str, login_url: &str) -> Self {
        SessionConfig {
            host: host.to_string(),
            login_url: login_url.to_string(),
            login_path: login_path(login_url, host),
            accept_invalid_certs: true,
        }
    }

    /// Build the configuration of a session, looking up the login URL with the
    /// provided function. Fails if the login URL isn't set.
    pub fn from_lookup<F>(host: &str, lookup: F) -> Result<Self, BenchmarkError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let login_url = login_url_from_lookup(lookup)?;
        Ok(SessionConfig::new(host, &login_url))
    }

    /// Build the configuration of a session from the process environment.
    pub fn from_env(host: &str) -> Result<Self, BenchmarkError> {
        SessionConfig::from_lookup(host, |key| env::var(key).ok())
    }

    /// Whether the host was found in the login URL. If not, the full login URL
    /// is requested as is.
    pub fn host_in_login_url(&self) -> bool {
        !self.host.is_empty() && self.login_url.contains(&self.host)
    }

    /// The builder for the HTTP client used by this session.
    ///
    /// Cookies are stored so the session established by logging in is reused by
    /// every following request.
    pub fn client_builder(&self) -> ClientBuilder {
        Client::builder()
            .user_agent(APP_USER_AGENT)
            .cookie_store(true)
            .gzip(true)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
    }
}

/// Derive the login path from the full login URL.
///
/// Returns everything after the first occurrence of `host` in `login_url` with
/// trailing whitespace removed. If `host` doesn't occur in `login_url`, the whole
/// `login_url` is returned with trailing whitespace removed.
pub fn login_path(login_url: &str, host: &str) -> String {
    let path = match login_url.split_once(host) {
        Some((_, path)) => path,
        None => login_url,
    };
    path.trim_end().to_string()
}

/// Convert the base url of a Goose user into the host string searched for in
/// the login URL.
pub fn host_from_base_url(base_url: &Url) -> String {
    base_url.as_str().trim_end_matches('/').to_string()
}

/// Look up the login URL with the provided function.
pub fn login_url_from_lookup<F>(lookup: F) -> Result<String, BenchmarkError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(LOGIN_URL_VAR).ok_or_else(|| BenchmarkError::MissingLoginUrl {
        variable: LOGIN_URL_VAR.to_string(),
        detail: "set it to a one-time login link, for example the output of `drush uli`"
            .to_string(),
    })
}

/// Read the login URL from the process environment.
pub fn login_url_from_env() -> Result<String, BenchmarkError> {
    login_url_from_lookup(|key| env::var(key).ok())
}

/// The scheme, host and port of the login URL, usable as the Goose `--host`.
///
/// Returns `None` if the login URL can't be parsed or has no host.
pub fn login_host(login_url: &str) -> Option<String> {
    match Url::parse(login_url.trim()) {
        Ok(url) if url.has_host() => Some(url.origin().ascii_serialization()),
        Ok(_) => None,
        Err(e) => {
            debug!("failed to parse login url: {}", e);
            None
        }
    }
}
