//! Authenticated HTTP client for the platform API.
//!
//! The [`Api`] trait is the seam every loader is written against. [`Client`]
//! implements it with a blocking `ureq` agent and a UAA bearer token that is
//! fetched on first use and cached for the lifetime of the client.

use crate::error::{Error, Result};
use reconcile::Transport;
use serde::Deserialize;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use ureq::Body;
use ureq::http::Response;

/// Timeout used when a caller passes a zero timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for inventory, manifest and apply requests.
pub const LONG_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Manifests of large deployments run to tens of megabytes.
const MAX_BODY_SIZE: u64 = 256 * 1024 * 1024;

const TOKEN_PATH: &str = "/uaa/oauth/token";

/// UAA client the platform registers for password logins.
const PASSWORD_CLIENT_ID: &str = "opsman";

/// Raw access to the platform API.
///
/// Paths are absolute API paths such as `/api/v0/staged/products`. A zero
/// timeout means [`DEFAULT_TIMEOUT`]. Non-success responses are errors.
pub trait Api {
    /// GET `path` and return the response body.
    fn get(&self, path: &str, timeout: Duration) -> Result<Vec<u8>>;

    /// POST a JSON `body` to `path` and return the response body.
    fn post(&self, path: &str, body: &str, timeout: Duration) -> Result<Vec<u8>>;

    /// PUT a JSON `body` to `path` and return the response body.
    fn put(&self, path: &str, body: &str, timeout: Duration) -> Result<Vec<u8>>;

    /// DELETE `path`.
    fn delete(&self, path: &str, timeout: Duration) -> Result<()>;
}

/// How the client authenticates against UAA.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Operator login through the platform's own UAA client.
    Password { username: String, password: String },
    /// A dedicated UAA client.
    Client { id: String, secret: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::Client { id, .. } => f
                .debug_struct("Client")
                .field("id", id)
                .finish_non_exhaustive(),
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn required(value: Option<&str>, what: &str) -> Result<String> {
    present(value).map(str::to_string).ok_or_else(|| {
        Error::InvalidConfig(format!(
            "Opsman {what} is required. Please specify by flag or environment variable"
        ))
    })
}

impl Credentials {
    /// Pick credentials from whatever the operator supplied.
    ///
    /// Without any client id or secret, a username and password are
    /// required. Once either client value is given, both are required.
    pub fn from_parts(
        username: Option<&str>,
        password: Option<&str>,
        client_id: Option<&str>,
        client_secret: Option<&str>,
    ) -> Result<Self> {
        if present(client_id).is_none() && present(client_secret).is_none() {
            Ok(Self::Password {
                username: required(username, "user")?,
                password: required(password, "user secret")?,
            })
        } else {
            Ok(Self::Client {
                id: required(client_id, "client ID")?,
                secret: required(client_secret, "client secret")?,
            })
        }
    }

    /// Form fields of the token request.
    fn token_form(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Password { username, password } => vec![
                ("grant_type", "password"),
                ("username", username.as_str()),
                ("password", password.as_str()),
                ("client_id", PASSWORD_CLIENT_ID),
                ("client_secret", ""),
            ],
            Self::Client { id, secret } => vec![
                ("grant_type", "client_credentials"),
                ("client_id", id.as_str()),
                ("client_secret", secret.as_str()),
            ],
        }
    }
}

/// Validate a target and give it a scheme if it has none.
pub fn normalize_target(target: Option<&str>) -> Result<String> {
    let target = required(target, "host")?;
    let target = target.trim_end_matches('/');
    if target.starts_with("http://") || target.starts_with("https://") {
        Ok(target.to_string())
    } else {
        Ok(format!("https://{target}"))
    }
}

/// Everything needed to build a [`Client`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL, with scheme.
    pub target: String,
    pub credentials: Credentials,
    /// Accept any TLS certificate.
    pub skip_ssl_validation: bool,
    /// Timeout for requests issued with a zero timeout.
    pub default_timeout: Duration,
}

impl ClientConfig {
    pub fn new(target: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            target: target.into(),
            credentials,
            skip_ssl_validation: false,
            default_timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Blocking client for the platform API.
pub struct Client {
    agent: ureq::Agent,
    target: String,
    credentials: Credentials,
    default_timeout: Duration,
    token: Mutex<Option<String>>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        let tls = ureq::tls::TlsConfig::builder()
            .disable_verification(config.skip_ssl_validation)
            .build();
        let agent_config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .tls_config(tls)
            .build();

        let default_timeout = if config.default_timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            config.default_timeout
        };

        Self {
            agent: ureq::Agent::new_with_config(agent_config),
            target: config.target,
            credentials: config.credentials,
            default_timeout,
            token: Mutex::new(None),
        }
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.target, path)
    }

    fn timeout(&self, requested: Duration) -> Duration {
        if requested.is_zero() {
            self.default_timeout
        } else {
            requested
        }
    }

    fn cached_token(&self) -> MutexGuard<'_, Option<String>> {
        match self.token.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn bearer(&self) -> Result<String> {
        let mut cached = self.cached_token();
        if let Some(token) = cached.as_ref() {
            return Ok(format!("Bearer {token}"));
        }
        let token = self.request_token()?;
        let header = format!("Bearer {token}");
        *cached = Some(token);
        Ok(header)
    }

    fn request_token(&self) -> Result<String> {
        log::debug!("Requesting token from {}{}", self.target, TOKEN_PATH);

        let mut response = self
            .agent
            .post(&self.url(TOKEN_PATH))
            .header("Accept", "application/json")
            .config()
            .timeout_global(Some(self.default_timeout))
            .build()
            .send_form(self.credentials.token_form())?;

        let status = response.status();
        let body = response.body_mut().read_to_string()?;
        if !status.is_success() {
            return Err(Error::Auth(format!("{} {}", status.as_u16(), body.trim())));
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| Error::decode("token response", &e))?;
        Ok(token.access_token)
    }

    fn finish(method: &str, path: &str, mut response: Response<Body>) -> Result<Vec<u8>> {
        let status = response.status();
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_SIZE)
            .read_to_vec()?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(Error::Http {
                method: method.to_string(),
                path: path.to_string(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            })
        }
    }
}

impl Api for Client {
    fn get(&self, path: &str, timeout: Duration) -> Result<Vec<u8>> {
        let timeout = self.timeout(timeout);
        log::debug!("GET {path} (timeout {timeout:?})");

        let response = self
            .agent
            .get(&self.url(path))
            .header("Authorization", self.bearer()?.as_str())
            .header("Accept", "application/json")
            .config()
            .timeout_global(Some(timeout))
            .build()
            .call()?;
        Self::finish("GET", path, response)
    }

    fn post(&self, path: &str, body: &str, timeout: Duration) -> Result<Vec<u8>> {
        let timeout = self.timeout(timeout);
        log::debug!("POST {path} (timeout {timeout:?})");

        let response = self
            .agent
            .post(&self.url(path))
            .header("Authorization", self.bearer()?.as_str())
            .header("Content-Type", "application/json")
            .config()
            .timeout_global(Some(timeout))
            .build()
            .send(body)?;
        Self::finish("POST", path, response)
    }

    fn put(&self, path: &str, body: &str, timeout: Duration) -> Result<Vec<u8>> {
        let timeout = self.timeout(timeout);
        log::debug!("PUT {path} (timeout {timeout:?})");

        let response = self
            .agent
            .put(&self.url(path))
            .header("Authorization", self.bearer()?.as_str())
            .header("Content-Type", "application/json")
            .config()
            .timeout_global(Some(timeout))
            .build()
            .send(body)?;
        Self::finish("PUT", path, response)
    }

    fn delete(&self, path: &str, timeout: Duration) -> Result<()> {
        let timeout = self.timeout(timeout);
        log::debug!("DELETE {path} (timeout {timeout:?})");

        let response = self
            .agent
            .delete(&self.url(path))
            .header("Authorization", self.bearer()?.as_str())
            .config()
            .timeout_global(Some(timeout))
            .build()
            .call()?;
        Self::finish("DELETE", path, response).map(|_| ())
    }
}

impl Transport for Client {
    fn post(&self, path: &str, body: &str, timeout: Duration) -> anyhow::Result<Vec<u8>> {
        Ok(Api::post(self, path, body, timeout)?)
    }
}
