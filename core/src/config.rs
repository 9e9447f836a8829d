//! Credentials and target configuration.
//!
//! # Design
//! `ClientConfig` is plain data: an app id/key pair, the protocol and hostname
//! used when no endpoint is configured, an ordered endpoint pool and an
//! optional pinned endpoint. Endpoint strings are checked and normalized by
//! [`normalize_endpoint`] when the config is handed to `IntercomClient`, so the
//! resolver only ever sees `http(s)://` URLs without a trailing slash.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_HOSTNAME: &str = "api.intercom.io";

/// Scheme used when the base URL is derived from `hostname`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    #[default]
    Https,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            _ => Err(ConfigError::InvalidProtocol(s.to_string())),
        }
    }
}

/// Stands in for secrets in `Debug` output.
pub(crate) const REDACTED: &str = "[redacted]";

/// Identity and target settings for one client.
///
/// `Debug` never prints `api_key`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    app_id: Option<String>,
    api_key: Option<String>,
    protocol: Protocol,
    hostname: String,
    endpoints: Vec<String>,
    endpoint: Option<String>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("app_id", &self.app_id)
            .field("api_key", &self.api_key.as_ref().map(|_| REDACTED))
            .field("protocol", &self.protocol)
            .field("hostname", &self.hostname)
            .field("endpoints", &self.endpoints)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            api_key: None,
            protocol: Protocol::default(),
            hostname: DEFAULT_HOSTNAME.to_string(),
            endpoints: Vec::new(),
            endpoint: None,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the config from `INTERCOM_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, using the same keys as
    /// [`ClientConfig::from_env`]. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        config.app_id = get("INTERCOM_APP_ID");
        config.api_key = get("INTERCOM_API_KEY");
        if let Some(protocol) = get("INTERCOM_PROTOCOL") {
            config.protocol = protocol.parse()?;
        }
        if let Some(hostname) = get("INTERCOM_HOSTNAME") {
            config.hostname = hostname;
        }
        if let Some(pool) = get("INTERCOM_ENDPOINTS") {
            config.endpoints = pool
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(normalize_endpoint)
                .collect::<Result<_, _>>()?;
        }
        config.endpoint = get("INTERCOM_ENDPOINT")
            .map(|e| normalize_endpoint(&e))
            .transpose()?;
        Ok(config)
    }

    pub fn with_credentials(mut self, app_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_endpoints<I, S>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.endpoints = endpoints.into_iter().map(Into::into).collect();
        self
    }

    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// The endpoint pool, in configured order.
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// The pinned endpoint, which takes precedence over the pool.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Both credentials, or `MissingCredentials` if either is unset or empty.
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        match (self.app_id(), self.api_key()) {
            (Some(id), Some(key)) if !id.is_empty() && !key.is_empty() => Ok((id, key)),
            _ => Err(ConfigError::MissingCredentials),
        }
    }

    /// Base URL derived from `protocol` and `hostname`, without credentials.
    pub fn derived_endpoint(&self) -> String {
        format!("{}://{}", self.protocol, self.hostname.trim_end_matches('/'))
    }

    pub(crate) fn set_credentials(&mut self, app_id: String, api_key: String) {
        self.app_id = Some(app_id);
        self.api_key = Some(api_key);
    }

    pub(crate) fn set_protocol(&mut self, protocol: Protocol) {
        self.protocol = protocol;
    }

    pub(crate) fn set_hostname(&mut self, hostname: String) {
        self.hostname = hostname;
    }

    pub(crate) fn set_endpoint(&mut self, endpoint: Option<String>) {
        self.endpoint = endpoint;
    }

    pub(crate) fn set_endpoints(&mut self, endpoints: Vec<String>) {
        self.endpoints = endpoints;
    }

    /// Normalize every configured endpoint, failing on the first invalid one.
    pub(crate) fn validated(mut self) -> Result<Self, ConfigError> {
        self.endpoint = self
            .endpoint
            .as_deref()
            .map(normalize_endpoint)
            .transpose()?;
        self.endpoints = self
            .endpoints
            .iter()
            .map(|e| normalize_endpoint(e))
            .collect::<Result<_, _>>()?;
        Ok(self)
    }
}

/// Check that `endpoint` is an absolute `http`/`https` URL with a host and
/// strip any trailing slash.
pub fn normalize_endpoint(endpoint: &str) -> Result<String, ConfigError> {
    let trimmed = endpoint.trim();
    let parsed = url::Url::parse(trimmed)
        .map_err(|_| ConfigError::InvalidEndpoint(endpoint.to_string()))?;
    let scheme_ok = matches!(parsed.scheme(), "http" | "https");
    if !scheme_ok || !parsed.has_host() {
        return Err(ConfigError::InvalidEndpoint(endpoint.to_string()));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}
