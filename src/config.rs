//! Gateway configuration parsed from environment variables.

use reqwest::Url;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::net::error::GatewayError;
use crate::net::transport::Timeouts;
use crate::net::types::UsernamePolicy;

pub const BACKEND_HOST_VAR: &str = "BACKEND_HOST";
pub const USERNAME_POLICY_VAR: &str = "AUTH_USERNAME_POLICY";
pub const REQUEST_TIMEOUT_VAR: &str = "AUTH_REQUEST_TIMEOUT_SECS";
pub const CONNECT_TIMEOUT_VAR: &str = "AUTH_CONNECT_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Validated base URL, without a trailing slash.
    pub backend_host: String,
    pub username_policy: UsernamePolicy,
    pub timeouts: Timeouts,
}

impl GatewayConfig {
    /// Config for `backend_host` with every other setting at its default.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidBackendHost`] unless the host is an
    /// absolute `http` or `https` URL.
    pub fn new(backend_host: &str) -> Result<Self, GatewayError> {
        Ok(Self {
            backend_host: parse_backend_host(backend_host)?,
            username_policy: UsernamePolicy::default(),
            timeouts: Timeouts::default(),
        })
    }

    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `BACKEND_HOST`: base URL of the auth backend
    ///
    /// Optional:
    /// - `AUTH_USERNAME_POLICY`: `omit` (default) or `derive`
    /// - `AUTH_REQUEST_TIMEOUT_SECS`: no timeout when absent
    /// - `AUTH_CONNECT_TIMEOUT_SECS`: no timeout when absent
    ///
    /// # Errors
    ///
    /// Returns an error if the host is missing or invalid, or if an optional
    /// value is present but unparsable.
    pub fn from_env() -> Result<Self, GatewayError> {
        let host = env_var(BACKEND_HOST_VAR)
            .ok_or_else(|| GatewayError::MissingBackendHost { var: BACKEND_HOST_VAR.into() })?;
        Self::from_env_with_host(&host)
    }

    /// Like [`GatewayConfig::from_env`], but with the host supplied directly.
    ///
    /// # Errors
    ///
    /// Same as [`GatewayConfig::from_env`], minus the missing-host case.
    pub fn from_env_with_host(host: &str) -> Result<Self, GatewayError> {
        let username_policy = parse_username_policy(env_var(USERNAME_POLICY_VAR).as_deref())?;
        let timeouts = Timeouts {
            request_secs: env_parse_secs(REQUEST_TIMEOUT_VAR)?,
            connect_secs: env_parse_secs(CONNECT_TIMEOUT_VAR)?,
        };
        Ok(Self { username_policy, timeouts, ..Self::new(host)? })
    }

    #[must_use]
    pub fn with_username_policy(mut self, policy: UsernamePolicy) -> Self {
        self.username_policy = policy;
        self
    }

    #[must_use]
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Join the backend host with an absolute path such as `/auth/login`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidBackendHost`] if the joined URL does not parse.
    pub fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        let raw = format!("{}/{}", self.backend_host, path.trim_start_matches('/'));
        Url::parse(&raw).map_err(|e| GatewayError::InvalidBackendHost {
            host: self.backend_host.clone(),
            reason: e.to_string(),
        })
    }

    /// Headers sent when a caller does not supply its own.
    #[must_use]
    pub fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }
}

fn env_var(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_owned()),
        _ => None,
    }
}

fn env_parse_secs(key: &str) -> Result<Option<u64>, GatewayError> {
    let Some(raw) = env_var(key) else {
        return Ok(None);
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(GatewayError::ConfigParse(format!("{key} must be positive"))),
        Ok(secs) => Ok(Some(secs)),
        Err(e) => Err(GatewayError::ConfigParse(format!("{key}={raw}: {e}"))),
    }
}

pub(crate) fn parse_backend_host(raw: &str) -> Result<String, GatewayError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: String| GatewayError::InvalidBackendHost { host: raw.to_owned(), reason };
    if trimmed.is_empty() {
        return Err(invalid("empty".into()));
    }
    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("no host".into()));
    }
    Ok(trimmed.to_owned())
}

pub(crate) fn parse_username_policy(raw: Option<&str>) -> Result<UsernamePolicy, GatewayError> {
    match raw.unwrap_or("omit") {
        "omit" => Ok(UsernamePolicy::Omit),
        "derive" => Ok(UsernamePolicy::DeriveFromEmail),
        other => Err(GatewayError::ConfigParse(format!(
            "unsupported username policy '{other}' (expected 'omit' or 'derive')"
        ))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
