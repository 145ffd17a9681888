//! Gateway error taxonomy.
//!
//! ERROR HANDLING
//! ==============
//! Every failure the gateway can observe maps to one variant here. Request
//! failures (transport, rejection, malformed body) are also projected into
//! the single observable error string on [`RequestState`](super::types::RequestState),
//! which loses the distinction; callers that need it match on the variant.

use std::fmt;

/// Errors produced by gateway configuration and request operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The backend host environment variable is not set.
    #[error("missing backend host: env var {var} not set")]
    MissingBackendHost { var: String },

    /// The backend host is not an absolute http(s) URL.
    #[error("invalid backend host `{host}`: {reason}")]
    InvalidBackendHost { host: String, reason: String },

    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request body could not be serialized.
    #[error("request encode failed: {0}")]
    Encode(String),

    /// The request never produced a readable response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status and a `details` message.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The backend answered, but the body did not match the envelope schema.
    #[error("malformed response (status {status}): {reason}")]
    Malformed { status: u16, reason: MalformedReason },
}

/// Why a response body was rejected as malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// The body was not valid JSON.
    InvalidJson(String),
    /// The body was JSON but not an object the envelope can be read from.
    InvalidEnvelope(String),
    /// The body was JSON but carried no `details` field.
    MissingDetails,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson(e) => write!(f, "body is not valid JSON: {e}"),
            Self::InvalidEnvelope(e) => write!(f, "body is not a response envelope: {e}"),
            Self::MissingDetails => f.write_str("envelope has no `details` field"),
        }
    }
}

/// Coarse failure class, one per taxonomy bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Encoding,
    Transport,
    BackendRejection,
    MalformedResponse,
}

impl GatewayError {
    /// Stable machine-readable code for logs and scripting.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingBackendHost { .. } => "E_MISSING_BACKEND_HOST",
            Self::InvalidBackendHost { .. } => "E_INVALID_BACKEND_HOST",
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Encode(_) => "E_ENCODE",
            Self::Transport(_) => "E_TRANSPORT",
            Self::Rejected { .. } => "E_BACKEND_REJECTION",
            Self::Malformed { .. } => "E_MALFORMED_RESPONSE",
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingBackendHost { .. }
            | Self::InvalidBackendHost { .. }
            | Self::ConfigParse(_)
            | Self::HttpClientBuild(_) => ErrorKind::Configuration,
            Self::Encode(_) => ErrorKind::Encoding,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Rejected { .. } => ErrorKind::BackendRejection,
            Self::Malformed { .. } => ErrorKind::MalformedResponse,
        }
    }

    /// HTTP status of the response that caused the error, if one arrived.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::Malformed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
