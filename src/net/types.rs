//! Wire types for the auth API plus the gateway's observable state.
//!
//! SYSTEM CONTEXT
//! ==============
//! `Credentials` come from the form, `AuthPayload` is what goes on the wire,
//! and `ResponseEnvelope` is the schema every backend response is read
//! through. `RequestState` is what UI code watches.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// CREDENTIALS
// =============================================================================

/// Password wrapper that never prints its contents.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw value, for serialization into a request body only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(••••••••)")
    }
}

/// Email + password pair submitted for authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: Password,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: Password::new(password) }
    }

    /// Local part of the email, when the email has one.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        derive_username(&self.email)
    }

    /// Build the request body under the given username policy.
    #[must_use]
    pub fn payload(&self, policy: UsernamePolicy) -> AuthPayload<'_> {
        let username = match policy {
            UsernamePolicy::Omit => None,
            UsernamePolicy::DeriveFromEmail => self.username(),
        };
        AuthPayload { username, email: &self.email, password: self.password.expose() }
    }
}

/// Return the part of `email` before the first `@`.
///
/// `None` when there is no `@` or the local part is blank.
#[must_use]
pub fn derive_username(email: &str) -> Option<&str> {
    let (local, _) = email.split_once('@')?;
    let local = local.trim();
    if local.is_empty() { None } else { Some(local) }
}

/// Whether login/sign-up bodies carry a `username` derived from the email.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UsernamePolicy {
    #[default]
    Omit,
    DeriveFromEmail,
}

/// JSON body of `POST /auth/login` and `POST /auth/sign_up`.
///
/// No `Debug`: it holds the raw password.
#[derive(Serialize)]
pub struct AuthPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<&'a str>,
    pub email: &'a str,
    pub password: &'a str,
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// The two auth endpoints, selected by variant rather than by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOperation {
    Login,
    SignUp,
}

impl AuthOperation {
    /// Fixed path joined onto the backend host.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/auth/login",
            Self::SignUp => "/auth/sign_up",
        }
    }

    /// Human-readable page name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::SignUp => "Sign Up",
        }
    }
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Schema every backend response body is read through.
///
/// FastAPI rejections use `detail`; the app's own handlers use `details`.
/// Both are read as separate fields and `details` wins when both are set.
#[derive(Debug, Default, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub details: Option<Value>,
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ResponseEnvelope {
    /// The payload field: `details`, falling back to `detail`.
    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        self.details.as_ref().or(self.detail.as_ref())
    }

    /// Owned form of [`ResponseEnvelope::payload`].
    #[must_use]
    pub fn into_payload(self) -> Option<Value> {
        self.details.or(self.detail)
    }

    /// Render the payload as a user-facing message.
    ///
    /// Strings pass through; any other JSON is shown in compact form.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self.payload()? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Loading/error flags observed by form components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestState {
    pub loading: bool,
    pub error: Option<String>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
