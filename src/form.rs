//! Login / sign-up form model.
//!
//! SYSTEM CONTEXT
//! ==============
//! Both auth pages are the same form with a different [`AuthOperation`].
//! Rendering is left to the caller; this module owns the input check, the
//! submit sequence, and what the page shows for a given [`RequestState`].

use serde_json::Value;

use crate::net::error::GatewayError;
use crate::net::gateway::Gateway;
use crate::net::transport::HttpTransport;
use crate::net::types::{AuthOperation, Credentials, RequestState};

const INCOMPLETE_MESSAGE: &str = "Enter both email and password.";

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("{0}")]
    Incomplete(&'static str),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Field values for one auth page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthForm {
    pub operation: AuthOperation,
    pub email: String,
    pub password: String,
}

impl AuthForm {
    #[must_use]
    pub fn new(operation: AuthOperation) -> Self {
        Self { operation, email: String::new(), password: String::new() }
    }

    #[must_use]
    pub fn with_input(operation: AuthOperation, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { operation, email: email.into(), password: password.into() }
    }

    #[must_use]
    pub fn page_title(&self) -> &'static str {
        self.operation.label()
    }

    #[must_use]
    pub fn submit_label(&self) -> String {
        self.operation.label().to_uppercase()
    }

    /// Trim the email and require both fields.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message if either field is blank.
    pub fn validate(&self) -> Result<Credentials, &'static str> {
        validate_auth_input(&self.email, &self.password)
    }

    /// Clear the previous error, then run this form's operation.
    ///
    /// # Errors
    ///
    /// [`FormError::Incomplete`] before anything is sent, otherwise the
    /// gateway's error. Incomplete input leaves gateway state untouched.
    pub async fn submit<T: HttpTransport>(&self, gateway: &Gateway<T>) -> Result<Value, FormError> {
        let credentials = self.validate().map_err(FormError::Incomplete)?;
        gateway.clear_error();
        let details = gateway.authenticate(self.operation, &credentials).await?;
        tracing::info!(operation = self.operation.label(), email = %credentials.email, "auth succeeded");
        Ok(details)
    }
}

fn validate_auth_input(email: &str, password: &str) -> Result<Credentials, &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(INCOMPLETE_MESSAGE);
    }
    Ok(Credentials::new(email, password))
}

/// Submit stays disabled while a request is outstanding.
#[must_use]
pub fn submit_disabled(state: &RequestState) -> bool {
    state.loading
}

/// Text of the dismissible warning banner, if one should show.
#[must_use]
pub fn warning_banner(state: &RequestState) -> Option<&str> {
    state.error.as_deref().filter(|e| !e.is_empty())
}

#[cfg(test)]
#[path = "form_test.rs"]
mod tests;
