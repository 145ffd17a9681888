//! Client for a remote email/password authentication API.
//!
//! The [`Gateway`] issues `POST /auth/login` and `POST /auth/sign_up` against
//! a configured backend host, tracking loading and last-error state for the
//! form that drives it.

pub mod config;
pub mod form;
pub mod net;

pub use config::GatewayConfig;
pub use form::{AuthForm, FormError};
pub use net::error::{ErrorKind, GatewayError, MalformedReason};
pub use net::gateway::Gateway;
pub use net::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, Timeouts};
pub use net::types::{AuthOperation, Credentials, RequestState, UsernamePolicy};
