//! Networking modules for the auth API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `gateway` owns the request cycle and observable state, `transport` is the
//! swappable HTTP seam, `types` defines the wire schema, and `error` the
//! failure taxonomy.

pub mod error;
pub mod gateway;
pub mod transport;
pub mod types;
