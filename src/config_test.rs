use super::*;
use std::sync::{Mutex, MutexGuard, PoisonError};

// =============================================================================
// GatewayConfig::from_env: env manipulation requires unsafe in edition 2024.
// Tests that touch the environment hold ENV_LOCK for their whole body.
// =============================================================================

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// # Safety
/// Caller must hold `ENV_LOCK`.
unsafe fn clear_gateway_env() {
    unsafe {
        std::env::remove_var(BACKEND_HOST_VAR);
        std::env::remove_var(USERNAME_POLICY_VAR);
        std::env::remove_var(REQUEST_TIMEOUT_VAR);
        std::env::remove_var(CONNECT_TIMEOUT_VAR);
    }
}

#[test]
fn from_env_missing_host_errors() {
    let _guard = env_lock();
    unsafe { clear_gateway_env() };

    let err = GatewayConfig::from_env().unwrap_err();
    assert!(matches!(err, GatewayError::MissingBackendHost { ref var } if var == "BACKEND_HOST"));
}

#[test]
fn from_env_blank_host_counts_as_missing() {
    let _guard = env_lock();
    unsafe {
        clear_gateway_env();
        std::env::set_var(BACKEND_HOST_VAR, "   ");
    }

    assert!(matches!(GatewayConfig::from_env(), Err(GatewayError::MissingBackendHost { .. })));
    unsafe { clear_gateway_env() };
}

#[test]
fn from_env_defaults() {
    let _guard = env_lock();
    unsafe {
        clear_gateway_env();
        std::env::set_var(BACKEND_HOST_VAR, "http://localhost:8000/");
    }

    let cfg = GatewayConfig::from_env().unwrap();
    assert_eq!(cfg.backend_host, "http://localhost:8000");
    assert_eq!(cfg.username_policy, UsernamePolicy::Omit);
    assert_eq!(cfg.timeouts, Timeouts::default());

    unsafe { clear_gateway_env() };
}

#[test]
fn from_env_parses_overrides() {
    let _guard = env_lock();
    unsafe {
        clear_gateway_env();
        std::env::set_var(BACKEND_HOST_VAR, "https://auth.example.test/api");
        std::env::set_var(USERNAME_POLICY_VAR, "derive");
        std::env::set_var(REQUEST_TIMEOUT_VAR, "30");
        std::env::set_var(CONNECT_TIMEOUT_VAR, "5");
    }

    let cfg = GatewayConfig::from_env().unwrap();
    assert_eq!(cfg.backend_host, "https://auth.example.test/api");
    assert_eq!(cfg.username_policy, UsernamePolicy::DeriveFromEmail);
    assert_eq!(cfg.timeouts, Timeouts { request_secs: Some(30), connect_secs: Some(5) });

    unsafe { clear_gateway_env() };
}

#[test]
fn from_env_bad_timeout_errors() {
    let _guard = env_lock();
    unsafe {
        clear_gateway_env();
        std::env::set_var(BACKEND_HOST_VAR, "http://localhost:8000");
        std::env::set_var(REQUEST_TIMEOUT_VAR, "soon");
    }

    let err = GatewayConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("AUTH_REQUEST_TIMEOUT_SECS"));

    unsafe { clear_gateway_env() };
}

#[test]
fn from_env_zero_timeout_errors() {
    let _guard = env_lock();
    unsafe {
        clear_gateway_env();
        std::env::set_var(BACKEND_HOST_VAR, "http://localhost:8000");
        std::env::set_var(CONNECT_TIMEOUT_VAR, "0");
    }

    assert!(matches!(GatewayConfig::from_env(), Err(GatewayError::ConfigParse(_))));

    unsafe { clear_gateway_env() };
}

#[test]
fn from_env_with_host_ignores_missing_host_var() {
    let _guard = env_lock();
    unsafe { clear_gateway_env() };

    let cfg = GatewayConfig::from_env_with_host("http://127.0.0.1:9000").unwrap();
    assert_eq!(cfg.backend_host, "http://127.0.0.1:9000");
}

// =============================================================================
// parsing helpers: no env access
// =============================================================================

#[test]
fn backend_host_rejects_relative_and_non_http() {
    assert!(matches!(parse_backend_host(""), Err(GatewayError::InvalidBackendHost { .. })));
    assert!(matches!(parse_backend_host("/auth"), Err(GatewayError::InvalidBackendHost { .. })));
    assert!(matches!(parse_backend_host("localhost:8000"), Err(GatewayError::InvalidBackendHost { .. })));
    assert!(matches!(parse_backend_host("ftp://example.com"), Err(GatewayError::InvalidBackendHost { .. })));
}

#[test]
fn backend_host_trims_trailing_slashes() {
    assert_eq!(parse_backend_host(" http://localhost:8000// ").unwrap(), "http://localhost:8000");
}

#[test]
fn username_policy_parses_known_values() {
    assert_eq!(parse_username_policy(None).unwrap(), UsernamePolicy::Omit);
    assert_eq!(parse_username_policy(Some("derive")).unwrap(), UsernamePolicy::DeriveFromEmail);
    let err = parse_username_policy(Some("always")).unwrap_err().to_string();
    assert!(err.contains("unsupported username policy"));
}

#[test]
fn endpoint_joins_host_and_path() {
    let cfg = GatewayConfig::new("http://localhost:8000/").unwrap();
    assert_eq!(cfg.endpoint("/auth/login").unwrap().as_str(), "http://localhost:8000/auth/login");

    let cfg = GatewayConfig::new("https://example.test/api").unwrap();
    assert_eq!(cfg.endpoint("/auth/sign_up").unwrap().as_str(), "https://example.test/api/auth/sign_up");
}

#[test]
fn default_headers_are_json() {
    let cfg = GatewayConfig::new("http://localhost:8000").unwrap();
    let headers = cfg.default_headers();
    assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
}

#[test]
fn builders_override_defaults() {
    let timeouts = Timeouts { request_secs: Some(10), connect_secs: None };
    let cfg = GatewayConfig::new("http://localhost:8000")
        .unwrap()
        .with_timeouts(timeouts)
        .with_username_policy(UsernamePolicy::DeriveFromEmail);
    assert_eq!(cfg.timeouts, timeouts);
    assert_eq!(cfg.username_policy, UsernamePolicy::DeriveFromEmail);
}
