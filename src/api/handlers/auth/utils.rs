//! Small helpers for identifier extraction and credential comparison.

use axum::http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use std::net::SocketAddr;

use super::session::SESSION_COOKIE_NAME;

/// Resolve the requester's identifier for rate limiting and session binding.
///
/// Trusted proxy headers win over the transport address: `x-forwarded-for`
/// (first entry), then `x-real-ip`, then the peer address, then loopback.
pub(crate) fn client_identifier(headers: &HeaderMap, remote: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(forwarded) = forwarded {
        return forwarded.to_string();
    }
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(real_ip) = real_ip {
        return real_ip.to_string();
    }
    remote
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "127.0.0.1".to_string())
}

/// Pull the raw session cookie value out of the `Cookie` header.
pub(crate) fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE_NAME {
            return Some(val.to_string());
        }
    }
    None
}

/// Constant-time comparison of the presented credential against the
/// configured one, so the equality check leaks no prefix length.
pub(super) fn credential_matches(presented: &str, expected: &SecretString) -> bool {
    let presented = presented.as_bytes();
    let expected = expected.expose_secret().as_bytes();
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
