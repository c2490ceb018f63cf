//! Session endpoints: verify (`GET`) and issue (`POST`).

use anyhow::Context;
use axum::{
    extract::{ConnectInfo, Extension},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::authenticator::{AuthError, Verdict};
use super::codec::EncryptedSession;
use super::state::{AuthConfig, AuthState};
use super::types::{IssueSessionRequest, StatusResponse};
use super::utils::{client_identifier, extract_session_cookie};

pub const SESSION_COOKIE_NAME: &str = "schk";

#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses(
        (status = 200, description = "Session is valid (`ok`) or absent/expired (`refresh`)", body = StatusResponse),
        (status = 401, description = "Session is malformed or bound to another address", body = StatusResponse),
        (status = 429, description = "Address is rate-limited or blocked", body = StatusResponse),
        (status = 500, description = "Server secrets are not configured", body = StatusResponse)
    ),
    tag = "auth"
)]
pub async fn verify(
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    let identifier = client_identifier(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    let cookie = extract_session_cookie(&headers);
    debug!(%identifier, cookie_present = cookie.is_some(), "session verify");

    match auth_state
        .authenticator()
        .verify(&identifier, cookie.as_deref())
    {
        Ok(verdict) => (StatusCode::OK, Json(StatusResponse { status: verdict })).into_response(),
        Err(err) => denial_response(&identifier, err),
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/session",
    request_body = IssueSessionRequest,
    responses(
        (status = 200, description = "Credential accepted, session cookie set", body = StatusResponse),
        (status = 401, description = "Credential mismatch", body = StatusResponse),
        (status = 429, description = "Address is rate-limited or blocked", body = StatusResponse),
        (status = 500, description = "Server secrets are not configured", body = StatusResponse)
    ),
    tag = "auth"
)]
pub async fn issue(
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    auth_state: Extension<Arc<AuthState>>,
    Json(body): Json<IssueSessionRequest>,
) -> impl IntoResponse {
    let identifier = client_identifier(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    debug!(%identifier, "session issue");

    let encoded = match auth_state
        .authenticator()
        .issue(&identifier, &body.presented_credential)
    {
        Ok(encoded) => encoded,
        Err(err) => return denial_response(&identifier, err),
    };

    let mut response_headers = HeaderMap::new();
    match session_cookie(auth_state.config(), &encoded) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!(%identifier, "Failed to build session cookie: {err}");
            return denial_response(&identifier, AuthError::Misconfigured);
        }
    }

    (
        StatusCode::OK,
        response_headers,
        Json(StatusResponse {
            status: Verdict::Ok,
        }),
    )
        .into_response()
}

/// Map a denial to its canonical HTTP response: `blocked` → 429, `error` →
/// 401, with misconfiguration as the single 500 exception (operator fault).
pub(crate) fn denial_response(identifier: &str, err: AuthError) -> Response {
    let status = match err {
        AuthError::RateLimited | AuthError::Blocked => StatusCode::TOO_MANY_REQUESTS,
        AuthError::MalformedSession | AuthError::InvalidCredential => StatusCode::UNAUTHORIZED,
        AuthError::Misconfigured => StatusCode::INTERNAL_SERVER_ERROR,
    };
    match err {
        AuthError::Misconfigured => error!(%identifier, "Session auth misconfigured: {err}"),
        _ => warn!(%identifier, "Session auth denied: {err}"),
    }
    (
        status,
        Json(StatusResponse {
            status: err.verdict(),
        }),
    )
        .into_response()
}

/// Build the session `Set-Cookie` header: the JSON-encoded encrypted session
/// with a `Max-Age` matching the payload TTL. No `HttpOnly`: the admin
/// front-end script is allowed to see the cookie, and checks its validity
/// through the verify endpoint rather than by parsing it.
fn session_cookie(
    config: &AuthConfig,
    encoded: &EncryptedSession,
) -> anyhow::Result<HeaderValue> {
    let value =
        serde_json::to_string(encoded).context("failed to serialize session cookie")?;
    let ttl_seconds = config.session_ttl_seconds();
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE_NAME}={value}; Path=/; Max-Age={ttl_seconds}; Secure; SameSite=Strict"
    ))
    .context("failed to build session cookie header")
}
