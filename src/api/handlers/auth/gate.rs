//! Middleware guarding the administrative surface.
//!
//! Wraps protected routes: the session is verified before the inner handler
//! runs, and any verdict other than `ok` short-circuits with the
//! machine-readable status (401, or 429 for rate-limited and blocked
//! addresses). The gate holds no state of its own.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, warn};

use super::authenticator::Verdict;
use super::session::denial_response;
use super::state::AuthState;
use super::types::StatusResponse;
use super::utils::{client_identifier, extract_session_cookie};

/// Verify the session cookie and either run the wrapped handler or deny.
pub async fn require_session(
    State(auth_state): State<Arc<AuthState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let identifier =
        client_identifier(request.headers(), connect_info.map(|ConnectInfo(addr)| addr));
    let cookie = extract_session_cookie(request.headers());

    match auth_state
        .authenticator()
        .verify(&identifier, cookie.as_deref())
    {
        Ok(Verdict::Ok) => {
            debug!(%identifier, "session accepted for protected route");
            next.run(request).await
        }
        Ok(verdict) => {
            warn!(%identifier, ?verdict, "denied access to protected route");
            (
                StatusCode::UNAUTHORIZED,
                Json(StatusResponse { status: verdict }),
            )
                .into_response()
        }
        Err(err) => denial_response(&identifier, err),
    }
}
