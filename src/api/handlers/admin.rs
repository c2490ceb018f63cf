//! Protected admin surface.
//!
//! Everything under `/v1/admin` sits behind the session gate middleware. The
//! survey administration routers (surveys, questions, response review) are
//! separate collaborators that nest here; this module only ships the service
//! overview used by the admin front-end after login.

use axum::{extract::Extension, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::auth::AuthState;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AdminOverview {
    pub name: String,
    pub version: String,
    /// Seconds a freshly issued session stays valid.
    pub session_ttl_seconds: u64,
    pub dev_mode: bool,
}

#[utoipa::path(
    get,
    path = "/v1/admin",
    responses(
        (status = 200, description = "Admin service overview", body = AdminOverview),
        (status = 401, description = "Missing or invalid session"),
        (status = 429, description = "Address is rate-limited or blocked")
    ),
    tag = "admin"
)]
pub async fn overview(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    Json(AdminOverview {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        session_ttl_seconds: auth_state.config().session_ttl_seconds(),
        dev_mode: auth_state.config().dev_mode(),
    })
}
