//! OpenAPI document for the session endpoints.

use utoipa::OpenApi;

use super::handlers::{admin, auth, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "enketi",
        description = "Survey platform session authentication and admin gate"
    ),
    paths(
        health::health,
        auth::session::verify,
        auth::session::issue,
        admin::overview
    ),
    components(schemas(
        auth::types::IssueSessionRequest,
        auth::types::StatusResponse,
        auth::Verdict,
        admin::AdminOverview,
        health::Health
    )),
    tags(
        (name = "auth", description = "Session issuance and verification"),
        (name = "admin", description = "Protected administrative surface"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_session_paths() {
        let doc = openapi();
        assert!(doc.paths.paths.contains_key("/v1/auth/session"));
        assert!(doc.paths.paths.contains_key("/v1/admin"));
        assert!(doc.paths.paths.contains_key("/health"));
    }
}
