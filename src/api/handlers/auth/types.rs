//! Request/response types for the session endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::authenticator::Verdict;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct IssueSessionRequest {
    #[serde(rename = "presentedCredential")]
    pub presented_credential: String,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct StatusResponse {
    pub status: Verdict,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    #[test]
    fn issue_request_uses_wire_field_name() -> Result<()> {
        let request: IssueSessionRequest =
            serde_json::from_str(r#"{"presentedCredential":"secret123"}"#)?;
        assert_eq!(request.presented_credential, "secret123");
        let value = serde_json::to_value(&request)?;
        value
            .get("presentedCredential")
            .context("missing presentedCredential")?;
        Ok(())
    }

    #[test]
    fn status_response_serializes_lowercase() -> Result<()> {
        let value = serde_json::to_value(StatusResponse {
            status: Verdict::Refresh,
        })?;
        assert_eq!(value["status"], "refresh");
        Ok(())
    }
}
