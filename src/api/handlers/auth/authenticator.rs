//! Session issuance and verification.
//!
//! Flow Overview: every call first passes the block list and the rate
//! limiter, then either checks the presented credential and mints an
//! encrypted session (issue) or decrypts and validates the presented cookie
//! (verify). All ambiguous input fails closed.

use secrecy::SecretString;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;
use utoipa::ToSchema;

use super::block_list::BlockList;
use super::codec::{CookieCodec, EncryptedSession, SessionPayload};
use super::rate_limit::{RateLimitDecision, RateLimiter};
use super::state::AuthConfig;
use super::utils::credential_matches;

/// Canonical authentication status reported to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Session is valid for this identifier.
    Ok,
    /// No session yet, or the session's TTL has lapsed; re-authenticate.
    Refresh,
    /// Invalid input: bad credential, undecryptable or mis-bound session,
    /// or missing server secrets.
    Error,
    /// The identifier is rate-limited or temporarily blocked.
    Blocked,
}

/// Denial reasons. `Refresh` outcomes are not errors and never appear here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("too many requests within the rate window")]
    RateLimited,
    #[error("identifier is temporarily blocked")]
    Blocked,
    #[error("session cookie is malformed or bound to another identifier")]
    MalformedSession,
    #[error("presented credential does not match")]
    InvalidCredential,
    #[error("session secrets are not configured")]
    Misconfigured,
}

impl AuthError {
    /// The status reported in the response body for this denial.
    #[must_use]
    pub const fn verdict(self) -> Verdict {
        match self {
            Self::RateLimited | Self::Blocked => Verdict::Blocked,
            Self::MalformedSession | Self::InvalidCredential | Self::Misconfigured => {
                Verdict::Error
            }
        }
    }
}

/// Orchestrates rate limiting, blocking, credential verification, and cookie
/// issuance/validation. Holds the only mutable auth state in the process.
pub struct SessionAuthenticator {
    codec: Option<CookieCodec>,
    credential: Option<SecretString>,
    limiter: Arc<dyn RateLimiter>,
    block_list: BlockList,
    session_ttl: Duration,
    block_duration: Duration,
    block_bypass: bool,
}

impl SessionAuthenticator {
    /// Build the authenticator from the auth configuration.
    ///
    /// Missing secrets are tolerated here: the affected paths answer
    /// `Misconfigured` at request time instead of refusing to start.
    ///
    /// # Errors
    /// Returns an error if cookie key derivation fails.
    pub fn new(config: &AuthConfig, limiter: Arc<dyn RateLimiter>) -> anyhow::Result<Self> {
        let codec = match config.cookie_key() {
            Some(secret) => Some(CookieCodec::new(secret)?),
            None => None,
        };
        Ok(Self {
            codec,
            credential: config.credential().cloned(),
            limiter,
            block_list: BlockList::new(),
            session_ttl: Duration::from_secs(config.session_ttl_seconds()),
            block_duration: Duration::from_secs(config.block_duration_seconds()),
            block_bypass: config.dev_mode(),
        })
    }

    /// Block-list and rate-limit admission shared by both paths.
    ///
    /// Exceeding the rate limit blocks the identifier for the configured
    /// duration; dev mode still records blocks but never enforces them.
    fn admit(&self, identifier: &str) -> Result<(), AuthError> {
        if !self.block_bypass && self.block_list.is_blocked(identifier) {
            return Err(AuthError::Blocked);
        }
        if self.limiter.check_and_consume(identifier) == RateLimitDecision::Limited {
            self.block_list.block(identifier, self.block_duration);
            return Err(AuthError::RateLimited);
        }
        Ok(())
    }

    /// Verify the session cookie presented by `identifier`.
    ///
    /// `Ok(Verdict::Refresh)` covers the two non-hostile no-session states:
    /// first contact (no cookie at all) and a lapsed TTL. A cookie that does
    /// not decrypt, or decrypts to a different identifier, is a
    /// [`AuthError::MalformedSession`] regardless of TTL.
    ///
    /// # Errors
    /// Returns the denial reason; all denials fail closed.
    pub fn verify(&self, identifier: &str, cookie: Option<&str>) -> Result<Verdict, AuthError> {
        self.admit(identifier)?;
        let codec = self.codec.as_ref().ok_or(AuthError::Misconfigured)?;

        let Some(cookie) = cookie else {
            // First contact: no cookie yet is the expected state.
            return Ok(Verdict::Refresh);
        };
        let encoded: EncryptedSession =
            serde_json::from_str(cookie).map_err(|_| AuthError::MalformedSession)?;
        let payload = codec.decrypt(&encoded).ok_or(AuthError::MalformedSession)?;

        if payload.identifier != identifier {
            return Err(AuthError::MalformedSession);
        }
        if now_unix_millis() > payload.expires_at {
            return Ok(Verdict::Refresh);
        }
        Ok(Verdict::Ok)
    }

    /// Check the presented credential and mint an encrypted session bound to
    /// `identifier`, valid for the configured TTL.
    ///
    /// # Errors
    /// Returns the denial reason; all denials fail closed.
    pub fn issue(
        &self,
        identifier: &str,
        presented: &str,
    ) -> Result<EncryptedSession, AuthError> {
        self.admit(identifier)?;
        let codec = self.codec.as_ref().ok_or(AuthError::Misconfigured)?;
        let expected = self.credential.as_ref().ok_or(AuthError::Misconfigured)?;

        if presented.is_empty() || !credential_matches(presented, expected) {
            return Err(AuthError::InvalidCredential);
        }

        let ttl_millis = i64::try_from(self.session_ttl.as_millis()).unwrap_or(i64::MAX);
        let payload = SessionPayload {
            identifier: identifier.to_string(),
            expires_at: now_unix_millis().saturating_add(ttl_millis),
            presented_credential: presented.to_string(),
        };
        codec.encrypt(&payload).map_err(|err| {
            error!("Failed to encrypt session payload: {err}");
            AuthError::Misconfigured
        })
    }

    /// Cookie `Max-Age` must match the payload TTL.
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Whether both server-side secrets are present, for `/health`.
    #[must_use]
    pub fn secrets_configured(&self) -> bool {
        self.codec.is_some() && self.credential.is_some()
    }
}

fn now_unix_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::super::rate_limit::{NoopRateLimiter, SlidingWindowLimiter};
    use super::*;

    const COOKIE_KEY: &str = "cookie-key";
    const CREDENTIAL: &str = "secret123";

    fn config() -> AuthConfig {
        AuthConfig::new("http://localhost:3000".to_string())
            .with_credential(SecretString::from(CREDENTIAL.to_string()))
            .with_cookie_key(SecretString::from(COOKIE_KEY.to_string()))
    }

    fn authenticator(config: &AuthConfig) -> SessionAuthenticator {
        SessionAuthenticator::new(config, Arc::new(NoopRateLimiter))
            .expect("authenticator should build")
    }

    fn cookie_for(encoded: &EncryptedSession) -> String {
        serde_json::to_string(encoded).expect("serialize cookie")
    }

    #[test]
    fn issue_then_verify_returns_ok() {
        let auth = authenticator(&config());
        let encoded = auth.issue("1.2.3.4", CREDENTIAL).expect("issue");
        let verdict = auth.verify("1.2.3.4", Some(&cookie_for(&encoded)));
        assert_eq!(verdict, Ok(Verdict::Ok));
    }

    #[test]
    fn issued_payload_preserves_identifier_binding() {
        let cfg = config();
        let auth = authenticator(&cfg);
        let encoded = auth.issue("1.2.3.4", CREDENTIAL).expect("issue");
        let codec = CookieCodec::new(&SecretString::from(COOKIE_KEY.to_string()))
            .expect("codec");
        let payload = codec.decrypt(&encoded).expect("decrypt");
        assert_eq!(payload.identifier, "1.2.3.4");
        assert_eq!(payload.presented_credential, CREDENTIAL);
    }

    #[test]
    fn verify_from_other_identifier_is_rejected_before_expiry() {
        let auth = authenticator(&config());
        let encoded = auth.issue("1.2.3.4", CREDENTIAL).expect("issue");
        let verdict = auth.verify("5.6.7.8", Some(&cookie_for(&encoded)));
        assert_eq!(verdict, Err(AuthError::MalformedSession));
    }

    #[test]
    fn expired_session_asks_for_refresh() {
        let cfg = config();
        let auth = authenticator(&cfg);
        let codec = CookieCodec::new(&SecretString::from(COOKIE_KEY.to_string()))
            .expect("codec");
        let expired = codec
            .encrypt(&SessionPayload {
                identifier: "1.2.3.4".to_string(),
                expires_at: now_unix_millis() - 1_000,
                presented_credential: CREDENTIAL.to_string(),
            })
            .expect("encrypt");
        let verdict = auth.verify("1.2.3.4", Some(&cookie_for(&expired)));
        assert_eq!(verdict, Ok(Verdict::Refresh));
    }

    #[test]
    fn missing_cookie_is_first_contact_not_an_error() {
        let auth = authenticator(&config());
        assert_eq!(auth.verify("1.2.3.4", None), Ok(Verdict::Refresh));
    }

    #[test]
    fn garbage_cookie_is_malformed() {
        let auth = authenticator(&config());
        assert_eq!(
            auth.verify("1.2.3.4", Some("not-json")),
            Err(AuthError::MalformedSession)
        );
        assert_eq!(
            auth.verify(
                "1.2.3.4",
                Some("{\"ciphertext\":\"zz\",\"iv\":\"zz\"}")
            ),
            Err(AuthError::MalformedSession)
        );
    }

    #[test]
    fn wrong_or_empty_credential_is_rejected() {
        let auth = authenticator(&config());
        assert_eq!(
            auth.issue("1.2.3.4", "wrong"),
            Err(AuthError::InvalidCredential)
        );
        assert_eq!(auth.issue("1.2.3.4", ""), Err(AuthError::InvalidCredential));
    }

    #[test]
    fn missing_secrets_fail_closed_as_misconfigured() {
        let cfg = AuthConfig::new("http://localhost:3000".to_string());
        let auth = authenticator(&cfg);
        assert_eq!(
            auth.issue("1.2.3.4", CREDENTIAL),
            Err(AuthError::Misconfigured)
        );
        assert_eq!(auth.verify("1.2.3.4", None), Err(AuthError::Misconfigured));
        assert!(!auth.secrets_configured());
    }

    #[test]
    fn exceeding_the_rate_limit_blocks_the_identifier() {
        let cfg = config()
            .with_rate_limit_max_requests(2)
            .with_block_duration_seconds(3600);
        let limiter = Arc::new(SlidingWindowLimiter::new(
            std::time::Duration::from_secs(60),
            cfg.rate_limit_max_requests(),
        ));
        let auth = SessionAuthenticator::new(&cfg, limiter).expect("authenticator");

        assert_eq!(auth.verify("1.2.3.4", None), Ok(Verdict::Refresh));
        assert_eq!(auth.verify("1.2.3.4", None), Ok(Verdict::Refresh));
        assert_eq!(auth.verify("1.2.3.4", None), Err(AuthError::RateLimited));
        // The block now takes precedence over the limiter.
        assert_eq!(auth.verify("1.2.3.4", None), Err(AuthError::Blocked));
        // Other identifiers are unaffected.
        assert_eq!(auth.verify("5.6.7.8", None), Ok(Verdict::Refresh));
    }

    #[test]
    fn dev_mode_bypasses_the_block_list_but_not_the_limiter() {
        let cfg = config()
            .with_rate_limit_max_requests(1)
            .with_block_duration_seconds(3600)
            .with_dev_mode(true);
        let limiter = Arc::new(SlidingWindowLimiter::new(
            std::time::Duration::from_millis(20),
            cfg.rate_limit_max_requests(),
        ));
        let auth = SessionAuthenticator::new(&cfg, limiter).expect("authenticator");

        assert_eq!(auth.verify("1.2.3.4", None), Ok(Verdict::Refresh));
        assert_eq!(auth.verify("1.2.3.4", None), Err(AuthError::RateLimited));
        std::thread::sleep(std::time::Duration::from_millis(30));
        // Window elapsed; the hour-long block would still deny without bypass.
        assert_eq!(auth.verify("1.2.3.4", None), Ok(Verdict::Refresh));
    }

    #[test]
    fn error_verdict_mapping_is_canonical() {
        assert_eq!(AuthError::RateLimited.verdict(), Verdict::Blocked);
        assert_eq!(AuthError::Blocked.verdict(), Verdict::Blocked);
        assert_eq!(AuthError::MalformedSession.verdict(), Verdict::Error);
        assert_eq!(AuthError::InvalidCredential.verdict(), Verdict::Error);
        assert_eq!(AuthError::Misconfigured.verdict(), Verdict::Error);
    }
}
