//! Auth configuration and shared state.

use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;

use super::authenticator::SessionAuthenticator;
use super::rate_limit::RateLimiter;

const DEFAULT_SESSION_TTL_SECONDS: u64 = 60 * 60;
const DEFAULT_RATE_LIMIT_WINDOW_SECONDS: u64 = 60;
const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 10;
const DEFAULT_BLOCK_DURATION_SECONDS: u64 = 5 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    credential: Option<SecretString>,
    cookie_key: Option<SecretString>,
    session_ttl_seconds: u64,
    rate_limit_window_seconds: u64,
    rate_limit_max_requests: u32,
    block_duration_seconds: u64,
    dev_mode: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            credential: None,
            cookie_key: None,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            rate_limit_window_seconds: DEFAULT_RATE_LIMIT_WINDOW_SECONDS,
            rate_limit_max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            block_duration_seconds: DEFAULT_BLOCK_DURATION_SECONDS,
            dev_mode: false,
        }
    }

    #[must_use]
    pub fn with_credential(mut self, credential: SecretString) -> Self {
        self.credential = Some(credential);
        self
    }

    #[must_use]
    pub fn with_cookie_key(mut self, cookie_key: SecretString) -> Self {
        self.cookie_key = Some(cookie_key);
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_rate_limit_window_seconds(mut self, seconds: u64) -> Self {
        self.rate_limit_window_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_rate_limit_max_requests(mut self, max_requests: u32) -> Self {
        self.rate_limit_max_requests = max_requests;
        self
    }

    #[must_use]
    pub fn with_block_duration_seconds(mut self, seconds: u64) -> Self {
        self.block_duration_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    pub(super) fn credential(&self) -> Option<&SecretString> {
        self.credential.as_ref()
    }

    pub(super) fn cookie_key(&self) -> Option<&SecretString> {
        self.cookie_key.as_ref()
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> u64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_seconds)
    }

    #[must_use]
    pub fn rate_limit_max_requests(&self) -> u32 {
        self.rate_limit_max_requests
    }

    #[must_use]
    pub fn block_duration_seconds(&self) -> u64 {
        self.block_duration_seconds
    }

    #[must_use]
    pub fn dev_mode(&self) -> bool {
        self.dev_mode
    }
}

/// Process-wide auth state: configuration plus the single authenticator
/// instance that owns the rate-limiter and block-list maps.
pub struct AuthState {
    config: AuthConfig,
    authenticator: SessionAuthenticator,
}

impl AuthState {
    /// Build the state once at startup.
    ///
    /// # Errors
    /// Returns an error if cookie key derivation fails.
    pub fn new(config: AuthConfig, limiter: Arc<dyn RateLimiter>) -> Result<Self> {
        let authenticator = SessionAuthenticator::new(&config, limiter)?;
        Ok(Self {
            config,
            authenticator,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn authenticator(&self) -> &SessionAuthenticator {
        &self.authenticator
    }
}

#[cfg(test)]
mod tests {
    use super::super::rate_limit::NoopRateLimiter;
    use super::*;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new("https://surveys.example.com".to_string());

        assert_eq!(config.frontend_base_url(), "https://surveys.example.com");
        assert_eq!(config.session_ttl_seconds(), DEFAULT_SESSION_TTL_SECONDS);
        assert_eq!(
            config.rate_limit_window(),
            Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECONDS)
        );
        assert_eq!(
            config.rate_limit_max_requests(),
            DEFAULT_RATE_LIMIT_MAX_REQUESTS
        );
        assert_eq!(
            config.block_duration_seconds(),
            DEFAULT_BLOCK_DURATION_SECONDS
        );
        assert!(!config.dev_mode());
        assert!(config.credential().is_none());
        assert!(config.cookie_key().is_none());

        let config = config
            .with_session_ttl_seconds(120)
            .with_rate_limit_window_seconds(30)
            .with_rate_limit_max_requests(5)
            .with_block_duration_seconds(60)
            .with_dev_mode(true)
            .with_credential(SecretString::from("secret123".to_string()))
            .with_cookie_key(SecretString::from("cookie-key".to_string()));

        assert_eq!(config.session_ttl_seconds(), 120);
        assert_eq!(config.rate_limit_window(), Duration::from_secs(30));
        assert_eq!(config.rate_limit_max_requests(), 5);
        assert_eq!(config.block_duration_seconds(), 60);
        assert!(config.dev_mode());
        assert!(config.credential().is_some());
        assert!(config.cookie_key().is_some());
    }

    #[test]
    fn auth_state_constructs_with_noop_rate_limiter() {
        let config = AuthConfig::new("http://localhost:3000".to_string())
            .with_credential(SecretString::from("secret123".to_string()))
            .with_cookie_key(SecretString::from("cookie-key".to_string()));
        let state =
            AuthState::new(config, Arc::new(NoopRateLimiter)).expect("state should build");
        assert!(state.authenticator().secrets_configured());
        assert_eq!(state.config().rate_limit_max_requests(), 10);
    }
}
