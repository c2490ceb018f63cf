use crate::api;
use crate::api::handlers::auth::{AuthConfig, AuthState, SlidingWindowLimiter};
use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub frontend_url: String,
    pub credential: Option<SecretString>,
    pub cookie_key: Option<SecretString>,
    pub dev_mode: bool,
}

/// Execute the server action.
///
/// # Errors
/// Returns an error if cookie key derivation or server startup fails.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    if args.credential.is_none() {
        warn!("SCHK_KEY is not set; session issuance answers 500 until it is configured");
    }
    if args.cookie_key.is_none() {
        warn!("COOKIE_KEY is not set; session endpoints answer 500 until it is configured");
    }

    let mut config = AuthConfig::new(args.frontend_url).with_dev_mode(args.dev_mode);
    if let Some(credential) = args.credential {
        config = config.with_credential(credential);
    }
    if let Some(cookie_key) = args.cookie_key {
        config = config.with_cookie_key(cookie_key);
    }

    let limiter = Arc::new(SlidingWindowLimiter::new(
        config.rate_limit_window(),
        config.rate_limit_max_requests(),
    ));
    let auth_state = Arc::new(AuthState::new(config, limiter)?);

    api::serve(args.port, auth_state).await
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("frontend_url", args.frontend_url.clone()),
        ("credential_set", args.credential.is_some().to_string()),
        ("cookie_key_set", args.cookie_key.is_some().to_string()),
        ("dev_mode", args.dev_mode.to_string()),
    ];
    log_entries("Startup configuration", &entries);
}

fn log_entries(title: &str, entries: &[(&str, String)]) {
    let short_hash = short_commit(crate::GIT_COMMIT_HASH);
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} - {} - {short_hash}\n\n{title}:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn short_commit(hash: &str) -> String {
    let trimmed = hash.trim();
    if trimmed.len() > 7 {
        trimmed[..7].to_string()
    } else {
        trimmed.to_string()
    }
}
