use crate::cli::actions::{server::Args, Action};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map parsed CLI matches onto the action to execute.
///
/// The two secrets stay optional on purpose: missing secrets are a runtime
/// misconfiguration answered per request, not a startup failure.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let frontend_url = matches
        .get_one::<String>("frontend-url")
        .cloned()
        .context("missing required argument: --frontend-url")?;
    let credential = matches
        .get_one::<String>("credential")
        .cloned()
        .map(SecretString::from);
    let cookie_key = matches
        .get_one::<String>("cookie-key")
        .cloned()
        .map(SecretString::from);
    let dev_mode = matches.get_flag("dev-mode");

    Ok(Action::Server(Args {
        port,
        frontend_url,
        credential,
        cookie_key,
        dev_mode,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn handler_builds_server_action() -> Result<()> {
        let matches = commands::new().get_matches_from(vec![
            "enketi",
            "--port",
            "9090",
            "--frontend-url",
            "https://surveys.example.com",
            "--credential",
            "secret123",
            "--cookie-key",
            "cookie-key",
        ]);
        let Action::Server(args) = handler(&matches)?;
        assert_eq!(args.port, 9090);
        assert_eq!(args.frontend_url, "https://surveys.example.com");
        assert!(args.credential.is_some());
        assert!(args.cookie_key.is_some());
        assert!(!args.dev_mode);
        Ok(())
    }

    #[test]
    fn handler_tolerates_missing_secrets() -> Result<()> {
        temp_env::with_vars(
            [("SCHK_KEY", None::<&str>), ("COOKIE_KEY", None)],
            || -> Result<()> {
                let matches = commands::new().get_matches_from(vec!["enketi"]);
                let Action::Server(args) = handler(&matches)?;
                assert!(args.credential.is_none());
                assert!(args.cookie_key.is_none());
                Ok(())
            },
        )
    }
}
