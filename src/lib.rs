//! # Enketi (survey session gate)
//!
//! `enketi` is the authentication service of the Enketi survey platform. It
//! guards the administrative surface (survey authoring, response review) with
//! a session-bound encrypted cookie:
//!
//! 1. An administrator presents the shared credential once and receives an
//!    encrypted, identifier-bound session cookie with a 60 minute TTL.
//! 2. Every later request carries the cookie; the service decrypts it, checks
//!    the identifier binding and the TTL, and answers with a verdict.
//! 3. Per-identifier rate limiting and temporary IP blocking sit in front of
//!    both paths, so credential guessing burns out quickly.
//!
//! The server keeps no session table: the cookie *is* the session, and only
//! the rate-limiter and block-list maps live in process memory. Survey CRUD,
//! rendering, and analytics are separate collaborators that mount behind the
//! auth gate middleware.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
