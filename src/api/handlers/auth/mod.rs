//! Session authentication for the survey admin surface.
//!
//! This module owns everything between a request and an authentication
//! verdict: per-identifier rate limiting, temporary IP blocking, the
//! encrypted session cookie, and the middleware gate over protected routes.
//!
//! ## Sessions
//!
//! There is no session table. A session is an AES-256-CBC encrypted cookie
//! holding the requester's address, an expiry timestamp, and the credential
//! that was presented at issuance. The cookie only verifies for the address
//! it was issued to, so a stolen cookie replayed from elsewhere is rejected
//! before its TTL is even looked at.
//!
//! ## Rate limiting and blocking
//!
//! Both session endpoints count every request against a per-address window
//! (10 requests per 60 seconds). Exceeding the window blocks the address for
//! 5 minutes. Dev mode keeps the counters but skips block enforcement so
//! local testing cannot lock itself out.

mod authenticator;
mod block_list;
mod codec;
pub(crate) mod gate;
mod rate_limit;
pub(crate) mod session;
mod state;
pub(crate) mod types;
mod utils;

pub use authenticator::{AuthError, SessionAuthenticator, Verdict};
pub use block_list::BlockList;
pub use codec::{CookieCodec, EncryptedSession, SessionPayload};
pub use rate_limit::{NoopRateLimiter, RateLimitDecision, RateLimiter, SlidingWindowLimiter};
pub use session::SESSION_COOKIE_NAME;
pub use state::{AuthConfig, AuthState};
