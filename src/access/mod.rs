//! Role-based route access control
//!
//! [`AccessPolicy::decide`] is the pure decision; [`AccessGate`] wraps it with
//! session-cookie parsing and per-request identity resolution.

mod role;
mod policy;
mod identity;
mod session;
mod gate;

pub use role::{Principal, Role};
pub use policy::{AccessPolicy, Decision, RouteClass};
pub use identity::{resolve_principal, IdentityError, IdentityVerifier, StaticTokenVerifier, DEFAULT_TOKENS_PATH};
pub use session::{establish_session, session_cookie, session_token, SESSION_COOKIE, SESSION_MAX_AGE_SECS};
pub use gate::AccessGate;
