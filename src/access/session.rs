//! Session cookie handling

use super::identity::{IdentityError, IdentityVerifier};

/// Name of the cookie carrying the bearer token
pub const SESSION_COOKIE: &str = "__session";

/// Cookie lifetime: 5 days
pub const SESSION_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 5;

/// Extract the session token from a `Cookie` request header
pub fn session_token(cookie_header: &str) -> Option<&str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Build the `Set-Cookie` value for a session token
pub fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}",
        SESSION_COOKIE, token, SESSION_MAX_AGE_SECS
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Verify `token` and, if valid, return the `Set-Cookie` value for it
pub fn establish_session<V>(verifier: &V, token: &str, secure: bool) -> Result<String, IdentityError>
where
    V: IdentityVerifier + ?Sized,
{
    let token = token.trim();
    if token.is_empty() {
        return Err(IdentityError::Unauthorized);
    }

    match verifier.verify(token)? {
        Some(_) => Ok(session_cookie(token, secure)),
        None => Err(IdentityError::Unauthorized),
    }
}
