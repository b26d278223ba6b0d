//! Per-request gate: token extraction, identity resolution, decision

use log::{debug, info};

use super::identity::{resolve_principal, IdentityVerifier};
use super::policy::{AccessPolicy, Decision};
use super::session::session_token;

/// Evaluates every inbound request before any handler runs
pub struct AccessGate<V> {
    policy: AccessPolicy,
    verifier: V,
}

impl<V: IdentityVerifier> AccessGate<V> {
    pub fn new(policy: AccessPolicy, verifier: V) -> Self {
        Self { policy, verifier }
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    /// Decide for `path` given the raw `Cookie` header, if any.
    ///
    /// Public and bypassed paths never reach the verifier.
    pub fn check(&self, path: &str, cookie_header: Option<&str>) -> Decision {
        if self.policy.is_bypassed(path) || self.policy.is_public(path) {
            return Decision::Allow;
        }

        let token = cookie_header.and_then(session_token);
        let principal = resolve_principal(&self.verifier, token);
        let decision = self.policy.decide(path, principal.as_ref());

        match decision {
            Decision::Allow => debug!("{}: allowed", path),
            _ => info!(
                "{}: {:?} (role: {})",
                path,
                decision,
                principal.as_ref().map_or("none", |p| p.role.as_str())
            ),
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{IdentityError, Principal, Role, StaticTokenVerifier};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts round-trips and fails every one of them
    struct CountingVerifier {
        calls: AtomicUsize,
    }

    impl IdentityVerifier for CountingVerifier {
        fn verify(&self, _token: &str) -> Result<Option<Principal>, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(IdentityError::Unavailable("timeout".into()))
        }
    }

    fn gate() -> AccessGate<StaticTokenVerifier> {
        let mut verifier = StaticTokenVerifier::new();
        verifier.insert("admin-tok", Principal::new("a1", "a@example.com", Role::Admin));
        verifier.insert("user-tok", Principal::new("u1", "u@example.com", Role::User));
        AccessGate::new(AccessPolicy::default(), verifier)
    }

    #[test]
    fn test_gate_decisions() {
        let gate = gate();

        assert_eq!(gate.check("/", None), Decision::Allow);
        assert_eq!(gate.check("/admin/articles", None), Decision::RedirectLogin);
        assert_eq!(
            gate.check("/admin/articles", Some("__session=user-tok")),
            Decision::RedirectUnauthorized
        );
        assert_eq!(gate.check("/admin/articles", Some("a=b; __session=admin-tok")), Decision::Allow);
        assert_eq!(gate.check("/news", Some("__session=user-tok")), Decision::Allow);
        assert_eq!(gate.check("/news", Some("__session=expired")), Decision::RedirectLogin);
    }

    #[test]
    fn test_verifier_failure_fails_closed() {
        let gate = AccessGate::new(AccessPolicy::default(), CountingVerifier { calls: AtomicUsize::new(0) });

        assert_eq!(gate.check("/admin", Some("__session=anything")), Decision::RedirectLogin);
        assert_eq!(gate.check("/investments", Some("__session=anything")), Decision::RedirectLogin);
        assert_eq!(gate.verifier().calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_public_and_bypassed_skip_verifier() {
        let gate = AccessGate::new(AccessPolicy::default(), CountingVerifier { calls: AtomicUsize::new(0) });

        assert_eq!(gate.check("/signup", Some("__session=x")), Decision::Allow);
        assert_eq!(gate.check("/api/verify", Some("__session=x")), Decision::Allow);
        assert_eq!(gate.check("/favicon.ico", None), Decision::Allow);
        assert_eq!(gate.verifier().calls.load(Ordering::SeqCst), 0);
    }
}
