//! Route classification and the access decision

use serde::{Deserialize, Serialize};

use super::role::Principal;

/// Outcome of gating a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    RedirectLogin,
    RedirectUnauthorized,
}

impl Decision {
    /// Path the caller should redirect to, if any
    pub fn redirect_target<'a>(&self, policy: &'a AccessPolicy) -> Option<&'a str> {
        match self {
            Decision::Allow => None,
            Decision::RedirectLogin => Some(policy.login_path.as_str()),
            Decision::RedirectUnauthorized => Some(policy.unauthorized_path.as_str()),
        }
    }
}

/// Static partition of paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteClass {
    Public,
    Authenticated,
    AdminOnly,
}

/// Which paths are public, which need a role, and where to send rejected requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessPolicy {
    /// Exact paths open to everyone
    pub public_paths: Vec<String>,

    /// Prefix reserved for admins (literal `starts_with` match)
    pub admin_prefix: String,

    /// Prefixes that skip gating entirely (API routes, static assets)
    pub bypass_prefixes: Vec<String>,

    pub login_path: String,
    pub unauthorized_path: String,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            public_paths: vec!["/login".into(), "/signup".into(), "/".into()],
            admin_prefix: "/admin".into(),
            bypass_prefixes: vec![
                "/api".into(),
                "/_next/static".into(),
                "/_next/image".into(),
                "/favicon.ico".into(),
            ],
            login_path: "/login".into(),
            unauthorized_path: "/unauthorized".into(),
        }
    }
}

impl AccessPolicy {
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|p| p == path)
    }

    /// Paths the gate never evaluates
    pub fn is_bypassed(&self, path: &str) -> bool {
        self.bypass_prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        if self.is_public(path) {
            RouteClass::Public
        } else if path.starts_with(self.admin_prefix.as_str()) {
            RouteClass::AdminOnly
        } else {
            RouteClass::Authenticated
        }
    }

    /// Decide whether `principal` may reach `path`
    pub fn decide(&self, path: &str, principal: Option<&Principal>) -> Decision {
        match (self.classify(path), principal) {
            (RouteClass::Public, _) => Decision::Allow,
            (_, None) => Decision::RedirectLogin,
            (RouteClass::AdminOnly, Some(p)) if !p.role.is_admin() => Decision::RedirectUnauthorized,
            _ => Decision::Allow,
        }
    }
}
