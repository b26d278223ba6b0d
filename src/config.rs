//! Runtime configuration loaded from environment variables

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{info, warn};

use crate::access::{AccessPolicy, IdentityError, StaticTokenVerifier, DEFAULT_TOKENS_PATH};

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// CSV token table backing the static verifier
    pub tokens_path: PathBuf,

    /// Add `Secure` to the session cookie
    pub secure_cookies: bool,

    pub access: AccessPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tokens_path: PathBuf::from(DEFAULT_TOKENS_PATH),
            secure_cookies: false,
            access: AccessPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Load from the process environment
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the environment
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let access = AccessPolicy {
            admin_prefix: try_load(&lookup, "PLANNER_ADMIN_PREFIX", defaults.access.admin_prefix.clone()),
            ..defaults.access
        };

        Self {
            tokens_path: try_load(&lookup, "PLANNER_TOKENS_PATH", defaults.tokens_path),
            secure_cookies: try_load(&lookup, "PLANNER_SECURE_COOKIES", defaults.secure_cookies),
            access,
        }
    }

    /// Whether the token table is the development one shipped in the repo
    pub fn uses_default_tokens(&self) -> bool {
        self.tokens_path == Path::new(DEFAULT_TOKENS_PATH)
    }

    /// Build the static verifier from the configured token table
    pub fn verifier(&self) -> Result<StaticTokenVerifier, IdentityError> {
        StaticTokenVerifier::from_csv_path(&self.tokens_path)
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    match lookup(key) {
        None => {
            info!("{key} not set, using default: {default:?}");
            default
        }
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default:?}");
            default
        }),
    }
}
