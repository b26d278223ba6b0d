//! Identity verification collaborator
//!
//! Turning an opaque bearer token into a [`Principal`] is delegated to an
//! [`IdentityVerifier`]. Resolution fails closed: any verifier error is
//! treated as "no principal".

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::warn;
use thiserror::Error;

use super::role::{Principal, Role};

/// Default location of the static token table
pub const DEFAULT_TOKENS_PATH: &str = "data/tokens.csv";

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("token rejected")]
    Unauthorized,

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read token table: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed token table: {0}")]
    Load(#[from] csv::Error),

    #[error("unknown role `{0}`")]
    UnknownRole(String),
}

/// Verifies bearer tokens. `Ok(None)` means the token is not recognised.
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Option<Principal>, IdentityError>;
}

/// Resolve the principal for one request, failing closed
pub fn resolve_principal<V>(verifier: &V, token: Option<&str>) -> Option<Principal>
where
    V: IdentityVerifier + ?Sized,
{
    let token = token.map(str::trim).filter(|t| !t.is_empty())?;

    match verifier.verify(token) {
        Ok(principal) => principal,
        Err(e) => {
            warn!("Failed to verify token: {}", e);
            None
        }
    }
}

/// Raw CSV row of the token table
#[derive(Debug, serde::Deserialize)]
struct TokenRow {
    token: String,
    uid: String,
    email: String,
    role: String,
}

/// Fixed token → principal table, for development and tests
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    principals: HashMap<String, Principal>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the default location (data/tokens.csv)
    pub fn load_default() -> Result<Self, IdentityError> {
        Self::from_csv_path(Path::new(DEFAULT_TOKENS_PATH))
    }

    /// Load from a CSV file with columns token,uid,email,role
    pub fn from_csv_path(path: &Path) -> Result<Self, IdentityError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, IdentityError> {
        let mut reader = csv::Reader::from_reader(reader);
        let mut verifier = Self::new();

        for result in reader.deserialize() {
            let row: TokenRow = result?;
            let role: Role = row.role.parse().map_err(|_| IdentityError::UnknownRole(row.role.clone()))?;
            verifier.insert(row.token, Principal::new(row.uid, row.email, role));
        }

        Ok(verifier)
    }

    pub fn insert(&mut self, token: impl Into<String>, principal: Principal) {
        self.principals.insert(token.into(), principal);
    }

    pub fn len(&self) -> usize {
        self.principals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }
}

impl IdentityVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Result<Option<Principal>, IdentityError> {
        Ok(self.principals.get(token).cloned())
    }
}
