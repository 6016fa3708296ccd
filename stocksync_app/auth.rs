use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use uuid::Uuid;

use stocksync_types::{Result, errors::AppError};

/// Identity of whoever is calling an entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Owner of the jobs created by this caller, used for resume lookups.
    pub owner_id: Uuid,
    pub token: String,
}

impl Caller {
    pub fn new(owner_id: Uuid, token: impl Into<String>) -> Self {
        Self {
            owner_id,
            token: token.into(),
        }
    }
}

/// Capability check performed before any command or query is dispatched.
pub trait AccessPolicy: Send + Sync {
    fn can_administer_commerce(&self, caller: &Caller) -> bool;
}

/// Grants access to callers presenting the admin token whose argon2 hash is
/// configured.
pub struct TokenAccessPolicy {
    token_hash: String,
}

impl TokenAccessPolicy {
    pub fn new(token_hash: impl Into<String>) -> Self {
        Self {
            token_hash: token_hash.into(),
        }
    }
}

impl AccessPolicy for TokenAccessPolicy {
    fn can_administer_commerce(&self, caller: &Caller) -> bool {
        if caller.token.is_empty() {
            return false;
        }
        match verify_token(&self.token_hash, &caller.token) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(owner_id = %caller.owner_id, "Token rejected: {e}");
                false
            }
        }
    }
}

/// Returns `Forbidden` unless the policy grants the caller access.
pub fn authorize(policy: &dyn AccessPolicy, caller: &Caller) -> Result<(), AppError> {
    if policy.can_administer_commerce(caller) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

pub fn hash_token(token: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hashed = argon2.hash_password(token.as_bytes(), &salt)?.to_string();
    Ok(hashed)
}

pub fn verify_token(hash: &str, token: &str) -> Result<(), AppError> {
    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default().verify_password(token.as_bytes(), &parsed_hash)?)
}
