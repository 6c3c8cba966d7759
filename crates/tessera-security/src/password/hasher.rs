//! Password hashing using Argon2id.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use shaku::Component;
use std::sync::Arc;
use tessera_config::SecurityConfig;
use tessera_core::{Interface, TesseraError, TesseraResult};
use tracing::debug;

/// Opaque one-way password verifier.
pub trait PasswordHasherInterface: Interface + Send + Sync {
    /// Hashes a password with a fresh salt.
    fn hash(&self, password: &str) -> TesseraResult<String>;

    /// Verifies a password against a stored hash.
    ///
    /// `Ok(false)` means the password is wrong; `Err` means the stored
    /// hash could not be parsed.
    fn verify(&self, password: &str, hash: &str) -> TesseraResult<bool>;
}

/// Password hasher using Argon2id.
#[derive(Component, Clone)]
#[shaku(interface = PasswordHasherInterface)]
pub struct PasswordHasher {
    argon2: Arc<Argon2<'static>>,
}

impl PasswordHasher {
    /// Creates a new password hasher with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(Params::DEFAULT)
    }

    /// Creates a new password hasher with custom parameters.
    #[must_use]
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Arc::new(Argon2::new(Algorithm::Argon2id, Version::V0x13, params)),
        }
    }

    /// Shared handle to the configured Argon2 instance.
    #[must_use]
    pub fn argon2_arc(&self) -> Arc<Argon2<'static>> {
        Arc::clone(&self.argon2)
    }

    /// Creates a password hasher whose time cost (iterations) is `cost`.
    /// Falls back to the default parameters if `cost` is rejected.
    #[must_use]
    pub fn with_cost(cost: u32) -> Self {
        let params = Params::new(Params::DEFAULT_M_COST, cost, Params::DEFAULT_P_COST, None)
            .unwrap_or(Params::DEFAULT);
        Self::with_params(params)
    }

    /// Creates a password hasher from the security section.
    #[must_use]
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::with_cost(config.password_hash_cost)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasherInterface for PasswordHasher {
    fn hash(&self, password: &str) -> TesseraResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| TesseraError::Internal(format!("Failed to hash password: {e}")))?;

        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> TesseraResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| TesseraError::Internal(format!("Invalid password hash format: {e}")))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => {
                debug!("Password verification failed: incorrect password");
                Ok(false)
            }
            Err(e) => Err(TesseraError::Internal(format!(
                "Password verification error: {e}"
            ))),
        }
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}
