//! # Credential Manager
//!
//! Turns a caller-supplied plaintext password into a storable, verifiable
//! `Credential` and guarantees it is never handed back out.
//!
//! - `CredentialManager::create`: hash a new password.
//! - `CredentialManager::maybe_replace`: rotate only when an update carries a password.
//! - `CredentialManager::replacement`: the same decision, without the existing credential.
//! - `CredentialManager::verify`: check a plaintext against a stored credential.
//! - `redact`: strip credential material from a user record.
//!
//! All operations are pure computations. Persistence belongs to the store.

pub mod error;

pub use error::CredentialError;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use core_types::{Credential, UserProfile, UserRecord, UserUpdate};
use rand_core::OsRng;

/// Hashes and rotates passwords with a fixed Argon2id work factor.
#[derive(Debug, Clone)]
pub struct CredentialManager {
    params: Params,
}

impl CredentialManager {
    /// Creates a manager whose hashes use `work_factor` Argon2 passes.
    pub fn new(work_factor: u32) -> Result<Self, CredentialError> {
        let params = Params::new(
            Params::DEFAULT_M_COST,
            work_factor,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|_| CredentialError::InvalidWorkFactor(work_factor))?;
        Ok(Self { params })
    }

    pub fn work_factor(&self) -> u32 {
        self.params.t_cost()
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Derives a new `Credential` from a plaintext password.
    ///
    /// The hash is an Argon2id PHC string carrying its own random salt. The
    /// `salt` field is generated independently on every call.
    ///
    /// # Errors
    ///
    /// * `CredentialError::EmptySecret` when the password is empty or blank.
    /// * `CredentialError::Hashing` when the primitive fails. Not retried.
    pub fn create(&self, plaintext: &str) -> Result<Credential, CredentialError> {
        if plaintext.trim().is_empty() {
            return Err(CredentialError::EmptySecret);
        }

        let hash_salt = SaltString::generate(&mut OsRng);
        let password_hash = self
            .hasher()
            .hash_password(plaintext.as_bytes(), &hash_salt)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?
            .to_string();

        let salt = SaltString::generate(&mut OsRng).as_str().to_string();

        Ok(Credential {
            password_hash,
            salt,
        })
    }

    /// Returns a freshly derived credential when `update` carries a password,
    /// otherwise `existing` unchanged.
    pub fn maybe_replace(
        &self,
        existing: Credential,
        update: &UserUpdate,
    ) -> Result<Credential, CredentialError> {
        Ok(self.replacement(update)?.unwrap_or(existing))
    }

    /// The credential an update asks for: `Some` only when it carries a password.
    ///
    /// Stores write the credential columns only for `Some`, so an update
    /// without a password never touches them.
    pub fn replacement(&self, update: &UserUpdate) -> Result<Option<Credential>, CredentialError> {
        match update.password.as_deref() {
            Some(plaintext) => {
                tracing::debug!("Rotating user credential.");
                self.create(plaintext).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Checks `plaintext` against the stored hash.
    ///
    /// A mismatch is `Ok(false)`. A stored hash that cannot be parsed is an error.
    pub fn verify(&self, credential: &Credential, plaintext: &str) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(&credential.password_hash)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?;
        match self.hasher().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CredentialError::Hashing(e.to_string())),
        }
    }
}

/// Drops the credential of a user record, leaving only what may be sent to clients.
///
/// Every response path that carries a user goes through this function.
pub fn redact(record: UserRecord) -> UserProfile {
    let UserRecord {
        id,
        email,
        display_name,
        credential: _,
        avatar_url,
        permission_level,
        created_at,
        updated_at,
    } = record;

    UserProfile {
        id,
        email,
        display_name,
        avatar_url,
        permission_level,
        created_at,
        updated_at,
    }
}
