//! Argon2id implementation of the [`PasswordHasher`] port.
//!
//! Hashing is CPU bound, so both operations run on Tokio's blocking pool.

use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier as _, SaltString,
    rand_core::OsRng,
};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHasher, PasswordHasherError};

/// Memory cost in KiB for production hashes.
const DEFAULT_MEMORY_KIB: u32 = 65_536;
const DEFAULT_ITERATIONS: u32 = 3;
const DEFAULT_PARALLELISM: u32 = 1;

/// Argon2id password hasher.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Hasher with production cost parameters.
    pub fn new() -> Result<Self, PasswordHasherError> {
        Self::with_cost(DEFAULT_MEMORY_KIB, DEFAULT_ITERATIONS, DEFAULT_PARALLELISM)
    }

    /// Hasher with explicit cost parameters.
    pub fn with_cost(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordHasherError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|err| PasswordHasherError::hashing(format!("argon2 params: {err}")))?;
        Ok(Self { params })
    }

    fn engine(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

fn hash_blocking(engine: &Argon2<'_>, password: &str) -> Result<PasswordHash, PasswordHasherError> {
    let salt = SaltString::generate(&mut OsRng);
    let encoded = engine
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| PasswordHasherError::hashing(format!("argon2 hash: {err}")))?
        .to_string();
    Ok(PasswordHash::new(encoded))
}

fn verify_blocking(
    engine: &Argon2<'_>,
    password: &str,
    encoded: &str,
) -> Result<bool, PasswordHasherError> {
    let parsed = PhcString::new(encoded)
        .map_err(|err| PasswordHasherError::hashing(format!("stored hash is malformed: {err}")))?;
    // Cost parameters come from the stored hash, not from `engine`.
    Ok(engine
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[async_trait]
impl PasswordHasher for Argon2Hasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        let engine = self.engine();
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || hash_blocking(&engine, password.as_str()))
            .await
            .map_err(|err| PasswordHasherError::hashing(format!("hash task failed: {err}")))?
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        let engine = self.engine();
        let password = Zeroizing::new(password.to_owned());
        let encoded = hash.as_str().to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(&engine, password.as_str(), &encoded))
            .await
            .map_err(|err| PasswordHasherError::hashing(format!("verify task failed: {err}")))?
    }
}
