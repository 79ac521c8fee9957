//! Argon2id implementation of the password hashing port.
//!
//! Hashing and verification run on tokio's blocking pool.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error as PasswordHashError, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use async_trait::async_trait;
use kinboard_application::PasswordHasher as PasswordHasherPort;
use kinboard_core::{AppError, AppResult};
use tokio::task;

/// Cost parameters for Argon2id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingCost {
    /// Memory in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashingCost {
    /// OWASP minimum for Argon2id: 19 MiB, two passes, one lane.
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Argon2id hasher for account passwords.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Creates a hasher with [`HashingCost::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_cost(HashingCost::default()).unwrap_or_else(|_| Self {
            argon2: Argon2::default(),
        })
    }

    /// Creates a hasher with explicit cost parameters.
    pub fn with_cost(cost: HashingCost) -> AppResult<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|error| {
                AppError::Validation(format!("invalid argon2 cost {cost:?}: {error}"))
            })?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    fn hash_blocking(argon2: &Argon2<'_>, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|error| AppError::Internal(format!("failed to hash password: {error}")))
    }

    fn verify_blocking(argon2: &Argon2<'_>, password: &str, hash: &str) -> AppResult<bool> {
        let stored = PasswordHash::new(hash).map_err(|error| {
            AppError::Internal(format!("stored password hash is malformed: {error}"))
        })?;

        match argon2.verify_password(password.as_bytes(), &stored) {
            Ok(()) => Ok(true),
            Err(PasswordHashError::Password) => Ok(false),
            Err(error) => Err(AppError::Internal(format!(
                "password verification failed: {error}"
            ))),
        }
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PasswordHasherPort for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> AppResult<String> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();

        task::spawn_blocking(move || Self::hash_blocking(&argon2, password.as_str()))
            .await
            .map_err(|error| AppError::Internal(format!("password hashing task failed: {error}")))?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();
        let hash = hash.to_owned();

        task::spawn_blocking(move || {
            Self::verify_blocking(&argon2, password.as_str(), hash.as_str())
        })
        .await
        .map_err(|error| {
            AppError::Internal(format!("password verification task failed: {error}"))
        })?
    }
}
