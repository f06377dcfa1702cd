//! Argon2id hashing and verification for admin passwords.

use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};
use async_trait::async_trait;
use tokio::task;

use crate::config::SecurityConfig;

/// One-way comparison of a candidate password against a stored hash.
#[async_trait]
pub trait PasswordVerifier: Send + Sync {
    async fn verify(&self, password: &str, stored_hash: &str) -> bool;
}

/// Verifies PHC strings with whatever parameters they were hashed with.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Verifier;

#[async_trait]
impl PasswordVerifier for Argon2Verifier {
    async fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let password = password.to_string();
        let stored_hash = stored_hash.to_string();

        // Argon2 is CPU-bound; keep it off the async workers.
        let outcome = task::spawn_blocking(move || verify_password(&password, &stored_hash)).await;

        match outcome {
            Ok(Ok(valid)) => valid,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Stored password hash is malformed");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "Password verification task failed");
                false
            }
        }
    }
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

    let hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// `Err` only when the stored hash cannot be parsed.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Hashes on the blocking pool. Used by the CLI and seeding.
pub async fn hash_password_blocking(password: String, config: SecurityConfig) -> Result<String> {
    task::spawn_blocking(move || hash_password(&password, &config))
        .await
        .context("Password hashing task panicked")?
}

/// Hash of a random throwaway password with the configured cost. Checked
/// against on unknown usernames so both failure paths spend the same work.
pub async fn decoy_hash(config: &SecurityConfig) -> Result<String> {
    use rand::Rng;

    let throwaway: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    hash_password_blocking(throwaway, config.clone()).await
}
