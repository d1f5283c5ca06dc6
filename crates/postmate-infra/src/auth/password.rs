//! Argon2 verification of the operator's credentials.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use postmate_core::ports::{AuthError, CredentialVerifier};

/// Hash `password` into a PHC string suitable for `ADMIN_PASSWORD_HASH`.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::HashingError(e.to_string()))
}

/// Checks a single operator account against an Argon2 PHC hash.
pub struct Argon2CredentialVerifier {
    argon2: Argon2<'static>,
    username: String,
    password_hash: Option<String>,
}

impl Argon2CredentialVerifier {
    pub fn new(username: impl Into<String>, password_hash: Option<String>) -> Self {
        Self {
            argon2: Argon2::default(),
            username: username.into(),
            password_hash,
        }
    }

    /// Reads `ADMIN_USERNAME` (default `admin`) and `ADMIN_PASSWORD_HASH`.
    pub fn from_env() -> Self {
        let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let password_hash = std::env::var("ADMIN_PASSWORD_HASH")
            .ok()
            .filter(|v| !v.trim().is_empty());

        if password_hash.is_none() {
            tracing::warn!("ADMIN_PASSWORD_HASH not set; management login is disabled");
        }
        Self::new(username, password_hash)
    }
}

impl CredentialVerifier for Argon2CredentialVerifier {
    fn verify(&self, username: &str, password: &str) -> Result<bool, AuthError> {
        let Some(hash) = self.password_hash.as_deref() else {
            return Ok(false);
        };
        if username != self.username {
            return Ok(false);
        }

        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| AuthError::HashingError(e.to_string()))?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
