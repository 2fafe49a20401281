use crate::auth::PasswordService;
use crate::domain::{DomainError, DomainResult};
use argon2::{
    Argon2,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Argon2-based implementation of PasswordService. Each hash gets a fresh
/// random salt, so hashing the same password twice yields different digests.
#[derive(Default)]
pub struct Argon2PasswordService;

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash_password(&self, password: &str) -> DomainResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::CredentialHash(e.to_string()))
    }

    fn verify_password(&self, password: &str, hash: &str) -> DomainResult<bool> {
        let parsed = argon2::PasswordHash::new(hash)
            .map_err(|e| DomainError::CredentialHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_produces_phc_string() {
        let service = Argon2PasswordService::new();
        let hash = service.hash_password("Password123!").unwrap();
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn salts_are_random() {
        let service = Argon2PasswordService::new();
        let first = service.hash_password("same-input").unwrap();
        let second = service.hash_password("same-input").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn verify_accepts_matching_password() {
        let service = Argon2PasswordService::new();
        let hash = service.hash_password("Password123!").unwrap();
        assert!(service.verify_password("Password123!", &hash).unwrap());
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let service = Argon2PasswordService::new();
        let hash = service.hash_password("Password123!").unwrap();
        assert!(!service.verify_password("password123!", &hash).unwrap());
    }

    #[test]
    fn verify_rejects_malformed_digest() {
        let service = Argon2PasswordService::new();
        let result = service.verify_password("anything", "not-a-phc-string");
        assert!(matches!(result, Err(DomainError::CredentialHash(_))));
    }
}
