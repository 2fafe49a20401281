use crate::domain::DomainResult;

/// Trait for one-way password hashing and verification
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PasswordService: Send + Sync {
    /// Hash a plaintext password into an opaque digest
    fn hash_password(&self, password: &str) -> DomainResult<String>;

    /// Verify a plaintext password against a stored digest
    fn verify_password(&self, password: &str, hash: &str) -> DomainResult<bool>;
}
