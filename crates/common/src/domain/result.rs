use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Failure taxonomy surfaced to callers of the account service.
///
/// The first three variants carry the exact caller-facing message and map to
/// recoverable (4xx-equivalent) outcomes in the transport layer. The
/// remaining variants wrap infrastructure failures.
#[derive(Error, Debug)]
pub enum DomainError {
    /// A uniqueness constraint (email, phone, device serial) was violated
    #[error("{0}")]
    AlreadyExists(String),

    /// A lookup by identifier or identity found nothing
    #[error("{0}")]
    EntityNotFound(String),

    /// A business rule was violated
    #[error("{0}")]
    Validation(String),

    #[error("Credential hashing error: {0}")]
    CredentialHash(String),

    #[error("Repository error: {0}")]
    Repository(#[from] anyhow::Error),
}
