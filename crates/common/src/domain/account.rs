use crate::domain::result::DomainResult;
use crate::domain::{Device, Page, PageRequest};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Role attached to every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRole {
    User,
    Admin,
}

impl AccountRole {
    /// Admin accounts are immutable through the profile-update and
    /// change-password operations. The rule is asserted here once and reused
    /// by both paths.
    pub fn can_mutate_profile(&self) -> bool {
        matches!(self, AccountRole::User)
    }

    /// Storage representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::User => "USER",
            AccountRole::Admin => "ADMIN",
        }
    }
}

/// Account domain entity
///
/// `id` is assigned once at creation and never reused. `email` and `phone`
/// are each unique across all accounts; the storage layer enforces this with
/// unique constraints, the service layer pre-checks for better messages.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub password_hash: String,
    pub role: AccountRole,
    /// Devices owned by this account, in registration order
    pub devices: Vec<Device>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Repository trait for account persistence operations
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Get an account by its identifier
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Account>>;

    /// Resolve an account by email or phone (login principal lookup)
    async fn find_by_email_or_phone(&self, value: &str) -> DomainResult<Option<Account>>;

    /// Get an account by email
    async fn get_by_email(&self, email: &str) -> DomainResult<Option<Account>>;

    /// Get an account by phone
    async fn get_by_phone(&self, phone: &str) -> DomainResult<Option<Account>>;

    /// One page of the full account collection
    async fn list_all(&self, page: PageRequest) -> DomainResult<Page<Account>>;

    /// One page of accounts matching `term` across account and device
    /// attributes; matching semantics belong to the repository
    async fn search(&self, term: &str, page: PageRequest) -> DomainResult<Page<Account>>;

    /// Persist an existing account (buffered)
    async fn save(&self, account: Account) -> DomainResult<Account>;

    /// Persist a new account with immediate durability; the row must be
    /// visible to reads and deletable within the same logical operation
    async fn save_and_flush(&self, account: Account) -> DomainResult<Account>;

    /// Delete an account (compensating action during registration)
    async fn delete(&self, account: Account) -> DomainResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_role_can_mutate_profile() {
        assert!(AccountRole::User.can_mutate_profile());
    }

    #[test]
    fn admin_role_cannot_mutate_profile() {
        assert!(!AccountRole::Admin.can_mutate_profile());
    }

    #[test]
    fn role_storage_representation() {
        assert_eq!(AccountRole::User.as_str(), "USER");
        assert_eq!(AccountRole::Admin.as_str(), "ADMIN");
    }
}
