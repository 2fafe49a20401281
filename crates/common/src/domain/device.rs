use crate::domain::Account;
use crate::domain::result::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

/// Device entity: one physical unit, owned by exactly one account.
///
/// Ownership is established at registration and is not reassignable here.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub serial_number: String,
    pub purchase_date: Option<NaiveDate>,
    pub account_id: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Registrar trait for device creation. Serial-number uniqueness is enforced
/// here, not in the account service; the service only triggers registration
/// and reacts to the outcome.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DeviceRegistrar: Send + Sync {
    /// Fails with `AlreadyExists` when the serial number is taken
    async fn fail_if_registered(&self, serial_number: &str) -> DomainResult<()>;

    /// Register a device under the owning account
    async fn register_device(
        &self,
        serial_number: &str,
        purchase_date: Option<NaiveDate>,
        owner: &Account,
    ) -> DomainResult<Device>;
}
