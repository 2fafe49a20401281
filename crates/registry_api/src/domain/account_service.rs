use chrono::NaiveDate;
use common::auth::PasswordService;
use common::domain::{
    Account, AccountRepository, AccountRole, DeviceRegistrar, DomainError, DomainResult,
    PageRequest, PagedResult,
};
use garde::Validate;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Service request for registering an account, optionally with one device.
///
/// The serial number is tri-state at the boundary (missing, blank, present);
/// `device_serial` normalizes it once before any business logic runs.
#[derive(Debug, Clone, Validate)]
pub struct CreateAccountRequest {
    #[garde(length(min = 1))]
    pub full_name: String,
    #[garde(length(min = 1))]
    pub password: String,
    #[garde(length(min = 1))]
    pub email: String,
    #[garde(length(min = 1))]
    pub phone: String,
    #[garde(skip)]
    pub address: String,
    #[garde(skip)]
    pub purchase_date: Option<NaiveDate>,
    #[garde(skip)]
    pub serial_number: Option<String>,
}

impl CreateAccountRequest {
    /// A serial that is missing or blank after trimming means no device.
    pub fn device_serial(&self) -> Option<&str> {
        self.serial_number
            .as_deref()
            .map(str::trim)
            .filter(|serial| !serial.is_empty())
    }
}

/// Service request for updating an account profile; all fields required.
#[derive(Debug, Clone, Validate)]
pub struct UpdateAccountRequest {
    #[garde(length(min = 1))]
    pub full_name: String,
    #[garde(length(min = 1))]
    pub address: String,
    #[garde(length(min = 1))]
    pub phone: String,
    #[garde(length(min = 1))]
    pub email: String,
}

/// Service request for changing an account password.
#[derive(Debug, Clone, Validate)]
pub struct ChangePasswordRequest {
    #[garde(length(min = 1))]
    pub old_password: String,
    #[garde(length(min = 1))]
    pub new_password: String,
}

/// Service request for listing accounts. `page` is 1-based.
#[derive(Debug, Clone, Validate)]
pub struct ListAccountsRequest {
    #[garde(skip)]
    pub search_by: Option<String>,
    #[garde(range(min = 1))]
    pub page: u32,
    #[garde(range(min = 1))]
    pub size: u32,
}

/// Password-free projection of an account used by the listing operation.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSummary {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub role: AccountRole,
    pub devices: Vec<DeviceSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSummary {
    pub serial_number: String,
    pub purchase_date: Option<NaiveDate>,
}

impl From<Account> for AccountSummary {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            full_name: account.full_name,
            email: account.email,
            phone: account.phone,
            address: account.address,
            role: account.role,
            devices: account
                .devices
                .into_iter()
                .map(|device| DeviceSummary {
                    serial_number: device.serial_number,
                    purchase_date: device.purchase_date,
                })
                .collect(),
        }
    }
}

/// Domain service for account management business logic.
///
/// Stateless across calls; all durable state lives behind the repository.
/// Registration is the one operation spanning two collaborators that are not
/// jointly transactional, so it carries a manual compensating delete.
pub struct AccountService {
    account_repository: Arc<dyn AccountRepository>,
    device_registrar: Arc<dyn DeviceRegistrar>,
    password_service: Arc<dyn PasswordService>,
}

impl AccountService {
    pub fn new(
        account_repository: Arc<dyn AccountRepository>,
        device_registrar: Arc<dyn DeviceRegistrar>,
        password_service: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            account_repository,
            device_registrar,
            password_service,
        }
    }

    /// Register a new account and, when a serial number is supplied, its
    /// first device. Success is silent.
    ///
    /// The account row is persisted durably before the registrar is invoked
    /// so that a registrar failure can be compensated by deleting the row.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: CreateAccountRequest) -> DomainResult<()> {
        common::garde::validate(&request)?;

        if self
            .account_repository
            .get_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(DomainError::AlreadyExists("Email already taken".to_string()));
        }

        if self
            .account_repository
            .get_by_phone(&request.phone)
            .await?
            .is_some()
        {
            return Err(DomainError::AlreadyExists("Phone already taken".to_string()));
        }

        let device_serial = request.device_serial().map(str::to_owned);
        let purchase_date = request.purchase_date;

        let password_hash = self.password_service.hash_password(&request.password)?;

        let account = Account {
            id: xid::new().to_string(),
            full_name: request.full_name,
            email: request.email,
            phone: request.phone,
            address: request.address,
            password_hash,
            role: AccountRole::User,
            devices: Vec::new(),
            created_at: None,
            updated_at: None,
        };

        debug!(account_id = %account.id, "persisting new account");
        let account = self.account_repository.save_and_flush(account).await?;

        if let Some(serial) = device_serial {
            if let Err(err) = self
                .register_initial_device(&serial, purchase_date, &account)
                .await
            {
                debug!(account_id = %account.id, "deleting account after device registration failure");
                if let Err(cleanup_err) = self.account_repository.delete(account).await {
                    warn!(error = %cleanup_err, "compensating delete failed");
                }
                return Err(err);
            }
        }

        Ok(())
    }

    async fn register_initial_device(
        &self,
        serial: &str,
        purchase_date: Option<NaiveDate>,
        owner: &Account,
    ) -> DomainResult<()> {
        self.device_registrar.fail_if_registered(serial).await?;
        self.device_registrar
            .register_device(serial, purchase_date, owner)
            .await?;
        Ok(())
    }

    /// Overwrite the profile fields of a non-admin account.
    #[instrument(skip(self, request), fields(account_id = %id))]
    pub async fn update_account(
        &self,
        id: &str,
        request: UpdateAccountRequest,
    ) -> DomainResult<Account> {
        common::garde::validate(&request)?;

        let mut account = self.require_account(id).await?;

        if !account.role.can_mutate_profile() {
            return Err(DomainError::Validation(
                "Admin profile can't be updated".to_string(),
            ));
        }

        // Setting a field to its own current value is never a conflict
        if request.email != account.email {
            if let Some(other) = self.account_repository.get_by_email(&request.email).await? {
                if other.id != account.id {
                    return Err(DomainError::AlreadyExists("Email already taken".to_string()));
                }
            }
        }

        if request.phone != account.phone {
            if let Some(other) = self.account_repository.get_by_phone(&request.phone).await? {
                if other.id != account.id {
                    return Err(DomainError::AlreadyExists("Phone already taken".to_string()));
                }
            }
        }

        account.full_name = request.full_name;
        account.address = request.address;
        account.phone = request.phone;
        account.email = request.email;

        let account = self.account_repository.save(account).await?;

        debug!(account_id = %account.id, "account profile updated");
        Ok(account)
    }

    /// Change the password of a non-admin account after verifying the old one.
    #[instrument(skip(self, request), fields(account_id = %id))]
    pub async fn update_password(
        &self,
        id: &str,
        request: ChangePasswordRequest,
    ) -> DomainResult<()> {
        common::garde::validate(&request)?;

        let mut account = self.require_account(id).await?;

        if !account.role.can_mutate_profile() {
            return Err(DomainError::Validation(
                "Admin password can't be changed".to_string(),
            ));
        }

        if !self
            .password_service
            .verify_password(&request.old_password, &account.password_hash)?
        {
            return Err(DomainError::Validation(
                "Old password didn't match".to_string(),
            ));
        }

        account.password_hash = self.password_service.hash_password(&request.new_password)?;
        self.account_repository.save(account).await?;

        debug!(account_id = %id, "account password changed");
        Ok(())
    }

    /// Get an account by its identifier.
    #[instrument(skip(self))]
    pub async fn get_account_by_id(&self, id: &str) -> DomainResult<Account> {
        self.require_account(id).await
    }

    /// Resolve a login principal by email or phone. Credential verification
    /// belongs to the external credential issuer, not here.
    #[instrument(skip(self, username))]
    pub async fn get_account_by_username(&self, username: &str) -> DomainResult<Account> {
        self.account_repository
            .find_by_email_or_phone(username)
            .await?
            .ok_or_else(|| DomainError::EntityNotFound("User not found".to_string()))
    }

    /// Existence check used for pre-submission validation; no side effects.
    #[instrument(skip(self, email))]
    pub async fn is_email_taken(&self, email: &str) -> DomainResult<bool> {
        Ok(self.account_repository.get_by_email(email).await?.is_some())
    }

    /// Existence check used for pre-submission validation; no side effects.
    #[instrument(skip(self, phone))]
    pub async fn is_phone_taken(&self, phone: &str) -> DomainResult<bool> {
        Ok(self.account_repository.get_by_phone(phone).await?.is_some())
    }

    /// One page of account summaries, optionally filtered by a search term.
    ///
    /// The caller-facing page number is 1-based; the repository is queried
    /// with a 0-based index. A present-but-empty search term still takes the
    /// search path.
    #[instrument(skip(self, request), fields(page = request.page, size = request.size))]
    pub async fn list_accounts(
        &self,
        request: ListAccountsRequest,
    ) -> DomainResult<PagedResult<AccountSummary>> {
        common::garde::validate(&request)?;

        let page_request = PageRequest::new(request.page - 1, request.size);

        let page = match request.search_by.as_deref() {
            None => self.account_repository.list_all(page_request).await?,
            Some(term) => self.account_repository.search(term, page_request).await?,
        };

        let items: Vec<AccountSummary> =
            page.items.into_iter().map(AccountSummary::from).collect();

        debug!(
            total_items = page.total_items,
            returned = items.len(),
            "listed accounts"
        );

        Ok(PagedResult::new(
            items,
            request.page,
            request.size,
            page.total_items,
        ))
    }

    async fn require_account(&self, id: &str) -> DomainResult<Account> {
        self.account_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::EntityNotFound("User not found".to_string()))
    }
}
