use crate::domain::{
    Account, AccountRepository, AccountRole, Device, DomainError, DomainResult, Page, PageRequest,
};
use crate::postgres::PostgresClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, instrument};

const ACCOUNT_COLUMNS: &str =
    "id, full_name, email, phone, address, password_hash, role, created_at, updated_at";

/// Account row for PostgreSQL storage
#[derive(Debug, Clone)]
struct AccountRow {
    id: String,
    full_name: String,
    email: String,
    phone: String,
    address: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn from_row(row: &tokio_postgres::Row) -> Self {
        Self {
            id: row.get(0),
            full_name: row.get(1),
            email: row.get(2),
            phone: row.get(3),
            address: row.get(4),
            password_hash: row.get(5),
            role: row.get(6),
            created_at: row.get(7),
            updated_at: row.get(8),
        }
    }

    fn into_account(self, devices: Vec<Device>) -> DomainResult<Account> {
        let role = role_from_storage(&self.role)?;
        Ok(Account {
            id: self.id,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            password_hash: self.password_hash,
            role,
            devices,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        })
    }
}

fn role_from_storage(value: &str) -> DomainResult<AccountRole> {
    match value {
        "USER" => Ok(AccountRole::User),
        "ADMIN" => Ok(AccountRole::Admin),
        other => Err(DomainError::Repository(anyhow::anyhow!(
            "unknown account role in storage: {other}"
        ))),
    }
}

/// Translate a unique-constraint violation into the caller-facing
/// `AlreadyExists` failure instead of an opaque storage error. The storage
/// constraints are the real uniqueness enforcement; the service-layer checks
/// are only a fast path with better ordering of messages.
fn map_account_unique_violation(e: tokio_postgres::Error) -> DomainError {
    if let Some(db_err) = e.as_db_error() {
        // PostgreSQL error code 23505 is unique_violation
        if db_err.code().code() == "23505" {
            let constraint = db_err.constraint().unwrap_or_default();
            let message = if constraint.contains("email") {
                "Email already taken"
            } else if constraint.contains("phone") {
                "Phone already taken"
            } else {
                "Account already exists"
            };
            return DomainError::AlreadyExists(message.to_string());
        }
    }
    DomainError::Repository(e.into())
}

/// PostgreSQL implementation of AccountRepository trait
#[derive(Clone)]
pub struct PostgresAccountRepository {
    client: PostgresClient,
}

impl PostgresAccountRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }

    async fn connection(&self) -> DomainResult<deadpool_postgres::Client> {
        self.client
            .get_connection()
            .await
            .map_err(DomainError::Repository)
    }

    /// Fetch a single account by an equality predicate on one column value.
    async fn fetch_one(&self, sql: &str, value: &str) -> DomainResult<Option<Account>> {
        let conn = self.connection().await?;

        let row = conn
            .query_opt(sql, &[&value])
            .await
            .map_err(|e| DomainError::Repository(e.into()))?;

        match row {
            Some(row) => {
                let account_row = AccountRow::from_row(&row);
                let devices = devices_for(&conn, &account_row.id).await?;
                Ok(Some(account_row.into_account(devices)?))
            }
            None => Ok(None),
        }
    }

    /// Run a paged account query and assemble the rows with their devices.
    async fn fetch_page(
        &self,
        count_sql: &str,
        rows_sql: &str,
        term: Option<&str>,
        page: PageRequest,
    ) -> DomainResult<Page<Account>> {
        let conn = self.connection().await?;

        let limit = page.size as i64;
        let offset = page.offset() as i64;

        let (total_row, rows) = match term {
            Some(term) => {
                let total = conn
                    .query_one(count_sql, &[&term])
                    .await
                    .map_err(|e| DomainError::Repository(e.into()))?;
                let rows = conn
                    .query(rows_sql, &[&term, &limit, &offset])
                    .await
                    .map_err(|e| DomainError::Repository(e.into()))?;
                (total, rows)
            }
            None => {
                let total = conn
                    .query_one(count_sql, &[])
                    .await
                    .map_err(|e| DomainError::Repository(e.into()))?;
                let rows = conn
                    .query(rows_sql, &[&limit, &offset])
                    .await
                    .map_err(|e| DomainError::Repository(e.into()))?;
                (total, rows)
            }
        };

        let total_items: i64 = total_row.get(0);
        let account_rows: Vec<AccountRow> = rows.iter().map(AccountRow::from_row).collect();

        let ids: Vec<String> = account_rows.iter().map(|row| row.id.clone()).collect();
        let mut devices_by_account = devices_for_all(&conn, &ids).await?;

        let mut items = Vec::with_capacity(account_rows.len());
        for row in account_rows {
            let devices = devices_by_account.remove(&row.id).unwrap_or_default();
            items.push(row.into_account(devices)?);
        }

        Ok(Page {
            items,
            total_items: total_items as u64,
        })
    }
}

/// Owned devices of one account, in registration order.
async fn devices_for(conn: &deadpool_postgres::Client, account_id: &str) -> DomainResult<Vec<Device>> {
    let rows = conn
        .query(
            "SELECT serial_number, purchase_date, account_id, created_at
             FROM devices
             WHERE account_id = $1
             ORDER BY created_at, serial_number",
            &[&account_id],
        )
        .await
        .map_err(|e| DomainError::Repository(e.into()))?;

    Ok(rows.iter().map(device_from_row).collect())
}

/// Owned devices for a batch of accounts, grouped by account id. One query
/// instead of one per account on the listing path.
async fn devices_for_all(
    conn: &deadpool_postgres::Client,
    account_ids: &Vec<String>,
) -> DomainResult<HashMap<String, Vec<Device>>> {
    if account_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = conn
        .query(
            "SELECT serial_number, purchase_date, account_id, created_at
             FROM devices
             WHERE account_id = ANY($1)
             ORDER BY created_at, serial_number",
            &[account_ids],
        )
        .await
        .map_err(|e| DomainError::Repository(e.into()))?;

    let mut grouped: HashMap<String, Vec<Device>> = HashMap::new();
    for row in &rows {
        let device = device_from_row(row);
        grouped
            .entry(device.account_id.clone())
            .or_default()
            .push(device);
    }

    Ok(grouped)
}

fn device_from_row(row: &tokio_postgres::Row) -> Device {
    Device {
        serial_number: row.get(0),
        purchase_date: row.get(1),
        account_id: row.get(2),
        created_at: Some(row.get(3)),
    }
}

const SEARCH_PREDICATE: &str = "full_name ILIKE $1
        OR email ILIKE $1
        OR phone ILIKE $1
        OR address ILIKE $1
        OR EXISTS (
            SELECT 1 FROM devices d
            WHERE d.account_id = accounts.id AND d.serial_number ILIKE $1
        )";

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Account>> {
        self.fetch_one(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"),
            id,
        )
        .await
    }

    #[instrument(skip(self, value))]
    async fn find_by_email_or_phone(&self, value: &str) -> DomainResult<Option<Account>> {
        self.fetch_one(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1 OR phone = $1"),
            value,
        )
        .await
    }

    #[instrument(skip(self, email))]
    async fn get_by_email(&self, email: &str) -> DomainResult<Option<Account>> {
        self.fetch_one(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"),
            email,
        )
        .await
    }

    #[instrument(skip(self, phone))]
    async fn get_by_phone(&self, phone: &str) -> DomainResult<Option<Account>> {
        self.fetch_one(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE phone = $1"),
            phone,
        )
        .await
    }

    #[instrument(skip(self), fields(page_index = page.index, page_size = page.size))]
    async fn list_all(&self, page: PageRequest) -> DomainResult<Page<Account>> {
        let result = self
            .fetch_page(
                "SELECT COUNT(*) FROM accounts",
                &format!(
                    "SELECT {ACCOUNT_COLUMNS} FROM accounts
                     ORDER BY created_at, id
                     LIMIT $1 OFFSET $2"
                ),
                None,
                page,
            )
            .await?;

        debug!(
            total_items = result.total_items,
            returned = result.items.len(),
            "listed accounts"
        );
        Ok(result)
    }

    #[instrument(skip(self, term), fields(page_index = page.index, page_size = page.size))]
    async fn search(&self, term: &str, page: PageRequest) -> DomainResult<Page<Account>> {
        let pattern = format!("%{term}%");

        let result = self
            .fetch_page(
                &format!("SELECT COUNT(*) FROM accounts WHERE {SEARCH_PREDICATE}"),
                &format!(
                    "SELECT {ACCOUNT_COLUMNS} FROM accounts
                     WHERE {SEARCH_PREDICATE}
                     ORDER BY created_at, id
                     LIMIT $2 OFFSET $3"
                ),
                Some(&pattern),
                page,
            )
            .await?;

        debug!(
            total_items = result.total_items,
            returned = result.items.len(),
            "searched accounts"
        );
        Ok(result)
    }

    #[instrument(skip(self, account), fields(account_id = %account.id))]
    async fn save(&self, account: Account) -> DomainResult<Account> {
        let conn = self.connection().await?;

        let now = Utc::now();

        let result = conn
            .execute(
                "UPDATE accounts
                 SET full_name = $2, email = $3, phone = $4, address = $5,
                     password_hash = $6, role = $7, updated_at = $8
                 WHERE id = $1",
                &[
                    &account.id,
                    &account.full_name,
                    &account.email,
                    &account.phone,
                    &account.address,
                    &account.password_hash,
                    &account.role.as_str(),
                    &now,
                ],
            )
            .await;

        match result {
            Ok(0) => Err(DomainError::EntityNotFound("User not found".to_string())),
            Ok(_) => {
                debug!(account_id = %account.id, "account updated in database");
                Ok(Account {
                    updated_at: Some(now),
                    ..account
                })
            }
            Err(e) => Err(map_account_unique_violation(e)),
        }
    }

    #[instrument(skip(self, account), fields(account_id = %account.id, email = %account.email))]
    async fn save_and_flush(&self, account: Account) -> DomainResult<Account> {
        let conn = self.connection().await?;

        let now = Utc::now();

        let result = conn
            .execute(
                "INSERT INTO accounts
                     (id, full_name, email, phone, address, password_hash, role,
                      created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                &[
                    &account.id,
                    &account.full_name,
                    &account.email,
                    &account.phone,
                    &account.address,
                    &account.password_hash,
                    &account.role.as_str(),
                    &now,
                    &now,
                ],
            )
            .await;

        if let Err(e) = result {
            return Err(map_account_unique_violation(e));
        }

        debug!(account_id = %account.id, "account inserted in database");

        Ok(Account {
            created_at: Some(now),
            updated_at: Some(now),
            ..account
        })
    }

    #[instrument(skip(self, account), fields(account_id = %account.id))]
    async fn delete(&self, account: Account) -> DomainResult<()> {
        let conn = self.connection().await?;

        // Owned device rows cascade via the foreign key
        conn.execute("DELETE FROM accounts WHERE id = $1", &[&account.id])
            .await
            .map_err(|e| DomainError::Repository(e.into()))?;

        debug!(account_id = %account.id, "account deleted from database");
        Ok(())
    }
}
