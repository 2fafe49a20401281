use crate::domain::{Account, Device, DeviceRegistrar, DomainError, DomainResult};
use crate::postgres::PostgresClient;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::{debug, instrument};

/// PostgreSQL implementation of DeviceRegistrar trait. The unique constraint
/// on `serial_number` is the authoritative uniqueness enforcement;
/// `fail_if_registered` is a pre-check that produces the conflict before any
/// insert is attempted.
#[derive(Clone)]
pub struct PostgresDeviceRegistrar {
    client: PostgresClient,
}

impl PostgresDeviceRegistrar {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }

    async fn connection(&self) -> DomainResult<deadpool_postgres::Client> {
        self.client
            .get_connection()
            .await
            .map_err(DomainError::Repository)
    }
}

#[async_trait]
impl DeviceRegistrar for PostgresDeviceRegistrar {
    #[instrument(skip(self))]
    async fn fail_if_registered(&self, serial_number: &str) -> DomainResult<()> {
        let conn = self.connection().await?;

        let row = conn
            .query_opt(
                "SELECT serial_number FROM devices WHERE serial_number = $1",
                &[&serial_number],
            )
            .await
            .map_err(|e| DomainError::Repository(e.into()))?;

        if row.is_some() {
            return Err(DomainError::AlreadyExists(
                "Device already registered".to_string(),
            ));
        }

        Ok(())
    }

    #[instrument(skip(self, owner), fields(account_id = %owner.id))]
    async fn register_device(
        &self,
        serial_number: &str,
        purchase_date: Option<NaiveDate>,
        owner: &Account,
    ) -> DomainResult<Device> {
        let conn = self.connection().await?;

        let now = Utc::now();

        let result = conn
            .execute(
                "INSERT INTO devices (serial_number, account_id, purchase_date, created_at)
                 VALUES ($1, $2, $3, $4)",
                &[&serial_number, &owner.id, &purchase_date, &now],
            )
            .await;

        if let Err(e) = result {
            if let Some(db_err) = e.as_db_error() {
                // PostgreSQL error code 23505 is unique_violation
                if db_err.code().code() == "23505" {
                    return Err(DomainError::AlreadyExists(
                        "Device already registered".to_string(),
                    ));
                }
            }
            return Err(DomainError::Repository(e.into()));
        }

        debug!(serial_number = %serial_number, account_id = %owner.id, "device registered");

        Ok(Device {
            serial_number: serial_number.to_string(),
            purchase_date,
            account_id: owner.id.clone(),
            created_at: Some(now),
        })
    }
}
