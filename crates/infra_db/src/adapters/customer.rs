//! PostgreSQL Customer Directory

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{CustomerId, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_credit::{CustomerContact, CustomerDirectoryPort};

use crate::adapters::ping;
use crate::repositories::customer::CustomerRepository;

const ADAPTER_ID: &str = "postgres-customer-directory";

/// Reads customer contact data from the `customers` table
#[derive(Debug, Clone)]
pub struct PostgresCustomerDirectory {
    repository: CustomerRepository,
    pool: PgPool,
}

impl PostgresCustomerDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: CustomerRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn repository(&self) -> &CustomerRepository {
        &self.repository
    }
}

impl DomainPort for PostgresCustomerDirectory {}

#[async_trait]
impl HealthCheckable for PostgresCustomerDirectory {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, ADAPTER_ID).await
    }
}

#[async_trait]
impl CustomerDirectoryPort for PostgresCustomerDirectory {
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    async fn get_contact(&self, customer_id: CustomerId) -> Result<Option<CustomerContact>, PortError> {
        let row = self.repository.find_by_id(customer_id.into()).await?;
        Ok(row.map(|row| CustomerContact {
            customer_id: row.id.into(),
            name: row.name,
            // blank phones are as good as none for messaging
            phone: row.phone.filter(|p| !p.trim().is_empty()),
        }))
    }
}
