//! Customer repository implementation
//!
//! Customers are maintained by the store's customer module; this crate
//! reads them for the credit directory and writes them only for seeding.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves a customer, or `None` if unknown
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CustomerRow>, DatabaseError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r#"
            SELECT id, name, phone, email, created_at, updated_at
            FROM customers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Inserts a customer
    pub async fn insert(&self, customer: &NewCustomer) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, name, phone, email)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Database row for a customer
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CustomerRow {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for inserting a customer
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}
