//! Database Test Utilities
//!
//! Provides a migrated PostgreSQL for integration tests, either in a
//! throwaway container or, when `TEST_DATABASE_URL` is set, an existing
//! server.

use once_cell::sync::Lazy;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};
use tokio::sync::OnceCell;
use uuid::Uuid;

use core_kernel::CustomerId;
use infra_db::repositories::customer::NewCustomer;
use infra_db::repositories::CustomerRepository;

/// Default PostgreSQL image for testing
const POSTGRES_IMAGE: &str = "postgres";
const POSTGRES_TAG: &str = "16-alpine";
const POSTGRES_USER: &str = "test_user";
const POSTGRES_PASSWORD: &str = "test_password";
const POSTGRES_DB: &str = "tienda_test";

/// Connection string of an already running test server, if any
static EXTERNAL_DATABASE_URL: Lazy<Option<String>> =
    Lazy::new(|| std::env::var("TEST_DATABASE_URL").ok().filter(|url| !url.is_empty()));

type TestResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Configuration for test database
#[derive(Debug, Clone)]
pub struct TestDatabaseConfig {
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: u16,
}

impl Default for TestDatabaseConfig {
    fn default() -> Self {
        Self {
            user: POSTGRES_USER.to_string(),
            password: POSTGRES_PASSWORD.to_string(),
            database: POSTGRES_DB.to_string(),
            host: "localhost".to_string(),
            port: 5432,
        }
    }
}

impl TestDatabaseConfig {
    /// Creates the database connection URL
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

/// A migrated PostgreSQL database for tests
pub struct TestDatabase {
    _container: Option<ContainerAsync<GenericImage>>,
    pub url: String,
    pub pool: PgPool,
}

impl TestDatabase {
    /// Connects to `TEST_DATABASE_URL` or starts a container, then migrates
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start, the connection
    /// fails, or a migration fails
    pub async fn new() -> TestResult<Self> {
        let (container, url) = match EXTERNAL_DATABASE_URL.as_ref() {
            Some(url) => (None, url.clone()),
            None => {
                let (container, config) = start_container().await?;
                (Some(container), config.connection_url())
            }
        };

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&url)
            .await?;

        infra_db::run_migrations(&pool).await?;

        Ok(Self {
            _container: container,
            url,
            pool,
        })
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Clears all data from the database while preserving the schema
    pub async fn clear_data(&self) -> TestResult<()> {
        let tables = [
            "whatsapp_chats",
            "credit_transactions",
            "credit_accounts",
            "daily_operations",
            "customers",
        ];

        for table in tables {
            sqlx::query(&format!("TRUNCATE TABLE {} CASCADE", table))
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }

    /// Inserts a customer and returns its id
    pub async fn seed_customer(&self, name: &str, phone: Option<&str>) -> TestResult<CustomerId> {
        let id = Uuid::new_v4();
        CustomerRepository::new(self.pool.clone())
            .insert(&NewCustomer {
                id,
                name: name.to_string(),
                phone: phone.map(str::to_string),
                email: None,
            })
            .await?;
        Ok(CustomerId::from_uuid(id))
    }
}

async fn start_container() -> TestResult<(ContainerAsync<GenericImage>, TestDatabaseConfig)> {
    let container = GenericImage::new(POSTGRES_IMAGE, POSTGRES_TAG)
        .with_exposed_port(5432.tcp())
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_USER", POSTGRES_USER)
        .with_env_var("POSTGRES_PASSWORD", POSTGRES_PASSWORD)
        .with_env_var("POSTGRES_DB", POSTGRES_DB)
        .start()
        .await?;

    let config = TestDatabaseConfig {
        host: container.get_host().await?.to_string(),
        port: container.get_host_port_ipv4(5432).await?,
        ..TestDatabaseConfig::default()
    };

    Ok((container, config))
}

/// Global test database for shared integration tests
static SHARED_TEST_DB: OnceCell<Arc<TestDatabase>> = OnceCell::const_new();

/// Gets or creates a shared test database instance
///
/// # Panics
///
/// Panics if the database fails to initialize
pub async fn get_shared_test_database() -> Arc<TestDatabase> {
    SHARED_TEST_DB
        .get_or_init(|| async {
            Arc::new(
                TestDatabase::new()
                    .await
                    .expect("Failed to create shared test database"),
            )
        })
        .await
        .clone()
}

/// Creates an isolated test database for a single test
pub async fn create_isolated_test_database() -> TestResult<TestDatabase> {
    TestDatabase::new().await
}

/// Helper macro for running database tests against an isolated database
///
/// Tests are ignored by default since they need Docker or `TEST_DATABASE_URL`.
#[macro_export]
macro_rules! db_test {
    ($name:ident, |$db:ident| $body:block) => {
        #[tokio::test]
        #[ignore = "requires PostgreSQL"]
        async fn $name() {
            let $db = $crate::database::create_isolated_test_database()
                .await
                .expect("Failed to create test database");
            $body
        }
    };
}
