//! API configuration
//!
//! Read from `APP_`-prefixed environment variables (a `.env` file is loaded
//! first by the server binary). Every field has a default, so an empty
//! environment yields a runnable local setup.

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use core_kernel::{BusinessCalendar, ClockError, Timezone};
use domain_credit::CreditPolicy;
use infra_db::DatabaseConfig;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Plain,
    Json,
}

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    /// Log level or `EnvFilter` directive
    pub log_level: String,
    pub log_format: LogFormat,
    /// IANA name of the store's timezone; decides the business date
    pub timezone: String,
    /// Fraction of the credit limit above which a near-limit warning is raised
    pub near_limit_threshold: Decimal,
    /// Upper bound for one customer notification, in milliseconds
    pub notification_timeout_ms: u64,
    /// Operator recorded when a request carries no `x-operator` header
    pub default_operator: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/tienda".to_string(),
            db_max_connections: 10,
            db_min_connections: 2,
            log_level: "info".to_string(),
            log_format: LogFormat::Plain,
            timezone: "America/Mexico_City".to_string(),
            near_limit_threshold: dec!(0.8),
            notification_timeout_ms: 5_000,
            default_operator: "Admin".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `APP_*` environment variables over the defaults
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("APP").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database_url.clone())
            .max_connections(self.db_max_connections)
            .min_connections(self.db_min_connections)
    }

    /// Store calendar for the configured timezone
    pub fn business_calendar(&self) -> Result<BusinessCalendar, ClockError> {
        let timezone: Timezone = self.timezone.parse()?;
        Ok(BusinessCalendar::new(timezone))
    }

    pub fn credit_policy(&self) -> CreditPolicy {
        CreditPolicy::default()
            .with_near_limit_threshold(self.near_limit_threshold)
            .with_notification_timeout(Duration::from_millis(self.notification_timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.default_operator, "Admin");
        assert_eq!(config.credit_policy().near_limit_threshold, dec!(0.8));
        assert_eq!(
            config.credit_policy().notification_timeout,
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_business_calendar_rejects_unknown_timezone() {
        let config = ApiConfig {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..ApiConfig::default()
        };
        assert!(config.business_calendar().is_err());
        assert!(ApiConfig::default().business_calendar().is_ok());
    }

    #[test]
    fn test_database_config_carries_pool_sizes() {
        let config = ApiConfig {
            db_max_connections: 25,
            ..ApiConfig::default()
        };
        assert_eq!(config.database_config().max_connections, 25);
        assert_eq!(config.database_config().min_connections, 2);
    }
}
