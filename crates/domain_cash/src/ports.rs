//! Cash Register Ports
//!
//! Storage for daily operations. The storage layer owns the uniqueness
//! guarantee: at most one operation per (branch, business date), so two
//! registers racing to open the same day cannot both win.

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{BranchId, DomainPort, HealthCheckable, PortError};

use crate::operation::DailyOperation;

/// Storage for daily cash operations
#[async_trait]
pub trait DailyOperationPort: DomainPort + HealthCheckable {
    /// Finds the operation for a branch on a business date
    async fn find_by_date(
        &self,
        branch_id: Option<BranchId>,
        business_date: NaiveDate,
    ) -> Result<Option<DailyOperation>, PortError>;

    /// Inserts a newly opened operation
    ///
    /// # Errors
    ///
    /// `PortError::Conflict` if an operation already exists for the same
    /// branch and date.
    async fn insert(&self, operation: &DailyOperation) -> Result<(), PortError>;

    /// Persists the closing of an operation
    ///
    /// # Errors
    ///
    /// `PortError::Conflict` if the stored operation is no longer open;
    /// `PortError::NotFound` if it does not exist.
    async fn close(&self, operation: &DailyOperation) -> Result<(), PortError>;

    /// Lists operations in an inclusive date range, newest first
    async fn list(
        &self,
        branch_id: Option<BranchId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyOperation>, PortError>;
}

/// In-memory implementation for tests and local runs
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::RwLock;

    use core_kernel::{AdapterHealth, DailyOperationId, HealthCheckResult};

    use crate::operation::OperationStatus;

    /// In-memory mock implementation of DailyOperationPort
    #[derive(Debug, Default)]
    pub struct MockDailyOperationPort {
        operations: RwLock<HashMap<DailyOperationId, DailyOperation>>,
        unavailable: AtomicBool,
    }

    impl MockDailyOperationPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every subsequent call fail with `ServiceUnavailable`
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        fn check_available(&self) -> Result<(), PortError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(PortError::ServiceUnavailable {
                    service: "mock-daily-operations".to_string(),
                });
            }
            Ok(())
        }
    }

    impl DomainPort for MockDailyOperationPort {}

    #[async_trait]
    impl HealthCheckable for MockDailyOperationPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-daily-operations".to_string(),
                status: if self.unavailable.load(Ordering::SeqCst) {
                    AdapterHealth::Unhealthy
                } else {
                    AdapterHealth::Healthy
                },
                latency_ms: 0,
                message: Some("Mock adapter".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl DailyOperationPort for MockDailyOperationPort {
        async fn find_by_date(
            &self,
            branch_id: Option<BranchId>,
            business_date: NaiveDate,
        ) -> Result<Option<DailyOperation>, PortError> {
            self.check_available()?;
            Ok(self
                .operations
                .read()
                .await
                .values()
                .find(|op| op.branch_id == branch_id && op.business_date == business_date)
                .cloned())
        }

        async fn insert(&self, operation: &DailyOperation) -> Result<(), PortError> {
            self.check_available()?;
            // Check and insert under one write lock, like a unique index
            let mut operations = self.operations.write().await;
            let duplicate = operations.values().any(|op| {
                op.branch_id == operation.branch_id && op.business_date == operation.business_date
            });
            if duplicate {
                return Err(PortError::conflict(format!(
                    "daily operation already exists for {}",
                    operation.business_date
                )));
            }
            operations.insert(operation.id, operation.clone());
            Ok(())
        }

        async fn close(&self, operation: &DailyOperation) -> Result<(), PortError> {
            self.check_available()?;
            let mut operations = self.operations.write().await;
            let stored = operations
                .get_mut(&operation.id)
                .ok_or_else(|| PortError::not_found("DailyOperation", operation.id))?;
            if stored.status != OperationStatus::Open {
                return Err(PortError::conflict(format!(
                    "daily operation {} is not open",
                    operation.id
                )));
            }
            *stored = operation.clone();
            Ok(())
        }

        async fn list(
            &self,
            branch_id: Option<BranchId>,
            from: NaiveDate,
            to: NaiveDate,
        ) -> Result<Vec<DailyOperation>, PortError> {
            self.check_available()?;
            let mut results: Vec<_> = self
                .operations
                .read()
                .await
                .values()
                .filter(|op| op.branch_id == branch_id && op.business_date >= from && op.business_date <= to)
                .cloned()
                .collect();
            results.sort_by(|a, b| b.business_date.cmp(&a.business_date));
            Ok(results)
        }
    }
}
