//! Credit Domain - Revolving Customer Credit Ledger
//!
//! This crate implements store credit for point-of-sale customers: each
//! account has a limit, a balance, and an append-only trail of transactions
//! that explains every change to that balance.
//!
//! # Ledger Invariants
//!
//! - `current_balance == Σ transaction.amount` for every account
//! - `available_credit == credit_limit - current_balance`, always derived
//! - The balance is never negative; payments larger than it are rejected
//! - Balance update and transaction insert are committed together or not at all
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_credit::{CreditLedgerService, ChargeRequest};
//!
//! let outcome = service
//!     .apply_charge(account_id, ChargeRequest {
//!         amount: Money::mxn(dec!(5000)),
//!         description: "Compra de materiales".into(),
//!         reference: Some("SALE-001".into()),
//!     }, "Admin")
//!     .await?;
//! ```

pub mod account;
pub mod transaction;
pub mod policy;
pub mod ledger;
pub mod statement;
pub mod portfolio;
pub mod notification;
pub mod ports;
pub mod service;
pub mod error;

pub use account::{AccountStatus, CreditAccount, OpenAccountRequest, PaymentTerms};
pub use transaction::{CreditTransaction, TransactionKind};
pub use policy::CreditPolicy;
pub use ledger::{
    reconcile, AdjustmentRequest, ChargeRequest, LedgerWarning, PaymentRequest, Posting,
    PostingRequest, PostingRules, Reconciliation,
};
pub use statement::{AgingBucket, AgingReport, Statement, StatementLine};
pub use portfolio::PortfolioSummary;
pub use notification::{CreditNotice, CustomerContact, OutboundMessage};
pub use ports::{AccountQuery, CreditLedgerPort, CustomerDirectoryPort, NotificationPort};
pub use service::{CreditLedgerService, LedgerOutcome};
pub use error::CreditError;
