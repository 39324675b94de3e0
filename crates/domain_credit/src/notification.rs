//! Customer notices for credit activity
//!
//! Notices are rendered to the Spanish WhatsApp text the store sends its
//! customers. Delivery goes through [`crate::ports::NotificationPort`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CreditAccountId, CustomerId, Money};

use crate::account::CreditAccount;
use crate::transaction::CreditTransaction;

/// A customer as seen by the notification path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    pub customer_id: CustomerId,
    pub name: String,
    pub phone: Option<String>,
}

/// Rendered message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Phone number of the recipient
    pub recipient: String,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

/// Credit events worth telling the customer about
#[derive(Debug, Clone, PartialEq)]
pub enum CreditNotice {
    ChargePosted {
        account_id: CreditAccountId,
        amount: Money,
        balance: Money,
        available: Money,
        reference: Option<String>,
        near_limit: bool,
    },
    PaymentReceived {
        account_id: CreditAccountId,
        amount: Money,
        balance: Money,
        available: Money,
        reference: Option<String>,
        near_limit: bool,
    },
}

impl CreditNotice {
    /// Builds the notice for a committed posting, if the kind warrants one
    pub fn for_posting(
        account: &CreditAccount,
        transaction: &CreditTransaction,
        near_limit: bool,
    ) -> Option<Self> {
        use crate::transaction::TransactionKind;

        match transaction.kind {
            TransactionKind::Charge => Some(CreditNotice::ChargePosted {
                account_id: account.id,
                amount: transaction.amount.abs(),
                balance: account.current_balance,
                available: account.available_credit(),
                reference: transaction.reference.clone(),
                near_limit,
            }),
            TransactionKind::Payment => Some(CreditNotice::PaymentReceived {
                account_id: account.id,
                amount: transaction.amount.abs(),
                balance: account.current_balance,
                available: account.available_credit(),
                reference: transaction.reference.clone(),
                near_limit,
            }),
            TransactionKind::Adjustment => None,
        }
    }

    /// Renders the WhatsApp text for `customer_name`
    pub fn render(&self, customer_name: &str) -> String {
        let (header, lead, amount, balance, available, reference, near_limit) = match self {
            CreditNotice::ChargePosted { amount, balance, available, reference, near_limit, .. } => (
                "🧾 *Cargo a tu Crédito*",
                "Se registró una compra a crédito en tu cuenta:",
                amount,
                balance,
                available,
                reference,
                *near_limit,
            ),
            CreditNotice::PaymentReceived { amount, balance, available, reference, near_limit, .. } => (
                "✅ *Pago Recibido*",
                "Recibimos tu pago, ¡gracias!",
                amount,
                balance,
                available,
                reference,
                *near_limit,
            ),
        };

        let mut text = format!(
            "{header}\n\nHola {customer_name},\n\n{lead}\n\n💵 Monto: {amount}\n📊 Saldo actual: {balance}\n💳 Crédito disponible: {available}"
        );
        if let Some(reference) = reference {
            text.push_str(&format!("\n🔖 Referencia: {reference}"));
        }
        if near_limit {
            text.push_str("\n\n⚠️ Tu saldo está cerca del límite de crédito.");
        }
        text
    }
}
