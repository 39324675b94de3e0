//! WhatsApp chat notifier
//!
//! Delivers credit notices by writing them to the store's WhatsApp chat
//! inbox, where the messaging integration picks them up. The chat for the
//! customer's phone is created on first contact and refreshed afterwards.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_credit::{NotificationPort, OutboundMessage};

use crate::adapters::ping;
use crate::repositories::chat::{ChatRepository, OutboundChatMessage};

const ADAPTER_ID: &str = "whatsapp-chat-notifier";

#[derive(Debug, Clone)]
pub struct WhatsAppChatNotifier {
    repository: ChatRepository,
    pool: PgPool,
}

impl WhatsAppChatNotifier {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ChatRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn repository(&self) -> &ChatRepository {
        &self.repository
    }
}

impl DomainPort for WhatsAppChatNotifier {}

#[async_trait]
impl HealthCheckable for WhatsAppChatNotifier {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, ADAPTER_ID).await
    }
}

#[async_trait]
impl NotificationPort for WhatsAppChatNotifier {
    #[instrument(skip(self, message), fields(customer_id = %message.customer_id))]
    async fn send(&self, message: &OutboundMessage) -> Result<(), PortError> {
        let recipient = message.recipient.trim();
        if recipient.is_empty() {
            return Err(PortError::validation_field("recipient phone is empty", "recipient"));
        }

        self.repository
            .upsert_outbound(&OutboundChatMessage {
                customer_phone: recipient.to_string(),
                customer_name: message.customer_name.clone(),
                customer_id: Some(Uuid::from(message.customer_id)),
                text: message.text.clone(),
                sent_at: message.sent_at,
            })
            .await?;

        debug!("Credit notice written to chat inbox");
        Ok(())
    }
}
