//! Clientes de notificación
//!
//! `WebhookDispatcher` publica cada notificación como JSON en un endpoint
//! HTTP configurado (`NOTIFICATION_WEBHOOK_URL`). `LogDispatcher` solo deja
//! constancia en los logs, para despliegues sin webhook.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::models::NotificationTemplate;
use crate::services::notification_service::{NotificationDispatcher, NotificationError};

/// Cuerpo enviado al webhook
#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    template: NotificationTemplate,
    recipient: Uuid,
    payload: &'a Value,
    sent_at: chrono::DateTime<chrono::Utc>,
}

pub struct WebhookDispatcher {
    client: Client,
    url: String,
}

impl WebhookDispatcher {
    /// Crear nuevo cliente HTTP para el webhook de notificaciones
    pub fn new(url: String, timeout: Duration) -> Result<Self, NotificationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl NotificationDispatcher for WebhookDispatcher {
    async fn send(
        &self,
        template: NotificationTemplate,
        recipient: Uuid,
        payload: &Value,
    ) -> Result<(), NotificationError> {
        let message = WebhookMessage {
            template,
            recipient,
            payload,
            sent_at: chrono::Utc::now(),
        };

        let response = self
            .client
            .post(&self.url)
            .header("Accept", "application/json")
            .header("User-Agent", "EcoTrack/1.0")
            .json(&message)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotificationError::Delivery {
                recipient,
                reason: format!("Error HTTP: {}", response.status()),
            });
        }

        Ok(())
    }
}

/// Dispatcher que solo registra la notificación en los logs
pub struct LogDispatcher;

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn send(
        &self,
        template: NotificationTemplate,
        recipient: Uuid,
        payload: &Value,
    ) -> Result<(), NotificationError> {
        info!(%template, %recipient, payload = %payload, "📨 Notificación");
        Ok(())
    }
}
