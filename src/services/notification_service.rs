//! Servicio de notificaciones
//!
//! `NotificationDispatcher` entrega una plantilla a un destinatario.
//! `NotificationService` hace el reparto a varios destinatarios en una
//! tarea aparte: la transición que la dispara no espera la entrega, y un
//! fallo con un destinatario no afecta al resto.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::NotificationTemplate;

/// Intentos por destinatario (entrega al menos una vez)
const MAX_ATTEMPTS: usize = 2;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("delivery to {recipient} failed: {reason}")]
    Delivery { recipient: Uuid, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(
        &self,
        template: NotificationTemplate,
        recipient: Uuid,
        payload: &Value,
    ) -> Result<(), NotificationError>;
}

/// Resultado de un reparto
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    pub delivered: Vec<Uuid>,
    pub failed: Vec<Uuid>,
}

#[derive(Clone)]
pub struct NotificationService {
    dispatcher: Arc<dyn NotificationDispatcher>,
    send_timeout: Duration,
}

impl NotificationService {
    pub fn new(dispatcher: Arc<dyn NotificationDispatcher>, send_timeout: Duration) -> Self {
        Self {
            dispatcher,
            send_timeout,
        }
    }

    /// Lanzar el reparto en segundo plano y devolver el handle
    pub fn dispatch(&self, template: NotificationTemplate, recipients: Vec<Uuid>, payload: Value) -> JoinHandle<DispatchReport> {
        let dispatcher = self.dispatcher.clone();
        let send_timeout = self.send_timeout;

        tokio::spawn(async move { fan_out(dispatcher, send_timeout, template, recipients, payload).await })
    }
}

async fn fan_out(
    dispatcher: Arc<dyn NotificationDispatcher>,
    send_timeout: Duration,
    template: NotificationTemplate,
    recipients: Vec<Uuid>,
    payload: Value,
) -> DispatchReport {
    if recipients.is_empty() {
        debug!(%template, "📭 Sin destinatarios");
        return DispatchReport::default();
    }

    let deliveries = recipients.iter().map(|recipient| {
        let dispatcher = dispatcher.as_ref();
        let payload = &payload;
        async move {
            let outcome = deliver(dispatcher, send_timeout, template, *recipient, payload).await;
            (*recipient, outcome)
        }
    });

    let mut report = DispatchReport::default();
    for (recipient, outcome) in futures::future::join_all(deliveries).await {
        match outcome {
            Ok(()) => report.delivered.push(recipient),
            Err(e) => {
                warn!(%template, %recipient, "⚠️ Notificación no entregada: {}", e);
                report.failed.push(recipient);
            }
        }
    }

    info!(
        %template,
        delivered = report.delivered.len(),
        failed = report.failed.len(),
        "📨 Reparto de notificaciones terminado"
    );
    report
}

async fn deliver(
    dispatcher: &dyn NotificationDispatcher,
    send_timeout: Duration,
    template: NotificationTemplate,
    recipient: Uuid,
    payload: &Value,
) -> Result<(), NotificationError> {
    let mut last_error = None;

    for attempt in 1..=MAX_ATTEMPTS {
        let result = match tokio::time::timeout(send_timeout, dispatcher.send(template, recipient, payload)).await {
            Ok(result) => result,
            Err(_) => Err(NotificationError::Timeout(send_timeout)),
        };

        match result {
            Ok(()) => return Ok(()),
            Err(e) => {
                debug!(%template, %recipient, attempt, "🔁 Intento de entrega fallido: {}", e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or(NotificationError::Delivery {
        recipient,
        reason: "no attempts made".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyDispatcher {
        calls: AtomicUsize,
        broken: Uuid,
    }

    #[async_trait]
    impl NotificationDispatcher for FlakyDispatcher {
        async fn send(&self, _template: NotificationTemplate, recipient: Uuid, _payload: &Value) -> Result<(), NotificationError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if recipient == self.broken {
                return Err(NotificationError::Delivery {
                    recipient,
                    reason: "mailbox full".to_string(),
                });
            }
            // El primer intento global falla para ejercitar el reintento
            if call == 0 {
                return Err(NotificationError::Delivery {
                    recipient,
                    reason: "transient".to_string(),
                });
            }
            Ok(())
        }
    }

    struct SlowDispatcher;

    #[async_trait]
    impl NotificationDispatcher for SlowDispatcher {
        async fn send(&self, _template: NotificationTemplate, _recipient: Uuid, _payload: &Value) -> Result<(), NotificationError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_partial_failure_does_not_block_others() {
        let broken = Uuid::new_v4();
        let healthy = Uuid::new_v4();
        let dispatcher = Arc::new(FlakyDispatcher {
            calls: AtomicUsize::new(0),
            broken,
        });
        let service = NotificationService::new(dispatcher, Duration::from_secs(1));

        let report = service
            .dispatch(NotificationTemplate::NewOrderForLogistics, vec![broken, healthy], Value::Null)
            .await
            .unwrap();

        assert_eq!(report.delivered, vec![healthy]);
        assert_eq!(report.failed, vec![broken]);
    }

    #[tokio::test]
    async fn test_send_timeout() {
        let service = NotificationService::new(Arc::new(SlowDispatcher), Duration::from_millis(20));
        let recipient = Uuid::new_v4();

        let report = service
            .dispatch(NotificationTemplate::OrderRouteSelected, vec![recipient], Value::Null)
            .await
            .unwrap();

        assert!(report.delivered.is_empty());
        assert_eq!(report.failed, vec![recipient]);
    }

    #[tokio::test]
    async fn test_empty_recipients() {
        let service = NotificationService::new(Arc::new(SlowDispatcher), Duration::from_millis(20));
        let report = service
            .dispatch(NotificationTemplate::OrderStatusChanged, Vec::new(), Value::Null)
            .await
            .unwrap();
        assert_eq!(report, DispatchReport::default());
    }
}
