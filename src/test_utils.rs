//! Colaboradores de prueba
//!
//! `ScriptedGeo` devuelve distancias fijas, falla o no responde según se
//! configure. `RecordingDispatcher` guarda cada notificación entregada y
//! puede rechazar destinatarios concretos. Se usan en los tests de
//! integración junto con `MemoryStore`.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::NotificationTemplate;
use crate::services::geocoding_service::{Coordinates, GeoDistance, GeoError};
use crate::services::notification_service::{NotificationDispatcher, NotificationError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeoScript {
    Distance(f64),
    Fail,
    /// No responde nunca; el llamador debe aplicar su timeout
    Hang,
}

pub struct ScriptedGeo {
    script: RwLock<GeoScript>,
    calls: AtomicUsize,
}

impl ScriptedGeo {
    pub fn new(script: GeoScript) -> Self {
        Self {
            script: RwLock::new(script),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn distance(distance_km: f64) -> Self {
        Self::new(GeoScript::Distance(distance_km))
    }

    pub async fn set_script(&self, script: GeoScript) {
        *self.script.write().await = script;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeoDistance for ScriptedGeo {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeoError> {
        Err(GeoError::AddressNotFound(address.to_string()))
    }

    async fn distance_km(&self, _origin: &str, _destination: &str) -> Result<f64, GeoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = *self.script.read().await;

        match script {
            GeoScript::Distance(distance_km) => Ok(distance_km),
            GeoScript::Fail => Err(GeoError::Status(503)),
            GeoScript::Hang => {
                std::future::pending::<()>().await;
                Err(GeoError::NotConfigured)
            }
        }
    }
}

/// Notificación entregada
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub template: NotificationTemplate,
    pub recipient: Uuid,
    pub payload: Value,
}

#[derive(Default)]
pub struct RecordingDispatcher {
    deliveries: RwLock<Vec<Delivery>>,
    failing: RwLock<HashSet<Uuid>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rechazar toda entrega a este destinatario
    pub async fn fail_for(&self, recipient: Uuid) {
        self.failing.write().await.insert(recipient);
    }

    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.read().await.clone()
    }

    pub async fn deliveries_of(&self, template: NotificationTemplate) -> Vec<Delivery> {
        self.deliveries
            .read()
            .await
            .iter()
            .filter(|delivery| delivery.template == template)
            .cloned()
            .collect()
    }

    /// Esperar hasta tener `count` entregas; `false` si vence el plazo
    pub async fn wait_for_deliveries(&self, count: usize, within: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + within;
        loop {
            if self.deliveries.read().await.len() >= count {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn send(
        &self,
        template: NotificationTemplate,
        recipient: Uuid,
        payload: &Value,
    ) -> Result<(), NotificationError> {
        if self.failing.read().await.contains(&recipient) {
            return Err(NotificationError::Delivery {
                recipient,
                reason: "recipient rejected".to_string(),
            });
        }

        self.deliveries.write().await.push(Delivery {
            template,
            recipient,
            payload: payload.clone(),
        });
        Ok(())
    }
}
