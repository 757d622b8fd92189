//! Modelo de Order
//!
//! Pedidos de recogida de material reciclable y su máquina de estados.
//! `price` y `environmental_impact` se fijan al crear el pedido y ningún
//! camino de escritura los modifica después.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Tipo de material - mapea al ENUM material_type
///
/// Al deserializar, cualquier material desconocido se convierte en `Other`
/// para no bloquear la creación del pedido por huecos del catálogo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "material_type")]
#[serde(from = "String", into = "String")]
pub enum MaterialType {
    #[sqlx(rename = "PET")]
    Pet,
    #[sqlx(rename = "HDPE")]
    Hdpe,
    #[sqlx(rename = "PVC")]
    Pvc,
    #[sqlx(rename = "LDPE")]
    Ldpe,
    #[sqlx(rename = "PP")]
    Pp,
    #[sqlx(rename = "PS")]
    Ps,
    #[sqlx(rename = "other")]
    Other,
}

impl MaterialType {
    pub const ALL: [MaterialType; 7] = [
        MaterialType::Pet,
        MaterialType::Hdpe,
        MaterialType::Pvc,
        MaterialType::Ldpe,
        MaterialType::Pp,
        MaterialType::Ps,
        MaterialType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialType::Pet => "PET",
            MaterialType::Hdpe => "HDPE",
            MaterialType::Pvc => "PVC",
            MaterialType::Ldpe => "LDPE",
            MaterialType::Pp => "PP",
            MaterialType::Ps => "PS",
            MaterialType::Other => "other",
        }
    }

    /// Conversión tolerante: materiales fuera del catálogo pasan a `Other`
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or(MaterialType::Other)
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaterialType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        MaterialType::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| format!("unknown material '{}'", s.trim()))
    }
}

impl From<String> for MaterialType {
    fn from(value: String) -> Self {
        MaterialType::parse_lenient(&value)
    }
}

impl From<MaterialType> for String {
    fn from(value: MaterialType) -> Self {
        value.as_str().to_string()
    }
}

/// Estado del pedido - mapea al ENUM order_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Routed,
    Accepted,
    Processing,
    Delivery,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Routed,
        OrderStatus::Accepted,
        OrderStatus::Processing,
        OrderStatus::Delivery,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Routed => "routed",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Processing => "processing",
            OrderStatus::Delivery => "delivery",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Siguiente paso hacia adelante en el ciclo de vida
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Routed),
            OrderStatus::Routed => Some(OrderStatus::Accepted),
            OrderStatus::Accepted => Some(OrderStatus::Processing),
            OrderStatus::Processing => Some(OrderStatus::Delivery),
            OrderStatus::Delivery => Some(OrderStatus::Completed),
            OrderStatus::Completed | OrderStatus::Cancelled => None,
        }
    }

    /// Tabla de transiciones permitidas: un paso hacia adelante, o
    /// cancelación desde cualquier estado no terminal.
    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        if to == OrderStatus::Cancelled {
            return !self.is_terminal();
        }
        self.next() == Some(to)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        OrderStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("unknown order status '{}'", s.trim()))
    }
}

/// Order principal - mapea exactamente a la tabla orders
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub material_type: MaterialType,
    pub volume_kg: f64,
    pub pickup_address: String,
    pub distance_km: f64,
    pub price: Decimal,
    pub environmental_impact: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Datos validados para construir un pedido nuevo
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub material_type: MaterialType,
    pub volume_kg: f64,
    pub pickup_address: String,
    pub distance_km: f64,
    pub price: Decimal,
    pub environmental_impact: f64,
}

impl Order {
    pub fn new(new_order: NewOrder) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: new_order.user_id,
            material_type: new_order.material_type,
            volume_kg: new_order.volume_kg,
            pickup_address: new_order.pickup_address,
            distance_km: new_order.distance_km,
            price: new_order.price,
            environmental_impact: new_order.environmental_impact,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}
