//! Modelo de LogisticRoute
//!
//! Una ruta logística por pedido, con sus opciones candidatas en orden de
//! presentación. `selected_option_id` solo se escribe una vez.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::order::Order;

/// Opción candidata dentro de una ruta - mapea a la tabla route_options
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct RouteOption {
    pub id: Uuid,
    pub route_id: Uuid,
    pub position: i32,
    pub name: String,
    pub estimated_cost: Decimal,
    pub estimated_duration_hours: f64,
}

/// Fila de la tabla logistic_routes (sin opciones)
#[derive(Debug, Clone, FromRow)]
pub struct LogisticRouteRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub selected_option_id: Option<Uuid>,
    pub distance_km: f64,
    pub distance_estimated: bool,
    pub created_at: DateTime<Utc>,
    pub selected_at: Option<DateTime<Utc>>,
}

/// Ruta logística completa con sus opciones
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogisticRoute {
    pub id: Uuid,
    pub order_id: Uuid,
    pub options: Vec<RouteOption>,
    pub selected_option_id: Option<Uuid>,
    pub distance_km: f64,
    pub distance_estimated: bool,
    pub created_at: DateTime<Utc>,
    pub selected_at: Option<DateTime<Utc>>,
}

impl LogisticRoute {
    pub fn from_parts(row: LogisticRouteRow, mut options: Vec<RouteOption>) -> Self {
        options.sort_by_key(|option| option.position);
        Self {
            id: row.id,
            order_id: row.order_id,
            options,
            selected_option_id: row.selected_option_id,
            distance_km: row.distance_km,
            distance_estimated: row.distance_estimated,
            created_at: row.created_at,
            selected_at: row.selected_at,
        }
    }

    pub fn option(&self, option_id: Uuid) -> Option<&RouteOption> {
        self.options.iter().find(|option| option.id == option_id)
    }

    pub fn option_by_name(&self, name: &str) -> Option<&RouteOption> {
        self.options.iter().find(|option| option.name == name)
    }

    pub fn selected_option(&self) -> Option<&RouteOption> {
        self.selected_option_id.and_then(|id| self.option(id))
    }
}

/// Resultado atómico de seleccionar una opción: ruta y pedido actualizados
#[derive(Debug, Clone, Serialize)]
pub struct RouteSelection {
    pub route: LogisticRoute,
    pub order: Order,
}
