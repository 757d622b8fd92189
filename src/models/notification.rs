//! Plantillas de notificación que dispara el flujo de pedidos

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationTemplate {
    /// Pedido nuevo con ruta generada, para todos los usuarios `logistic`
    NewOrderForLogistics,
    /// Opción de ruta elegida, para el cliente dueño del pedido
    OrderRouteSelected,
    /// Avance o cancelación del pedido, para el cliente dueño
    OrderStatusChanged,
}

impl NotificationTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationTemplate::NewOrderForLogistics => "new-order-for-logistics",
            NotificationTemplate::OrderRouteSelected => "order-route-selected",
            NotificationTemplate::OrderStatusChanged => "order-status-changed",
        }
    }
}

impl fmt::Display for NotificationTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
