use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::models::{LogisticRoute, MaterialType, Order, OrderStatus};
use crate::services::{CreateOrderInput, OrderCreation, PriceQuote};

// Request para crear un pedido
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    /// Materiales desconocidos se tratan como `other`
    pub material_type: MaterialType,

    #[validate(range(max = 1000000.0))]
    pub volume_kg: f64,

    #[validate(length(min = 1, max = 500))]
    pub pickup_address: String,
}

impl From<CreateOrderRequest> for CreateOrderInput {
    fn from(request: CreateOrderRequest) -> Self {
        Self {
            material_type: request.material_type,
            volume_kg: request.volume_kg,
            pickup_address: request.pickup_address,
        }
    }
}

// Response del alta: el pedido, su ruta si se generó, y el error de ruteo si no
#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub order: Order,
    pub route: Option<LogisticRoute>,
    pub routing_error: Option<Value>,
}

impl From<OrderCreation> for CreateOrderResponse {
    fn from(creation: OrderCreation) -> Self {
        let routing_error = creation.routing_error.map(|error| {
            serde_json::json!({
                "code": error.code(),
                "message": error.to_string(),
            })
        });

        Self {
            order: creation.order,
            route: creation.route,
            routing_error,
        }
    }
}

// Request para avanzar el estado de un pedido
#[derive(Debug, Deserialize)]
pub struct AdvanceOrderRequest {
    pub status: OrderStatus,
}

// Request para elegir una opción de ruta
#[derive(Debug, Deserialize)]
pub struct SelectRouteRequest {
    pub option_id: uuid::Uuid,
}

// Query del presupuesto: distancia explícita o dirección a geocodificar
#[derive(Debug, Deserialize, Validate)]
pub struct PriceQuoteQuery {
    pub material_type: MaterialType,
    #[validate(range(max = 1000000.0))]
    pub volume_kg: f64,
    #[validate(range(min = 0.0, max = 20000.0))]
    pub distance_km: Option<f64>,
    pub pickup_address: Option<String>,
}

// Response del presupuesto
#[derive(Debug, Serialize)]
pub struct PriceQuoteResponse {
    pub material_type: MaterialType,
    pub volume_kg: f64,
    pub distance_km: f64,
    #[serde(flatten)]
    pub quote: PriceQuote,
}
