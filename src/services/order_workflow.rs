//! Flujo de pedidos
//!
//! Orquesta el ciclo de vida completo: alta con precio fijado, generación
//! automática de la ruta, selección de opción por logística, avance de
//! estados y cancelación. Cada cambio de estado es una escritura
//! condicional en el store; las notificaciones salen después, en segundo
//! plano, y nunca hacen fallar la operación.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use super::authorization_service::AuthorizationService;
use super::notification_service::NotificationService;
use super::pricing_service::PricingEngine;
use super::route_generator::{DistanceEstimate, RouteGenerator};
use crate::models::{
    LogisticRoute, MaterialType, NewOrder, NotificationTemplate, Order, OrderStatus, Role, RouteSelection, User,
};
use crate::repositories::{OrderRepository, RouteRepository, Store, TransitionOutcome, UserRepository};
use crate::utils::errors::{invalid_input_error, not_found_error, unauthorized_error, AppError, AppResult};
use crate::utils::validation::{validate_finite, validate_not_empty, validate_positive};

/// Datos de un pedido nuevo tal como llegan del cliente
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    pub material_type: MaterialType,
    pub volume_kg: f64,
    pub pickup_address: String,
}

/// Resultado del alta: el pedido siempre existe; la ruta puede faltar
#[derive(Debug)]
pub struct OrderCreation {
    pub order: Order,
    pub route: Option<LogisticRoute>,
    /// Siempre `RouteCreationFailed` cuando está presente
    pub routing_error: Option<AppError>,
}

/// Pedido ya en `routed` junto con su ruta
#[derive(Debug, Clone, Serialize)]
pub struct RoutedOrder {
    pub order: Order,
    pub route: LogisticRoute,
}

#[derive(Clone)]
pub struct OrderWorkflow {
    store: Arc<dyn Store>,
    pricing: PricingEngine,
    routes: RouteGenerator,
    notifications: NotificationService,
}

impl OrderWorkflow {
    pub fn new(
        store: Arc<dyn Store>,
        pricing: PricingEngine,
        routes: RouteGenerator,
        notifications: NotificationService,
    ) -> Self {
        Self {
            store,
            pricing,
            routes,
            notifications,
        }
    }

    pub async fn create(&self, input: CreateOrderInput, acting: &User) -> AppResult<OrderCreation> {
        validate_not_empty(&input.pickup_address)
            .map_err(|_| invalid_input_error("pickup_address must not be empty"))?;
        validate_finite(input.volume_kg)
            .and_then(|_| validate_positive(input.volume_kg))
            .map_err(|_| invalid_input_error("volume_kg must be a positive number"))?;
        let pickup_address = input.pickup_address.trim().to_string();

        let distance = self.routes.resolve_distance(&pickup_address).await;
        let quote = self
            .pricing
            .compute_price(input.material_type, input.volume_kg, distance.distance_km)?;

        let order = self
            .store
            .insert_order(Order::new(NewOrder {
                user_id: acting.id,
                material_type: input.material_type,
                volume_kg: input.volume_kg,
                pickup_address,
                distance_km: distance.distance_km,
                price: quote.price,
                environmental_impact: quote.environmental_impact,
            }))
            .await?;

        info!(
            order_id = %order.id,
            user_id = %acting.id,
            material = %order.material_type,
            price = %order.price,
            "📦 Pedido creado"
        );

        match self.route_order(&order, Some(distance)).await {
            Ok(routed) => Ok(OrderCreation {
                order: routed.order,
                route: Some(routed.route),
                routing_error: None,
            }),
            Err(e) => {
                warn!(order_id = %order.id, "⚠️ El pedido queda en pending sin ruta: {}", e);
                let routing_error = match e {
                    AppError::RouteCreationFailed { .. } => e,
                    other => AppError::RouteCreationFailed {
                        order_id: order.id,
                        reason: other.to_string(),
                    },
                };
                Ok(OrderCreation {
                    order,
                    route: None,
                    routing_error: Some(routing_error),
                })
            }
        }
    }

    /// Reintentar la generación de ruta de un pedido que quedó en `pending`
    pub async fn retry_routing(&self, order_id: Uuid, acting: &User) -> AppResult<RoutedOrder> {
        let order = self.load_order(order_id).await?;
        self.require_order_access(acting, &order, "retry routing")?;

        if order.status != OrderStatus::Pending {
            return Err(AppError::InvalidTransition {
                order_id,
                from: order.status,
                to: OrderStatus::Routed,
            });
        }

        // Ruta ya persistida pero la transición no llegó a aplicarse
        if let Some(route) = self.store.find_route_by_order(order_id).await? {
            let order = self.apply_transition(order_id, OrderStatus::Pending, OrderStatus::Routed).await?;
            self.notify_logistics(&order, &route).await;
            return Ok(RoutedOrder { order, route });
        }

        self.route_order(&order, None).await
    }

    /// Elegir una opción de la ruta; el pedido pasa a `accepted`
    pub async fn select_route(&self, route_id: Uuid, option_id: Uuid, acting: &User) -> AppResult<RouteSelection> {
        AuthorizationService::require(AuthorizationService::can_select_route(acting), acting, "select route")?;

        let selection = self.store.select_route_option(route_id, option_id).await?;

        let option = selection.route.selected_option();
        info!(
            route_id = %route_id,
            order_id = %selection.order.id,
            option = option.map(|o| o.name.as_str()).unwrap_or_default(),
            selected_by = %acting.id,
            "✅ Opción de ruta seleccionada"
        );

        let payload = json!({
            "order_id": selection.order.id,
            "route_id": route_id,
            "option_id": option_id,
            "option_name": option.map(|o| o.name.clone()),
            "estimated_cost": option.map(|o| o.estimated_cost),
            "estimated_duration_hours": option.map(|o| o.estimated_duration_hours),
            "status": selection.order.status,
        });
        self.notifications
            .dispatch(NotificationTemplate::OrderRouteSelected, vec![selection.order.user_id], payload);

        Ok(selection)
    }

    /// Avanzar un paso: accepted -> processing -> delivery -> completed
    pub async fn advance(&self, order_id: Uuid, next_status: OrderStatus, acting: &User) -> AppResult<Order> {
        AuthorizationService::require(AuthorizationService::can_advance(acting), acting, "advance order")?;

        let order = self.load_order(order_id).await?;
        let manual_step = matches!(
            next_status,
            OrderStatus::Processing | OrderStatus::Delivery | OrderStatus::Completed
        );
        if !manual_step || order.status.next() != Some(next_status) {
            return Err(AppError::InvalidTransition {
                order_id,
                from: order.status,
                to: next_status,
            });
        }

        let updated = self.apply_transition(order_id, order.status, next_status).await?;
        info!(order_id = %order_id, from = %order.status, to = %next_status, "🔄 Estado del pedido actualizado");

        self.notify_status_change(&updated, order.status);
        Ok(updated)
    }

    /// Cancelar desde cualquier estado no terminal
    pub async fn cancel(&self, order_id: Uuid, acting: &User) -> AppResult<Order> {
        let order = self.load_order(order_id).await?;
        self.require_order_access(acting, &order, "cancel order")?;

        let mut current = order.status;
        // Cada rechazo condicional implica un avance; no puede haber más
        // intentos que estados.
        for _ in 0..OrderStatus::ALL.len() {
            if !current.can_transition_to(OrderStatus::Cancelled) {
                break;
            }

            match self.store.transition_order(order_id, current, OrderStatus::Cancelled).await? {
                TransitionOutcome::Applied(cancelled) => {
                    info!(order_id = %order_id, from = %current, cancelled_by = %acting.id, "🛑 Pedido cancelado");
                    self.notify_status_change(&cancelled, current);
                    return Ok(cancelled);
                }
                TransitionOutcome::Rejected { current: now } => current = now,
            }
        }

        Err(AppError::InvalidTransition {
            order_id,
            from: current,
            to: OrderStatus::Cancelled,
        })
    }

    pub async fn get_order(&self, order_id: Uuid, acting: &User) -> AppResult<Order> {
        let order = self.load_order(order_id).await?;
        self.require_order_access(acting, &order, "read order")?;
        Ok(order)
    }

    pub async fn get_route_for_order(&self, order_id: Uuid, acting: &User) -> AppResult<LogisticRoute> {
        let order = self.get_order(order_id, acting).await?;
        self.store
            .find_route_by_order(order.id)
            .await?
            .ok_or_else(|| not_found_error("LogisticRoute for order", &order.id.to_string()))
    }

    /// Los clientes ven solo sus pedidos; el resto de roles ve todos
    pub async fn list_orders_for(&self, acting: &User) -> AppResult<Vec<Order>> {
        let owner = if acting.role.is_staff() { None } else { Some(acting.id) };
        self.store.list_orders(owner).await
    }

    async fn route_order(&self, order: &Order, distance: Option<DistanceEstimate>) -> AppResult<RoutedOrder> {
        let route = match distance {
            Some(distance) => self.routes.generate_routes_with_distance(order, distance).await?,
            None => self.routes.generate_routes(order).await?,
        };

        let order = self
            .apply_transition(order.id, OrderStatus::Pending, OrderStatus::Routed)
            .await?;
        self.notify_logistics(&order, &route).await;

        Ok(RoutedOrder { order, route })
    }

    async fn apply_transition(&self, order_id: Uuid, from: OrderStatus, to: OrderStatus) -> AppResult<Order> {
        match self.store.transition_order(order_id, from, to).await? {
            TransitionOutcome::Applied(order) => Ok(order),
            TransitionOutcome::Rejected { current } => Err(AppError::InvalidTransition {
                order_id,
                from: current,
                to,
            }),
        }
    }

    async fn load_order(&self, order_id: Uuid) -> AppResult<Order> {
        self.store
            .find_order(order_id)
            .await?
            .ok_or_else(|| not_found_error("Order", &order_id.to_string()))
    }

    fn require_order_access(&self, acting: &User, order: &Order, operation: &str) -> AppResult<()> {
        if AuthorizationService::can_access_order(acting, order) {
            Ok(())
        } else {
            Err(unauthorized_error(operation, "order belongs to another client"))
        }
    }

    async fn notify_logistics(&self, order: &Order, route: &LogisticRoute) {
        let recipients = match self.store.list_users_by_role(Role::Logistic).await {
            Ok(users) => users.into_iter().map(|user| user.id).collect(),
            Err(e) => {
                warn!(order_id = %order.id, "⚠️ No se pudo obtener el equipo de logística: {}", e);
                return;
            }
        };

        let payload = json!({
            "order_id": order.id,
            "material_type": order.material_type,
            "volume_kg": order.volume_kg,
            "pickup_address": order.pickup_address,
            "price": order.price,
            "route_id": route.id,
            "options": route.options.iter().map(|o| o.name.as_str()).collect::<Vec<_>>(),
            "distance_km": route.distance_km,
            "distance_estimated": route.distance_estimated,
        });
        self.notifications
            .dispatch(NotificationTemplate::NewOrderForLogistics, recipients, payload);
    }

    fn notify_status_change(&self, order: &Order, previous: OrderStatus) {
        let payload: Value = json!({
            "order_id": order.id,
            "previous_status": previous,
            "status": order.status,
        });
        self.notifications
            .dispatch(NotificationTemplate::OrderStatusChanged, vec![order.user_id], payload);
    }
}
