//! Store en memoria
//!
//! Se usa cuando no hay `DATABASE_URL` y en los tests. Todas las tablas
//! viven detrás de un único `RwLock`, de modo que cada operación del trait
//! es atómica igual que una transacción en PostgreSQL.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{OrderRepository, RouteRepository, TransitionOutcome, UserRepository};
use crate::models::{LogisticRoute, Order, OrderStatus, Role, RoleSource, RouteSelection, User};
use crate::utils::errors::{conflict_error, not_found_error, AppError, AppResult};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    orders: HashMap<Uuid, Order>,
    routes: HashMap<Uuid, LogisticRoute>,
    route_by_order: HashMap<Uuid, Uuid>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_route_inserts: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simular una caída del store al insertar rutas
    pub fn set_fail_route_inserts(&self, fail: bool) {
        self.fail_route_inserts.store(fail, Ordering::SeqCst);
    }

    pub async fn route_count(&self) -> usize {
        self.tables.read().await.routes.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, user: User) -> AppResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|existing| existing.email == user.email) {
            return Err(conflict_error("User", "email", &user.email));
        }

        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|user| user.email == email).cloned())
    }

    async fn list_users_by_role(&self, role: Role) -> AppResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|user| user.role == role)
            .cloned()
            .collect();
        users.sort_by_key(|user| user.created_at);
        Ok(users)
    }

    async fn update_user_role(&self, id: Uuid, role: Role, source: RoleSource) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| not_found_error("User", &id.to_string()))?;

        user.role = role;
        user.role_source = source;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn insert_order(&self, order: Order) -> AppResult<Order> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&order.user_id) {
            return Err(not_found_error("User", &order.user_id.to_string()));
        }
        if tables.orders.contains_key(&order.id) {
            return Err(conflict_error("Order", "id", &order.id.to_string()));
        }

        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn find_order(&self, id: Uuid) -> AppResult<Option<Order>> {
        Ok(self.tables.read().await.orders.get(&id).cloned())
    }

    async fn list_orders(&self, owner: Option<Uuid>) -> AppResult<Vec<Order>> {
        let tables = self.tables.read().await;
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|order| owner.map_or(true, |user_id| order.user_id == user_id))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn transition_order(
        &self,
        id: Uuid,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> AppResult<TransitionOutcome> {
        let mut tables = self.tables.write().await;
        let order = tables
            .orders
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Order", &id.to_string()))?;

        if order.status != expected {
            return Ok(TransitionOutcome::Rejected { current: order.status });
        }

        order.status = next;
        order.updated_at = Utc::now();
        Ok(TransitionOutcome::Applied(order.clone()))
    }
}

#[async_trait]
impl RouteRepository for MemoryStore {
    async fn insert_route(&self, route: LogisticRoute) -> AppResult<LogisticRoute> {
        if self.fail_route_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Internal("route storage unavailable".to_string()));
        }

        let mut tables = self.tables.write().await;

        if !tables.orders.contains_key(&route.order_id) {
            return Err(not_found_error("Order", &route.order_id.to_string()));
        }
        if tables.route_by_order.contains_key(&route.order_id) {
            return Err(AppError::DuplicateRoute { order_id: route.order_id });
        }

        let route = LogisticRoute {
            selected_option_id: None,
            selected_at: None,
            ..route
        };
        tables.route_by_order.insert(route.order_id, route.id);
        tables.routes.insert(route.id, route.clone());
        Ok(route)
    }

    async fn find_route(&self, id: Uuid) -> AppResult<Option<LogisticRoute>> {
        Ok(self.tables.read().await.routes.get(&id).cloned())
    }

    async fn find_route_by_order(&self, order_id: Uuid) -> AppResult<Option<LogisticRoute>> {
        let tables = self.tables.read().await;
        Ok(tables
            .route_by_order
            .get(&order_id)
            .and_then(|route_id| tables.routes.get(route_id))
            .cloned())
    }

    async fn select_route_option(&self, route_id: Uuid, option_id: Uuid) -> AppResult<RouteSelection> {
        let mut tables = self.tables.write().await;

        let route = tables
            .routes
            .get(&route_id)
            .ok_or_else(|| not_found_error("LogisticRoute", &route_id.to_string()))?;

        // Una ruta ya elegida responde siempre `AlreadySelected`
        if route.selected_option_id.is_some() {
            return Err(AppError::AlreadySelected { route_id });
        }
        if route.option(option_id).is_none() {
            return Err(AppError::InvalidOption { route_id, option_id });
        }

        let order_id = route.order_id;
        let current = tables
            .orders
            .get(&order_id)
            .map(|order| order.status)
            .ok_or_else(|| not_found_error("Order", &order_id.to_string()))?;
        if current != OrderStatus::Routed {
            return Err(AppError::InvalidTransition {
                order_id,
                from: current,
                to: OrderStatus::Accepted,
            });
        }

        let now = Utc::now();

        let order = match tables.orders.get_mut(&order_id) {
            Some(order) => {
                order.status = OrderStatus::Accepted;
                order.updated_at = now;
                order.clone()
            }
            None => return Err(not_found_error("Order", &order_id.to_string())),
        };

        let route = match tables.routes.get_mut(&route_id) {
            Some(route) => {
                route.selected_option_id = Some(option_id);
                route.selected_at = Some(now);
                route.clone()
            }
            None => return Err(not_found_error("LogisticRoute", &route_id.to_string())),
        };

        Ok(RouteSelection { route, order })
    }
}
